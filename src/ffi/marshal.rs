//! Strings, enum constants and collections across the boundary.

use super::env::{ClassRef, Env, MethodId, ObjectRef, Value};
use super::error::enforce_not_null;
use crate::error::{Error, Result};

/// `java.lang.String`
pub const STRING_CLASS: &str = "java/lang/String";
/// `java.lang.Iterable`
pub const ITERABLE_CLASS: &str = "java/lang/Iterable";
/// `java.util.Iterator`
pub const ITERATOR_CLASS: &str = "java/util/Iterator";

/// Convert a managed string to a native string. Null is rejected.
pub fn to_native_string(env: &mut dyn Env, s: Option<ObjectRef>) -> Result<String> {
    let s = enforce_not_null(s)?;
    env.get_string(s)
}

/// Convert a native string to a managed string.
pub fn to_managed_string(env: &mut dyn Env, s: &str) -> Result<ObjectRef> {
    env.new_string(s)
}

/// Call a method that returns a `String` and convert the result.
pub fn call_string_method(env: &mut dyn Env, obj: ObjectRef, method: MethodId) -> Result<String> {
    let ret = env.call_method(obj, method, &[])?.l()?;
    to_native_string(env, ret)
}

/// The constant named `constant` of the managed enum class `enum_class`.
pub fn get_enum_constant(env: &mut dyn Env, enum_class: &str, constant: &str) -> Result<ObjectRef> {
    let class = env.find_class(enum_class)?;
    let signature = format!("L{};", enum_class);
    let value = env.get_static_field(class, constant, &signature)?.l()?;
    value.ok_or_else(|| Error::logic(format!("enum constant {}.{} is null", enum_class, constant)))
}

/// Build a managed array from a native sequence.
///
/// The array is allocated with exactly `items.len()` elements of class
/// `element_class`, and element `i` is `conv(items[i])`. If any conversion
/// fails the error is returned and the partially filled array is dropped.
pub fn to_managed_array<T>(
    env: &mut dyn Env,
    element_class: ClassRef,
    items: &[T],
    mut conv: impl FnMut(&mut dyn Env, &T) -> Result<Option<ObjectRef>>,
) -> Result<ObjectRef> {
    let len = i32::try_from(items.len())
        .map_err(|_| Error::native("sequence is too long for a managed array"))?;
    let array = env.new_object_array(len, element_class)?;
    for (index, item) in (0..len).zip(items) {
        let element = conv(env, item)?;
        env.set_object_array_element(array, index, element)?;
    }
    Ok(array)
}

/// Resolved `Iterable` / `Iterator` methods, reusable across many
/// traversals within one call.
pub struct IterableContext {
    iterable_class: ClassRef,
    iterator: MethodId,
    has_next: MethodId,
    next: MethodId,
}

impl IterableContext {
    /// Resolve the iteration methods.
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let iterable_class = env.find_class(ITERABLE_CLASS)?;
        let iterator_class = env.find_class(ITERATOR_CLASS)?;
        Ok(Self {
            iterable_class,
            iterator: env.get_method_id(iterable_class, "iterator", "()Ljava/util/Iterator;")?,
            has_next: env.get_method_id(iterator_class, "hasNext", "()Z")?,
            next: env.get_method_id(iterator_class, "next", "()Ljava/lang/Object;")?,
        })
    }

    /// Call `f` once for each element of `iterable`, in traversal order.
    ///
    /// Only `hasNext()` / `next()` are used, so the collection needs neither
    /// random access nor a known size.
    pub fn for_each(
        &self,
        env: &mut dyn Env,
        iterable: Option<ObjectRef>,
        mut f: impl FnMut(&mut dyn Env, Option<ObjectRef>) -> Result<()>,
    ) -> Result<()> {
        let iterable = enforce_not_null(iterable)?;
        if !env.is_instance_of(iterable, self.iterable_class) {
            return Err(Error::illegal_argument("object is not an Iterable"));
        }
        let iterator = enforce_not_null(env.call_method(iterable, self.iterator, &[])?.l()?)?;
        while env.call_method(iterator, self.has_next, &[])?.z()? {
            let element = env.call_method(iterator, self.next, &[])?.l()?;
            f(env, element)?;
        }
        Ok(())
    }

    /// Convert each element of `iterable` and collect the results in order.
    pub fn collect<T>(
        &self,
        env: &mut dyn Env,
        iterable: Option<ObjectRef>,
        mut conv: impl FnMut(&mut dyn Env, Option<ObjectRef>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::new();
        self.for_each(env, iterable, |env, element| {
            out.push(conv(env, element)?);
            Ok(())
        })?;
        Ok(out)
    }
}

/// Construct an object of class `class_name` through its `(J)V` constructor,
/// passing a native handle.
pub fn new_with_handle(env: &mut dyn Env, class_name: &str, handle: i64) -> Result<ObjectRef> {
    let class = env.find_class(class_name)?;
    let ctor = env.get_method_id(class, "<init>", "(J)V")?;
    env.new_object(class, ctor, &[Value::Long(handle)])
}
