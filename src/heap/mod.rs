//! An in-process managed heap.
//!
//! [`Heap`] implements [`Env`] without an external virtual machine. It hosts
//! the standard classes the bridge touches (strings, `ArrayList`, iterators,
//! the exception hierarchy) and the Coral contract classes, with their
//! methods written in Rust. Embedders can drive the bridge from Rust through
//! it, and the test suites use it as the managed side of every call.
//!
//! Objects are never collected; a `Heap` is meant to live for one session.

mod classes;
mod objects;

use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::error::{Error, Result};
use crate::ffi::{ClassRef, Env, FieldId, MethodId, ObjectRef, Value};

/// Implementation of a managed method. `this` is the receiver, or the
/// freshly allocated object for a constructor.
pub(crate) type NativeMethod = fn(&mut Heap, ObjectRef, &[Value]) -> Result<Value>;

pub(crate) const OBJECT: &str = "java/lang/Object";
pub(crate) const STRING: &str = "java/lang/String";
pub(crate) const THROWABLE: &str = "java/lang/Throwable";
const MESSAGE_FIELD: &str = "detailMessage";

struct Class {
    name: String,
    superclass: Option<String>,
    interfaces: Vec<String>,
    /// `None` marks an abstract (interface) method.
    methods: HashMap<(String, String), Option<NativeMethod>>,
    fields: Vec<(String, String)>,
    statics: HashMap<String, Value>,
}

struct MethodDecl {
    class: ClassRef,
    name: String,
    sig: String,
}

/// Built-in state of objects whose classes are implemented natively.
pub(crate) enum Payload {
    None,
    Str(String),
    Array {
        element_class: ClassRef,
        elements: Vec<Option<ObjectRef>>,
    },
    List(Vec<Option<ObjectRef>>),
    Iter {
        source: ObjectRef,
        position: usize,
    },
    Constant(String),
}

struct Object {
    class: ClassRef,
    fields: HashMap<String, Value>,
    payload: Payload,
}

fn default_value(sig: &str) -> Value {
    match sig.as_bytes().first() {
        Some(b'Z') => Value::Boolean(false),
        Some(b'I') => Value::Int(0),
        Some(b'J') => Value::Long(0),
        Some(b'D') => Value::Double(0.0),
        _ => Value::NULL,
    }
}

/// The in-process managed heap.
pub struct Heap {
    classes: Vec<Class>,
    class_index: HashMap<String, ClassRef>,
    methods: Vec<MethodDecl>,
    fields: Vec<String>,
    objects: Vec<Object>,
    pending: Option<ObjectRef>,
    object_limit: Option<usize>,
}

impl Heap {
    /// Create a heap with the standard and contract classes loaded.
    pub fn new() -> Self {
        let mut heap = Self {
            classes: Vec::new(),
            class_index: HashMap::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            objects: Vec::new(),
            pending: None,
            object_limit: None,
        };
        classes::load(&mut heap);
        heap
    }

    /// Limit the number of live objects. Allocations past the limit raise
    /// `OutOfMemoryError`. Exceptions are always allocated.
    pub fn set_object_limit(&mut self, limit: Option<usize>) {
        self.object_limit = limit;
    }

    /// Number of objects allocated so far.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Class name and message of the in-flight exception, if any.
    pub fn exception_info(&self) -> Option<(String, String)> {
        let throwable = self.pending?;
        let class = self.class_name_of(throwable).ok()?;
        let message = match self.field_value(throwable, MESSAGE_FIELD) {
            Ok(Value::Object(Some(s))) => self.str_of(s).ok()?.to_owned(),
            _ => String::new(),
        };
        Some((class, message))
    }

    /// Clear the in-flight exception, returning its class name and message.
    pub fn take_exception_info(&mut self) -> Option<(String, String)> {
        let info = self.exception_info();
        self.pending = None;
        info
    }

    /// Clear the in-flight exception.
    pub fn exception_clear(&mut self) {
        self.pending = None;
    }

    /// Name of the enum constant `obj`, if it is one.
    pub fn enum_constant_name(&self, obj: ObjectRef) -> Option<String> {
        match &self.object(obj).ok()?.payload {
            Payload::Constant(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Elements of an object array.
    pub fn array_elements(&self, array: ObjectRef) -> Result<Vec<Option<ObjectRef>>> {
        match &self.object(array)?.payload {
            Payload::Array { elements, .. } => Ok(elements.clone()),
            _ => Err(Error::logic("object is not an array")),
        }
    }

    /// Create a `java.util.ArrayList` holding `elements`.
    pub fn new_list(&mut self, elements: Vec<Option<ObjectRef>>) -> Result<ObjectRef> {
        let class = self.find_class(classes::ARRAY_LIST)?;
        self.alloc(class, Payload::List(elements))
    }

    /// Read an instance field by name.
    pub fn field(&self, obj: ObjectRef, name: &str) -> Result<Value> {
        self.field_value(obj, name)
    }

    /// Read a string field by name. Null reads as `None`.
    pub fn string_field(&self, obj: ObjectRef, name: &str) -> Result<Option<String>> {
        match self.field_value(obj, name)?.l()? {
            Some(s) => Ok(Some(self.str_of(s)?.to_owned())),
            None => Ok(None),
        }
    }

    /// Fully qualified class name of an object, slash-separated.
    pub fn class_name_of(&self, obj: ObjectRef) -> Result<String> {
        let class = self.object(obj)?.class;
        Ok(self.class(class)?.name.clone())
    }

    // ---- internals used by the class implementations ----

    fn class(&self, class: ClassRef) -> Result<&Class> {
        self.classes
            .get(class.0 as usize)
            .ok_or_else(|| Error::logic(format!("invalid class reference {:?}", class)))
    }

    fn object(&self, obj: ObjectRef) -> Result<&Object> {
        self.objects
            .get(obj.into_raw().get() as usize - 1)
            .ok_or_else(|| Error::logic(format!("invalid object reference {:?}", obj)))
    }

    fn object_mut(&mut self, obj: ObjectRef) -> Result<&mut Object> {
        self.objects
            .get_mut(obj.into_raw().get() as usize - 1)
            .ok_or_else(|| Error::logic(format!("invalid object reference {:?}", obj)))
    }

    pub(crate) fn payload(&self, obj: ObjectRef) -> Result<&Payload> {
        Ok(&self.object(obj)?.payload)
    }

    pub(crate) fn payload_mut(&mut self, obj: ObjectRef) -> Result<&mut Payload> {
        Ok(&mut self.object_mut(obj)?.payload)
    }

    pub(crate) fn str_of(&self, obj: ObjectRef) -> Result<&str> {
        match &self.object(obj)?.payload {
            Payload::Str(s) => Ok(s),
            _ => Err(Error::logic("object is not a string")),
        }
    }

    pub(crate) fn field_value(&self, obj: ObjectRef, name: &str) -> Result<Value> {
        self.object(obj)?
            .fields
            .get(name)
            .copied()
            .ok_or_else(|| Error::logic(format!("object has no field {}", name)))
    }

    pub(crate) fn set_field_value(&mut self, obj: ObjectRef, name: &str, value: Value) -> Result<()> {
        let slot = self
            .object_mut(obj)?
            .fields
            .get_mut(name)
            .ok_or_else(|| Error::logic(format!("object has no field {}", name)))?;
        *slot = value;
        Ok(())
    }

    fn superclass_of(&self, class: ClassRef) -> Option<ClassRef> {
        let name = self.class(class).ok()?.superclass.as_deref()?;
        self.class_index.get(name).copied()
    }

    fn is_subtype(&self, class: ClassRef, target: ClassRef) -> bool {
        if class == target {
            return true;
        }
        let Ok(c) = self.class(class) else {
            return false;
        };
        c.superclass
            .iter()
            .chain(c.interfaces.iter())
            .filter_map(|name| self.class_index.get(name).copied())
            .any(|parent| self.is_subtype(parent, target))
    }

    fn declares(&self, class: ClassRef, key: &(String, String)) -> bool {
        let Ok(c) = self.class(class) else {
            return false;
        };
        c.methods.contains_key(key)
            || c
                .superclass
                .iter()
                .chain(c.interfaces.iter())
                .filter_map(|name| self.class_index.get(name).copied())
                .any(|parent| self.declares(parent, key))
    }

    fn find_impl(&self, class: ClassRef, key: &(String, String)) -> Option<NativeMethod> {
        let mut current = Some(class);
        while let Some(c) = current {
            if let Some(Some(f)) = self.class(c).ok()?.methods.get(key) {
                return Some(*f);
            }
            current = self.superclass_of(c);
        }
        None
    }

    fn field_declared(&self, class: ClassRef, name: &str, sig: &str) -> bool {
        let mut current = Some(class);
        while let Some(c) = current {
            match self.class(c) {
                Ok(cls) if cls.fields.iter().any(|(n, s)| n == name && s == sig) => return true,
                Ok(_) => current = self.superclass_of(c),
                Err(_) => return false,
            }
        }
        false
    }

    fn define(&mut self, class: Class) -> ClassRef {
        let class_ref = ClassRef(self.classes.len() as u32);
        self.class_index.insert(class.name.clone(), class_ref);
        self.classes.push(class);
        class_ref
    }

    fn array_class(&mut self, element_class: ClassRef) -> Result<ClassRef> {
        let name = format!("[L{};", self.class(element_class)?.name);
        if let Some(c) = self.class_index.get(&name) {
            return Ok(*c);
        }
        Ok(self.define(Class {
            name,
            superclass: Some(OBJECT.to_owned()),
            interfaces: Vec::new(),
            methods: HashMap::new(),
            fields: Vec::new(),
            statics: HashMap::new(),
        }))
    }

    fn new_object_unchecked(&mut self, class: ClassRef, payload: Payload) -> Result<ObjectRef> {
        let mut fields = HashMap::new();
        let mut current = Some(class);
        while let Some(c) = current {
            for (name, sig) in &self.class(c)?.fields {
                fields.entry(name.clone()).or_insert_with(|| default_value(sig));
            }
            current = self.superclass_of(c);
        }
        let index = u32::try_from(self.objects.len() + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| Error::native("managed heap is full"))?;
        self.objects.push(Object {
            class,
            fields,
            payload,
        });
        Ok(ObjectRef::from_raw(index))
    }

    /// Allocate an object, honouring the object limit.
    pub(crate) fn alloc(&mut self, class: ClassRef, payload: Payload) -> Result<ObjectRef> {
        if self.object_limit.map_or(false, |limit| self.objects.len() >= limit) {
            return Err(self.raise("java/lang/OutOfMemoryError", "Java heap space"));
        }
        self.new_object_unchecked(class, payload)
    }

    pub(crate) fn alloc_str(&mut self, s: &str) -> Result<ObjectRef> {
        let class = self.find_class(STRING)?;
        self.alloc(class, Payload::Str(s.to_owned()))
    }

    /// Raise a managed exception and return the error that reports it.
    pub(crate) fn raise(&mut self, class_name: &str, message: &str) -> Error {
        let thrown = self
            .class_index
            .get(class_name)
            .copied()
            .ok_or_else(|| Error::logic(format!("unknown exception class {}", class_name)))
            .and_then(|class| self.throwable(class, message));
        match thrown {
            Ok(throwable) => {
                self.pending = Some(throwable);
                Error::Pending
            }
            Err(err) => err,
        }
    }

    fn throwable(&mut self, class: ClassRef, message: &str) -> Result<ObjectRef> {
        let string_class = self
            .class_index
            .get(STRING)
            .copied()
            .ok_or_else(|| Error::logic("java/lang/String is not loaded"))?;
        let message = self.new_object_unchecked(string_class, Payload::Str(message.to_owned()))?;
        let throwable = self.new_object_unchecked(class, Payload::None)?;
        self.set_field_value(throwable, MESSAGE_FIELD, message.into())?;
        Ok(throwable)
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Env for Heap {
    fn exception_check(&self) -> bool {
        self.pending.is_some()
    }

    fn exception_describe(&mut self) {
        if let Some((class, message)) = self.exception_info() {
            log::error!("Exception {}: {}", class.replace('/', "."), message);
        }
    }

    fn throw_new(&mut self, class: ClassRef, message: &str) -> Result<()> {
        let throwable_class = self.find_class(THROWABLE)?;
        if !self.is_subtype(class, throwable_class) {
            return Err(Error::logic(format!(
                "{} is not a throwable class",
                self.class(class)?.name
            )));
        }
        let throwable = self.throwable(class, message)?;
        self.pending = Some(throwable);
        Ok(())
    }

    fn fatal_error(&mut self, message: &str) -> ! {
        log::error!("FATAL ERROR in native method: {}", message);
        std::process::abort()
    }

    fn find_class(&mut self, name: &str) -> Result<ClassRef> {
        match self.class_index.get(name).copied() {
            Some(c) => Ok(c),
            None => Err(self.raise("java/lang/NoClassDefFoundError", name)),
        }
    }

    fn get_object_class(&mut self, obj: ObjectRef) -> Result<ClassRef> {
        Ok(self.object(obj)?.class)
    }

    fn is_instance_of(&mut self, obj: ObjectRef, class: ClassRef) -> bool {
        match self.object(obj) {
            Ok(o) => self.is_subtype(o.class, class),
            Err(_) => false,
        }
    }

    fn is_same_object(&self, a: Option<ObjectRef>, b: Option<ObjectRef>) -> bool {
        a == b
    }

    fn get_method_id(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<MethodId> {
        let key = (name.to_owned(), sig.to_owned());
        let found = if name == "<init>" {
            self.class(class)?.methods.contains_key(&key)
        } else {
            self.declares(class, &key)
        };
        if !found {
            let message = format!("{}.{}{}", self.class(class)?.name, name, sig);
            return Err(self.raise("java/lang/NoSuchMethodError", &message));
        }
        if let Some(index) = self
            .methods
            .iter()
            .position(|m| m.class == class && m.name == name && m.sig == sig)
        {
            return Ok(MethodId(index as u32));
        }
        self.methods.push(MethodDecl {
            class,
            name: name.to_owned(),
            sig: sig.to_owned(),
        });
        Ok(MethodId(self.methods.len() as u32 - 1))
    }

    fn get_field_id(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<FieldId> {
        if !self.field_declared(class, name, sig) {
            return Err(self.raise("java/lang/NoSuchFieldError", name));
        }
        if let Some(index) = self.fields.iter().position(|f| f == name) {
            return Ok(FieldId(index as u32));
        }
        self.fields.push(name.to_owned());
        Ok(FieldId(self.fields.len() as u32 - 1))
    }

    fn get_static_field(&mut self, class: ClassRef, name: &str, _sig: &str) -> Result<Value> {
        let value = self.class(class)?.statics.get(name).copied();
        match value {
            Some(v) => Ok(v),
            None => Err(self.raise("java/lang/NoSuchFieldError", name)),
        }
    }

    fn new_object(&mut self, class: ClassRef, ctor: MethodId, args: &[Value]) -> Result<ObjectRef> {
        let decl = self
            .methods
            .get(ctor.0 as usize)
            .ok_or_else(|| Error::logic("invalid method ID"))?;
        if decl.class != class || decl.name != "<init>" {
            return Err(Error::logic("method is not a constructor of the class"));
        }
        let key = (decl.name.clone(), decl.sig.clone());
        let init = self
            .class(class)?
            .methods
            .get(&key)
            .copied()
            .flatten()
            .ok_or_else(|| Error::logic("constructor has no implementation"))?;
        let obj = self.alloc(class, Payload::None)?;
        init(self, obj, args)?;
        Ok(obj)
    }

    fn call_method(&mut self, obj: ObjectRef, method: MethodId, args: &[Value]) -> Result<Value> {
        let decl = self
            .methods
            .get(method.0 as usize)
            .ok_or_else(|| Error::logic("invalid method ID"))?;
        let (declaring, key) = (decl.class, (decl.name.clone(), decl.sig.clone()));
        let runtime = self.object(obj)?.class;
        if !self.is_subtype(runtime, declaring) {
            return Err(Error::logic(format!(
                "{} has no method {}{}",
                self.class(runtime)?.name,
                key.0,
                key.1
            )));
        }
        match self.find_impl(runtime, &key) {
            Some(f) => f(self, obj, args),
            None => {
                let message = format!("{}.{}{}", self.class(runtime)?.name, key.0, key.1);
                Err(self.raise("java/lang/AbstractMethodError", &message))
            }
        }
    }

    fn get_field(&mut self, obj: ObjectRef, field: FieldId) -> Result<Value> {
        let name = self
            .fields
            .get(field.0 as usize)
            .ok_or_else(|| Error::logic("invalid field ID"))?;
        self.field_value(obj, name)
    }

    fn set_field(&mut self, obj: ObjectRef, field: FieldId, value: Value) -> Result<()> {
        let name = self
            .fields
            .get(field.0 as usize)
            .cloned()
            .ok_or_else(|| Error::logic("invalid field ID"))?;
        self.set_field_value(obj, &name, value)
    }

    fn new_string(&mut self, s: &str) -> Result<ObjectRef> {
        self.alloc_str(s)
    }

    fn get_string(&mut self, s: ObjectRef) -> Result<String> {
        Ok(self.str_of(s)?.to_owned())
    }

    fn new_object_array(&mut self, len: i32, element_class: ClassRef) -> Result<ObjectRef> {
        let len = match usize::try_from(len) {
            Ok(len) => len,
            Err(_) => {
                return Err(self.raise(
                    "java/lang/NegativeArraySizeException",
                    &len.to_string(),
                ))
            }
        };
        let class = self.array_class(element_class)?;
        self.alloc(
            class,
            Payload::Array {
                element_class,
                elements: vec![None; len],
            },
        )
    }

    fn set_object_array_element(
        &mut self,
        array: ObjectRef,
        index: i32,
        value: Option<ObjectRef>,
    ) -> Result<()> {
        let (element_class, len) = match self.payload(array)? {
            Payload::Array {
                element_class,
                elements,
            } => (*element_class, elements.len()),
            _ => return Err(Error::logic("object is not an array")),
        };
        let slot = match usize::try_from(index) {
            Ok(i) if i < len => i,
            _ => {
                let message = format!("Index {} out of bounds for length {}", index, len);
                return Err(self.raise("java/lang/ArrayIndexOutOfBoundsException", &message));
            }
        };
        if let Some(v) = value {
            if !self.is_instance_of(v, element_class) {
                let message = self.class_name_of(v)?.replace('/', ".");
                return Err(self.raise("java/lang/ArrayStoreException", &message));
            }
        }
        if let Payload::Array { elements, .. } = self.payload_mut(array)? {
            elements[slot] = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_class_raises() {
        let mut heap = Heap::new();
        let err = heap.find_class("no/such/Thing").unwrap_err();
        assert!(err.is_pending());
        let (class, message) = heap.take_exception_info().unwrap();
        assert_eq!(class, "java/lang/NoClassDefFoundError");
        assert_eq!(message, "no/such/Thing");
    }

    #[test]
    fn test_throw_new_requires_throwable() {
        let mut heap = Heap::new();
        let string = heap.find_class(STRING).unwrap();
        assert!(heap.throw_new(string, "nope").is_err());
        assert!(!heap.exception_check());
    }

    #[test]
    fn test_array_store_checks() {
        let mut heap = Heap::new();
        let string = heap.find_class(STRING).unwrap();
        let array = heap.new_object_array(2, string).unwrap();
        let s = heap.new_string("a").unwrap();
        heap.set_object_array_element(array, 1, Some(s)).unwrap();
        assert_eq!(heap.array_elements(array).unwrap(), vec![None, Some(s)]);

        assert!(heap.set_object_array_element(array, 2, Some(s)).is_err());
        let (class, _) = heap.take_exception_info().unwrap();
        assert_eq!(class, "java/lang/ArrayIndexOutOfBoundsException");

        let list = heap.new_list(Vec::new()).unwrap();
        assert!(heap.set_object_array_element(array, 0, Some(list)).is_err());
        let (class, _) = heap.take_exception_info().unwrap();
        assert_eq!(class, "java/lang/ArrayStoreException");
    }

    #[test]
    fn test_interface_dispatch() {
        let mut heap = Heap::new();
        let iterable = heap.find_class("java/lang/Iterable").unwrap();
        let iterator = heap
            .get_method_id(iterable, "iterator", "()Ljava/util/Iterator;")
            .unwrap();
        let s = heap.new_string("x").unwrap();
        let list = heap.new_list(vec![Some(s)]).unwrap();
        assert!(heap.is_instance_of(list, iterable));
        let it = heap.call_method(list, iterator, &[]).unwrap().l().unwrap();
        assert!(it.is_some());
    }

    #[test]
    fn test_object_limit() {
        let mut heap = Heap::new();
        heap.set_object_limit(Some(heap.object_count()));
        assert!(heap.new_string("x").unwrap_err().is_pending());
        let (class, _) = heap.take_exception_info().unwrap();
        assert_eq!(class, "java/lang/OutOfMemoryError");
    }
}
