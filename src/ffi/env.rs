//! The managed runtime interface.
//!
//! [`Env`] is what every entry point receives from its caller: the handle to
//! the managed runtime the call came from. It mirrors the reflective native
//! interface the managed contract classes are written against, so the
//! converters look up classes, methods and fields by name and signature and
//! then operate on opaque object references.
//!
//! A failure the runtime itself reports (a missing class, a throwing
//! method) comes back as [`Error::Pending`]: the managed exception
//! describing it is already in flight, and the caller only needs to unwind
//! back to the boundary. Misuse of the interface, such as a dangling
//! reference or an ID from another runtime, is a logic error with no
//! exception raised.

use std::fmt;
use std::num::NonZeroU32;

use crate::error::{Error, Result};

/// Opaque reference to a managed object. Null is represented by `None`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(NonZeroU32);

impl ObjectRef {
    /// Create a reference from a runtime-specific non-zero index.
    pub const fn from_raw(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    /// The runtime-specific index.
    pub const fn into_raw(self) -> NonZeroU32 {
        self.0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef(#{})", self.0)
    }
}

/// Opaque reference to a managed class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassRef(pub u32);

/// Resolved method identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u32);

/// Resolved field identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub u32);

/// A managed value: a primitive or an object reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// No value (`void` return).
    Void,
    /// `boolean`
    Boolean(bool),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `double`
    Double(f64),
    /// Object reference, possibly null.
    Object(Option<ObjectRef>),
}

impl Value {
    /// The null reference.
    pub const NULL: Value = Value::Object(None);

    fn kind(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::Object(_) => "object",
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::logic(format!(
            "managed value has type {}, expected {}",
            self.kind(),
            expected
        ))
    }

    /// Interpret as `boolean`.
    pub fn z(self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(b),
            other => Err(other.mismatch("boolean")),
        }
    }

    /// Interpret as `int`.
    pub fn i(self) -> Result<i32> {
        match self {
            Value::Int(i) => Ok(i),
            other => Err(other.mismatch("int")),
        }
    }

    /// Interpret as `long`.
    pub fn j(self) -> Result<i64> {
        match self {
            Value::Long(j) => Ok(j),
            other => Err(other.mismatch("long")),
        }
    }

    /// Interpret as `double`.
    pub fn d(self) -> Result<f64> {
        match self {
            Value::Double(d) => Ok(d),
            other => Err(other.mismatch("double")),
        }
    }

    /// Interpret as an object reference.
    pub fn l(self) -> Result<Option<ObjectRef>> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.mismatch("object")),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(Some(v))
    }
}

impl From<Option<ObjectRef>> for Value {
    fn from(v: Option<ObjectRef>) -> Self {
        Value::Object(v)
    }
}

/// Interface to the managed runtime a call came from.
///
/// Method and field signatures use the managed runtime's descriptor syntax,
/// e.g. `"(Ljava/lang/String;I)V"`.
pub trait Env {
    /// Whether a managed exception is currently in flight.
    fn exception_check(&self) -> bool;

    /// Print the in-flight exception, if any, for diagnosis.
    fn exception_describe(&mut self);

    /// Raise a new exception of class `class` with message `message`.
    fn throw_new(&mut self, class: ClassRef, message: &str) -> Result<()>;

    /// Terminate the process with a message. Never returns.
    fn fatal_error(&mut self, message: &str) -> !;

    /// Look up a class by its slash-separated name.
    fn find_class(&mut self, name: &str) -> Result<ClassRef>;

    /// The class of an object.
    fn get_object_class(&mut self, obj: ObjectRef) -> Result<ClassRef>;

    /// Whether `obj` is an instance of `class` or one of its subtypes.
    fn is_instance_of(&mut self, obj: ObjectRef, class: ClassRef) -> bool;

    /// Whether two references denote the same object (both null counts).
    fn is_same_object(&self, a: Option<ObjectRef>, b: Option<ObjectRef>) -> bool;

    /// Resolve an instance method (or constructor, named `<init>`).
    fn get_method_id(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<MethodId>;

    /// Resolve an instance field.
    fn get_field_id(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<FieldId>;

    /// Read a static field.
    fn get_static_field(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<Value>;

    /// Construct an object through the constructor `ctor`.
    fn new_object(&mut self, class: ClassRef, ctor: MethodId, args: &[Value]) -> Result<ObjectRef>;

    /// Call an instance method, dispatching on the runtime class of `obj`.
    fn call_method(&mut self, obj: ObjectRef, method: MethodId, args: &[Value]) -> Result<Value>;

    /// Read an instance field.
    fn get_field(&mut self, obj: ObjectRef, field: FieldId) -> Result<Value>;

    /// Write an instance field.
    fn set_field(&mut self, obj: ObjectRef, field: FieldId, value: Value) -> Result<()>;

    /// Create a managed string.
    fn new_string(&mut self, s: &str) -> Result<ObjectRef>;

    /// Read the contents of a managed string.
    fn get_string(&mut self, s: ObjectRef) -> Result<String>;

    /// Create an object array of `len` null elements.
    fn new_object_array(&mut self, len: i32, element_class: ClassRef) -> Result<ObjectRef>;

    /// Store an element into an object array.
    fn set_object_array_element(
        &mut self,
        array: ObjectRef,
        index: i32,
        value: Option<ObjectRef>,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(true).z().unwrap(), true);
        assert_eq!(Value::from(7).i().unwrap(), 7);
        assert_eq!(Value::from(7i64).j().unwrap(), 7);
        assert_eq!(Value::from(0.5).d().unwrap(), 0.5);
        assert_eq!(Value::NULL.l().unwrap(), None);
    }

    #[test]
    fn test_value_accessor_mismatch_is_logic_error() {
        let err = Value::from(1.0).i().unwrap_err();
        assert!(err.is_logic());
        assert!(err.to_string().contains("double"));
    }
}
