use super::{checked_instance, class_names, DataTypeConverter};
use crate::error::{Error, Result};
use crate::ffi::marshal::{call_string_method, to_managed_string};
use crate::ffi::{ClassRef, Env, MethodId, ObjectRef, Value};
use crate::types::{DataType, ScalarValue};

/// `ScalarValue` ⇄ `no.viproma.coral.model.ScalarValue`
///
/// Conversion is directed by the value's data type: it selects which
/// accessor is called on the way in and which constructor on the way out.
pub struct ScalarValueConverter {
    data_types: DataTypeConverter,
    class: ClassRef,
    get_data_type: MethodId,
    get_real_value: MethodId,
    get_integer_value: MethodId,
    get_boolean_value: MethodId,
    get_string_value: MethodId,
    new_real: MethodId,
    new_integer: MethodId,
    new_boolean: MethodId,
    new_string: MethodId,
}

impl ScalarValueConverter {
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let data_types = DataTypeConverter::new(env)?;
        let class = env.find_class(class_names::SCALAR_VALUE)?;
        Ok(Self {
            data_types,
            class,
            get_data_type: env.get_method_id(
                class,
                "getDataType",
                "()Lno/viproma/coral/model/DataType;",
            )?,
            get_real_value: env.get_method_id(class, "getRealValue", "()D")?,
            get_integer_value: env.get_method_id(class, "getIntegerValue", "()I")?,
            get_boolean_value: env.get_method_id(class, "getBooleanValue", "()Z")?,
            get_string_value: env.get_method_id(class, "getStringValue", "()Ljava/lang/String;")?,
            new_real: env.get_method_id(class, "<init>", "(D)V")?,
            new_integer: env.get_method_id(class, "<init>", "(I)V")?,
            new_boolean: env.get_method_id(class, "<init>", "(Z)V")?,
            new_string: env.get_method_id(class, "<init>", "(Ljava/lang/String;)V")?,
        })
    }

    /// The data type a managed scalar value declares.
    pub fn data_type(&self, env: &mut dyn Env, obj: ObjectRef) -> Result<DataType> {
        let dt = env.call_method(obj, self.get_data_type, &[])?.l()?;
        self.data_types.to_native(env, dt)
    }

    pub fn to_native(&self, env: &mut dyn Env, obj: Option<ObjectRef>) -> Result<ScalarValue> {
        let obj = checked_instance(env, obj, self.class, class_names::SCALAR_VALUE)?;
        let data_type = self.data_type(env, obj)?;
        self.read(env, obj, data_type)
    }

    /// Read the value through the accessor `data_type` selects. A value
    /// of another kind behind that accessor is a logic error.
    fn read(&self, env: &mut dyn Env, obj: ObjectRef, data_type: DataType) -> Result<ScalarValue> {
        let value = match data_type {
            DataType::Real => env
                .call_method(obj, self.get_real_value, &[])
                .and_then(Value::d)
                .map(ScalarValue::Real),
            DataType::Integer => env
                .call_method(obj, self.get_integer_value, &[])
                .and_then(Value::i)
                .map(ScalarValue::Integer),
            DataType::Boolean => env
                .call_method(obj, self.get_boolean_value, &[])
                .and_then(Value::z)
                .map(ScalarValue::Boolean),
            DataType::String => {
                call_string_method(env, obj, self.get_string_value).map(ScalarValue::String)
            }
        };
        value.map_err(|err| {
            if err.is_logic() {
                Error::logic(format!(
                    "ScalarValue declares {:?} but holds another kind of value ({})",
                    data_type, err
                ))
            } else {
                err
            }
        })
    }

    pub fn to_managed(&self, env: &mut dyn Env, value: &ScalarValue) -> Result<ObjectRef> {
        let (ctor, arg) = match value {
            ScalarValue::Real(v) => (self.new_real, Value::Double(*v)),
            ScalarValue::Integer(v) => (self.new_integer, Value::Int(*v)),
            ScalarValue::Boolean(v) => (self.new_boolean, Value::Boolean(*v)),
            ScalarValue::String(s) => (self.new_string, to_managed_string(env, s)?.into()),
        };
        env.new_object(self.class, ctor, &[arg])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn roundtrip(value: &ScalarValue) -> ScalarValue {
        let mut heap = Heap::new();
        let conv = ScalarValueConverter::new(&mut heap).unwrap();
        let obj = conv.to_managed(&mut heap, value).unwrap();
        assert_eq!(conv.data_type(&mut heap, obj).unwrap(), value.data_type());
        conv.to_native(&mut heap, Some(obj)).unwrap()
    }

    proptest! {
        #[test]
        fn prop_real_roundtrip(v in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            prop_assert_eq!(roundtrip(&ScalarValue::Real(v)), ScalarValue::Real(v));
        }

        #[test]
        fn prop_integer_roundtrip(v in any::<i32>()) {
            prop_assert_eq!(roundtrip(&ScalarValue::Integer(v)), ScalarValue::Integer(v));
        }

        #[test]
        fn prop_boolean_roundtrip(v in any::<bool>()) {
            prop_assert_eq!(roundtrip(&ScalarValue::Boolean(v)), ScalarValue::Boolean(v));
        }

        #[test]
        fn prop_string_roundtrip(v in ".*") {
            prop_assert_eq!(
                roundtrip(&ScalarValue::String(v.clone())),
                ScalarValue::String(v)
            );
        }
    }

    #[test]
    fn test_value_of_undeclared_kind_is_logic_error() {
        let mut heap = Heap::new();
        let conv = ScalarValueConverter::new(&mut heap).unwrap();
        let obj = conv.to_managed(&mut heap, &ScalarValue::Real(1.5)).unwrap();
        let class = heap.find_class(class_names::SCALAR_VALUE).unwrap();
        let field = heap.get_field_id(class, "realValue_", "D").unwrap();
        heap.set_field(obj, field, Value::Int(1)).unwrap();

        let err = conv.to_native(&mut heap, Some(obj)).unwrap_err();
        assert!(err.is_logic(), "{err}");
        assert!(err.to_string().contains("declares Real"), "{err}");
        assert!(!heap.exception_check());
    }

    #[test]
    fn test_wrong_class_is_illegal_argument() {
        let mut heap = Heap::new();
        let conv = ScalarValueConverter::new(&mut heap).unwrap();
        let s = heap.new_string("1.0").unwrap();
        let err = conv.to_native(&mut heap, Some(s)).unwrap_err();
        assert_eq!(err.class(), Some(crate::ExceptionClass::IllegalArgument));
    }
}
