//! Enum converters. Managed enum values are compared by identity against the
//! constants fetched when the converter is created.

use super::class_names;
use crate::error::{Error, Result};
use crate::ffi::marshal::get_enum_constant;
use crate::ffi::{enforce_not_null, Env, ObjectRef};
use crate::types::{Causality, DataType, FmiVersion, Variability};

macro_rules! enum_converter {
    (
        $(#[$meta:meta])*
        $name:ident, $native:ty, $class:expr, $what:literal,
        { $($variant:expr => $constant:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        pub struct $name {
            constants: Vec<($native, ObjectRef)>,
        }

        impl $name {
            /// Fetch the enum constants.
            pub fn new(env: &mut dyn Env) -> Result<Self> {
                Ok(Self {
                    constants: vec![
                        $(($variant, get_enum_constant(env, $class, $constant)?)),+
                    ],
                })
            }

            /// The managed constant for `value`.
            pub fn to_managed(&self, value: $native) -> Result<ObjectRef> {
                self.constants
                    .iter()
                    .find(|(v, _)| *v == value)
                    .map(|(_, obj)| *obj)
                    .ok_or_else(|| Error::logic(concat!("Unsupported ", $what, " encountered")))
            }

            /// The native value of the managed constant `obj`.
            pub fn to_native(&self, env: &dyn Env, obj: Option<ObjectRef>) -> Result<$native> {
                let obj = enforce_not_null(obj)?;
                self.constants
                    .iter()
                    .find(|(_, c)| env.is_same_object(Some(obj), Some(*c)))
                    .map(|(v, _)| *v)
                    .ok_or_else(|| Error::logic(concat!("Unsupported ", $what, " encountered")))
            }
        }
    };
}

enum_converter!(
    /// `DataType` ⇄ `no.viproma.coral.model.DataType`
    DataTypeConverter, DataType, class_names::DATA_TYPE, "data type",
    {
        DataType::Real => "REAL",
        DataType::Integer => "INTEGER",
        DataType::Boolean => "BOOLEAN",
        DataType::String => "STRING",
    }
);

enum_converter!(
    /// `Causality` ⇄ `no.viproma.coral.model.Causality`
    CausalityConverter, Causality, class_names::CAUSALITY, "variable causality",
    {
        Causality::Parameter => "PARAMETER",
        Causality::CalculatedParameter => "CALCULATED_PARAMETER",
        Causality::Input => "INPUT",
        Causality::Output => "OUTPUT",
        Causality::Local => "LOCAL",
    }
);

enum_converter!(
    /// `Variability` ⇄ `no.viproma.coral.model.Variability`
    VariabilityConverter, Variability, class_names::VARIABILITY, "variable variability",
    {
        Variability::Constant => "CONSTANT",
        Variability::Fixed => "FIXED",
        Variability::Tunable => "TUNABLE",
        Variability::Discrete => "DISCRETE",
        Variability::Continuous => "CONTINUOUS",
    }
);

enum_converter!(
    /// `FmiVersion` ⇄ `no.viproma.coral.fmi.FMIVersion`
    FmiVersionConverter, FmiVersion, class_names::FMI_VERSION, "FMI version",
    {
        FmiVersion::V1_0 => "V1_0",
        FmiVersion::V2_0 => "V2_0",
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use rstest::rstest;

    #[rstest]
    #[case(DataType::Real)]
    #[case(DataType::Integer)]
    #[case(DataType::Boolean)]
    #[case(DataType::String)]
    fn test_data_type_roundtrip(#[case] dt: DataType) {
        let mut heap = Heap::new();
        let conv = DataTypeConverter::new(&mut heap).unwrap();
        let obj = conv.to_managed(dt).unwrap();
        assert_eq!(conv.to_native(&heap, Some(obj)).unwrap(), dt);
    }

    #[test]
    fn test_constants_are_distinct_objects() {
        let mut heap = Heap::new();
        let conv = VariabilityConverter::new(&mut heap).unwrap();
        let a = conv.to_managed(Variability::Fixed).unwrap();
        let b = conv.to_managed(Variability::Tunable).unwrap();
        assert_ne!(a, b);
        assert_eq!(
            heap.enum_constant_name(a).as_deref(),
            Some("FIXED"),
        );
    }

    #[test]
    fn test_foreign_object_is_logic_error() {
        let mut heap = Heap::new();
        let conv = CausalityConverter::new(&mut heap).unwrap();
        let other = heap.new_string("INPUT").unwrap();
        let err = conv.to_native(&heap, Some(other)).unwrap_err();
        assert!(err.is_logic());
        assert!(err.to_string().contains("causality"));
    }
}
