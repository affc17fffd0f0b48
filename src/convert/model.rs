//! Converters for the model types: IDs, variables, settings and
//! descriptions.

use super::{
    checked_instance, class_names, CausalityConverter, DataTypeConverter, ScalarValueConverter,
    VariabilityConverter,
};
use crate::error::{Error, Result};
use crate::ffi::marshal::{to_managed_array, to_managed_string};
use crate::ffi::{ClassRef, Env, MethodId, ObjectRef, Value};
use crate::types::{
    SlaveId, SlaveTypeDescription, Variable, VariableDescription, VariableId, VariableSetting,
};

fn variable_id_from_managed(id: i32) -> Result<VariableId> {
    VariableId::try_from(id)
        .map_err(|_| Error::illegal_argument(format!("Variable ID out of range: {}", id)))
}

fn variable_id_to_managed(id: VariableId) -> Result<i32> {
    i32::try_from(id)
        .map_err(|_| Error::illegal_argument(format!("Variable ID out of range: {}", id)))
}

/// `SlaveId` ⇄ `no.viproma.coral.model.SlaveID`
pub struct SlaveIdConverter {
    class: ClassRef,
    init: MethodId,
    get_id: MethodId,
}

impl SlaveIdConverter {
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let class = env.find_class(class_names::SLAVE_ID)?;
        Ok(Self {
            class,
            init: env.get_method_id(class, "<init>", "(I)V")?,
            get_id: env.get_method_id(class, "getID", "()I")?,
        })
    }

    /// Fails with `IllegalArgumentException` if the managed ID does not fit
    /// in a native slave ID.
    pub fn to_native(&self, env: &mut dyn Env, obj: Option<ObjectRef>) -> Result<SlaveId> {
        let obj = checked_instance(env, obj, self.class, class_names::SLAVE_ID)?;
        let id = env.call_method(obj, self.get_id, &[])?.i()?;
        u16::try_from(id)
            .map(SlaveId)
            .map_err(|_| Error::illegal_argument(format!("Slave ID out of range: {}", id)))
    }

    pub fn to_managed(&self, env: &mut dyn Env, id: SlaveId) -> Result<ObjectRef> {
        env.new_object(self.class, self.init, &[Value::Int(i32::from(id.0))])
    }
}

/// `Variable` ⇄ `no.viproma.coral.model.Variable`
pub struct VariableConverter {
    slave_ids: SlaveIdConverter,
    class: ClassRef,
    init: MethodId,
    get_slave_id: MethodId,
    get_variable_id: MethodId,
}

impl VariableConverter {
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let slave_ids = SlaveIdConverter::new(env)?;
        let class = env.find_class(class_names::VARIABLE)?;
        Ok(Self {
            slave_ids,
            class,
            init: env.get_method_id(class, "<init>", "(Lno/viproma/coral/model/SlaveID;I)V")?,
            get_slave_id: env.get_method_id(
                class,
                "getSlaveID",
                "()Lno/viproma/coral/model/SlaveID;",
            )?,
            get_variable_id: env.get_method_id(class, "getVariableID", "()I")?,
        })
    }

    pub fn to_native(&self, env: &mut dyn Env, obj: Option<ObjectRef>) -> Result<Variable> {
        let obj = checked_instance(env, obj, self.class, class_names::VARIABLE)?;
        let slave = env.call_method(obj, self.get_slave_id, &[])?.l()?;
        let id = env.call_method(obj, self.get_variable_id, &[])?.i()?;
        Ok(Variable {
            slave: self.slave_ids.to_native(env, slave)?,
            id: variable_id_from_managed(id)?,
        })
    }

    pub fn to_managed(&self, env: &mut dyn Env, variable: Variable) -> Result<ObjectRef> {
        let slave = self.slave_ids.to_managed(env, variable.slave)?;
        let id = variable_id_to_managed(variable.id)?;
        env.new_object(self.class, self.init, &[slave.into(), Value::Int(id)])
    }
}

/// `no.viproma.coral.model.VariableSetting` → `VariableSetting`
pub struct VariableSettingConverter {
    scalars: ScalarValueConverter,
    variables: VariableConverter,
    class: ClassRef,
    get_variable_id: MethodId,
    get_value: MethodId,
    get_connected_output: MethodId,
}

impl VariableSettingConverter {
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let scalars = ScalarValueConverter::new(env)?;
        let variables = VariableConverter::new(env)?;
        let class = env.find_class(class_names::VARIABLE_SETTING)?;
        Ok(Self {
            scalars,
            variables,
            class,
            get_variable_id: env.get_method_id(class, "getVariableID", "()I")?,
            get_value: env.get_method_id(
                class,
                "getValue",
                "()Lno/viproma/coral/model/ScalarValue;",
            )?,
            get_connected_output: env.get_method_id(
                class,
                "getConnectedOutput",
                "()Lno/viproma/coral/model/Variable;",
            )?,
        })
    }

    /// A setting with neither a value nor a connection is a logic error.
    pub fn to_native(&self, env: &mut dyn Env, obj: Option<ObjectRef>) -> Result<VariableSetting> {
        let obj = checked_instance(env, obj, self.class, class_names::VARIABLE_SETTING)?;
        let id = env.call_method(obj, self.get_variable_id, &[])?.i()?;
        let value = env.call_method(obj, self.get_value, &[])?.l()?;
        let output = env.call_method(obj, self.get_connected_output, &[])?.l()?;

        let value = match value {
            Some(v) => Some(self.scalars.to_native(env, Some(v))?),
            None => None,
        };
        let output = match output {
            Some(o) => Some(self.variables.to_native(env, Some(o))?),
            None => None,
        };
        VariableSetting::from_parts(variable_id_from_managed(id)?, value, output)
    }
}

/// `VariableDescription` → `no.viproma.coral.model.VariableDescription`
pub struct VariableDescriptionConverter {
    data_types: DataTypeConverter,
    causalities: CausalityConverter,
    variabilities: VariabilityConverter,
    class: ClassRef,
    init: MethodId,
    set_id: MethodId,
    set_name: MethodId,
    set_data_type: MethodId,
    set_causality: MethodId,
    set_variability: MethodId,
}

impl VariableDescriptionConverter {
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let data_types = DataTypeConverter::new(env)?;
        let causalities = CausalityConverter::new(env)?;
        let variabilities = VariabilityConverter::new(env)?;
        let class = env.find_class(class_names::VARIABLE_DESCRIPTION)?;
        Ok(Self {
            data_types,
            causalities,
            variabilities,
            class,
            init: env.get_method_id(class, "<init>", "()V")?,
            set_id: env.get_method_id(class, "setID", "(I)V")?,
            set_name: env.get_method_id(class, "setName", "(Ljava/lang/String;)V")?,
            set_data_type: env.get_method_id(
                class,
                "setDataType",
                "(Lno/viproma/coral/model/DataType;)V",
            )?,
            set_causality: env.get_method_id(
                class,
                "setCausality",
                "(Lno/viproma/coral/model/Causality;)V",
            )?,
            set_variability: env.get_method_id(
                class,
                "setVariability",
                "(Lno/viproma/coral/model/Variability;)V",
            )?,
        })
    }

    /// The managed class of converted descriptions, for building arrays.
    pub fn class(&self) -> ClassRef {
        self.class
    }

    pub fn to_managed(&self, env: &mut dyn Env, vd: &VariableDescription) -> Result<ObjectRef> {
        let obj = env.new_object(self.class, self.init, &[])?;
        let id = variable_id_to_managed(vd.id)?;
        env.call_method(obj, self.set_id, &[Value::Int(id)])?;
        let name = to_managed_string(env, &vd.name)?;
        env.call_method(obj, self.set_name, &[name.into()])?;
        let dt = self.data_types.to_managed(vd.data_type)?;
        env.call_method(obj, self.set_data_type, &[dt.into()])?;
        let causality = self.causalities.to_managed(vd.causality)?;
        env.call_method(obj, self.set_causality, &[causality.into()])?;
        let variability = self.variabilities.to_managed(vd.variability)?;
        env.call_method(obj, self.set_variability, &[variability.into()])?;
        Ok(obj)
    }
}

/// `SlaveTypeDescription` → `no.viproma.coral.model.SlaveTypeDescription`
pub struct SlaveTypeDescriptionConverter {
    variables: VariableDescriptionConverter,
    class: ClassRef,
    init: MethodId,
}

impl SlaveTypeDescriptionConverter {
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let variables = VariableDescriptionConverter::new(env)?;
        let class = env.find_class(class_names::SLAVE_TYPE_DESCRIPTION)?;
        Ok(Self {
            variables,
            class,
            init: env.get_method_id(
                class,
                "<init>",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;\
                 Ljava/lang/String;Ljava/lang/String;\
                 [Lno/viproma/coral/model/VariableDescription;)V",
            )?,
        })
    }

    pub fn to_managed(&self, env: &mut dyn Env, std: &SlaveTypeDescription) -> Result<ObjectRef> {
        let variables = to_managed_array(env, self.variables.class(), &std.variables, |env, vd| {
            self.variables.to_managed(env, vd).map(Some)
        })?;
        let name = to_managed_string(env, &std.name)?;
        let uuid = to_managed_string(env, &std.uuid)?;
        let description = to_managed_string(env, &std.description)?;
        let author = to_managed_string(env, &std.author)?;
        let version = to_managed_string(env, &std.version)?;
        env.new_object(
            self.class,
            self.init,
            &[
                name.into(),
                uuid.into(),
                description.into(),
                author.into(),
                version.into(),
                variables.into(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::types::{Causality, DataType, ScalarValue, Variability};
    use crate::ExceptionClass;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slave_id_roundtrip() {
        let mut heap = Heap::new();
        let conv = SlaveIdConverter::new(&mut heap).unwrap();
        let obj = conv.to_managed(&mut heap, SlaveId(65535)).unwrap();
        assert_eq!(conv.to_native(&mut heap, Some(obj)).unwrap(), SlaveId(65535));
    }

    #[test]
    fn test_slave_id_out_of_range() {
        let mut heap = Heap::new();
        let conv = SlaveIdConverter::new(&mut heap).unwrap();
        for raw in [-1, 65536] {
            let obj = heap.new_slave_id(raw).unwrap();
            let err = conv.to_native(&mut heap, Some(obj)).unwrap_err();
            assert_eq!(err.class(), Some(ExceptionClass::IllegalArgument));
            assert!(err.to_string().contains(&raw.to_string()));
        }
    }

    #[test]
    fn test_variable_roundtrip() {
        let mut heap = Heap::new();
        let conv = VariableConverter::new(&mut heap).unwrap();
        let var = Variable {
            slave: SlaveId(3),
            id: 12,
        };
        let obj = conv.to_managed(&mut heap, var).unwrap();
        assert_eq!(conv.to_native(&mut heap, Some(obj)).unwrap(), var);
    }

    #[test]
    fn test_variable_setting_shapes() {
        let mut heap = Heap::new();
        let conv = VariableSettingConverter::new(&mut heap).unwrap();
        let out = Variable {
            slave: SlaveId(1),
            id: 4,
        };

        let value = heap.new_scalar_value(&ScalarValue::Real(2.5)).unwrap();
        let output = heap.new_variable(out).unwrap();

        let only_value = heap.new_variable_setting(7, Some(value), None).unwrap();
        assert_eq!(
            conv.to_native(&mut heap, Some(only_value)).unwrap(),
            VariableSetting::value(7, ScalarValue::Real(2.5))
        );

        let only_connection = heap.new_variable_setting(7, None, Some(output)).unwrap();
        assert_eq!(
            conv.to_native(&mut heap, Some(only_connection)).unwrap(),
            VariableSetting::connection(7, out)
        );

        let both = heap.new_variable_setting(7, Some(value), Some(output)).unwrap();
        assert_eq!(
            conv.to_native(&mut heap, Some(both)).unwrap(),
            VariableSetting::value_and_connection(7, ScalarValue::Real(2.5), out)
        );

        let neither = heap.new_variable_setting(7, None, None).unwrap();
        assert!(conv.to_native(&mut heap, Some(neither)).unwrap_err().is_logic());
    }

    #[test]
    fn test_slave_type_description_to_managed() {
        let mut heap = Heap::new();
        let conv = SlaveTypeDescriptionConverter::new(&mut heap).unwrap();
        let std = SlaveTypeDescription {
            name: "sine".into(),
            uuid: "{1234}".into(),
            description: "A sine wave".into(),
            author: "SINTEF".into(),
            version: "1.0".into(),
            variables: vec![
                VariableDescription {
                    id: 0,
                    name: "out".into(),
                    data_type: DataType::Real,
                    causality: Causality::Output,
                    variability: Variability::Continuous,
                },
                VariableDescription {
                    id: 1,
                    name: "amplitude".into(),
                    data_type: DataType::Real,
                    causality: Causality::Parameter,
                    variability: Variability::Fixed,
                },
            ],
        };
        let obj = conv.to_managed(&mut heap, &std).unwrap();
        assert_eq!(heap.read_slave_type_description(obj).unwrap(), std);
    }
}
