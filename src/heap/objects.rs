//! Building and reading contract objects from Rust.
//!
//! These go through the same managed interface the bridge uses, so an object
//! built here is indistinguishable from one built by managed code.

use super::Heap;
use crate::convert::class_names;
use crate::error::{Error, Result};
use crate::ffi::{Env, ObjectRef, Value};
use crate::types::{
    Causality, DataType, ScalarValue, SlaveId, SlaveLocator, SlaveTypeDescription, Variability,
    Variable, VariableDescription,
};

impl Heap {
    /// Construct an object of `class_name` through the constructor `sig`.
    pub fn construct(&mut self, class_name: &str, sig: &str, args: &[Value]) -> Result<ObjectRef> {
        let class = self.find_class(class_name)?;
        let ctor = self.get_method_id(class, "<init>", sig)?;
        self.new_object(class, ctor, args)
    }

    /// Call a method on `obj`, resolved against its runtime class.
    pub fn invoke(&mut self, obj: ObjectRef, name: &str, sig: &str, args: &[Value]) -> Result<Value> {
        let class = self.get_object_class(obj)?;
        let method = self.get_method_id(class, name, sig)?;
        self.call_method(obj, method, args)
    }

    fn invoke_string(&mut self, obj: ObjectRef, name: &str) -> Result<Option<String>> {
        match self.invoke(obj, name, "()Ljava/lang/String;", &[])?.l()? {
            Some(s) => Ok(Some(self.get_string(s)?)),
            None => Ok(None),
        }
    }

    fn constant_name(&self, obj: Option<ObjectRef>) -> Result<String> {
        obj.and_then(|o| self.enum_constant_name(o))
            .ok_or_else(|| Error::logic("expected an enum constant"))
    }

    /// `new SlaveID(id)`
    pub fn new_slave_id(&mut self, id: i32) -> Result<ObjectRef> {
        self.construct(class_names::SLAVE_ID, "(I)V", &[Value::Int(id)])
    }

    /// `new ScalarValue(value)`
    pub fn new_scalar_value(&mut self, value: &ScalarValue) -> Result<ObjectRef> {
        match value {
            ScalarValue::Real(v) => self.construct(class_names::SCALAR_VALUE, "(D)V", &[Value::Double(*v)]),
            ScalarValue::Integer(v) => self.construct(class_names::SCALAR_VALUE, "(I)V", &[Value::Int(*v)]),
            ScalarValue::Boolean(v) => {
                self.construct(class_names::SCALAR_VALUE, "(Z)V", &[Value::Boolean(*v)])
            }
            ScalarValue::String(s) => {
                let s = self.new_string(s)?;
                self.construct(class_names::SCALAR_VALUE, "(Ljava/lang/String;)V", &[s.into()])
            }
        }
    }

    /// `new Variable(new SlaveID(slave), id)`
    pub fn new_variable(&mut self, variable: Variable) -> Result<ObjectRef> {
        let slave = self.new_slave_id(i32::from(variable.slave.0))?;
        let id = i32::try_from(variable.id)
            .map_err(|_| Error::illegal_argument("variable ID out of range"))?;
        self.construct(
            class_names::VARIABLE,
            "(Lno/viproma/coral/model/SlaveID;I)V",
            &[slave.into(), Value::Int(id)],
        )
    }

    /// A `VariableSetting` with any combination of value and connection,
    /// including ones the managed constructors cannot produce.
    pub fn new_variable_setting(
        &mut self,
        variable_id: i32,
        value: Option<ObjectRef>,
        connected_output: Option<ObjectRef>,
    ) -> Result<ObjectRef> {
        let obj = match value {
            Some(_) => self.construct(
                class_names::VARIABLE_SETTING,
                "(ILno/viproma/coral/model/ScalarValue;)V",
                &[Value::Int(variable_id), value.into()],
            )?,
            None => self.construct(
                class_names::VARIABLE_SETTING,
                "(ILno/viproma/coral/model/Variable;)V",
                &[Value::Int(variable_id), connected_output.into()],
            )?,
        };
        self.set_field_value(obj, "connectedOutput_", connected_output.into())?;
        self.set_field_value(
            obj,
            "isConnectionChange_",
            Value::Boolean(connected_output.is_some()),
        )?;
        Ok(obj)
    }

    /// `new ExecutionOptions()`
    pub fn new_default_execution_options(&mut self) -> Result<ObjectRef> {
        self.construct(class_names::EXECUTION_OPTIONS, "()V", &[])
    }

    /// An `ExecutionOptions` with its fields set directly, bypassing the
    /// managed setters' validation.
    pub fn new_execution_options(
        &mut self,
        start_time: f64,
        max_time: f64,
        slave_variable_recv_timeout_ms: i32,
    ) -> Result<ObjectRef> {
        let obj = self.new_default_execution_options()?;
        self.set_field_value(obj, "startTime_", Value::Double(start_time))?;
        self.set_field_value(obj, "maxTime_", Value::Double(max_time))?;
        self.set_field_value(
            obj,
            "slaveVariableRecvTimeout_ms_",
            Value::Int(slave_variable_recv_timeout_ms),
        )?;
        Ok(obj)
    }

    /// `new SlaveLocator(control, dataPub)`
    pub fn new_slave_locator(&mut self, locator: &SlaveLocator) -> Result<ObjectRef> {
        let control = self.new_string(&locator.control_endpoint)?;
        let data_pub = self.new_string(&locator.data_pub_endpoint)?;
        self.construct(
            class_names::SLAVE_LOCATOR,
            "(Ljava/lang/String;Ljava/lang/String;)V",
            &[control.into(), data_pub.into()],
        )
    }

    /// Read a `SlaveLocator`.
    pub fn read_slave_locator(&mut self, obj: ObjectRef) -> Result<SlaveLocator> {
        Ok(SlaveLocator {
            control_endpoint: self.invoke_string(obj, "getControlEndpoint")?.unwrap_or_default(),
            data_pub_endpoint: self.invoke_string(obj, "getDataPubEndpoint")?.unwrap_or_default(),
        })
    }

    /// `new AddedSlave(new SlaveLocator(..), name)`
    pub fn new_added_slave(&mut self, locator: &SlaveLocator, name: Option<&str>) -> Result<ObjectRef> {
        let locator = self.new_slave_locator(locator)?;
        let name = match name {
            Some(n) => Some(self.new_string(n)?),
            None => None,
        };
        self.construct(
            class_names::ADDED_SLAVE,
            "(Lno/viproma/coral/net/SlaveLocator;Ljava/lang/String;)V",
            &[locator.into(), name.into()],
        )
    }

    /// The `id` and `error` an `AddedSlave` or `SlaveConfig` reports.
    ///
    /// `id` is `None` for a `SlaveConfig` and for a slave without an ID.
    pub fn batch_outcome(&mut self, obj: ObjectRef) -> Result<(Option<i32>, Option<String>)> {
        let id = if self.class_name_of(obj)? == class_names::ADDED_SLAVE {
            match self.invoke(obj, "getID", "()Lno/viproma/coral/model/SlaveID;", &[])?.l()? {
                Some(id) => Some(self.invoke(id, "getID", "()I", &[])?.i()?),
                None => None,
            }
        } else {
            None
        };
        let error = self.invoke_string(obj, "getError")?;
        Ok((id, error))
    }

    /// `new SlaveConfig(new SlaveID(slave), [settings...])`
    pub fn new_slave_config(&mut self, slave: SlaveId, settings: &[ObjectRef]) -> Result<ObjectRef> {
        let id = self.new_slave_id(i32::from(slave.0))?;
        let list = self.new_list(settings.iter().copied().map(Some).collect())?;
        self.construct(
            class_names::SLAVE_CONFIG,
            "(Lno/viproma/coral/model/SlaveID;Ljava/lang/Iterable;)V",
            &[id.into(), list.into()],
        )
    }

    /// Read a `SlaveTypeDescription` back into its native form.
    pub fn read_slave_type_description(&mut self, obj: ObjectRef) -> Result<SlaveTypeDescription> {
        let mut std = SlaveTypeDescription {
            name: self.invoke_string(obj, "getName")?.unwrap_or_default(),
            uuid: self.invoke_string(obj, "getUUID")?.unwrap_or_default(),
            description: self.invoke_string(obj, "getDescription")?.unwrap_or_default(),
            author: self.invoke_string(obj, "getAuthor")?.unwrap_or_default(),
            version: self.invoke_string(obj, "getVersion")?.unwrap_or_default(),
            variables: Vec::new(),
        };
        let variables = match self.field_value(obj, "variables_")?.l()? {
            Some(array) => self.array_elements(array)?,
            None => Vec::new(),
        };
        for vd in variables.into_iter().flatten() {
            std.variables.push(self.read_variable_description(vd)?);
        }
        Ok(std)
    }

    /// Read a `VariableDescription` back into its native form.
    pub fn read_variable_description(&mut self, obj: ObjectRef) -> Result<VariableDescription> {
        let id = self.invoke(obj, "getID", "()I", &[])?.i()?;
        let name = self.invoke_string(obj, "getName")?.unwrap_or_default();
        let data_type = self
            .invoke(obj, "getDataType", "()Lno/viproma/coral/model/DataType;", &[])?
            .l()?;
        let causality = self
            .invoke(obj, "getCausality", "()Lno/viproma/coral/model/Causality;", &[])?
            .l()?;
        let variability = self
            .invoke(obj, "getVariability", "()Lno/viproma/coral/model/Variability;", &[])?
            .l()?;

        let data_type = match self.constant_name(data_type)?.as_str() {
            "REAL" => DataType::Real,
            "INTEGER" => DataType::Integer,
            "BOOLEAN" => DataType::Boolean,
            "STRING" => DataType::String,
            other => return Err(Error::logic(format!("unknown data type {}", other))),
        };
        let causality = match self.constant_name(causality)?.as_str() {
            "PARAMETER" => Causality::Parameter,
            "CALCULATED_PARAMETER" => Causality::CalculatedParameter,
            "INPUT" => Causality::Input,
            "OUTPUT" => Causality::Output,
            "LOCAL" => Causality::Local,
            other => return Err(Error::logic(format!("unknown causality {}", other))),
        };
        let variability = match self.constant_name(variability)?.as_str() {
            "CONSTANT" => Variability::Constant,
            "FIXED" => Variability::Fixed,
            "TUNABLE" => Variability::Tunable,
            "DISCRETE" => Variability::Discrete,
            "CONTINUOUS" => Variability::Continuous,
            other => return Err(Error::logic(format!("unknown variability {}", other))),
        };
        Ok(VariableDescription {
            id: u32::try_from(id).map_err(|_| Error::logic("negative variable ID"))?,
            name,
            data_type,
            causality,
            variability,
        })
    }

    /// The handle stored in an object built by its `(J)V` constructor.
    pub fn native_ptr(&self, obj: ObjectRef) -> Result<i64> {
        self.field_value(obj, "nativePtr_")?.j()
    }
}
