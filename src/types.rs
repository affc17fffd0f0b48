//! Native-side type definitions: the value model the engine speaks.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// Data type of a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit floating point.
    Real,
    /// 32-bit signed integer.
    Integer,
    /// Boolean.
    Boolean,
    /// UTF-8 string.
    String,
}

/// Causality of a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Causality {
    /// Independent parameter.
    Parameter,
    /// Parameter calculated from other parameters.
    CalculatedParameter,
    /// Input.
    Input,
    /// Output.
    Output,
    /// Local variable.
    Local,
}

/// Variability of a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variability {
    /// Never changes.
    Constant,
    /// Fixed after initialization.
    Fixed,
    /// Changes only at events triggered from outside.
    Tunable,
    /// Changes only at discrete time points.
    Discrete,
    /// No restrictions.
    Continuous,
}

/// FMI standard version of an imported FMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FmiVersion {
    /// FMI 1.0
    V1_0,
    /// FMI 2.0
    V2_0,
}

/// Identifier of a slave within an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlaveId(pub u16);

impl fmt::Display for SlaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a variable within a slave type.
pub type VariableId = u32;

/// Simulation time point.
pub type TimePoint = f64;

/// Simulation time duration.
pub type TimeDuration = f64;

/// A scalar variable value, tagged by its data type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Real value.
    Real(f64),
    /// Integer value.
    Integer(i32),
    /// Boolean value.
    Boolean(bool),
    /// String value.
    String(String),
}

impl ScalarValue {
    /// The data type this value carries.
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::Real(_) => DataType::Real,
            ScalarValue::Integer(_) => DataType::Integer,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::String(_) => DataType::String,
        }
    }
}

/// A variable of a specific slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    /// Slave that owns the variable.
    pub slave: SlaveId,
    /// Variable within the slave.
    pub id: VariableId,
}

/// Describes one variable of a slave type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDescription {
    /// Variable ID.
    pub id: VariableId,
    /// Variable name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
    /// Causality.
    pub causality: Causality,
    /// Variability.
    pub variability: Variability,
}

/// Describes a slave type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlaveTypeDescription {
    /// Type name.
    pub name: String,
    /// Universally unique identifier of the type.
    pub uuid: String,
    /// Human readable description.
    pub description: String,
    /// Author.
    pub author: String,
    /// Version string.
    pub version: String,
    /// Variables of the type, in declaration order.
    pub variables: Vec<VariableDescription>,
}

/// A change to a slave input: a new value, a new connection, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSetting {
    variable: VariableId,
    value: Option<ScalarValue>,
    connected_output: Option<Variable>,
}

impl VariableSetting {
    /// Sets a value.
    pub fn value(variable: VariableId, value: ScalarValue) -> Self {
        Self {
            variable,
            value: Some(value),
            connected_output: None,
        }
    }

    /// Connects an input to an output.
    pub fn connection(variable: VariableId, output: Variable) -> Self {
        Self {
            variable,
            value: None,
            connected_output: Some(output),
        }
    }

    /// Sets a value and connects the input to an output.
    pub fn value_and_connection(
        variable: VariableId,
        value: ScalarValue,
        output: Variable,
    ) -> Self {
        Self {
            variable,
            value: Some(value),
            connected_output: Some(output),
        }
    }

    /// Builds a setting from optional parts.
    ///
    /// Fails with a logic error if neither a value nor a connection is given.
    pub fn from_parts(
        variable: VariableId,
        value: Option<ScalarValue>,
        connected_output: Option<Variable>,
    ) -> Result<Self> {
        if value.is_none() && connected_output.is_none() {
            return Err(Error::logic(
                "Invalid variable setting: must have a value, a connection, or both",
            ));
        }
        Ok(Self {
            variable,
            value,
            connected_output,
        })
    }

    /// Variable being set.
    pub fn variable(&self) -> VariableId {
        self.variable
    }

    /// New value, if any.
    pub fn new_value(&self) -> Option<&ScalarValue> {
        self.value.as_ref()
    }

    /// Output to connect to, if any.
    pub fn connected_output(&self) -> Option<Variable> {
        self.connected_output
    }
}

/// Network endpoint, rendered as `transport://address`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Transport name (e.g. "tcp", "inproc").
    pub transport: String,
    /// Transport-specific address.
    pub address: String,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(transport: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            address: address.into(),
        }
    }

    /// The endpoint URL.
    pub fn url(&self) -> String {
        format!("{}://{}", self.transport, self.address)
    }
}

/// Where to reach a slave: its control and data publishing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlaveLocator {
    /// Control endpoint URL.
    pub control_endpoint: String,
    /// Data publishing endpoint URL.
    pub data_pub_endpoint: String,
}

/// A slave type offered by one or more slave providers in a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaveType {
    /// Description of the type.
    pub description: SlaveTypeDescription,
    /// IDs of the providers that can instantiate it.
    pub providers: Vec<String>,
}

/// One item of a batch slave addition.
///
/// `locator` and `name` are inputs; `id` and `error` are filled in by the
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedSlave {
    /// Where the slave runs.
    pub locator: SlaveLocator,
    /// Name of the slave in the execution. Empty means "pick one".
    pub name: String,
    /// ID assigned by the execution, if the slave was added.
    pub id: Option<SlaveId>,
    /// Why the slave could not be added, if it was not.
    pub error: Option<String>,
}

impl AddedSlave {
    /// Create an input item.
    pub fn new(locator: SlaveLocator, name: impl Into<String>) -> Self {
        Self {
            locator,
            name: name.into(),
            id: None,
            error: None,
        }
    }
}

/// One item of a batch reconfiguration.
#[derive(Debug, Clone, PartialEq)]
pub struct SlaveConfig {
    /// Slave to reconfigure.
    pub slave_id: SlaveId,
    /// Changes to apply, in order.
    pub variable_settings: Vec<VariableSetting>,
    /// Why the configuration failed, if it did.
    pub error: Option<String>,
}

/// Outcome of a time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// All slaves completed the step.
    Completed,
    /// One or more slaves did not complete the step.
    Failed,
}

/// Options for creating an execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOptions {
    start_time: TimePoint,
    max_time: TimePoint,
    /// How long slaves wait for variable values from other slaves.
    pub slave_variable_recv_timeout: Duration,
}

impl ExecutionOptions {
    /// Start time of the simulation (default: 0.0).
    pub fn start_time(&self) -> TimePoint {
        self.start_time
    }

    /// Maximum simulation time (default: unbounded).
    pub fn max_time(&self) -> TimePoint {
        self.max_time
    }

    /// Set the simulation time interval.
    ///
    /// Requires `-inf < start_time < max_time`.
    pub fn set_sim_time(&mut self, start_time: TimePoint, max_time: TimePoint) -> Result<()> {
        if f64::NEG_INFINITY < start_time && start_time < max_time {
            self.start_time = start_time;
            self.max_time = max_time;
            Ok(())
        } else {
            Err(Error::illegal_argument("Invalid simulation time interval"))
        }
    }

    /// Set the slave variable receive timeout from milliseconds.
    pub fn set_slave_variable_recv_timeout_ms(&mut self, timeout_ms: i32) -> Result<()> {
        self.slave_variable_recv_timeout = timeout_from_ms(timeout_ms)?;
        Ok(())
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            max_time: f64::INFINITY,
            slave_variable_recv_timeout: Duration::from_millis(1000),
        }
    }
}

/// Convert a managed millisecond timeout to a duration.
///
/// Negative timeouts are rejected.
pub fn timeout_from_ms(timeout_ms: i32) -> Result<Duration> {
    u64::try_from(timeout_ms)
        .map(Duration::from_millis)
        .map_err(|_| Error::illegal_argument("Timeout is negative"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_options_defaults() {
        let opts = ExecutionOptions::default();
        assert_eq!(opts.start_time(), 0.0);
        assert!(opts.max_time().is_infinite());
        assert_eq!(opts.slave_variable_recv_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_set_sim_time_rejects_empty_interval() {
        let mut opts = ExecutionOptions::default();
        assert!(opts.set_sim_time(0.0, 10.0).is_ok());
        let err = opts.set_sim_time(5.0, 5.0).unwrap_err();
        assert_eq!(err.class(), Some(crate::ExceptionClass::IllegalArgument));
        assert!(opts.set_sim_time(f64::NEG_INFINITY, 1.0).is_err());
        assert_eq!(opts.max_time(), 10.0);
    }

    #[test]
    fn test_negative_timeout_is_rejected() {
        assert_eq!(timeout_from_ms(50).unwrap(), Duration::from_millis(50));
        assert!(timeout_from_ms(-1).is_err());
    }

    #[test]
    fn test_variable_setting_needs_value_or_connection() {
        let err = VariableSetting::from_parts(3, None, None).unwrap_err();
        assert!(err.is_logic());

        let out = Variable {
            slave: SlaveId(1),
            id: 7,
        };
        let vs = VariableSetting::from_parts(3, None, Some(out)).unwrap();
        assert_eq!(vs.connected_output(), Some(out));
        assert!(vs.new_value().is_none());
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(Endpoint::new("tcp", "10.0.0.1:5432").url(), "tcp://10.0.0.1:5432");
    }
}
