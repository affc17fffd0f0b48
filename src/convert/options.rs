use super::{checked_instance, class_names};
use crate::error::Result;
use crate::ffi::{Env, ObjectRef};
use crate::types::ExecutionOptions;

/// Read a managed `ExecutionOptions` object.
///
/// The fields are read directly. Values the managed setters would have
/// refused are rejected with `IllegalArgumentException` here too.
pub fn execution_options_to_native(
    env: &mut dyn Env,
    obj: Option<ObjectRef>,
) -> Result<ExecutionOptions> {
    let class = env.find_class(class_names::EXECUTION_OPTIONS)?;
    let obj = checked_instance(env, obj, class, class_names::EXECUTION_OPTIONS)?;
    let class = env.get_object_class(obj)?;
    let start_time_field = env.get_field_id(class, "startTime_", "D")?;
    let max_time_field = env.get_field_id(class, "maxTime_", "D")?;
    let timeout_field = env.get_field_id(class, "slaveVariableRecvTimeout_ms_", "I")?;

    let start_time = env.get_field(obj, start_time_field)?.d()?;
    let max_time = env.get_field(obj, max_time_field)?.d()?;
    let timeout_ms = env.get_field(obj, timeout_field)?.i()?;

    let mut options = ExecutionOptions::default();
    options.set_sim_time(start_time, max_time)?;
    options.set_slave_variable_recv_timeout_ms(timeout_ms)?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::ExceptionClass;
    use std::time::Duration;

    #[test]
    fn test_reads_fields() {
        let mut heap = Heap::new();
        let obj = heap.new_execution_options(0.0, 10.0, 500).unwrap();
        let opts = execution_options_to_native(&mut heap, Some(obj)).unwrap();
        assert_eq!(opts.start_time(), 0.0);
        assert_eq!(opts.max_time(), 10.0);
        assert_eq!(opts.slave_variable_recv_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_defaults_match_managed_defaults() {
        let mut heap = Heap::new();
        let obj = heap.new_default_execution_options().unwrap();
        let opts = execution_options_to_native(&mut heap, Some(obj)).unwrap();
        assert_eq!(opts, ExecutionOptions::default());
    }

    #[test]
    fn test_negative_timeout_is_rejected() {
        let mut heap = Heap::new();
        let obj = heap.new_execution_options(0.0, 1.0, -5).unwrap();
        let err = execution_options_to_native(&mut heap, Some(obj)).unwrap_err();
        assert_eq!(err.class(), Some(ExceptionClass::IllegalArgument));
        assert!(err.to_string().contains("Timeout is negative"));
    }
}
