//! Execution entry points against the in-memory engine.

mod common;

use common::{assert_no_exception, expect_exception, locator, setup, FakeEngine};
use jcoral::ffi::error::UNIDENTIFIED_MESSAGE;
use jcoral::heap::Heap;
use jcoral::{Bridge, Env, ObjectRef, ScalarValue, SlaveId, Value};
use pretty_assertions::assert_eq;

fn create_execution(bridge: &Bridge<FakeEngine>, heap: &mut Heap) -> i64 {
    let name = heap.new_string("test").unwrap();
    let options = heap.new_execution_options(0.0, 10.0, 500).unwrap();
    let execution = bridge.execution_create(heap, Some(name), Some(options));
    assert_no_exception(heap);
    assert_ne!(execution, 0);
    execution
}

fn added_slaves(heap: &mut Heap, names: &[&str]) -> (ObjectRef, Vec<ObjectRef>) {
    let items: Vec<ObjectRef> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            heap.new_added_slave(&locator(10000 + 2 * i as u16), Some(name))
                .unwrap()
        })
        .collect();
    let list = heap.new_list(items.iter().copied().map(Some).collect()).unwrap();
    (list, items)
}

#[test]
fn test_create_passes_options() {
    let (bridge, mut heap) = setup();
    create_execution(&bridge, &mut heap);
    assert_eq!(
        bridge.engine().events(),
        vec!["create_execution test 0..10 500ms".to_owned()]
    );
    assert_eq!(bridge.live_objects(), 1);
}

#[test]
fn test_create_with_invalid_time_interval() {
    let (bridge, mut heap) = setup();
    let name = heap.new_string("bad").unwrap();
    let options = heap.new_execution_options(5.0, 1.0, 500).unwrap();
    assert_eq!(bridge.execution_create(&mut heap, Some(name), Some(options)), 0);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalArgumentException");
    assert_eq!(message, "Invalid simulation time interval");
    assert_eq!(bridge.live_objects(), 0);
}

#[test]
fn test_add_slaves_assigns_ids() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let (list, items) = added_slaves(&mut heap, &["sine", "cosine"]);

    bridge.execution_add_slaves(&mut heap, execution, Some(list), 1000);
    assert_no_exception(&heap);
    assert_eq!(heap.batch_outcome(items[0]).unwrap(), (Some(1), None));
    assert_eq!(heap.batch_outcome(items[1]).unwrap(), (Some(2), None));
}

#[test]
fn test_duplicate_slave_name_sets_item_error_and_raises() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let (first, _) = added_slaves(&mut heap, &["sine"]);
    bridge.execution_add_slaves(&mut heap, execution, Some(first), 1000);
    assert_no_exception(&heap);

    let (second, items) = added_slaves(&mut heap, &["sine"]);
    bridge.execution_add_slaves(&mut heap, execution, Some(second), 1000);

    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/RuntimeException");
    assert_eq!(message, "One or more slaves could not be added");
    let (id, error) = heap.batch_outcome(items[0]).unwrap();
    assert_eq!(id, None);
    assert!(error.unwrap().contains("duplicate"));
}

#[test]
fn test_partial_failure_writes_back_every_item() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let (list, items) = added_slaves(&mut heap, &["a", "b", "a", "c"]);

    bridge.execution_add_slaves(&mut heap, execution, Some(list), 1000);
    expect_exception(&mut heap);
    let outcomes: Vec<_> = items
        .iter()
        .map(|item| heap.batch_outcome(*item).unwrap())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (Some(1), None),
            (Some(2), None),
            (None, Some("duplicate slave name: a".to_owned())),
            (Some(3), None),
        ]
    );
}

#[test]
fn test_crash_during_add_slaves_still_writes_back() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let (list, items) = added_slaves(&mut heap, &["a", "a", "crash"]);

    bridge.execution_add_slaves(&mut heap, execution, Some(list), 1000);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/Error");
    assert_eq!(message, UNIDENTIFIED_MESSAGE);
    let outcomes: Vec<_> = items
        .iter()
        .map(|item| heap.batch_outcome(*item).unwrap())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (Some(1), None),
            (None, Some("duplicate slave name: a".to_owned())),
            (None, None),
        ]
    );

    // The execution is still usable after the crash.
    assert!(bridge.execution_step(&mut heap, execution, 0.1, 50));
    assert_no_exception(&heap);
}

#[test]
fn test_reconfigure_rejects_value_of_undeclared_kind() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let value = heap.new_scalar_value(&ScalarValue::Real(1.5)).unwrap();
    let class = heap.find_class("no/viproma/coral/model/ScalarValue").unwrap();
    let field = heap.get_field_id(class, "realValue_", "D").unwrap();
    heap.set_field(value, field, Value::Int(3)).unwrap();
    let setting = heap.new_variable_setting(0, Some(value), None).unwrap();
    let config = heap.new_slave_config(SlaveId(1), &[setting]).unwrap();
    let configs = heap.new_list(vec![Some(config)]).unwrap();

    bridge.execution_reconfigure(&mut heap, execution, Some(configs), 1000);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalStateException");
    assert!(message.contains("declares Real"), "{message}");
}

#[test]
fn test_reconfigure_reports_unknown_slave() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let (list, _) = added_slaves(&mut heap, &["sine"]);
    bridge.execution_add_slaves(&mut heap, execution, Some(list), 1000);

    let value = heap.new_scalar_value(&ScalarValue::Real(1.5)).unwrap();
    let setting = heap.new_variable_setting(0, Some(value), None).unwrap();
    let known = heap.new_slave_config(SlaveId(1), &[setting]).unwrap();
    let unknown = heap.new_slave_config(SlaveId(9), &[setting]).unwrap();
    let configs = heap.new_list(vec![Some(known), Some(unknown)]).unwrap();

    bridge.execution_reconfigure(&mut heap, execution, Some(configs), 1000);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/Exception");
    assert_eq!(message, "Reconfiguration failed");
    assert_eq!(heap.batch_outcome(known).unwrap(), (None, None));
    assert_eq!(
        heap.batch_outcome(unknown).unwrap(),
        (None, Some("no slave with ID 9".to_owned()))
    );
}

#[test]
fn test_setting_without_value_or_connection_is_rejected() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let setting = heap.new_variable_setting(0, None, None).unwrap();
    let config = heap.new_slave_config(SlaveId(1), &[setting]).unwrap();
    let configs = heap.new_list(vec![Some(config)]).unwrap();

    bridge.execution_reconfigure(&mut heap, execution, Some(configs), 1000);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalStateException");
    assert!(message.contains("must have a value, a connection, or both"));
}

#[test]
fn test_step_and_accept() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    assert!(bridge.execution_step(&mut heap, execution, 0.1, 50));
    bridge.execution_accept_step(&mut heap, execution, 50);
    assert_no_exception(&heap);
}

#[test]
fn test_step_that_does_not_complete_returns_false() {
    let (bridge, mut heap) = setup();
    bridge.engine().steps_fail = true;
    let execution = create_execution(&bridge, &mut heap);
    assert!(!bridge.execution_step(&mut heap, execution, 0.1, 50));
    assert!(!heap.exception_check());
}

#[test]
fn test_negative_timeout_is_rejected() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    assert!(!bridge.execution_step(&mut heap, execution, 0.1, -1));
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalArgumentException");
    assert_eq!(message, "Timeout is negative");
}

#[test]
fn test_destroy_terminates() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    bridge.execution_destroy(&mut heap, execution);
    assert_no_exception(&heap);
    assert_eq!(bridge.engine().events().last().map(String::as_str), Some("terminate"));
    assert_eq!(bridge.live_objects(), 0);

    // The handle is dead now.
    bridge.execution_accept_step(&mut heap, execution, 50);
    let (class, _) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalStateException");
}

#[test]
fn test_add_slave_future() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let loc = heap.new_slave_locator(&locator(10000)).unwrap();
    let name = heap.new_string("sine").unwrap();

    let future = bridge.execution_add_slave(&mut heap, execution, Some(loc), Some(name), 1000);
    assert_no_exception(&heap);
    assert_ne!(future, 0);
    bridge.future_wait(&mut heap, future);
    assert_eq!(bridge.future_slave_id_get(&mut heap, future), 1);
    assert_no_exception(&heap);
    bridge.future_destroy(&mut heap, future);
    assert_eq!(bridge.live_objects(), 1);
}

#[test]
fn test_set_variables_future() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let (list, _) = added_slaves(&mut heap, &["sine"]);
    bridge.execution_add_slaves(&mut heap, execution, Some(list), 1000);

    let value = heap.new_scalar_value(&ScalarValue::Integer(3)).unwrap();
    let setting = heap.new_variable_setting(0, Some(value), None).unwrap();
    let settings = heap.new_list(vec![Some(setting)]).unwrap();
    let future = bridge.execution_set_variables(&mut heap, execution, 1, Some(settings), 1000);
    assert_no_exception(&heap);

    assert!(bridge.future_wait_for(&mut heap, future, 0));
    bridge.future_void_get(&mut heap, future);
    assert_no_exception(&heap);
    assert!(bridge
        .engine()
        .events()
        .contains(&"set_variables 1 x1".to_owned()));
    bridge.future_destroy(&mut heap, future);
}

#[test]
fn test_set_variables_slave_id_out_of_range() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let settings = heap.new_list(Vec::new()).unwrap();
    let future = bridge.execution_set_variables(&mut heap, execution, 70000, Some(settings), 1000);
    assert_eq!(future, 0);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalArgumentException");
    assert_eq!(message, "Slave ID out of range: 70000");
}
