//! Future entry points.

mod common;

use common::{assert_no_exception, expect_exception, locator, setup, FakeEngine};
use jcoral::heap::Heap;
use jcoral::{Bridge, Env};

fn add_slave(bridge: &Bridge<FakeEngine>, heap: &mut Heap, execution: i64, name: &str) -> i64 {
    let loc = heap.new_slave_locator(&locator(10000)).unwrap();
    let name = heap.new_string(name).unwrap();
    bridge.execution_add_slave(heap, execution, Some(loc), Some(name), 1000)
}

fn create_execution(bridge: &Bridge<FakeEngine>, heap: &mut Heap) -> i64 {
    let name = heap.new_string("futures").unwrap();
    let options = heap.new_default_execution_options().unwrap();
    bridge.execution_create(heap, Some(name), Some(options))
}

#[test]
fn test_value_can_be_retrieved_only_once() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let future = add_slave(&bridge, &mut heap, execution, "a");

    assert_eq!(bridge.future_slave_id_get(&mut heap, future), 1);
    assert_no_exception(&heap);

    assert_eq!(bridge.future_slave_id_get(&mut heap, future), 0);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalStateException");
    assert!(message.contains("already been retrieved"));
}

#[test]
fn test_wrong_variant_is_logic_error() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let future = add_slave(&bridge, &mut heap, execution, "a");

    bridge.future_void_get(&mut heap, future);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalStateException");
    assert_eq!(message, "value of a Future.SlaveID requested as Future.Void");

    // The value is still there.
    assert_eq!(bridge.future_slave_id_get(&mut heap, future), 1);
}

#[test]
fn test_failed_operation_surfaces_on_get() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let first = add_slave(&bridge, &mut heap, execution, "a");
    let second = add_slave(&bridge, &mut heap, execution, "a");
    assert_no_exception(&heap);

    assert!(bridge.future_wait_for(&mut heap, second, 1000));
    assert_eq!(bridge.future_slave_id_get(&mut heap, second), 0);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/Exception");
    assert_eq!(message, "duplicate slave name: a");

    bridge.future_destroy(&mut heap, first);
    bridge.future_destroy(&mut heap, second);
    bridge.execution_destroy(&mut heap, execution);
    assert_eq!(bridge.live_objects(), 0);
}

#[test]
fn test_negative_wait_timeout() {
    let (bridge, mut heap) = setup();
    let execution = create_execution(&bridge, &mut heap);
    let future = add_slave(&bridge, &mut heap, execution, "a");
    assert!(!bridge.future_wait_for(&mut heap, future, -5));
    let (class, _) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalArgumentException");
}

#[test]
fn test_destroy_null_future_is_noop() {
    let (bridge, mut heap) = setup();
    bridge.future_destroy(&mut heap, 0);
    assert_no_exception(&heap);
}
