//! Handle validation and failure translation at the boundary.

mod common;

use common::{assert_no_exception, expect_exception, setup};
use jcoral::ffi::error::UNIDENTIFIED_MESSAGE;
use jcoral::Env;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn npe() -> (String, String) {
    (
        "java/lang/NullPointerException".to_owned(),
        "Null pointer".to_owned(),
    )
}

#[test]
fn test_zero_handle_raises_null_pointer() {
    let (bridge, mut heap) = setup();

    assert!(!bridge.execution_step(&mut heap, 0, 0.1, 50));
    assert_eq!(expect_exception(&mut heap), npe());

    assert!(bridge.cluster_get_slave_types(&mut heap, 0, 50).is_none());
    assert_eq!(expect_exception(&mut heap), npe());

    assert!(bridge.fmu_get_description(&mut heap, 0).is_none());
    assert_eq!(expect_exception(&mut heap), npe());

    bridge.runner_run(&mut heap, 0);
    assert_eq!(expect_exception(&mut heap), npe());

    bridge.future_wait(&mut heap, 0);
    assert_eq!(expect_exception(&mut heap), npe());
}

#[rstest]
#[case::execution(0)]
#[case::cluster(1)]
#[case::importer(2)]
#[case::fmu(3)]
#[case::instance(4)]
#[case::runner(5)]
#[case::future(6)]
fn test_destroying_zero_handle_is_noop(#[case] which: usize) {
    let (bridge, mut heap) = setup();
    match which {
        0 => bridge.execution_destroy(&mut heap, 0),
        1 => bridge.cluster_destroy(&mut heap, 0),
        2 => bridge.importer_destroy(&mut heap, 0),
        3 => bridge.fmu_destroy(&mut heap, 0),
        4 => bridge.instance_destroy(&mut heap, 0),
        5 => bridge.runner_destroy(&mut heap, 0),
        _ => bridge.future_destroy(&mut heap, 0),
    }
    assert_no_exception(&heap);
}

#[test]
fn test_handle_of_wrong_kind_is_detected() {
    let (bridge, mut heap) = setup();
    let importer = bridge.importer_create(&mut heap);
    assert!(!bridge.execution_step(&mut heap, importer, 0.1, 50));
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalArgumentException");
    assert!(message.ends_with("does not refer to a Execution"), "{}", message);
}

#[test]
fn test_stale_handle_is_detected() {
    let (bridge, mut heap) = setup();
    let first = bridge.importer_create(&mut heap);
    bridge.importer_destroy(&mut heap, first);
    let second = bridge.importer_create(&mut heap);
    assert_ne!(first, second);

    bridge.importer_clean_cache(&mut heap, first);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalStateException");
    assert!(message.contains("stale"));

    bridge.importer_clean_cache(&mut heap, second);
    assert_no_exception(&heap);
}

#[test]
fn test_panic_is_unidentified() {
    let (bridge, mut heap) = setup();
    let name = heap.new_string("x").unwrap();
    let options = heap.new_default_execution_options().unwrap();
    let execution = bridge.execution_create(&mut heap, Some(name), Some(options));

    // The fake engine panics on a negative step size.
    assert!(!bridge.execution_step(&mut heap, execution, -1.0, 50));
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/Error");
    assert_eq!(message, UNIDENTIFIED_MESSAGE);
    assert!(!message.contains("negative step size"));

    // The bridge is still usable.
    assert!(bridge.execution_step(&mut heap, execution, 0.1, 50));
    assert!(!heap.exception_check());
}

#[test]
fn test_wrong_argument_class_is_illegal_argument() {
    let (bridge, mut heap) = setup();
    let name = heap.new_string("x").unwrap();
    let not_options = heap.new_string("options").unwrap();
    assert_eq!(
        bridge.execution_create(&mut heap, Some(name), Some(not_options)),
        0
    );
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalArgumentException");
    assert_eq!(
        message,
        "expected an instance of no.viproma.coral.master.ExecutionOptions"
    );
}
