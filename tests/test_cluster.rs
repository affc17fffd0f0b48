//! Provider cluster entry points.

mod common;

use common::{assert_no_exception, expect_exception, setup, sine_description};
use jcoral::Env;
use pretty_assertions::assert_eq;

#[test]
fn test_create_rejects_bad_port() {
    let (bridge, mut heap) = setup();
    let iface = heap.new_string("*").unwrap();
    assert_eq!(bridge.cluster_create(&mut heap, Some(iface), 70000), 0);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/IllegalArgumentException");
    assert_eq!(message, "Invalid port number: 70000");
    assert!(bridge.engine().events().is_empty());
}

#[test]
fn test_create_requires_interface() {
    let (bridge, mut heap) = setup();
    assert_eq!(bridge.cluster_create(&mut heap, None, 10272), 0);
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/NullPointerException");
    assert_eq!(message, "Null pointer");
}

#[test]
fn test_get_slave_types() {
    let (bridge, mut heap) = setup();
    let iface = heap.new_string("*").unwrap();
    let cluster = bridge.cluster_create(&mut heap, Some(iface), 10272);
    assert_no_exception(&heap);

    let types = bridge
        .cluster_get_slave_types(&mut heap, cluster, 1000)
        .expect("slave type array");
    assert_eq!(heap.class_name_of(types).unwrap(), "[Lno/viproma/coral/master/ProviderCluster$SlaveType;");
    let elements = heap.array_elements(types).unwrap();
    assert_eq!(elements.len(), 1);

    let slave_type = elements[0].unwrap();
    let description = heap
        .invoke(
            slave_type,
            "getSlaveTypeDescription",
            "()Lno/viproma/coral/model/SlaveTypeDescription;",
            &[],
        )
        .unwrap()
        .l()
        .unwrap()
        .unwrap();
    assert_eq!(
        heap.read_slave_type_description(description).unwrap(),
        sine_description()
    );

    bridge.cluster_destroy(&mut heap, cluster);
    assert_eq!(bridge.live_objects(), 0);
}

#[test]
fn test_instantiate_slave() {
    let (bridge, mut heap) = setup();
    let iface = heap.new_string("*").unwrap();
    let cluster = bridge.cluster_create(&mut heap, Some(iface), 0);
    let provider = heap.new_string("provider-1").unwrap();
    let uuid = heap.new_string(&sine_description().uuid).unwrap();

    let locator = bridge
        .cluster_instantiate_slave(&mut heap, cluster, Some(provider), Some(uuid), 1000)
        .expect("slave locator");
    assert_eq!(
        heap.read_slave_locator(locator).unwrap(),
        common::locator(10000)
    );
}

#[test]
fn test_instantiate_slave_engine_error() {
    let (bridge, mut heap) = setup();
    let iface = heap.new_string("*").unwrap();
    let cluster = bridge.cluster_create(&mut heap, Some(iface), 0);
    let provider = heap.new_string("elsewhere").unwrap();
    let uuid = heap.new_string("x").unwrap();

    let locator =
        bridge.cluster_instantiate_slave(&mut heap, cluster, Some(provider), Some(uuid), 1000);
    assert!(locator.is_none());
    let (class, message) = expect_exception(&mut heap);
    assert_eq!(class, "java/lang/Exception");
    assert_eq!(message, "Unknown slave provider: elsewhere");
    assert!(!heap.exception_check());
}
