//! `no.viproma.coral.master.ProviderCluster`

use std::sync::{Arc, Mutex};

use crate::bridge::{lock, Bridge};
use crate::convert::{class_names, SlaveLocatorConverter, SlaveTypeDescriptionConverter};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::ffi::marshal::{to_managed_array, to_managed_string, to_native_string, STRING_CLASS};
use crate::ffi::{
    boundary, destructor, ClassRef, Env, Handle, MethodId, ObjectRef, ProviderClusterHandle,
};
use crate::types::{timeout_from_ms, SlaveType};

/// `SlaveType` → `ProviderCluster.SlaveType`
struct SlaveTypeConverter {
    descriptions: SlaveTypeDescriptionConverter,
    string_class: ClassRef,
    class: ClassRef,
    init: MethodId,
}

impl SlaveTypeConverter {
    fn new(env: &mut dyn Env) -> Result<Self> {
        let descriptions = SlaveTypeDescriptionConverter::new(env)?;
        let string_class = env.find_class(STRING_CLASS)?;
        let class = env.find_class(class_names::SLAVE_TYPE)?;
        Ok(Self {
            descriptions,
            string_class,
            class,
            init: env.get_method_id(
                class,
                "<init>",
                "(Lno/viproma/coral/model/SlaveTypeDescription;[Ljava/lang/String;)V",
            )?,
        })
    }

    fn to_managed(&self, env: &mut dyn Env, slave_type: &SlaveType) -> Result<ObjectRef> {
        let description = self.descriptions.to_managed(env, &slave_type.description)?;
        let providers = to_managed_array(env, self.string_class, &slave_type.providers, |env, p| {
            to_managed_string(env, p).map(Some)
        })?;
        env.new_object(self.class, self.init, &[description.into(), providers.into()])
    }
}

fn port_from_managed(port: i32) -> Result<u16> {
    u16::try_from(port).map_err(|_| Error::illegal_argument(format!("Invalid port number: {}", port)))
}

impl<G: Engine> Bridge<G> {
    /// `ProviderCluster.createNative(String, int)`
    pub fn cluster_create(
        &self,
        env: &mut dyn Env,
        network_interface: Option<ObjectRef>,
        discovery_port: i32,
    ) -> i64 {
        boundary(env, 0, |env| {
            let network_interface = to_native_string(env, network_interface)?;
            let port = port_from_managed(discovery_port)?;
            let cluster = self
                .engine()
                .create_provider_cluster(&network_interface, port)?;
            Ok(self.clusters.wrap(Arc::new(Mutex::new(cluster)))?.into_raw())
        })
    }

    /// `ProviderCluster.destroyNative`
    pub fn cluster_destroy(&self, env: &mut dyn Env, cluster: i64) {
        let handle = ProviderClusterHandle::from_raw(cluster);
        if !handle.is_valid() {
            return;
        }
        destructor(env, || self.clusters.destroy(handle).map(drop));
    }

    /// `ProviderCluster.getSlaveTypesNative(long, int)`
    ///
    /// Returns a `ProviderCluster.SlaveType[]`, or null on failure.
    pub fn cluster_get_slave_types(
        &self,
        env: &mut dyn Env,
        cluster: i64,
        timeout_ms: i32,
    ) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let cluster = self.clusters.get(ProviderClusterHandle::from_raw(cluster))?;
            let timeout = timeout_from_ms(timeout_ms)?;
            let slave_types = lock(&cluster).slave_types(timeout)?;
            log::debug!("discovered {} slave type(s)", slave_types.len());

            let conv = SlaveTypeConverter::new(env)?;
            to_managed_array(env, conv.class, &slave_types, |env, st| {
                conv.to_managed(env, st).map(Some)
            })
            .map(Some)
        })
    }

    /// `ProviderCluster.instantiateSlaveNative(long, String, String, int)`
    pub fn cluster_instantiate_slave(
        &self,
        env: &mut dyn Env,
        cluster: i64,
        slave_provider_id: Option<ObjectRef>,
        slave_type_uuid: Option<ObjectRef>,
        timeout_ms: i32,
    ) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let cluster = self.clusters.get(ProviderClusterHandle::from_raw(cluster))?;
            let provider_id = to_native_string(env, slave_provider_id)?;
            let type_uuid = to_native_string(env, slave_type_uuid)?;
            let timeout = timeout_from_ms(timeout_ms)?;
            let locator = lock(&cluster).instantiate_slave(&provider_id, &type_uuid, timeout)?;
            SlaveLocatorConverter::new(env)?
                .to_managed(env, &locator)
                .map(Some)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::types::SlaveTypeDescription;

    #[test]
    fn test_port_range() {
        assert_eq!(port_from_managed(0).unwrap(), 0);
        assert_eq!(port_from_managed(65535).unwrap(), 65535);
        let err = port_from_managed(65536).unwrap_err();
        assert_eq!(err.class(), Some(crate::ExceptionClass::IllegalArgument));
        assert!(err.to_string().contains("Invalid port number: 65536"));
        assert!(port_from_managed(-1).is_err());
    }

    #[test]
    fn test_slave_type_to_managed() {
        let mut heap = Heap::new();
        let conv = SlaveTypeConverter::new(&mut heap).unwrap();
        let slave_type = SlaveType {
            description: SlaveTypeDescription {
                name: "sine".into(),
                uuid: "1234".into(),
                ..Default::default()
            },
            providers: vec!["provider-a".into(), "provider-b".into()],
        };
        let obj = conv.to_managed(&mut heap, &slave_type).unwrap();
        let description = heap
            .field(obj, "description_")
            .unwrap()
            .l()
            .unwrap()
            .unwrap();
        let read = heap.read_slave_type_description(description).unwrap();
        assert_eq!(read, slave_type.description);

        let providers = heap.field(obj, "providers_").unwrap().l().unwrap().unwrap();
        let providers: Vec<String> = heap
            .array_elements(providers)
            .unwrap()
            .into_iter()
            .map(|p| heap.get_string(p.unwrap()).unwrap())
            .collect();
        assert_eq!(providers, slave_type.providers);
    }
}
