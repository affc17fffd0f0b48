use super::{checked_instance, class_names};
use crate::error::Result;
use crate::ffi::marshal::{call_string_method, to_managed_string};
use crate::ffi::{ClassRef, Env, MethodId, ObjectRef};
use crate::types::SlaveLocator;

/// `SlaveLocator` ⇄ `no.viproma.coral.net.SlaveLocator`
pub struct SlaveLocatorConverter {
    class: ClassRef,
    init: MethodId,
    get_control_endpoint: MethodId,
    get_data_pub_endpoint: MethodId,
}

impl SlaveLocatorConverter {
    pub fn new(env: &mut dyn Env) -> Result<Self> {
        let class = env.find_class(class_names::SLAVE_LOCATOR)?;
        Ok(Self {
            class,
            init: env.get_method_id(class, "<init>", "(Ljava/lang/String;Ljava/lang/String;)V")?,
            get_control_endpoint: env.get_method_id(
                class,
                "getControlEndpoint",
                "()Ljava/lang/String;",
            )?,
            get_data_pub_endpoint: env.get_method_id(
                class,
                "getDataPubEndpoint",
                "()Ljava/lang/String;",
            )?,
        })
    }

    pub fn to_native(&self, env: &mut dyn Env, obj: Option<ObjectRef>) -> Result<SlaveLocator> {
        let obj = checked_instance(env, obj, self.class, class_names::SLAVE_LOCATOR)?;
        Ok(SlaveLocator {
            control_endpoint: call_string_method(env, obj, self.get_control_endpoint)?,
            data_pub_endpoint: call_string_method(env, obj, self.get_data_pub_endpoint)?,
        })
    }

    pub fn to_managed(&self, env: &mut dyn Env, locator: &SlaveLocator) -> Result<ObjectRef> {
        let control = to_managed_string(env, &locator.control_endpoint)?;
        let data_pub = to_managed_string(env, &locator.data_pub_endpoint)?;
        env.new_object(self.class, self.init, &[control.into(), data_pub.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    #[test]
    fn test_locator_roundtrip() {
        let mut heap = Heap::new();
        let conv = SlaveLocatorConverter::new(&mut heap).unwrap();
        let loc = SlaveLocator {
            control_endpoint: "tcp://127.0.0.1:5000".into(),
            data_pub_endpoint: "tcp://127.0.0.1:5001".into(),
        };
        let obj = conv.to_managed(&mut heap, &loc).unwrap();
        assert_eq!(conv.to_native(&mut heap, Some(obj)).unwrap(), loc);
    }

    #[test]
    fn test_null_locator() {
        let mut heap = Heap::new();
        let conv = SlaveLocatorConverter::new(&mut heap).unwrap();
        let err = conv.to_native(&mut heap, None).unwrap_err();
        assert_eq!(err.class(), Some(crate::ExceptionClass::NullPointer));
    }
}
