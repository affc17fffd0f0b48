//! `no.viproma.coral.slave`: opaque instances, the instance factory and the
//! two runner classes.

use std::sync::Arc;
use std::time::Duration;

use crate::bridge::{wrap_in_managed, Bridge};
use crate::convert::{class_names, SlaveLocatorConverter, SlaveTypeDescriptionConverter};
use crate::engine::{Engine, SlaveInstance};
use crate::error::{Error, Result};
use crate::ffi::marshal::to_native_string;
use crate::ffi::{boundary, destructor, Env, Handle, ObjectRef, RunnerHandle, SlaveInstanceHandle};
use crate::types::{Endpoint, SlaveLocator};

/// A `tcp` endpoint on `address`. Port 0 means any free port.
fn make_endpoint(address: &str, port: i32) -> Result<Endpoint> {
    let port = match u16::try_from(port) {
        Ok(0) => "*".to_owned(),
        Ok(p) => p.to_string(),
        Err(_) => {
            return Err(Error::illegal_argument(format!(
                "Invalid port number: {}",
                port
            )))
        }
    };
    Ok(Endpoint::new("tcp", format!("{}:{}", address, port)))
}

/// Negative means never time out.
fn comm_timeout_from_s(timeout_s: i32) -> Option<Duration> {
    u64::try_from(timeout_s).ok().map(Duration::from_secs)
}

/// `OpaqueInstance` and `InstanceFactory`
impl<G: Engine> Bridge<G> {
    fn instance(&self, instance: i64) -> Result<Arc<dyn SlaveInstance>> {
        self.instances.get(SlaveInstanceHandle::from_raw(instance))
    }

    /// `OpaqueInstance.destroyNative`
    ///
    /// Runners and logging instances built on the instance keep it alive.
    pub fn instance_destroy(&self, env: &mut dyn Env, instance: i64) {
        let handle = SlaveInstanceHandle::from_raw(instance);
        if !handle.is_valid() {
            return;
        }
        destructor(env, || self.instances.destroy(handle).map(drop));
    }

    /// `OpaqueInstance.getTypeDescriptionNative(long)`
    pub fn instance_get_type_description(
        &self,
        env: &mut dyn Env,
        instance: i64,
    ) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let description = self.instance(instance)?.type_description();
            SlaveTypeDescriptionConverter::new(env)?
                .to_managed(env, &description)
                .map(Some)
        })
    }

    /// `InstanceFactory.newCSVLoggingInstanceNative(long, String)`
    ///
    /// Returns a new `OpaqueInstance` wrapping the given one.
    pub fn instance_factory_new_csv_logging_instance(
        &self,
        env: &mut dyn Env,
        instance_to_wrap: i64,
        output_file_prefix: Option<ObjectRef>,
    ) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let wrapped = self.instance(instance_to_wrap)?;
            let prefix = to_native_string(env, output_file_prefix)?;
            let logging = self.engine().create_logging_instance(wrapped, &prefix)?;
            wrap_in_managed(env, &self.instances, class_names::OPAQUE_INSTANCE, logging)
                .map(Some)
        })
    }
}

/// `InProcessRunner` and `NetworkedRunner`
impl<G: Engine> Bridge<G> {
    /// `InProcessRunner.createNative(long)`
    ///
    /// The runner gets in-process endpoints no other runner of this bridge
    /// uses, and never times out.
    pub fn in_process_runner_create(&self, env: &mut dyn Env, instance: i64) -> i64 {
        boundary(env, 0, |_| {
            let instance = self.instance(instance)?;
            let control = Endpoint::new("inproc", self.next_inproc_name());
            let data_pub = Endpoint::new("inproc", self.next_inproc_name());
            let runner = self
                .engine()
                .create_runner(instance, control, data_pub, None)?;
            Ok(self.runners.wrap(Arc::from(runner))?.into_raw())
        })
    }

    /// `NetworkedRunner.createNative(long, String, int, int, int)`
    ///
    /// Ports must be in 0–65535; 0 picks any free port. A negative
    /// `comm_timeout_s` means never time out.
    pub fn networked_runner_create(
        &self,
        env: &mut dyn Env,
        instance: i64,
        bind_address: Option<ObjectRef>,
        control_port: i32,
        data_pub_port: i32,
        comm_timeout_s: i32,
    ) -> i64 {
        boundary(env, 0, |env| {
            let instance = self.instance(instance)?;
            let address = to_native_string(env, bind_address)?;
            let control = make_endpoint(&address, control_port)?;
            let data_pub = make_endpoint(&address, data_pub_port)?;
            let runner = self.engine().create_runner(
                instance,
                control,
                data_pub,
                comm_timeout_from_s(comm_timeout_s),
            )?;
            Ok(self.runners.wrap(Arc::from(runner))?.into_raw())
        })
    }

    /// `InProcessRunner.destroyNative`, `NetworkedRunner.destroyNative`
    pub fn runner_destroy(&self, env: &mut dyn Env, runner: i64) {
        let handle = RunnerHandle::from_raw(runner);
        if !handle.is_valid() {
            return;
        }
        destructor(env, || self.runners.destroy(handle).map(drop));
    }

    /// `InProcessRunner.getLocatorNative`, `NetworkedRunner.getLocatorNative`
    ///
    /// The endpoints the runner actually bound, so port 0 is resolved.
    pub fn runner_get_locator(&self, env: &mut dyn Env, runner: i64) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let runner = self.runners.get(RunnerHandle::from_raw(runner))?;
            let locator = SlaveLocator {
                control_endpoint: runner.bound_control_endpoint().url(),
                data_pub_endpoint: runner.bound_data_pub_endpoint().url(),
            };
            SlaveLocatorConverter::new(env)?
                .to_managed(env, &locator)
                .map(Some)
        })
    }

    /// `InProcessRunner.runNative`, `NetworkedRunner.runNative`
    ///
    /// Blocks until the master releases the slave. Other calls, including
    /// ones on this runner, proceed meanwhile.
    pub fn runner_run(&self, env: &mut dyn Env, runner: i64) {
        boundary(env, (), |_| {
            let runner = self.runners.get(RunnerHandle::from_raw(runner))?;
            runner.run()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "tcp://10.0.0.1:*")]
    #[case(1, "tcp://10.0.0.1:1")]
    #[case(65535, "tcp://10.0.0.1:65535")]
    fn test_make_endpoint(#[case] port: i32, #[case] url: &str) {
        assert_eq!(make_endpoint("10.0.0.1", port).unwrap().url(), url);
    }

    #[rstest]
    #[case(-1)]
    #[case(65536)]
    fn test_make_endpoint_rejects_bad_port(#[case] port: i32) {
        let err = make_endpoint("*", port).unwrap_err();
        assert_eq!(err.class(), Some(crate::ExceptionClass::IllegalArgument));
        assert_eq!(
            err.to_string(),
            format!(
                "Invalid port number: {} (to be thrown as java/lang/IllegalArgumentException)",
                port
            )
        );
    }

    #[test]
    fn test_negative_comm_timeout_never_expires() {
        assert_eq!(comm_timeout_from_s(-1), None);
        assert_eq!(comm_timeout_from_s(0), Some(Duration::ZERO));
        assert_eq!(comm_timeout_from_s(30), Some(Duration::from_secs(30)));
    }
}
