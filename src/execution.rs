//! `no.viproma.coral.master.Execution`

use std::sync::{Arc, Mutex};

use crate::batch::{transfer, BatchConverter};
use crate::bridge::{lock, Bridge};
use crate::convert::{
    class_names, execution_options_to_native, SlaveIdConverter, SlaveLocatorConverter,
    VariableSettingConverter,
};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::ffi::marshal::{to_managed_string, to_native_string, IterableContext};
use crate::ffi::{
    boundary, destructor, ClassRef, Env, ExecutionHandle, FutureHandle, Handle, MethodId,
    ObjectRef,
};
use crate::future::FutureVariant;
use crate::types::{timeout_from_ms, AddedSlave, SlaveConfig, SlaveId, StepResult};

fn not_an_instance(class_name: &str) -> Error {
    Error::illegal_argument(format!(
        "expected an instance of {}",
        class_name.replace('/', ".")
    ))
}

/// `AddedSlave` items of `addSlaves`.
struct AddedSlaveConverter {
    locators: SlaveLocatorConverter,
    slave_ids: SlaveIdConverter,
    class: ClassRef,
    get_locator: MethodId,
    get_name: MethodId,
    set_id: MethodId,
    set_error: MethodId,
}

impl AddedSlaveConverter {
    fn new(env: &mut dyn Env) -> Result<Self> {
        let locators = SlaveLocatorConverter::new(env)?;
        let slave_ids = SlaveIdConverter::new(env)?;
        let class = env.find_class(class_names::ADDED_SLAVE)?;
        Ok(Self {
            locators,
            slave_ids,
            class,
            get_locator: env.get_method_id(
                class,
                "getLocator",
                "()Lno/viproma/coral/net/SlaveLocator;",
            )?,
            get_name: env.get_method_id(class, "getName", "()Ljava/lang/String;")?,
            set_id: env.get_method_id(class, "setID", "(Lno/viproma/coral/model/SlaveID;)V")?,
            set_error: env.get_method_id(class, "setError", "(Ljava/lang/String;)V")?,
        })
    }
}

impl BatchConverter for AddedSlaveConverter {
    type Native = AddedSlave;

    fn to_native_input(&self, env: &mut dyn Env, obj: ObjectRef) -> Result<AddedSlave> {
        if !env.is_instance_of(obj, self.class) {
            return Err(not_an_instance(class_names::ADDED_SLAVE));
        }
        let locator = env.call_method(obj, self.get_locator, &[])?.l()?;
        let locator = self.locators.to_native(env, locator)?;
        // A null name lets the execution pick one.
        let name = match env.call_method(obj, self.get_name, &[])?.l()? {
            Some(name) => env.get_string(name)?,
            None => String::new(),
        };
        Ok(AddedSlave::new(locator, name))
    }

    fn copy_to_managed_output(
        &self,
        env: &mut dyn Env,
        item: &AddedSlave,
        obj: ObjectRef,
    ) -> Result<()> {
        let id = match item.id {
            Some(id) => Some(self.slave_ids.to_managed(env, id)?),
            None => None,
        };
        env.call_method(obj, self.set_id, &[id.into()])?;
        let error = match &item.error {
            Some(message) => Some(to_managed_string(env, message)?),
            None => None,
        };
        env.call_method(obj, self.set_error, &[error.into()])?;
        Ok(())
    }
}

/// `SlaveConfig` items of `reconfigure`.
struct SlaveConfigConverter {
    slave_ids: SlaveIdConverter,
    settings: VariableSettingConverter,
    iterables: IterableContext,
    class: ClassRef,
    get_slave_id: MethodId,
    get_variable_settings: MethodId,
    set_error: MethodId,
}

impl SlaveConfigConverter {
    fn new(env: &mut dyn Env) -> Result<Self> {
        let slave_ids = SlaveIdConverter::new(env)?;
        let settings = VariableSettingConverter::new(env)?;
        let iterables = IterableContext::new(env)?;
        let class = env.find_class(class_names::SLAVE_CONFIG)?;
        Ok(Self {
            slave_ids,
            settings,
            iterables,
            class,
            get_slave_id: env.get_method_id(
                class,
                "getSlaveID",
                "()Lno/viproma/coral/model/SlaveID;",
            )?,
            get_variable_settings: env.get_method_id(
                class,
                "getVariableSettings",
                "()Ljava/lang/Iterable;",
            )?,
            set_error: env.get_method_id(class, "setError", "(Ljava/lang/String;)V")?,
        })
    }
}

impl BatchConverter for SlaveConfigConverter {
    type Native = SlaveConfig;

    fn to_native_input(&self, env: &mut dyn Env, obj: ObjectRef) -> Result<SlaveConfig> {
        if !env.is_instance_of(obj, self.class) {
            return Err(not_an_instance(class_names::SLAVE_CONFIG));
        }
        let slave_id = env.call_method(obj, self.get_slave_id, &[])?.l()?;
        let slave_id = self.slave_ids.to_native(env, slave_id)?;
        let settings = env.call_method(obj, self.get_variable_settings, &[])?.l()?;
        let variable_settings = self
            .iterables
            .collect(env, settings, |env, vs| self.settings.to_native(env, vs))?;
        Ok(SlaveConfig {
            slave_id,
            variable_settings,
            error: None,
        })
    }

    fn copy_to_managed_output(
        &self,
        env: &mut dyn Env,
        item: &SlaveConfig,
        obj: ObjectRef,
    ) -> Result<()> {
        let error = match &item.error {
            Some(message) => Some(to_managed_string(env, message)?),
            None => None,
        };
        env.call_method(obj, self.set_error, &[error.into()])?;
        Ok(())
    }
}

fn slave_id_from_managed(id: i32) -> Result<SlaveId> {
    u16::try_from(id)
        .map(SlaveId)
        .map_err(|_| Error::illegal_argument(format!("Slave ID out of range: {}", id)))
}

impl<G: Engine> Bridge<G> {
    /// `Execution.createNative(String, ExecutionOptions)`
    pub fn execution_create(
        &self,
        env: &mut dyn Env,
        name: Option<ObjectRef>,
        options: Option<ObjectRef>,
    ) -> i64 {
        boundary(env, 0, |env| {
            let name = to_native_string(env, name)?;
            let options = execution_options_to_native(env, options)?;
            log::debug!("creating execution {:?}", name);
            let execution = self.engine().create_execution(&name, options)?;
            Ok(self.executions.wrap(Arc::new(Mutex::new(execution)))?.into_raw())
        })
    }

    /// `Execution.destroyNative`
    ///
    /// The execution is terminated before it is dropped. A failure to
    /// terminate is logged; the execution is dropped regardless.
    pub fn execution_destroy(&self, env: &mut dyn Env, execution: i64) {
        let handle = ExecutionHandle::from_raw(execution);
        if !handle.is_valid() {
            return;
        }
        destructor(env, || {
            let execution = self.executions.destroy(handle)?;
            if let Err(err) = lock(&execution).terminate() {
                log::warn!("execution did not terminate cleanly: {}", err);
            }
            Ok(())
        });
    }

    /// `Execution.addSlavesNative(long, Iterable<AddedSlave>, int)`
    ///
    /// Every `AddedSlave` gets its ID or error set, even if the call fails.
    pub fn execution_add_slaves(
        &self,
        env: &mut dyn Env,
        execution: i64,
        slaves_to_add: Option<ObjectRef>,
        comm_timeout_ms: i32,
    ) {
        boundary(env, (), |env| {
            let execution = self.executions.get(ExecutionHandle::from_raw(execution))?;
            let timeout = timeout_from_ms(comm_timeout_ms)?;
            let conv = AddedSlaveConverter::new(env)?;
            let ctx = IterableContext::new(env)?;
            transfer(env, &conv, &ctx, slaves_to_add, |slaves| {
                lock(&execution).reconstitute(slaves, timeout)
            })
        })
    }

    /// `Execution.reconfigureNative(long, Iterable<SlaveConfig>, int)`
    ///
    /// Every `SlaveConfig` gets its error set, even if the call fails.
    pub fn execution_reconfigure(
        &self,
        env: &mut dyn Env,
        execution: i64,
        slave_configs: Option<ObjectRef>,
        comm_timeout_ms: i32,
    ) {
        boundary(env, (), |env| {
            let execution = self.executions.get(ExecutionHandle::from_raw(execution))?;
            let timeout = timeout_from_ms(comm_timeout_ms)?;
            let conv = SlaveConfigConverter::new(env)?;
            let ctx = IterableContext::new(env)?;
            transfer(env, &conv, &ctx, slave_configs, |configs| {
                lock(&execution).reconfigure(configs, timeout)
            })
        })
    }

    /// `Execution.stepNative(long, double, int)`
    ///
    /// Returns `false` if the step did not complete, including on timeout.
    pub fn execution_step(
        &self,
        env: &mut dyn Env,
        execution: i64,
        step_size: f64,
        timeout_ms: i32,
    ) -> bool {
        boundary(env, false, |_| {
            let execution = self.executions.get(ExecutionHandle::from_raw(execution))?;
            let timeout = timeout_from_ms(timeout_ms)?;
            let result = lock(&execution).step(step_size, timeout)?;
            if result == StepResult::Failed {
                log::debug!("step of size {} did not complete", step_size);
            }
            Ok(result == StepResult::Completed)
        })
    }

    /// `Execution.acceptStepNative(long, int)`
    pub fn execution_accept_step(&self, env: &mut dyn Env, execution: i64, timeout_ms: i32) {
        boundary(env, (), |_| {
            let execution = self.executions.get(ExecutionHandle::from_raw(execution))?;
            let timeout = timeout_from_ms(timeout_ms)?;
            let result = lock(&execution).accept_step(timeout);
            result
        })
    }

    /// `Execution.addSlaveNative(long, SlaveLocator, String, int)`
    ///
    /// Returns a `Future.SlaveID` handle.
    pub fn execution_add_slave(
        &self,
        env: &mut dyn Env,
        execution: i64,
        locator: Option<ObjectRef>,
        name: Option<ObjectRef>,
        comm_timeout_ms: i32,
    ) -> i64 {
        boundary(env, 0, |env| {
            let exe = self.executions.get(ExecutionHandle::from_raw(execution))?;
            let locator = SlaveLocatorConverter::new(env)?.to_native(env, locator)?;
            let name = match name {
                Some(name) => env.get_string(name)?,
                None => String::new(),
            };
            let timeout = timeout_from_ms(comm_timeout_ms)?;
            let future = lock(&exe).add_slave(locator, &name, timeout)?;
            let future = Arc::new(Mutex::new(FutureVariant::SlaveId(future)));
            let handle: FutureHandle = self.futures.wrap(future)?;
            Ok(handle.into_raw())
        })
    }

    /// `Execution.setVariablesNative(long, int, Iterable<VariableSetting>, int)`
    ///
    /// Returns a `Future.Void` handle.
    pub fn execution_set_variables(
        &self,
        env: &mut dyn Env,
        execution: i64,
        slave_id: i32,
        variable_settings: Option<ObjectRef>,
        comm_timeout_ms: i32,
    ) -> i64 {
        boundary(env, 0, |env| {
            let exe = self.executions.get(ExecutionHandle::from_raw(execution))?;
            let slave = slave_id_from_managed(slave_id)?;
            let conv = VariableSettingConverter::new(env)?;
            let settings = IterableContext::new(env)?
                .collect(env, variable_settings, |env, vs| conv.to_native(env, vs))?;
            let timeout = timeout_from_ms(comm_timeout_ms)?;
            let future = lock(&exe).set_variables(slave, settings, timeout)?;
            let future = Arc::new(Mutex::new(FutureVariant::Void(future)));
            let handle: FutureHandle = self.futures.wrap(future)?;
            Ok(handle.into_raw())
        })
    }
}
