//! Shared test helpers: an in-memory engine and setup functions.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use jcoral::heap::Heap;
use jcoral::{
    AddedSlave, Bridge, Causality, DataType, Endpoint, Engine, Error, ExceptionClass, Execution,
    ExecutionOptions, FmiVersion, Fmu, Importer, NativeFuture, ProviderCluster, Result, Runner,
    SlaveConfig, SlaveId, SlaveInstance, SlaveLocator, SlaveType, SlaveTypeDescription, StepResult,
    Variability, VariableDescription, VariableSetting,
};

/// Things the fake engine was asked to do, in order.
pub type Events = Arc<Mutex<Vec<String>>>;

/// Number of steps taken by any execution, signalled on every step.
pub type Steps = Arc<(Mutex<usize>, Condvar)>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn setup() -> (Bridge<FakeEngine>, Heap) {
    init_logging();
    (Bridge::new(FakeEngine::default()), Heap::new())
}

pub fn sine_description() -> SlaveTypeDescription {
    SlaveTypeDescription {
        name: "sine".into(),
        uuid: "a0b1c2d3".into(),
        description: "Sine wave generator".into(),
        author: "test".into(),
        version: "1.0".into(),
        variables: vec![
            VariableDescription {
                id: 0,
                name: "amplitude".into(),
                data_type: DataType::Real,
                causality: Causality::Parameter,
                variability: Variability::Fixed,
            },
            VariableDescription {
                id: 1,
                name: "output".into(),
                data_type: DataType::Real,
                causality: Causality::Output,
                variability: Variability::Continuous,
            },
        ],
    }
}

pub fn locator(port: u16) -> SlaveLocator {
    SlaveLocator {
        control_endpoint: format!("tcp://localhost:{}", port),
        data_pub_endpoint: format!("tcp://localhost:{}", port + 1),
    }
}

/// Take the in-flight exception, panicking if there is none.
pub fn expect_exception(heap: &mut Heap) -> (String, String) {
    heap.take_exception_info()
        .expect("a managed exception should be in flight")
}

pub fn assert_no_exception(heap: &Heap) {
    if let Some((class, message)) = heap.exception_info() {
        panic!("unexpected exception {}: {}", class, message);
    }
}

#[derive(Default)]
pub struct FakeEngine {
    pub events: Events,
    pub steps: Steps,
    /// Make every step report that it did not complete.
    pub steps_fail: bool,
    /// Make runners serve until some execution has stepped.
    pub runners_wait_for_step: bool,
}

impl FakeEngine {
    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Engine for FakeEngine {
    fn create_execution(
        &mut self,
        name: &str,
        options: ExecutionOptions,
    ) -> Result<Box<dyn Execution>> {
        self.record(format!(
            "create_execution {} {}..{} {:?}",
            name,
            options.start_time(),
            options.max_time(),
            options.slave_variable_recv_timeout
        ));
        Ok(Box::new(FakeExecution {
            events: self.events.clone(),
            options,
            names: HashSet::new(),
            next_id: 1,
            steps: self.steps.clone(),
            steps_fail: self.steps_fail,
        }))
    }

    fn create_provider_cluster(
        &mut self,
        network_interface: &str,
        discovery_port: u16,
    ) -> Result<Box<dyn ProviderCluster>> {
        self.record(format!("create_provider_cluster {}:{}", network_interface, discovery_port));
        Ok(Box::new(FakeCluster))
    }

    fn create_importer(&mut self, cache_dir: Option<&Path>) -> Result<Box<dyn Importer>> {
        match cache_dir {
            Some(dir) if dir.as_os_str().is_empty() => {
                Err(Error::native("cache directory name is empty"))
            }
            Some(dir) => {
                self.record(format!("create_importer {}", dir.display()));
                Ok(Box::new(FakeImporter))
            }
            None => {
                self.record("create_importer");
                Ok(Box::new(FakeImporter))
            }
        }
    }

    fn create_runner(
        &mut self,
        _instance: Arc<dyn SlaveInstance>,
        control: Endpoint,
        data_pub: Endpoint,
        comm_timeout: Option<Duration>,
    ) -> Result<Box<dyn Runner>> {
        self.record(format!(
            "create_runner {} {} {:?}",
            control.url(),
            data_pub.url(),
            comm_timeout
        ));
        Ok(Box::new(FakeRunner {
            control,
            data_pub,
            steps: self.runners_wait_for_step.then(|| self.steps.clone()),
        }))
    }

    fn create_logging_instance(
        &mut self,
        instance: Arc<dyn SlaveInstance>,
        output_file_prefix: &str,
    ) -> Result<Arc<dyn SlaveInstance>> {
        self.record(format!("create_logging_instance {}", output_file_prefix));
        Ok(Arc::new(FakeInstance {
            description: instance.type_description(),
        }))
    }
}

pub struct FakeExecution {
    events: Events,
    pub options: ExecutionOptions,
    names: HashSet<String>,
    next_id: u16,
    steps: Steps,
    steps_fail: bool,
}

impl Execution for FakeExecution {
    fn reconstitute(&mut self, slaves: &mut [AddedSlave], _comm_timeout: Duration) -> Result<()> {
        let mut failed = false;
        for slave in slaves.iter_mut() {
            if slave.name == "crash" {
                panic!("slave provider crashed");
            }
            if !self.names.insert(slave.name.clone()) {
                slave.error = Some(format!("duplicate slave name: {}", slave.name));
                failed = true;
                continue;
            }
            slave.id = Some(SlaveId(self.next_id));
            self.next_id += 1;
        }
        if failed {
            return Err(Error::throw(
                ExceptionClass::Runtime,
                "One or more slaves could not be added",
            ));
        }
        Ok(())
    }

    fn reconfigure(&mut self, configs: &mut [SlaveConfig], _comm_timeout: Duration) -> Result<()> {
        let mut failed = false;
        for config in configs.iter_mut() {
            if config.slave_id.0 >= self.next_id {
                config.error = Some(format!("no slave with ID {}", config.slave_id));
                failed = true;
            }
        }
        if failed {
            return Err(Error::native("Reconfiguration failed"));
        }
        Ok(())
    }

    fn step(&mut self, step_size: f64, _timeout: Duration) -> Result<StepResult> {
        if step_size < 0.0 {
            panic!("negative step size {}", step_size);
        }
        let (count, stepped) = &*self.steps;
        *count.lock().unwrap() += 1;
        stepped.notify_all();
        if self.steps_fail {
            Ok(StepResult::Failed)
        } else {
            Ok(StepResult::Completed)
        }
    }

    fn accept_step(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn add_slave(
        &mut self,
        _locator: SlaveLocator,
        name: &str,
        _comm_timeout: Duration,
    ) -> Result<NativeFuture<SlaveId>> {
        if !self.names.insert(name.to_owned()) {
            return Ok(NativeFuture::failed(Error::native(format!(
                "duplicate slave name: {}",
                name
            ))));
        }
        let (promise, future) = jcoral::future::channel();
        let id = SlaveId(self.next_id);
        self.next_id += 1;
        std::thread::spawn(move || promise.set_value(id));
        Ok(future)
    }

    fn set_variables(
        &mut self,
        slave: SlaveId,
        settings: Vec<VariableSetting>,
        _comm_timeout: Duration,
    ) -> Result<NativeFuture<()>> {
        if slave.0 >= self.next_id {
            return Err(Error::illegal_argument(format!("no slave with ID {}", slave)));
        }
        self.events
            .lock()
            .unwrap()
            .push(format!("set_variables {} x{}", slave, settings.len()));
        Ok(NativeFuture::ready(()))
    }

    fn terminate(&mut self) -> Result<()> {
        self.events.lock().unwrap().push("terminate".into());
        Ok(())
    }
}

pub struct FakeCluster;

impl ProviderCluster for FakeCluster {
    fn slave_types(&mut self, _timeout: Duration) -> Result<Vec<SlaveType>> {
        Ok(vec![SlaveType {
            description: sine_description(),
            providers: vec!["provider-1".into(), "provider-2".into()],
        }])
    }

    fn instantiate_slave(
        &mut self,
        provider_id: &str,
        type_uuid: &str,
        _timeout: Duration,
    ) -> Result<SlaveLocator> {
        if !provider_id.starts_with("provider-") {
            return Err(Error::native(format!("Unknown slave provider: {}", provider_id)));
        }
        if type_uuid != sine_description().uuid {
            return Err(Error::native(format!("Unknown slave type: {}", type_uuid)));
        }
        Ok(locator(10000))
    }
}

pub struct FakeImporter;

impl Importer for FakeImporter {
    fn import(&mut self, fmu_path: &Path) -> Result<Arc<dyn Fmu>> {
        if fmu_path.extension().map_or(true, |ext| ext != "fmu") {
            return Err(Error::native(format!("Not an FMU: {}", fmu_path.display())));
        }
        Ok(Arc::new(FakeFmu))
    }

    fn import_unpacked(&mut self, _unpacked_fmu_path: &Path) -> Result<Arc<dyn Fmu>> {
        Ok(Arc::new(FakeFmu))
    }

    fn clean_cache(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct FakeFmu;

impl Fmu for FakeFmu {
    fn fmi_version(&self) -> FmiVersion {
        FmiVersion::V2_0
    }

    fn description(&self) -> &SlaveTypeDescription {
        static DESCRIPTION: std::sync::OnceLock<SlaveTypeDescription> = std::sync::OnceLock::new();
        DESCRIPTION.get_or_init(sine_description)
    }

    fn instantiate_slave(&self) -> Result<Arc<dyn SlaveInstance>> {
        Ok(Arc::new(FakeInstance {
            description: sine_description(),
        }))
    }
}

pub struct FakeInstance {
    description: SlaveTypeDescription,
}

impl SlaveInstance for FakeInstance {
    fn type_description(&self) -> SlaveTypeDescription {
        self.description.clone()
    }
}

pub struct FakeRunner {
    control: Endpoint,
    data_pub: Endpoint,
    steps: Option<Steps>,
}

/// Any-port endpoints resolve to a fixed port once bound.
fn bound(endpoint: &Endpoint) -> Endpoint {
    match endpoint.address.strip_suffix(":*") {
        Some(host) => Endpoint::new(endpoint.transport.clone(), format!("{}:49152", host)),
        None => endpoint.clone(),
    }
}

impl Runner for FakeRunner {
    fn bound_control_endpoint(&self) -> Endpoint {
        bound(&self.control)
    }

    fn bound_data_pub_endpoint(&self) -> Endpoint {
        bound(&self.data_pub)
    }

    fn run(&self) -> Result<()> {
        let Some(steps) = &self.steps else {
            return Ok(());
        };
        let (count, stepped) = &**steps;
        let (count, _) = stepped
            .wait_timeout_while(count.lock().unwrap(), Duration::from_secs(5), |n| *n == 0)
            .unwrap();
        if *count == 0 {
            return Err(Error::native("master never stepped"));
        }
        Ok(())
    }
}
