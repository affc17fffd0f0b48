//! The simulation engine behind the bridge.
//!
//! The bridge only marshals: every piece of simulation behaviour comes from
//! an [`Engine`] supplied by the embedder. The traits here list exactly the
//! operations the entry points need.
//!
//! Entry points may be called from any thread, so every engine object is
//! `Send`. Objects the bridge shares between calls without locking them
//! (FMUs, slave instances and runners) are `Sync` as well.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::future::NativeFuture;
use crate::types::{
    AddedSlave, Endpoint, ExecutionOptions, FmiVersion, SlaveConfig, SlaveId, SlaveLocator,
    SlaveType, SlaveTypeDescription, StepResult, VariableSetting,
};

/// Factory for the engine's top-level objects.
pub trait Engine: Send {
    /// Start a new execution.
    fn create_execution(
        &mut self,
        name: &str,
        options: ExecutionOptions,
    ) -> Result<Box<dyn Execution>>;

    /// Join the slave provider cluster reachable through `network_interface`.
    fn create_provider_cluster(
        &mut self,
        network_interface: &str,
        discovery_port: u16,
    ) -> Result<Box<dyn ProviderCluster>>;

    /// Create an FMU importer, caching unpacked FMUs in `cache_dir` or in a
    /// default location.
    fn create_importer(&mut self, cache_dir: Option<&Path>) -> Result<Box<dyn Importer>>;

    /// Create a runner serving `instance` on the given endpoints.
    ///
    /// `comm_timeout` of `None` means the runner never times out waiting for
    /// its master.
    fn create_runner(
        &mut self,
        instance: Arc<dyn SlaveInstance>,
        control: Endpoint,
        data_pub: Endpoint,
        comm_timeout: Option<Duration>,
    ) -> Result<Box<dyn Runner>>;

    /// Wrap `instance` in one that logs every variable value to CSV files
    /// whose names start with `output_file_prefix`.
    fn create_logging_instance(
        &mut self,
        instance: Arc<dyn SlaveInstance>,
        output_file_prefix: &str,
    ) -> Result<Arc<dyn SlaveInstance>>;
}

/// A running co-simulation.
pub trait Execution: Send {
    /// Add the slaves in `slaves` and record, per item, the assigned ID or
    /// the reason it could not be added. Fails if any item failed.
    fn reconstitute(&mut self, slaves: &mut [AddedSlave], comm_timeout: Duration) -> Result<()>;

    /// Apply the variable settings in `configs` and record, per item, any
    /// error. Fails if any item failed.
    fn reconfigure(&mut self, configs: &mut [SlaveConfig], comm_timeout: Duration) -> Result<()>;

    /// Perform one time step.
    fn step(&mut self, step_size: f64, timeout: Duration) -> Result<StepResult>;

    /// Accept the last step.
    fn accept_step(&mut self, timeout: Duration) -> Result<()>;

    /// Add one slave; the future yields its ID.
    fn add_slave(
        &mut self,
        locator: SlaveLocator,
        name: &str,
        comm_timeout: Duration,
    ) -> Result<NativeFuture<SlaveId>>;

    /// Change variables of one slave; the future completes when they are set.
    fn set_variables(
        &mut self,
        slave: SlaveId,
        settings: Vec<VariableSetting>,
        comm_timeout: Duration,
    ) -> Result<NativeFuture<()>>;

    /// Shut the execution and its slaves down.
    fn terminate(&mut self) -> Result<()>;
}

/// The set of slave providers on the network.
pub trait ProviderCluster: Send {
    /// Slave types offered by every discovered provider.
    fn slave_types(&mut self, timeout: Duration) -> Result<Vec<SlaveType>>;

    /// Ask provider `provider_id` to instantiate the slave type `type_uuid`.
    fn instantiate_slave(
        &mut self,
        provider_id: &str,
        type_uuid: &str,
        timeout: Duration,
    ) -> Result<SlaveLocator>;
}

/// FMU importer.
pub trait Importer: Send {
    /// Import a packed `.fmu` file.
    fn import(&mut self, fmu_path: &Path) -> Result<Arc<dyn Fmu>>;

    /// Import an FMU that has already been unpacked into a directory.
    fn import_unpacked(&mut self, unpacked_fmu_path: &Path) -> Result<Arc<dyn Fmu>>;

    /// Remove unused files from the cache.
    fn clean_cache(&mut self) -> Result<()>;
}

/// An imported FMU.
pub trait Fmu: Send + Sync {
    /// The FMI standard version the FMU implements.
    fn fmi_version(&self) -> FmiVersion;

    /// The slave type the FMU provides.
    fn description(&self) -> &SlaveTypeDescription;

    /// Create a new slave from this FMU.
    fn instantiate_slave(&self) -> Result<Arc<dyn SlaveInstance>>;
}

/// A slave, ready to be served by a [`Runner`].
pub trait SlaveInstance: Send + Sync {
    /// Description of the slave's type and variables.
    fn type_description(&self) -> SlaveTypeDescription;
}

/// Serves one slave instance to a master.
///
/// [`run`](Self::run) blocks for as long as the master needs the slave;
/// the endpoint queries may be made from other threads meanwhile.
pub trait Runner: Send + Sync {
    /// The control endpoint as bound, with any wildcard port resolved.
    fn bound_control_endpoint(&self) -> Endpoint;

    /// The data publishing endpoint as bound, with any wildcard port
    /// resolved.
    fn bound_data_pub_endpoint(&self) -> Endpoint;

    /// Serve the instance until the master lets it go.
    fn run(&self) -> Result<()>;
}

impl<G: Engine + ?Sized> Engine for Box<G> {
    fn create_execution(
        &mut self,
        name: &str,
        options: ExecutionOptions,
    ) -> Result<Box<dyn Execution>> {
        (**self).create_execution(name, options)
    }

    fn create_provider_cluster(
        &mut self,
        network_interface: &str,
        discovery_port: u16,
    ) -> Result<Box<dyn ProviderCluster>> {
        (**self).create_provider_cluster(network_interface, discovery_port)
    }

    fn create_importer(&mut self, cache_dir: Option<&Path>) -> Result<Box<dyn Importer>> {
        (**self).create_importer(cache_dir)
    }

    fn create_runner(
        &mut self,
        instance: Arc<dyn SlaveInstance>,
        control: Endpoint,
        data_pub: Endpoint,
        comm_timeout: Option<Duration>,
    ) -> Result<Box<dyn Runner>> {
        (**self).create_runner(instance, control, data_pub, comm_timeout)
    }

    fn create_logging_instance(
        &mut self,
        instance: Arc<dyn SlaveInstance>,
        output_file_prefix: &str,
    ) -> Result<Arc<dyn SlaveInstance>> {
        (**self).create_logging_instance(instance, output_file_prefix)
    }
}
