//! The bridge: owner of every native object the managed side refers to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::{Engine, Execution, Fmu, Importer, ProviderCluster, Runner, SlaveInstance};
use crate::error::Result;
use crate::ffi::marshal::new_with_handle;
use crate::ffi::{
    Env, ExecutionHandle, FmuHandle, FutureHandle, Handle, ImporterHandle, ObjectRef,
    ProviderClusterHandle, RunnerHandle, SharedRegistry, SlaveInstanceHandle,
};
use crate::future::FutureVariant;

/// A native object that entry points call through `&mut`.
pub(crate) type Locked<T> = Arc<Mutex<T>>;

/// Entry points of the managed Coral classes, over one [`Engine`].
///
/// Each managed object holding a native handle got that handle from one of
/// the registries here, and gives it back through the matching `*_destroy`
/// entry point.
///
/// A `Bridge` is shared between every thread the managed runtime calls in
/// from. Calls on different objects run concurrently; calls on the same
/// execution, cluster, importer or future take turns. A runner may be
/// queried while it runs.
pub struct Bridge<G: Engine> {
    engine: Mutex<G>,
    pub(crate) executions: SharedRegistry<ExecutionHandle, Locked<Box<dyn Execution>>>,
    pub(crate) clusters: SharedRegistry<ProviderClusterHandle, Locked<Box<dyn ProviderCluster>>>,
    pub(crate) importers: SharedRegistry<ImporterHandle, Locked<Box<dyn Importer>>>,
    pub(crate) fmus: SharedRegistry<FmuHandle, Arc<dyn Fmu>>,
    pub(crate) instances: SharedRegistry<SlaveInstanceHandle, Arc<dyn SlaveInstance>>,
    pub(crate) runners: SharedRegistry<RunnerHandle, Arc<dyn Runner>>,
    pub(crate) futures: SharedRegistry<FutureHandle, Locked<FutureVariant>>,
    inproc_counter: AtomicU64,
}

impl<G: Engine> Bridge<G> {
    /// A bridge with no live objects, creating them through `engine`.
    pub fn new(engine: G) -> Self {
        Self {
            engine: Mutex::new(engine),
            executions: SharedRegistry::new(),
            clusters: SharedRegistry::new(),
            importers: SharedRegistry::new(),
            fmus: SharedRegistry::new(),
            instances: SharedRegistry::new(),
            runners: SharedRegistry::new(),
            futures: SharedRegistry::new(),
            inproc_counter: AtomicU64::new(0),
        }
    }

    /// Exclusive access to the engine. Entry points that create objects
    /// wait while the guard is held.
    pub fn engine(&self) -> MutexGuard<'_, G> {
        lock(&self.engine)
    }

    /// Number of native objects currently held for the managed side.
    pub fn live_objects(&self) -> usize {
        self.executions.len()
            + self.clusters.len()
            + self.importers.len()
            + self.fmus.len()
            + self.instances.len()
            + self.runners.len()
            + self.futures.len()
    }

    /// A name no other in-process endpoint of this bridge uses.
    pub(crate) fn next_inproc_name(&self) -> String {
        let n = self.inproc_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("coral-{}-{}", std::process::id(), n)
    }
}

/// Lock `mutex`, carrying on if a panicking entry point poisoned it.
///
/// Panics are reported to the managed caller as errors, after which the
/// object stays usable as far as the bridge is concerned.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Wrap `value` in `registry` and construct a managed `class_name` object
/// holding the new handle. If the managed object cannot be built, the handle
/// is destroyed again.
pub(crate) fn wrap_in_managed<H: Handle, T>(
    env: &mut dyn Env,
    registry: &SharedRegistry<H, T>,
    class_name: &str,
    value: T,
) -> Result<ObjectRef> {
    let handle = registry.wrap(value)?;
    match new_with_handle(env, class_name, handle.into_raw()) {
        Ok(obj) => Ok(obj),
        Err(err) => {
            if let Err(cleanup) = registry.destroy(handle) {
                log::warn!("could not release {} after failed construction: {}", H::KIND, cleanup);
            }
            Err(err)
        }
    }
}
