//! Bridge exposing the Coral co-simulation engine to a managed runtime.
//!
//! The managed side (the `no.viproma.coral` classes) refers to native engine
//! objects through integer handles. This crate owns those objects, converts
//! values between the two sides, and turns every native failure into a
//! managed exception before control returns to the caller.
//!
//! # Example
//!
//! ```no_run
//! use jcoral::{Bridge, Engine, Env};
//!
//! fn step_once<G: Engine>(bridge: &Bridge<G>, env: &mut dyn Env, execution: i64) -> bool {
//!     // 0.1 s of simulated time, waiting at most 50 ms for the slaves.
//!     let completed = bridge.execution_step(env, execution, 0.1, 50);
//!     if completed {
//!         bridge.execution_accept_step(env, execution, 50);
//!     }
//!     completed && !env.exception_check()
//! }
//! ```
//!
//! Embedders provide the [`Engine`] and an [`Env`] for the runtime the call
//! came from. With the `jni` feature, the `jvm` module supplies both the
//! [`Env`] for a Java virtual machine and the exported native methods. The
//! `test-heap` feature adds `heap`, an in-process [`Env`] with the Coral
//! contract classes loaded, for tests.
//!
//! A [`Bridge`] is `Sync`: the managed runtime may call in from any number
//! of threads at once.
//!
//! # Handles
//!
//! Every native object lives in a registry inside the [`Bridge`] from the
//! entry point that creates it until the `*_destroy` entry point the managed
//! owner calls exactly once. A zero handle is reported as a
//! `NullPointerException`; stale handles and handles of the wrong kind are
//! detected too.

pub mod batch;
pub mod bridge;
mod cluster;
pub mod convert;
pub mod engine;
pub mod error;
mod execution;
pub mod ffi;
mod fmi;
pub mod future;
#[cfg(any(test, feature = "test-heap"))]
pub mod heap;
#[cfg(feature = "jni")]
pub mod jvm;
mod slave;
pub mod types;

// Re-export main types at the crate root
pub use bridge::Bridge;
pub use engine::{Engine, Execution, Fmu, Importer, ProviderCluster, Runner, SlaveInstance};
pub use error::{Error, ExceptionClass, Result};
pub use ffi::{Env, ObjectRef, Value};
pub use future::{NativeFuture, Promise};
pub use types::{
    AddedSlave, Causality, DataType, Endpoint, ExecutionOptions, FmiVersion, ScalarValue,
    SlaveConfig, SlaveId, SlaveLocator, SlaveType, SlaveTypeDescription, StepResult, Variability,
    Variable, VariableDescription, VariableId, VariableSetting,
};

/// API version constants.
pub mod version {
    /// API major version.
    pub const MAJOR: i32 = 0;
    /// API minor version.
    pub const MINOR: i32 = 1;
    /// API patch version.
    pub const PATCH: i32 = 0;
}

/// Get the API version string (e.g., "0.1.0").
pub fn api_version() -> String {
    format!("{}.{}.{}", version::MAJOR, version::MINOR, version::PATCH)
}

/// Check if this bridge is compatible with code written against the given
/// major.minor version.
pub fn api_version_compatible(major: i32, minor: i32) -> bool {
    major == version::MAJOR && minor <= version::MINOR
}
