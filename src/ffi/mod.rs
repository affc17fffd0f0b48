//! The foreign-function boundary machinery.
//!
//! - [`env`]: the managed runtime interface every entry point receives.
//! - [`handles`]: integer handles for native objects.
//! - [`error`]: translation of native failures into managed exceptions.
//! - [`marshal`]: strings, enum constants and collections.

pub mod env;
pub mod error;
pub mod handles;
pub mod marshal;

pub use env::{ClassRef, Env, FieldId, MethodId, ObjectRef, Value};
pub use error::{boundary, destructor, enforce_not_null, fatal, Translated};
pub use handles::*;
