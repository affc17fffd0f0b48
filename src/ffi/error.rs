//! Translation of native failures into managed exceptions.
//!
//! Entry points run their body through [`boundary`], which is the only place
//! an [`Error`] (or a panic) is turned into a managed exception. Helpers
//! below the boundary just return `Result`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::env::{Env, ObjectRef};
use crate::error::{Error, ExceptionClass, Result};

/// Message used for faults that carry no usable description.
pub const UNIDENTIFIED_MESSAGE: &str = "An unidentified error occurred in Coral";

/// A native failure, classified for raising on the managed side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translated {
    /// A managed exception is already in flight; nothing to raise.
    Pending,
    /// Raise exactly this class with this message.
    Classified {
        /// Managed exception class.
        class: ExceptionClass,
        /// Exception message.
        message: String,
    },
    /// Contract violation in the native layer.
    Logic(String),
    /// Any other descriptive native failure.
    Generic(String),
    /// Opaque fault; its details are not passed on.
    Unidentified,
}

impl From<Error> for Translated {
    fn from(err: Error) -> Self {
        match err {
            Error::Pending => Translated::Pending,
            Error::Throw { class, message } => Translated::Classified { class, message },
            Error::Logic(message) => Translated::Logic(message),
            Error::Native(message) => Translated::Generic(message),
            Error::Unidentified => Translated::Unidentified,
        }
    }
}

impl Translated {
    /// The managed class this will be raised as, or `None` if already pending.
    pub fn class(&self) -> Option<ExceptionClass> {
        match self {
            Translated::Pending => None,
            Translated::Classified { class, .. } => Some(*class),
            Translated::Logic(_) => Some(ExceptionClass::IllegalState),
            Translated::Generic(_) => Some(ExceptionClass::Exception),
            Translated::Unidentified => Some(ExceptionClass::Error),
        }
    }

    /// The message this will be raised with, or `None` if already pending.
    pub fn message(&self) -> Option<&str> {
        match self {
            Translated::Pending => None,
            Translated::Classified { message, .. }
            | Translated::Logic(message)
            | Translated::Generic(message) => Some(message),
            Translated::Unidentified => Some(UNIDENTIFIED_MESSAGE),
        }
    }

    /// Raise the managed exception. Afterwards the caller must return to the
    /// managed runtime without making further managed calls.
    pub fn raise(self, env: &mut dyn Env) {
        if let (Some(class), Some(message)) = (self.class(), self.message()) {
            throw_managed(env, class, message);
        }
    }
}

fn throw_managed(env: &mut dyn Env, class: ExceptionClass, message: &str) {
    let class_ref = match env.find_class(class.class_name()) {
        Ok(c) => c,
        Err(_) => fatal(env, "exception class could not be resolved"),
    };
    if env.throw_new(class_ref, message).is_err() {
        fatal(env, "managed runtime refused to raise an exception");
    }
}

/// Convert `err` into an in-flight managed exception.
///
/// [`Error::Pending`] with nothing actually in flight is raised as an
/// unidentified fault, so the caller never sees a silent failure.
pub fn rethrow_as_managed(env: &mut dyn Env, err: Error) {
    let translated = match Translated::from(err) {
        Translated::Pending if !env.exception_check() => {
            log::error!("native call failed with no managed exception in flight");
            Translated::Unidentified
        }
        translated => translated,
    };
    log::debug!("raising native failure on managed side: {:?}", translated);
    translated.raise(env);
}

/// Extract a human-readable message from a `catch_unwind` payload.
fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Run an entry-point body, translating any failure.
///
/// On success the body's value is returned. On an `Err` the error is raised
/// as a managed exception and `default` is returned. A panic is raised as an
/// unidentified fault; its message goes to the log only.
pub fn boundary<T>(
    env: &mut dyn Env,
    default: T,
    body: impl FnOnce(&mut dyn Env) -> Result<T>,
) -> T {
    match panic::catch_unwind(AssertUnwindSafe(|| body(&mut *env))) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            rethrow_as_managed(env, err);
            default
        }
        Err(payload) => {
            log::error!(
                "panic in native code reached the boundary: {}",
                panic_message(&payload)
            );
            Translated::Unidentified.raise(env);
            default
        }
    }
}

/// Run a destructor body. Destructors never raise managed exceptions; any
/// failure here means the bridge's own bookkeeping is broken, which is fatal.
pub fn destructor(env: &mut dyn Env, body: impl FnOnce() -> Result<()>) {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            log::error!("destructor failed: {}", err);
            fatal(env, "native object could not be destroyed")
        }
        Err(payload) => {
            log::error!("panic in destructor: {}", panic_message(&payload));
            fatal(env, "panic while destroying native object")
        }
    }
}

/// Terminate the process. Any in-flight managed exception is described first.
pub fn fatal(env: &mut dyn Env, message: &str) -> ! {
    if env.exception_check() {
        env.exception_describe();
    }
    log::error!("fatal error in Coral bridge: {}", message);
    env.fatal_error(message)
}

/// Fail with `NullPointerException` if `obj` is null.
pub fn enforce_not_null(obj: Option<ObjectRef>) -> Result<ObjectRef> {
    obj.ok_or_else(Error::null_pointer)
}

/// Fail with [`Error::Pending`] if a managed exception is in flight.
pub fn check_not_thrown(env: &dyn Env) -> Result<()> {
    if env.exception_check() {
        Err(Error::Pending)
    } else {
        Ok(())
    }
}
