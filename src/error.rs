//! Error types for the bridge.
//!
//! Every internal helper and every engine call reports failure through
//! [`Error`]. Only the outermost entry-point wrapper turns an `Error` into a
//! managed exception (see [`crate::ffi::error`]).

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Managed exception classes the bridge knows how to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionClass {
    /// `java.lang.NullPointerException`
    NullPointer,
    /// `java.lang.IllegalArgumentException`
    IllegalArgument,
    /// `java.lang.IllegalStateException`
    IllegalState,
    /// `java.lang.RuntimeException`
    Runtime,
    /// `java.lang.Exception`
    Exception,
    /// `java.lang.Error`
    Error,
    /// `java.util.concurrent.TimeoutException`
    Timeout,
}

impl ExceptionClass {
    /// Fully qualified managed class name, in slash-separated form.
    pub const fn class_name(self) -> &'static str {
        match self {
            ExceptionClass::NullPointer => "java/lang/NullPointerException",
            ExceptionClass::IllegalArgument => "java/lang/IllegalArgumentException",
            ExceptionClass::IllegalState => "java/lang/IllegalStateException",
            ExceptionClass::Runtime => "java/lang/RuntimeException",
            ExceptionClass::Exception => "java/lang/Exception",
            ExceptionClass::Error => "java/lang/Error",
            ExceptionClass::Timeout => "java/util/concurrent/TimeoutException",
        }
    }
}

/// Error type for bridge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A managed exception has already been thrown and is in flight.
    #[error("a managed exception has been thrown")]
    Pending,

    /// An error for which a managed exception of a specific class should be
    /// thrown, carrying the message to throw it with.
    #[error("{message} (to be thrown as {})", class.class_name())]
    Throw {
        /// Managed exception class.
        class: ExceptionClass,
        /// Message for the managed exception.
        message: String,
    },

    /// A contract violation inside the native layer.
    #[error("logic error: {0}")]
    Logic(String),

    /// Any other descriptive native failure.
    #[error("{0}")]
    Native(String),

    /// A native fault that carries no usable description.
    #[error("unidentified native fault")]
    Unidentified,
}

impl Error {
    /// Shorthand for an error that should surface as `class` with `message`.
    pub fn throw(class: ExceptionClass, message: impl Into<String>) -> Self {
        Error::Throw {
            class,
            message: message.into(),
        }
    }

    /// `NullPointerException` with the standard "Null pointer" message.
    pub fn null_pointer() -> Self {
        Error::throw(ExceptionClass::NullPointer, "Null pointer")
    }

    /// `IllegalArgumentException` with the given message.
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Error::throw(ExceptionClass::IllegalArgument, message)
    }

    /// `IllegalStateException` with the given message.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Error::throw(ExceptionClass::IllegalState, message)
    }

    /// A logic error with the given message.
    pub fn logic(message: impl Into<String>) -> Self {
        Error::Logic(message.into())
    }

    /// A descriptive native failure with the given message.
    pub fn native(message: impl Into<String>) -> Self {
        Error::Native(message.into())
    }

    /// Check if a managed exception is already in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Error::Pending)
    }

    /// Check if this is a logic error.
    pub fn is_logic(&self) -> bool {
        matches!(self, Error::Logic(_))
    }

    /// The managed class this error is classified as, if any.
    pub fn class(&self) -> Option<ExceptionClass> {
        match self {
            Error::Throw { class, .. } => Some(*class),
            _ => None,
        }
    }
}
