use thiserror::Error;

/// Errors raised while installing or restoring an interception.
///
/// Errors raised by an intercepted function itself never show up here: they
/// are observed by the exception logger and handed back to the caller as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// A logging selector or configuration option was invalid.
    #[error("invalid interception config: {0}")]
    Configuration(String),

    /// The named type, function or method was not compiled with
    /// `#[interceptable]`.
    #[error("{0}")]
    TargetNotFound(String),

    /// The target is already intercepted.
    #[error("`{0}` is already intercepted")]
    Duplicate(String),

    /// The interception registry could not be updated.
    ///
    /// Only happens once the registry lock has been poisoned, that is after
    /// a panic unwound while the registry was being updated. Installs and
    /// cleanups fail from then on, and calls to targets that were still
    /// intercepted run unlogged.
    #[error("cannot patch `{target}`: {reason}")]
    Patch {
        /// Fully-qualified name of the target.
        target: String,
        /// What went wrong.
        reason: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Configuration(err.to_string())
    }
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
