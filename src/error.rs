//! Core Error Types
//!
//! Every hard failure the core can raise. Soft lifecycle violations are not
//! errors: they are logged and ignored by the lifecycle guard.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Exit code used when the installed panic hook terminates the process
pub const EXIT_PANIC: i32 = 101;

/// Failures while resolving a command name to an invocable entry point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No unit descriptor exists at the conventional location
    #[error("unit not found: '{name}' (expected {})", .path.display())]
    UnitNotFound { name: String, path: PathBuf },

    /// The descriptor exists but does not define a registered unit of that name
    #[error("unit not defined: '{name}' ({reason})")]
    UnitNotDefined { name: String, reason: String },

    /// The unit exists but lacks the designated entry point
    #[error("entry point not found: '{entry}' in unit '{unit}'")]
    EntryPointNotFound { unit: String, entry: String },
}

/// Top-level error for the bootstrap core
#[derive(Error, Debug)]
pub enum CoreError {
    /// Runtime environment is below the declared minimum
    #[error("environment error: {message}")]
    Environment { message: String },

    /// Configuration missing, unreadable or unusable
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Command name could not be resolved
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// The command's entry point returned an error
    #[error("command '{command}' failed: {source:#}")]
    CommandFailed {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// A unit could not be added to the registry
    #[error("registry error: {message}")]
    Registry { message: String },
}

impl CoreError {
    /// Create an environment error
    pub fn environment<S: Into<String>>(message: S) -> Self {
        Self::Environment { message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a "nothing to run" configuration error
    pub fn nothing_to_run() -> Self {
        Self::configuration("nothing to run")
    }

    /// Create a unit-not-found resolution error
    pub fn unit_not_found<S: Into<String>>(name: S, path: PathBuf) -> Self {
        Self::Resolution(ResolutionError::UnitNotFound { name: name.into(), path })
    }

    /// Create a unit-not-defined resolution error
    pub fn unit_not_defined<S: Into<String>, R: Into<String>>(name: S, reason: R) -> Self {
        Self::Resolution(ResolutionError::UnitNotDefined {
            name: name.into(),
            reason: reason.into(),
        })
    }

    /// Create an entry-point-not-found resolution error
    pub fn entry_point_not_found<S: Into<String>, E: Into<String>>(unit: S, entry: E) -> Self {
        Self::Resolution(ResolutionError::EntryPointNotFound {
            unit: unit.into(),
            entry: entry.into(),
        })
    }

    /// Wrap an entry point failure
    pub fn command_failed<S: Into<String>>(command: S, source: anyhow::Error) -> Self {
        Self::CommandFailed { command: command.into(), source }
    }

    /// Create a registry error
    pub fn registry<S: Into<String>>(message: S) -> Self {
        Self::Registry { message: message.into() }
    }

    /// Short name of the error kind, used as the logging context
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Environment { .. } => "EnvironmentError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::Resolution(_) => "ResolutionError",
            Self::CommandFailed { .. } => "CommandFailed",
            Self::Registry { .. } => "RegistryError",
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed { .. } => 1,
            Self::Configuration { .. } | Self::Registry { .. } => 2,
            Self::Environment { .. } => 3,
            Self::Resolution(_) => 4,
        }
    }

    /// Check whether this is a resolution error
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }
}
