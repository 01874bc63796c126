//! Error types for import resolution.
//!

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// Override store miss. Recovered inside the fallback chain.
    #[error("Import not found in override store: {parent}:{path}")]
    NotFound { parent: String, path: String },

    /// Operation attempted on a closed session.
    #[error("Lifecycle violation: cannot {operation} on closed session {session}")]
    LifecycleViolation { session: String, operation: String },

    /// A handle was looked up that is not registered. Indicates an internal bug.
    #[error("Registry corruption: no resolver registered for handle {handle}")]
    RegistryCorruption { handle: u64 },

    /// Every resolution step declined the import.
    #[error("Import not found: '{import}' imported from {file}:{line}")]
    EngineResolutionFailure {
        import: String,
        file: String,
        line: usize,
    },

    #[error("Import depth exceeded while importing '{import}' (depth {depth})")]
    ImportDepthExceeded { import: String, depth: usize },

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ImportError {
    pub fn lifecycle(session: impl ToString, operation: impl Into<String>) -> Self {
        ImportError::LifecycleViolation {
            session: session.to_string(),
            operation: operation.into(),
        }
    }

    pub fn io(path: impl Into<String>, error: &std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Programming errors the caller should not try to recover from
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::LifecycleViolation { .. } | ImportError::RegistryCorruption { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ImportError::NotFound { .. })
    }
}

impl From<config::ConfigError> for ImportError {
    fn from(error: config::ConfigError) -> Self {
        ImportError::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
