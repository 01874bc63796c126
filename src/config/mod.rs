//! # Importer Configuration
//!
//! Settings for resolver sessions, the reference engine and logging, loaded from an optional
//! TOML file with environment variable overrides.
//!
//! ## Sources (later wins)
//!
//! - Built-in defaults
//! - `config/sass-imports.toml` (or an explicit path)
//! - `SASS_IMPORTS__<SECTION>__<KEY>` environment variables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sass_imports::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load()?;
//! let options = config.resolver_options();
//! println!("cache capacity: {}", options.cache_capacity);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_IMPORT_DEPTH};
use crate::error::{ImportError, Result};
use crate::resolver::{ResolverMode, ResolverOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use loader::ConfigLoader;

/// Root configuration structure mirroring sass-imports.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Resolver session settings
    pub resolver: ResolverSettings,

    /// Reference engine settings
    pub engine: EngineSettings,

    /// Logging settings
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub mode: ResolverMode,
    pub cache_capacity: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            mode: ResolverMode::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Directories searched when no resolver answers an import
    pub include_paths: Vec<PathBuf>,
    pub max_import_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            include_paths: Vec::new(),
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Overrides the environment-derived level when set
    pub level: Option<String>,
    pub json: bool,
}

impl ImporterConfig {
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions::new(self.resolver.mode, self.resolver.cache_capacity)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.max_import_depth == 0 {
            return Err(ImportError::Configuration(
                "engine.max_import_depth must be greater than zero".to_string(),
            ));
        }

        if let Some(empty) = self
            .engine
            .include_paths
            .iter()
            .position(|path| path.as_os_str().is_empty())
        {
            return Err(ImportError::Configuration(format!(
                "engine.include_paths[{empty}] is empty"
            )));
        }

        if let Some(level) = &self.logging.level {
            if level.trim().is_empty() {
                return Err(ImportError::Configuration(
                    "logging.level must not be blank".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ImporterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver_options(), ResolverOptions::default());
        assert_eq!(config.engine.max_import_depth, DEFAULT_MAX_IMPORT_DEPTH);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let mut config = ImporterConfig::default();
        config.engine.max_import_depth = 0;
        assert!(matches!(
            config.validate(),
            Err(ImportError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_include_path_is_rejected() {
        let mut config = ImporterConfig::default();
        config.engine.include_paths = vec![PathBuf::from("scss"), PathBuf::new()];
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("include_paths[1]"));
    }
}
