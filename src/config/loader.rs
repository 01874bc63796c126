//! Configuration Loader
//!
//! Builds an [`ImporterConfig`] from an optional TOML file and environment overrides using the
//! `config` crate.

use super::ImporterConfig;
use crate::constants::env;
use crate::error::Result;
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "config/sass-imports.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `config/sass-imports.toml` if present, then apply environment overrides
    pub fn load() -> Result<ImporterConfig> {
        Self::load_from_path(PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load from a specific file. A missing file is not an error.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<ImporterConfig> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading importer configuration");

        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(env::CONFIG_PREFIX)
                    .prefix_separator(env::CONFIG_SEPARATOR)
                    .separator(env::CONFIG_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("engine.include_paths")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(settings)
    }

    /// Load from TOML text without touching the filesystem or environment
    pub fn load_from_str(toml: &str) -> Result<ImporterConfig> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<ImporterConfig> {
        let config: ImporterConfig = settings.try_deserialize()?;
        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(config)
    }
}
