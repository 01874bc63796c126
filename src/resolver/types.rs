//! Resolver data types shared by the session, the cache and the engine boundary.

use crate::constants::{DEFAULT_CACHE_CAPACITY, ROOT_CONTEXT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which identifier of the importing source is handed to the resolver as its context key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverMode {
    /// The importer's raw import URL
    #[default]
    ByImporterUrl,
    /// The importer's absolute resolved path
    ByImporterAbsolutePath,
}

impl fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByImporterUrl => write!(f, "by_importer_url"),
            Self::ByImporterAbsolutePath => write!(f, "by_importer_absolute_path"),
        }
    }
}

impl std::str::FromStr for ResolverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_importer_url" | "url" => Ok(Self::ByImporterUrl),
            "by_importer_absolute_path" | "abs" | "absolute_path" => {
                Ok(Self::ByImporterAbsolutePath)
            }
            _ => Err(format!("Invalid resolver mode: {s}")),
        }
    }
}

/// Immutable options fixed when a session is constructed.
///
/// A `cache_capacity` of zero disables the resolution cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    pub mode: ResolverMode,
    pub cache_capacity: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            mode: ResolverMode::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ResolverOptions {
    pub fn new(mode: ResolverMode, cache_capacity: usize) -> Self {
        Self {
            mode,
            cache_capacity,
        }
    }

    pub fn caching_enabled(&self) -> bool {
        self.cache_capacity > 0
    }
}

/// Outcome of one resolution attempt.
///
/// `resolved == false` means "try the next step". `should_cache` is only honoured for
/// answers produced by the user resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub new_url: String,
    pub source: String,
    pub resolved: bool,
    pub should_cache: bool,
}

impl ResolutionResult {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn resolved(new_url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            new_url: new_url.into(),
            source: source.into(),
            resolved: true,
            should_cache: false,
        }
    }

    /// Mark this answer as safe to reuse for the same `(url, context)` pair
    pub fn cacheable(mut self) -> Self {
        self.should_cache = true;
        self
    }

    /// An empty body asks the engine to load the import from `new_url` itself
    pub fn loads_from_disk(&self) -> bool {
        self.resolved && self.source.is_empty()
    }
}

/// Identity of the source that contains an `@import`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImporterContext {
    pub url: String,
    pub abs_path: String,
}

impl ImporterContext {
    pub fn new(url: impl Into<String>, abs_path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            abs_path: abs_path.into(),
        }
    }

    /// Context for standard input, which has no path of its own
    pub fn stdin() -> Self {
        Self::new(ROOT_CONTEXT, ROOT_CONTEXT)
    }

    pub fn context_key(&self, mode: ResolverMode) -> &str {
        match mode {
            ResolverMode::ByImporterUrl => &self.url,
            ResolverMode::ByImporterAbsolutePath => &self.abs_path,
        }
    }
}
