//! Shared constants for import resolution.

/// Canonical parent context for sources that were not imported by another file.
pub const ROOT_CONTEXT: &str = "stdin";

/// Parent context some callers pass for string input; normalised to [`ROOT_CONTEXT`].
pub const STRING_CONTEXT_SENTINEL: &str = "string";

/// Caching is off unless a capacity is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 0;

pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 64;

/// Extensions tried by the reference engine's filesystem fallback, in order.
pub const IMPORT_EXTENSIONS: &[&str] = &["scss", "css"];

/// Partial files are prefixed with an underscore.
pub const PARTIAL_PREFIX: &str = "_";

pub mod env {
    pub const ENVIRONMENT: &str = "SASS_IMPORTS_ENV";
    pub const FALLBACK_ENVIRONMENT: &str = "APP_ENV";
    pub const CONFIG_PREFIX: &str = "SASS_IMPORTS";
    pub const CONFIG_SEPARATOR: &str = "__";
}
