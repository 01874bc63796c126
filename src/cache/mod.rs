//! Per-session cache of resolver answers.

pub mod resolution_cache;

pub use resolution_cache::{CacheKey, CacheOutcome, CacheStats, ResolutionCache};
