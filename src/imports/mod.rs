//! Caller-supplied import bodies used as the last resolution fallback.

pub mod override_store;

pub use override_store::{normalize_parent_context, ImportRecord, OverrideStore};
