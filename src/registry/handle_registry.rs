//! # Resolver Handle Registry
//!
//! Maps opaque integer handles to registered import callbacks so the compilation engine can
//! refer to a resolver without holding it.
//!
//! ## Concurrency
//!
//! Entries live in a sharded [`DashMap`], so a `lookup` only contends with writers on the same
//! shard and never waits on `register`/`release` of unrelated handles. Handles come from a
//! monotonically increasing counter and are never reused while the registry is alive.
//!
//! The registry is an ordinary value owned by the composition root and shared through `Arc`;
//! tests build their own to stay isolated from each other.

use crate::error::{ImportError, Result};
use crate::resolver::{ImporterContext, ResolutionResult};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Opaque identifier of one registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolverHandle(u64);

impl ResolverHandle {
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResolverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resolver#{}", self.0)
    }
}

/// Entry point the engine invokes through a handle.
///
/// Sessions register their fallback chain behind this trait.
pub trait ImportCallback: Send + Sync {
    fn invoke(&self, url: &str, importer: &ImporterContext) -> Result<ResolutionResult>;
}

/// Table of registered callbacks, shared by every session built on it
pub struct HandleRegistry {
    entries: DashMap<ResolverHandle, Arc<dyn ImportCallback>>,
    next_handle: AtomicU64,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("registered", &self.entries.len())
            .field("next_handle", &self.next_handle.load(Ordering::Relaxed))
            .finish()
    }
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Store a callback under a fresh handle
    pub fn register(&self, callback: Arc<dyn ImportCallback>) -> ResolverHandle {
        let handle = ResolverHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(handle, callback);
        debug!(handle = %handle, "Registered import callback");
        handle
    }

    /// Fetch the callback for a handle.
    ///
    /// An unknown handle means a caller kept using a handle after releasing it, which is a bug
    /// rather than a resolution miss.
    pub fn lookup(&self, handle: ResolverHandle) -> Result<Arc<dyn ImportCallback>> {
        match self.entries.get(&handle) {
            Some(entry) => Ok(Arc::clone(entry.value())),
            None => {
                error!(handle = %handle, "Lookup of unregistered resolver handle");
                Err(ImportError::RegistryCorruption {
                    handle: handle.as_raw(),
                })
            }
        }
    }

    /// Remove a handle. Returns whether it was registered.
    pub fn release(&self, handle: ResolverHandle) -> bool {
        let removed = self.entries.remove(&handle).is_some();
        debug!(handle = %handle, removed, "Released import callback");
        removed
    }

    pub fn contains(&self, handle: ResolverHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    struct EchoCallback(&'static str);

    impl ImportCallback for EchoCallback {
        fn invoke(&self, url: &str, _importer: &ImporterContext) -> Result<ResolutionResult> {
            Ok(ResolutionResult::resolved(url, self.0))
        }
    }

    #[test]
    fn test_register_lookup_release() {
        let registry = HandleRegistry::new();
        let handle = registry.register(Arc::new(EchoCallback("body")));

        assert!(registry.contains(handle));
        let result = registry
            .lookup(handle)
            .unwrap()
            .invoke("a", &ImporterContext::stdin())
            .unwrap();
        assert_eq!(result.source, "body");

        assert!(registry.release(handle));
        assert!(!registry.release(handle));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_of_released_handle_is_corruption() {
        let registry = HandleRegistry::new();
        let handle = registry.register(Arc::new(EchoCallback("body")));
        registry.release(handle);

        let error = registry.lookup(handle).err().unwrap();
        assert_eq!(
            error,
            ImportError::RegistryCorruption {
                handle: handle.as_raw()
            }
        );
        assert!(error.is_fatal());
    }

    #[test]
    fn test_handles_are_not_reused_after_release() {
        let registry = HandleRegistry::new();
        let first = registry.register(Arc::new(EchoCallback("one")));
        registry.release(first);
        let second = registry.register(Arc::new(EchoCallback("two")));
        assert_ne!(first, second);
    }

    #[test]
    fn test_concurrent_registration_yields_unique_handles() {
        let registry = Arc::new(HandleRegistry::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| registry.register(Arc::new(EchoCallback("x"))))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for worker in workers {
            for handle in worker.join().unwrap() {
                assert!(seen.insert(handle), "duplicate handle {handle}");
            }
        }
        assert_eq!(registry.len(), 400);
    }

    #[test]
    fn test_independent_registries_do_not_share_entries() {
        let left = HandleRegistry::new();
        let right = HandleRegistry::new();
        let handle = left.register(Arc::new(EchoCallback("left")));

        assert!(left.contains(handle));
        assert!(right.lookup(handle).is_err());
    }
}
