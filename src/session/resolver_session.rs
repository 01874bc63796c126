//! # Resolver Session
//!
//! Binds one configured resolver, one override store and one resolution cache to any number of
//! compilations.
//!
//! ## Fallback chain
//!
//! ```text
//! (url, importer) ──▶ context key per mode
//!                        │
//!                   ┌────▼─────┐ hit
//!                   │  cache   ├──────────────────────────▶ answer
//!                   └────┬─────┘
//!                   ┌────▼─────┐ resolved (+ cache if asked)
//!                   │ resolver ├──────────────────────────▶ answer
//!                   └────┬─────┘
//!                   ┌────▼─────┐ match (never cached)
//!                   │ override ├──────────────────────────▶ answer
//!                   └────┬─────┘
//!                        ▼
//!                   unresolved ──▶ engine decides
//! ```
//!
//! ## Lifecycle
//!
//! `Unbound -> Bound -> Closed`. The first [`ResolverSession::bind`] registers the chain in the
//! [`HandleRegistry`]; later binds hand out the same handle, so the cache carries over between
//! compilations. [`ResolverSession::close`] refuses new resolutions, waits for in-flight ones to
//! finish, then releases the handle and the cache exactly once.

use super::binding::ImporterBinding;
use super::state::SessionState;
use crate::cache::{CacheKey, CacheOutcome, CacheStats, ResolutionCache};
use crate::error::{ImportError, Result};
use crate::imports::{ImportRecord, OverrideStore};
use crate::logging::{log_resolution_step, log_session_operation};
use crate::registry::{HandleRegistry, ImportCallback, ResolverHandle};
use crate::resolver::{
    ImportResolver, ImporterContext, ResolutionResult, ResolverFn, ResolverMode, ResolverOptions,
};
use parking_lot::{Condvar, Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Lifecycle {
    state: SessionState,
    handle: Option<ResolverHandle>,
    in_flight: usize,
}

struct SessionCore {
    session_id: String,
    options: ResolverOptions,
    resolver: Option<Arc<dyn ImportResolver>>,
    overrides: OverrideStore,
    cache: RwLock<Option<Arc<ResolutionCache>>>,
    registry: Arc<HandleRegistry>,
    lifecycle: Mutex<Lifecycle>,
    drained: Condvar,
    /// Mirrors `Closed` for bindings, which cannot take the lifecycle lock
    closed: Arc<AtomicBool>,
}

/// Decrements the in-flight count when a resolution finishes
struct InFlightGuard<'a> {
    core: &'a SessionCore,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut lifecycle = self.core.lifecycle.lock();
        lifecycle.in_flight -= 1;
        if lifecycle.in_flight == 0 {
            self.core.drained.notify_all();
        }
    }
}

impl SessionCore {
    fn closed_error(&self, operation: &str) -> ImportError {
        ImportError::lifecycle(&self.session_id, operation)
    }

    /// Run `f` under the lifecycle lock so it cannot interleave with `close`
    fn with_open<T>(&self, operation: &str, f: impl FnOnce() -> T) -> Result<T> {
        let lifecycle = self.lifecycle.lock();
        if lifecycle.state.is_terminal() {
            return Err(self.closed_error(operation));
        }
        Ok(f())
    }

    fn enter(&self, operation: &str) -> Result<InFlightGuard<'_>> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state.is_terminal() {
            return Err(self.closed_error(operation));
        }
        lifecycle.in_flight += 1;
        Ok(InFlightGuard { core: self })
    }

    fn cache(&self) -> Option<Arc<ResolutionCache>> {
        self.cache.read().clone()
    }

    fn resolve(&self, url: &str, importer: &ImporterContext) -> Result<ResolutionResult> {
        let _in_flight = self.enter("resolve")?;
        Ok(self.resolve_chain(url, importer))
    }

    /// Runs without holding any session lock so slow resolvers do not block other callers.
    /// Concurrent misses on one `(url, context)` share a single resolver call.
    fn resolve_chain(&self, url: &str, importer: &ImporterContext) -> ResolutionResult {
        let context = importer.context_key(self.options.mode);

        if let Some(resolver) = &self.resolver {
            let (answer, outcome) = match self.cache() {
                Some(cache) => cache.get_or_resolve(&CacheKey::new(url, context), || {
                    resolver.resolve(url, context)
                }),
                None => (resolver.resolve(url, context), CacheOutcome::Bypassed),
            };

            if outcome == CacheOutcome::Hit {
                log_resolution_step(&self.session_id, "cache", url, context, "hit");
                return answer;
            }
            if answer.resolved {
                log_resolution_step(&self.session_id, "resolver", url, context, "resolved");
                return answer;
            }
            log_resolution_step(&self.session_id, "resolver", url, context, "declined");
        }

        let entries = self.overrides.entries_snapshot();
        if let Some(record) = OverrideStore::find_entry(&entries, context, url) {
            log_resolution_step(&self.session_id, "override", url, context, "resolved");
            return ResolutionResult::resolved(url, record.source());
        }

        log_resolution_step(&self.session_id, "chain", url, context, "unresolved");
        ResolutionResult::unresolved()
    }
}

/// Registered in the handle registry on bind. Holds the session weakly so the registry never
/// keeps a dropped session alive.
struct SessionCallback {
    session_id: String,
    core: Weak<SessionCore>,
}

impl ImportCallback for SessionCallback {
    fn invoke(&self, url: &str, importer: &ImporterContext) -> Result<ResolutionResult> {
        let core = self
            .core
            .upgrade()
            .ok_or_else(|| ImportError::lifecycle(&self.session_id, "resolve"))?;
        core.resolve(url, importer)
    }
}

/// Orchestrates import resolution for one configured resolver across many compilations
pub struct ResolverSession {
    core: Arc<SessionCore>,
}

impl ResolverSession {
    /// Session with no user resolver: only the override store answers
    pub fn new(registry: Arc<HandleRegistry>, options: ResolverOptions) -> Self {
        Self::build(registry, options, None)
    }

    /// Session with a resolver in either the legacy or the advanced shape
    pub fn configure(
        registry: Arc<HandleRegistry>,
        options: ResolverOptions,
        resolver: ResolverFn,
    ) -> Self {
        Self::build(registry, options, Some(resolver.into_resolver()))
    }

    pub fn with_resolver(
        registry: Arc<HandleRegistry>,
        options: ResolverOptions,
        resolver: Arc<dyn ImportResolver>,
    ) -> Self {
        Self::build(registry, options, Some(resolver))
    }

    /// Legacy resolver with caching disabled
    pub fn with_legacy_resolver<F>(
        registry: Arc<HandleRegistry>,
        mode: ResolverMode,
        resolver: F,
    ) -> Self
    where
        F: Fn(&str, &str) -> (String, String, bool) + Send + Sync + 'static,
    {
        Self::configure(
            registry,
            ResolverOptions::new(mode, 0),
            ResolverFn::legacy(resolver),
        )
    }

    fn build(
        registry: Arc<HandleRegistry>,
        options: ResolverOptions,
        resolver: Option<Arc<dyn ImportResolver>>,
    ) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let cache = options
            .caching_enabled()
            .then(|| Arc::new(ResolutionCache::new(options.cache_capacity)));

        debug!(
            session_id = %session_id,
            mode = %options.mode,
            cache_capacity = options.cache_capacity,
            resolver = resolver.as_ref().map(|r| r.resolver_name()),
            "Created resolver session"
        );

        Self {
            core: Arc::new(SessionCore {
                session_id,
                options,
                resolver,
                overrides: OverrideStore::new(),
                cache: RwLock::new(cache),
                registry,
                lifecycle: Mutex::new(Lifecycle::default()),
                drained: Condvar::new(),
                closed: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.core.session_id
    }

    pub fn options(&self) -> ResolverOptions {
        self.core.options
    }

    pub fn state(&self) -> SessionState {
        self.core.lifecycle.lock().state
    }

    pub fn is_closed(&self) -> bool {
        self.state().is_terminal()
    }

    /// Handle allocated by the first bind, if any
    pub fn handle(&self) -> Option<ResolverHandle> {
        self.core.lifecycle.lock().handle
    }

    pub fn in_flight(&self) -> usize {
        self.core.lifecycle.lock().in_flight
    }

    /// Attach the session to an engine run.
    ///
    /// The first call registers the fallback chain and moves the session to `Bound`; every later
    /// call returns a binding with the same handle.
    pub fn bind(&self) -> Result<ImporterBinding> {
        let mut lifecycle = self.core.lifecycle.lock();
        if lifecycle.state.is_terminal() {
            return Err(self.core.closed_error("bind"));
        }

        let handle = match lifecycle.handle {
            Some(handle) => handle,
            None => {
                let callback = SessionCallback {
                    session_id: self.core.session_id.clone(),
                    core: Arc::downgrade(&self.core),
                };
                let handle = self.core.registry.register(Arc::new(callback));
                lifecycle.handle = Some(handle);
                lifecycle.state = SessionState::Bound;
                log_session_operation(
                    "bind",
                    &self.core.session_id,
                    Some(handle.as_raw()),
                    "bound",
                    None,
                );
                handle
            }
        };

        Ok(ImporterBinding::new(
            Arc::clone(&self.core.registry),
            handle,
            self.core.options.mode,
            self.core.session_id.clone(),
            Arc::clone(&self.core.closed),
        ))
    }

    /// Resolve an import directly, without going through the registry
    pub fn resolve(&self, url: &str, importer: &ImporterContext) -> Result<ResolutionResult> {
        self.core.resolve(url, importer)
    }

    pub fn add_source(
        &self,
        parent_context: &str,
        path: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.core.with_open("add_source", || {
            self.core.overrides.add(parent_context, path, bytes)
        })
    }

    /// Returns how many records were removed
    pub fn remove_source(&self, path: &str) -> Result<usize> {
        self.core
            .with_open("remove_source", || self.core.overrides.del(path))
    }

    pub fn get_source(&self, parent_context: &str, path: &str) -> Result<Vec<u8>> {
        self.core.with_open("get_source", || {
            self.core.overrides.get(parent_context, path)
        })?
    }

    /// Inert modification-time refresh
    pub fn update_source(&self, name: &str) -> Result<()> {
        self.core
            .with_open("update_source", || self.core.overrides.update(name))
    }

    pub fn entries(&self) -> Result<Vec<ImportRecord>> {
        self.core
            .with_open("entries", || self.core.overrides.entries_snapshot())
    }

    /// Number of records in the override store.
    ///
    /// Stays readable after [`close`](Self::close) and reports 0 there, since closing empties the
    /// store. Mutating the store after close is an error.
    pub fn imports(&self) -> usize {
        self.core.overrides.len()
    }

    /// Drop every cached answer, typically between builds
    pub fn clear_cache(&self) -> Result<()> {
        self.core.with_open("clear_cache", || {
            if let Some(cache) = self.core.cache() {
                cache.clear();
                debug!(session_id = %self.core.session_id, "Cleared resolution cache");
            }
        })
    }

    /// Snapshot of the cache counters.
    ///
    /// `None` when caching is disabled, and after [`close`](Self::close) released the cache.
    /// Reading stats never fails, so callers can log them during teardown.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.core.cache().map(|cache| cache.stats())
    }

    /// Close the session.
    ///
    /// New resolutions fail immediately; this call blocks until resolutions already running
    /// have returned, then releases the handle and the cache. Must not be called from inside a
    /// resolver running on this session, since it would wait on itself.
    pub fn close(&self) -> Result<()> {
        let handle = {
            let mut lifecycle = self.core.lifecycle.lock();
            if lifecycle.state.is_terminal() {
                return Err(self.core.closed_error("close"));
            }
            lifecycle.state = SessionState::Closed;
            self.core.closed.store(true, Ordering::Release);

            if lifecycle.in_flight > 0 {
                info!(
                    session_id = %self.core.session_id,
                    in_flight = lifecycle.in_flight,
                    "Waiting for in-flight resolutions before closing"
                );
            }
            while lifecycle.in_flight > 0 {
                self.core.drained.wait(&mut lifecycle);
            }
            lifecycle.handle.take()
        };

        if let Some(handle) = handle {
            self.core.registry.release(handle);
        }
        if let Some(cache) = self.core.cache.write().take() {
            cache.clear();
        }
        self.core.overrides.init();

        log_session_operation(
            "close",
            &self.core.session_id,
            handle.map(|h| h.as_raw()),
            "closed",
            None,
        );
        Ok(())
    }
}

impl Drop for ResolverSession {
    fn drop(&mut self) {
        if !self.is_closed() {
            let _ = self.close();
        }
    }
}

impl fmt::Debug for ResolverSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lifecycle = self.core.lifecycle.lock();
        f.debug_struct("ResolverSession")
            .field("session_id", &self.core.session_id)
            .field("options", &self.core.options)
            .field("state", &lifecycle.state)
            .field("handle", &lifecycle.handle)
            .field("in_flight", &lifecycle.in_flight)
            .finish()
    }
}
