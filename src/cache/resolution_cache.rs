//! # Resolution Cache
//!
//! Bounded store of resolver answers keyed by `(url, context_key)`, backed by Moka. Lives as long
//! as the session that owns it, so answers survive across compilations that reuse the session.
//!
//! ## Eviction
//!
//! Moka decides which entry leaves once `capacity` is reached; only the bound itself is
//! guaranteed. Re-inserting an existing key replaces its answer.
//!
//! ## Coalescing
//!
//! [`ResolutionCache::get_or_resolve`] runs the resolver at most once for concurrent misses on
//! the same key. Callers that arrive while it runs wait and receive the stored answer. Answers
//! that are not stored (unresolved, or resolved without `should_cache`) are handed back only to
//! the caller that produced them.
//!
//! A capacity of zero produces a disabled cache: every lookup misses and inserts are dropped.

use crate::resolver::ResolutionResult;
use moka::notification::RemovalCause;
use moka::sync::Cache;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Cache key: the imported URL plus the importer's context key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub context: String,
}

impl CacheKey {
    pub fn new(url: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.url, self.context)
    }
}

/// Counters for monitoring cache effectiveness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub capacity: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Where an answer from [`ResolutionCache::get_or_resolve`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Stored answer, possibly produced by a concurrent caller
    Hit,
    /// Resolved by this caller and stored
    Inserted,
    /// Resolved by this caller and not stored
    Bypassed,
}

pub struct ResolutionCache {
    capacity: usize,
    /// `None` when caching is disabled
    answers: Option<Cache<CacheKey, ResolutionResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: Arc<AtomicU64>,
}

impl fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("capacity", &self.capacity)
            .field(
                "entry_count",
                &self.answers.as_ref().map(|answers| answers.entry_count()),
            )
            .finish()
    }
}

impl ResolutionCache {
    pub fn new(capacity: usize) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let answers = (capacity > 0).then(|| {
            let counter = Arc::clone(&evictions);
            Cache::builder()
                .max_capacity(capacity as u64)
                .eviction_listener(move |key: Arc<CacheKey>, _answer, cause: RemovalCause| {
                    if cause.was_evicted() {
                        counter.fetch_add(1, Ordering::Relaxed);
                        trace!(key = %key, "Evicted resolution cache entry");
                    }
                })
                .build()
        });

        debug!(capacity, "Resolution cache created");

        Self {
            capacity,
            answers,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            insertions: AtomicU64::new(0),
            evictions,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.answers.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<ResolutionResult> {
        let answers = self.answers.as_ref()?;

        let hit = answers.get(key);
        match hit {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Resolution cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
        hit
    }

    pub fn insert(&self, key: CacheKey, result: ResolutionResult) {
        if let Some(answers) = &self.answers {
            answers.insert(key, result);
            self.insertions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Return the stored answer for `key`, or run `resolve` once across concurrent callers.
    ///
    /// Only answers with `resolved && should_cache` are stored. Never holds a lock of its own
    /// while `resolve` runs; concurrent callers for the same key wait on Moka's per-key init.
    pub fn get_or_resolve<F>(
        &self,
        key: &CacheKey,
        resolve: F,
    ) -> (ResolutionResult, CacheOutcome)
    where
        F: FnOnce() -> ResolutionResult,
    {
        let Some(answers) = &self.answers else {
            return (resolve(), CacheOutcome::Bypassed);
        };

        let mut pending = Some(resolve);
        let mut declined = None;
        let stored = answers.optionally_get_with(key.clone(), || {
            let resolve = pending.take()?;
            let answer = resolve();
            if answer.resolved && answer.should_cache {
                Some(answer)
            } else {
                declined = Some(answer);
                None
            }
        });

        if let Some(answer) = declined {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return (answer, CacheOutcome::Bypassed);
        }

        match stored {
            Some(answer) if pending.is_some() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Resolution cache hit");
                (answer, CacheOutcome::Hit)
            }
            Some(answer) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.insertions.fetch_add(1, Ordering::Relaxed);
                (answer, CacheOutcome::Inserted)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let answer = pending.map(|resolve| resolve()).unwrap_or_default();
                (answer, CacheOutcome::Bypassed)
            }
        }
    }

    pub fn clear(&self) {
        if let Some(answers) = &self.answers {
            answers.invalidate_all();
            answers.run_pending_tasks();
        }
    }

    /// Entry count after Moka's pending maintenance has run
    pub fn len(&self) -> usize {
        self.answers.as_ref().map_or(0, |answers| {
            answers.run_pending_tasks();
            answers.entry_count() as usize
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity,
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
