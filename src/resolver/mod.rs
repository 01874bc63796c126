//! # Import Resolvers
//!
//! User-supplied resolution logic comes in two shapes:
//!
//! - **Legacy**: `(url, prev) -> (new_url, body, resolved)`
//! - **Advanced**: `(url, prev) -> ResolutionResult`, which may ask for the answer to be cached
//!
//! Both are reduced to the single [`ImportResolver`] interface when a session is configured.
//! The legacy shape goes through [`LegacyResolver`], which always reports `should_cache = false`;
//! nothing downstream knows which shape the caller used.
//!
//! ```rust
//! use sass_imports::resolver::{ImportResolver, ResolutionResult, ResolverFn};
//!
//! let advanced = ResolverFn::advanced(|url, _prev| {
//!     if url == "theme" {
//!         ResolutionResult::resolved("theme.scss", "$primary: red;").cacheable()
//!     } else {
//!         ResolutionResult::unresolved()
//!     }
//! });
//! let resolver = advanced.into_resolver();
//! assert!(resolver.resolve("theme", "stdin").should_cache);
//! ```

pub mod types;

pub use types::{ImporterContext, ResolutionResult, ResolverMode, ResolverOptions};

use std::fmt;
use std::sync::Arc;

/// Single internal resolver interface: `(url, context_key) -> ResolutionResult`.
///
/// Implementations may block or perform I/O. They are never called while a session lock is held.
pub trait ImportResolver: Send + Sync {
    fn resolve(&self, url: &str, context: &str) -> ResolutionResult;

    fn resolver_name(&self) -> &str {
        "custom"
    }
}

/// Signature of the legacy three-value resolver
pub type LegacyResolverFn = dyn Fn(&str, &str) -> (String, String, bool) + Send + Sync;

/// Adapts a closure returning [`ResolutionResult`] to [`ImportResolver`]
pub struct FnResolver<F> {
    inner: F,
}

impl<F> FnResolver<F>
where
    F: Fn(&str, &str) -> ResolutionResult + Send + Sync,
{
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F> ImportResolver for FnResolver<F>
where
    F: Fn(&str, &str) -> ResolutionResult + Send + Sync,
{
    fn resolve(&self, url: &str, context: &str) -> ResolutionResult {
        (self.inner)(url, context)
    }

    fn resolver_name(&self) -> &str {
        "advanced"
    }
}

/// The only place the legacy shape is understood
pub struct LegacyResolver {
    inner: Arc<LegacyResolverFn>,
}

impl LegacyResolver {
    pub fn new(inner: Arc<LegacyResolverFn>) -> Self {
        Self { inner }
    }
}

impl ImportResolver for LegacyResolver {
    fn resolve(&self, url: &str, context: &str) -> ResolutionResult {
        let (new_url, source, resolved) = (self.inner)(url, context);
        ResolutionResult {
            new_url,
            source,
            resolved,
            should_cache: false,
        }
    }

    fn resolver_name(&self) -> &str {
        "legacy"
    }
}

/// A resolver as handed over by the caller, in either supported shape
#[derive(Clone)]
pub enum ResolverFn {
    Legacy(Arc<LegacyResolverFn>),
    Advanced(Arc<dyn ImportResolver>),
}

impl ResolverFn {
    pub fn legacy<F>(resolver: F) -> Self
    where
        F: Fn(&str, &str) -> (String, String, bool) + Send + Sync + 'static,
    {
        Self::Legacy(Arc::new(resolver))
    }

    pub fn advanced<F>(resolver: F) -> Self
    where
        F: Fn(&str, &str) -> ResolutionResult + Send + Sync + 'static,
    {
        Self::Advanced(Arc::new(FnResolver::new(resolver)))
    }

    /// Use a hand-written [`ImportResolver`] implementation
    pub fn custom(resolver: Arc<dyn ImportResolver>) -> Self {
        Self::Advanced(resolver)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    pub fn into_resolver(self) -> Arc<dyn ImportResolver> {
        match self {
            Self::Legacy(inner) => Arc::new(LegacyResolver::new(inner)),
            Self::Advanced(resolver) => resolver,
        }
    }
}

impl fmt::Debug for ResolverFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy(_) => f.write_str("ResolverFn::Legacy"),
            Self::Advanced(resolver) => {
                write!(f, "ResolverFn::Advanced({})", resolver.resolver_name())
            }
        }
    }
}
