//! What a session hands to the compilation engine when it binds.

use crate::error::{ImportError, Result};
use crate::registry::{HandleRegistry, ResolverHandle};
use crate::resolver::{ImporterContext, ResolutionResult, ResolverMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Opaque callback reference plus resolution mode.
///
/// The engine resolves every import through [`ImporterBinding::resolve`], which looks the handle
/// up in the registry on each call. Once the owning session has closed, calls fail with
/// `LifecycleViolation`.
#[derive(Debug, Clone)]
pub struct ImporterBinding {
    registry: Arc<HandleRegistry>,
    handle: ResolverHandle,
    mode: ResolverMode,
    session_id: String,
    closed: Arc<AtomicBool>,
}

impl ImporterBinding {
    pub(crate) fn new(
        registry: Arc<HandleRegistry>,
        handle: ResolverHandle,
        mode: ResolverMode,
        session_id: String,
        closed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            registry,
            handle,
            mode,
            session_id,
            closed,
        }
    }

    pub fn handle(&self) -> ResolverHandle {
        self.handle
    }

    pub fn mode(&self) -> ResolverMode {
        self.mode
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolve `url` imported from `importer`. An unresolved answer is `Ok` with
    /// `resolved == false`; errors are lifecycle or registry faults.
    pub fn resolve(&self, url: &str, importer: &ImporterContext) -> Result<ResolutionResult> {
        if self.is_closed() {
            return Err(ImportError::lifecycle(&self.session_id, "resolve"));
        }
        match self.registry.lookup(self.handle) {
            Ok(callback) => callback.invoke(url, importer),
            // Closed between the check above and the lookup
            Err(_) if self.is_closed() => Err(ImportError::lifecycle(&self.session_id, "resolve")),
            Err(error) => Err(error),
        }
    }
}
