//! # Registry Infrastructure
//!
//! Handle-based registration of import callbacks.
//!
//! ## Overview
//!
//! The compilation engine never holds a resolver directly. A session registers its fallback
//! chain once, receives a [`ResolverHandle`], and hands only that handle to the engine. Every
//! import the engine meets goes through [`HandleRegistry::lookup`].
//!
//! ```text
//! ResolverSession ──register──▶ HandleRegistry ◀──lookup── engine callback
//!        │                            ▲
//!        └────────── release ─────────┘  (on Close)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use sass_imports::registry::{HandleRegistry, ImportCallback};
//! use sass_imports::resolver::{ImporterContext, ResolutionResult};
//! use std::sync::Arc;
//!
//! struct Fixed;
//!
//! impl ImportCallback for Fixed {
//!     fn invoke(
//!         &self,
//!         url: &str,
//!         _importer: &ImporterContext,
//!     ) -> sass_imports::Result<ResolutionResult> {
//!         Ok(ResolutionResult::resolved(url, ".fixed {}"))
//!     }
//! }
//!
//! let registry = HandleRegistry::new();
//! let handle = registry.register(Arc::new(Fixed));
//! let answer = registry.lookup(handle)?.invoke("a", &ImporterContext::stdin())?;
//! assert!(answer.resolved);
//! registry.release(handle);
//! # Ok::<(), sass_imports::ImportError>(())
//! ```

pub mod handle_registry;

pub use handle_registry::{HandleRegistry, ImportCallback, ResolverHandle};
