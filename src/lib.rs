#![allow(clippy::doc_markdown)] // Allow technical terms like SCSS, libsass in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Sass Imports Core
//!
//! Import resolution for Sass compilations: user resolvers, caller-supplied overrides and a
//! per-session resolution cache behind a single opaque callback handle.
//!
//! ## Overview
//!
//! A stylesheet engine meets `@import 'x'` and needs the body of `x`. This crate answers that
//! question through a fixed fallback chain:
//!
//! 1. **Resolution cache** keyed by `(url, context)`, if the session was built with a capacity
//! 2. **User resolver**, in the legacy `(url, prev) -> (new_url, body, resolved)` shape or the
//!    advanced `(url, prev) -> ResolutionResult` shape
//! 3. **Override store** of bodies registered up front with `add_source`
//! 4. **Unresolved**, leaving the engine to search the filesystem or fail
//!
//! ## Module Organization
//!
//! - [`session`] - Resolver sessions, bindings and lifecycle
//! - [`resolver`] - Resolver shapes and the data passed across the engine boundary
//! - [`imports`] - Override store
//! - [`cache`] - Resolution cache
//! - [`registry`] - Handle registry connecting engine callbacks to sessions
//! - [`engine`] - Engine trait and the reference inline engine
//! - [`compiler`] - Compiler façade
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use sass_imports::{Compiler, HandleRegistry, ResolverMode, ResolverSession};
//! use std::sync::Arc;
//!
//! # fn main() -> sass_imports::Result<()> {
//! let registry = Arc::new(HandleRegistry::new());
//! let session = Arc::new(ResolverSession::with_legacy_resolver(
//!     Arc::clone(&registry),
//!     ResolverMode::ByImporterUrl,
//!     |url, _prev| match url {
//!         "a" => ("a.scss".into(), ".a { color: #aaa; }\n@import 'b';".into(), true),
//!         _ => (String::new(), String::new(), false),
//!     },
//! ));
//! session.add_source("a", "b", ".b { color: #bbb; }")?;
//!
//! let mut compiler = Compiler::builder()
//!     .with_session(Arc::clone(&session))
//!     .with_stdin("@import 'a';")
//!     .build()?;
//! let output = compiler.run()?;
//!
//! assert_eq!(output.css, ".a { color: #aaa; }\n.b { color: #bbb; }\n");
//! session.close()?;
//! assert!(registry.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! cargo bench --features benchmarks
//! ```

pub mod cache;
pub mod compiler;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod imports;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod session;

pub use cache::{CacheKey, CacheOutcome, CacheStats, ResolutionCache};
pub use compiler::{Compiler, CompilerBuilder};
pub use config::{ConfigLoader, ImporterConfig};
pub use engine::{CompileOutput, InlineEngine, SourceInput, StylesheetEngine};
pub use error::{ImportError, Result};
pub use imports::{ImportRecord, OverrideStore};
pub use registry::{HandleRegistry, ImportCallback, ResolverHandle};
pub use resolver::{
    ImportResolver, ImporterContext, ResolutionResult, ResolverFn, ResolverMode, ResolverOptions,
};
pub use session::{ImporterBinding, ResolverSession, SessionState};
