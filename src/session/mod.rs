//! # Resolver Sessions
//!
//! A [`ResolverSession`] owns one configured resolver, one override store and one resolution
//! cache. Binding it yields an [`ImporterBinding`], the only thing a compilation engine sees.
//!
//! ```rust
//! use sass_imports::registry::HandleRegistry;
//! use sass_imports::resolver::{ImporterContext, ResolverOptions};
//! use sass_imports::session::{ResolverSession, SessionState};
//! use std::sync::Arc;
//!
//! # fn main() -> sass_imports::Result<()> {
//! let session = ResolverSession::new(Arc::new(HandleRegistry::new()), ResolverOptions::default());
//! session.add_source("", "colors", "$red: #f00;")?;
//!
//! let binding = session.bind()?;
//! let answer = binding.resolve("colors", &ImporterContext::stdin())?;
//! assert_eq!(answer.source, "$red: #f00;");
//!
//! session.close()?;
//! assert_eq!(session.state(), SessionState::Closed);
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod resolver_session;
pub mod state;

pub use binding::ImporterBinding;
pub use resolver_session::ResolverSession;
pub use state::SessionState;
