//! # Compiler Façade
//!
//! Ties one root source, one engine and one [`ResolverSession`] together. Several compilers may
//! share a session; answers cached by one run are then visible to the next.
//!
//! ```rust
//! use sass_imports::compiler::Compiler;
//! use sass_imports::registry::HandleRegistry;
//! use sass_imports::resolver::{ResolutionResult, ResolverFn, ResolverMode, ResolverOptions};
//! use sass_imports::session::ResolverSession;
//! use std::sync::Arc;
//!
//! # fn main() -> sass_imports::Result<()> {
//! let session = Arc::new(ResolverSession::configure(
//!     Arc::new(HandleRegistry::new()),
//!     ResolverOptions::new(ResolverMode::ByImporterUrl, 16),
//!     ResolverFn::advanced(|url, _prev| match url {
//!         "theme" => ResolutionResult::resolved("theme.scss", ".theme { color: red; }")
//!             .cacheable(),
//!         _ => ResolutionResult::unresolved(),
//!     }),
//! ));
//!
//! let mut compiler = Compiler::builder()
//!     .with_session(Arc::clone(&session))
//!     .with_stdin("@import 'theme';")
//!     .build()?;
//!
//! let output = compiler.run()?;
//! assert_eq!(output.css, ".theme { color: red; }\n");
//! assert_eq!(compiler.included_files(), ["stdin", "theme.scss"]);
//! # Ok(())
//! # }
//! ```

use crate::engine::{CompileOutput, InlineEngine, SourceInput, StylesheetEngine};
use crate::error::{ImportError, Result};
use crate::logging::log_error;
use crate::registry::HandleRegistry;
use crate::resolver::ResolverOptions;
use crate::session::ResolverSession;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct Compiler {
    engine: Arc<dyn StylesheetEngine>,
    session: Arc<ResolverSession>,
    input: SourceInput,
    included_files: Vec<String>,
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::default()
    }

    /// Bind the session and compile the root source.
    ///
    /// Binding is idempotent, so calling `run` again reuses the session handle and its cache.
    pub fn run(&mut self) -> Result<CompileOutput> {
        let binding = self.session.bind()?;
        let output = self
            .engine
            .compile(&self.input, Some(&binding))
            .inspect_err(|error| {
                log_error(
                    "compiler",
                    "run",
                    &error.to_string(),
                    Some(&format!("root={}", self.input.label())),
                )
            })?;

        info!(
            session_id = %self.session.session_id(),
            engine = self.engine.engine_name(),
            root = %self.input.label(),
            included = output.included_files.len(),
            "Compilation finished"
        );
        self.included_files.clone_from(&output.included_files);
        Ok(output)
    }

    /// Number of records in the session's override store
    pub fn imports(&self) -> usize {
        self.session.imports()
    }

    /// Files included by the last successful run, root first
    pub fn included_files(&self) -> &[String] {
        &self.included_files
    }

    pub fn add_source(
        &self,
        parent_context: &str,
        path: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.session.add_source(parent_context, path, bytes)
    }

    pub fn remove_source(&self, path: &str) -> Result<usize> {
        self.session.remove_source(path)
    }

    pub fn session(&self) -> &Arc<ResolverSession> {
        &self.session
    }

    pub fn input(&self) -> &SourceInput {
        &self.input
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("engine", &self.engine.engine_name())
            .field("session", &self.session)
            .field("input", &self.input.label())
            .finish()
    }
}

/// Builder pattern for creating compilers with fluent API
#[derive(Default)]
pub struct CompilerBuilder {
    engine: Option<Arc<dyn StylesheetEngine>>,
    session: Option<Arc<ResolverSession>>,
    input: Option<SourceInput>,
}

impl CompilerBuilder {
    /// Set the engine; defaults to [`InlineEngine`]
    pub fn with_engine(mut self, engine: Arc<dyn StylesheetEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set the resolver session; defaults to a session with no resolver
    pub fn with_session(mut self, session: Arc<ResolverSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_stdin(mut self, source: impl Into<String>) -> Self {
        self.input = Some(SourceInput::Stdin(source.into()));
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(SourceInput::File(path.into()));
        self
    }

    pub fn with_named(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.input = Some(SourceInput::Named {
            path: path.into(),
            source: source.into(),
        });
        self
    }

    pub fn build(self) -> Result<Compiler> {
        let input = self.input.ok_or_else(|| {
            ImportError::Configuration("compiler needs a stdin, path or named source".to_string())
        })?;
        let session = self.session.unwrap_or_else(|| {
            Arc::new(ResolverSession::new(
                Arc::new(HandleRegistry::new()),
                ResolverOptions::default(),
            ))
        });

        if session.is_closed() {
            return Err(ImportError::lifecycle(session.session_id(), "build compiler"));
        }

        Ok(Compiler {
            engine: self
                .engine
                .unwrap_or_else(|| Arc::new(InlineEngine::default())),
            session,
            input,
            included_files: Vec::new(),
        })
    }
}
