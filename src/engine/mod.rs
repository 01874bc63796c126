//! # Compilation Engine Boundary
//!
//! The engine walks a stylesheet and asks an [`ImporterBinding`] for every `@import` it meets.
//! Sessions never call into the engine; the engine only ever sees the binding.
//!
//! [`InlineEngine`] is the reference implementation: it inlines imported bodies line by line and
//! falls back to the filesystem when no resolver answers.

pub mod inline_engine;

pub use inline_engine::InlineEngine;

use crate::constants::ROOT_CONTEXT;
use crate::error::{ImportError, Result};
use crate::resolver::ImporterContext;
use crate::session::ImporterBinding;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Anything that can compile a root stylesheet while resolving imports through a binding
pub trait StylesheetEngine: Send + Sync {
    fn compile(
        &self,
        input: &SourceInput,
        importer: Option<&ImporterBinding>,
    ) -> Result<CompileOutput>;

    fn engine_name(&self) -> &'static str;
}

/// Root source of a compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    /// Standard input; imports are resolved against the `stdin` context
    Stdin(String),
    /// A file read from disk when the compilation runs
    File(PathBuf),
    /// In-memory source that behaves as if it lived at `path`
    Named { path: String, source: String },
}

impl SourceInput {
    /// Name reported in errors and as the first included file
    pub fn label(&self) -> String {
        match self {
            Self::Stdin(_) => ROOT_CONTEXT.to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Named { path, .. } => path.clone(),
        }
    }

    /// Context key pair for imports made by the root source
    pub fn importer_context(&self) -> ImporterContext {
        match self {
            Self::Stdin(_) => ImporterContext::stdin(),
            Self::File(path) => ImporterContext::new(
                path.display().to_string(),
                absolutize(path).display().to_string(),
            ),
            Self::Named { path, .. } => ImporterContext::new(
                path.clone(),
                absolutize(Path::new(path)).display().to_string(),
            ),
        }
    }

    pub fn read_source(&self) -> Result<String> {
        match self {
            Self::Stdin(source) | Self::Named { source, .. } => Ok(source.clone()),
            Self::File(path) => std::fs::read_to_string(path)
                .map_err(|e| ImportError::io(path.display().to_string(), &e)),
        }
    }
}

/// Result of one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileOutput {
    pub css: String,
    /// Root label first, then every inlined import in the order it was included
    pub included_files: Vec<String>,
}

/// Join a relative path onto the working directory without touching symlinks
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
