//! Reference engine: inlines `@import` statements line by line.
//!
//! Every non-blank line is emitted trimmed. A line starting with `@import` is split into its
//! comma-separated targets; plain-CSS imports (`url(..)`, `*.css`, `http(s)://`) are kept as
//! `@import` statements, every other target is resolved and its body compiled in place.
//!
//! Resolution order for one target:
//!
//! 1. the session binding, when one is attached
//! 2. the filesystem: `x`, `x.scss`, `_x.scss`, `x.css`, `_x.css`, first next to the importer
//!    and then under each include path
//!
//! There is no cycle detection; `max_import_depth` bounds recursion instead.

use super::{absolutize, CompileOutput, SourceInput, StylesheetEngine};
use crate::config::EngineSettings;
use crate::constants::{DEFAULT_MAX_IMPORT_DEPTH, IMPORT_EXTENSIONS, PARTIAL_PREFIX, ROOT_CONTEXT};
use crate::error::{ImportError, Result};
use crate::resolver::ImporterContext;
use crate::session::ImporterBinding;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct InlineEngine {
    include_paths: Vec<PathBuf>,
    max_import_depth: usize,
}

impl Default for InlineEngine {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_MAX_IMPORT_DEPTH)
    }
}

impl InlineEngine {
    pub fn new(include_paths: Vec<PathBuf>, max_import_depth: usize) -> Self {
        Self {
            include_paths,
            max_import_depth,
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.include_paths.clone(), settings.max_import_depth)
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn max_import_depth(&self) -> usize {
        self.max_import_depth
    }

    fn find_on_disk(&self, url: &str, importer: &ImporterContext) -> Option<PathBuf> {
        let search_dirs = importer_dir(importer)
            .into_iter()
            .chain(self.include_paths.iter().cloned());

        for dir in search_dirs {
            for candidate in candidates(&dir, url) {
                trace!(candidate = %candidate.display(), "Probing import candidate");
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl StylesheetEngine for InlineEngine {
    fn compile(
        &self,
        input: &SourceInput,
        importer: Option<&ImporterBinding>,
    ) -> Result<CompileOutput> {
        let label = input.label();
        let source = input.read_source()?;
        debug!(
            root = %label,
            session_id = importer.map(|binding| binding.session_id()),
            "Compiling stylesheet"
        );

        let mut run = InlineRun {
            engine: self,
            importer,
            lines: Vec::new(),
            included_files: vec![label.clone()],
        };
        run.compile_source(&source, &input.importer_context(), &label, 0)?;

        let mut css = run.lines.join("\n");
        if !css.is_empty() {
            css.push('\n');
        }
        Ok(CompileOutput {
            css,
            included_files: run.included_files,
        })
    }

    fn engine_name(&self) -> &'static str {
        "inline"
    }
}

/// A resolved import body together with the context its own imports resolve against
struct LoadedImport {
    context: ImporterContext,
    label: String,
    source: String,
}

struct InlineRun<'a> {
    engine: &'a InlineEngine,
    importer: Option<&'a ImporterBinding>,
    lines: Vec<String>,
    included_files: Vec<String>,
}

impl InlineRun<'_> {
    fn compile_source(
        &mut self,
        source: &str,
        importer: &ImporterContext,
        file: &str,
        depth: usize,
    ) -> Result<()> {
        for (index, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((targets, trailing)) = split_import_statement(line) else {
                self.lines.push(line.to_string());
                continue;
            };

            for target in parse_targets(targets) {
                match target {
                    ImportTarget::PlainCss(raw) => self.lines.push(format!("@import {raw};")),
                    ImportTarget::Stylesheet(url) => {
                        if depth + 1 > self.engine.max_import_depth {
                            return Err(ImportError::ImportDepthExceeded {
                                import: url.to_string(),
                                depth: depth + 1,
                            });
                        }
                        let loaded = self.load(url, importer, file, index + 1)?;
                        self.included_files.push(loaded.label.clone());
                        self.compile_source(
                            &loaded.source,
                            &loaded.context,
                            &loaded.label,
                            depth + 1,
                        )?;
                    }
                }
            }

            if !trailing.is_empty() {
                self.lines.push(trailing.to_string());
            }
        }
        Ok(())
    }

    fn load(
        &self,
        url: &str,
        importer: &ImporterContext,
        file: &str,
        line: usize,
    ) -> Result<LoadedImport> {
        if let Some(binding) = self.importer {
            let answer = binding.resolve(url, importer)?;
            if answer.resolved {
                let new_url = if answer.new_url.is_empty() {
                    url.to_string()
                } else {
                    answer.new_url.clone()
                };
                let source = if answer.loads_from_disk() {
                    read_import_body(&new_url, importer)?
                } else {
                    answer.source
                };
                debug!(url, new_url = %new_url, "Import resolved by session");
                return Ok(LoadedImport {
                    context: ImporterContext::new(url, new_url.clone()),
                    label: new_url,
                    source,
                });
            }
        }

        if let Some(path) = self.engine.find_on_disk(url, importer) {
            let source = std::fs::read_to_string(&path)
                .map_err(|e| ImportError::io(path.display().to_string(), &e))?;
            debug!(url, path = %path.display(), "Import resolved from filesystem");
            return Ok(LoadedImport {
                context: ImporterContext::new(url, absolutize(&path).display().to_string()),
                label: path.display().to_string(),
                source,
            });
        }

        Err(ImportError::EngineResolutionFailure {
            import: url.to_string(),
            file: file.to_string(),
            line,
        })
    }
}

enum ImportTarget<'s> {
    PlainCss(&'s str),
    Stylesheet(&'s str),
}

/// `@import 'a', 'b'; rest` -> `("'a', 'b'", "rest")`
fn split_import_statement(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("@import")?;
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return None;
    }
    Some(match rest.split_once(';') {
        Some((targets, trailing)) => (targets.trim(), trailing.trim()),
        None => (rest.trim(), ""),
    })
}

fn parse_targets(targets: &str) -> Vec<ImportTarget<'_>> {
    targets
        .split(',')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            let url = unquote(raw);
            if raw.starts_with("url(") || is_plain_css(url) {
                ImportTarget::PlainCss(raw)
            } else {
                ImportTarget::Stylesheet(url)
            }
        })
        .collect()
}

fn unquote(raw: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}

fn is_plain_css(url: &str) -> bool {
    url.ends_with(".css")
        || url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
}

/// Directory of the importing file; the working directory for stdin
fn importer_dir(importer: &ImporterContext) -> Option<PathBuf> {
    if importer.abs_path == ROOT_CONTEXT {
        return Some(PathBuf::from("."));
    }
    Path::new(&importer.abs_path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

fn candidates(dir: &Path, url: &str) -> Vec<PathBuf> {
    let relative = Path::new(url);
    let parent = dir.join(relative.parent().unwrap_or_else(|| Path::new("")));
    let Some(name) = relative.file_name().and_then(|name| name.to_str()) else {
        return Vec::new();
    };

    let mut paths = vec![dir.join(relative)];
    for extension in IMPORT_EXTENSIONS {
        paths.push(parent.join(format!("{name}.{extension}")));
        paths.push(parent.join(format!("{PARTIAL_PREFIX}{name}.{extension}")));
    }
    paths
}

/// Body for a resolved answer that left `source` empty
fn read_import_body(new_url: &str, importer: &ImporterContext) -> Result<String> {
    let direct = PathBuf::from(new_url);
    let path = if direct.is_file() {
        direct
    } else {
        importer_dir(importer)
            .map(|dir| dir.join(new_url))
            .filter(|candidate| candidate.is_file())
            .unwrap_or(direct)
    };
    std::fs::read_to_string(&path).map_err(|e| ImportError::io(new_url, &e))
}
