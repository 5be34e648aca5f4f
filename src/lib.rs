//! Source-transformation engine for single-file React/TSX snippets.
//!
//! A snippet is one source string that may carry named virtual files. The
//! engine expands it, derives the props schema of its exported components,
//! indexes its JSX for click-to-source, compiles its Tailwind classes and
//! performs point-targeted structural edits on it.
//!
//! The free functions below go through a process-wide [`SnippetEngine`] built
//! from the default config. Hosts that need their own limits construct an
//! engine with [`SnippetEngine::new`] or [`SnippetEngine::from_json`].

pub mod ast;
pub mod cache;
pub mod config;
pub mod editors;
pub mod engine;
pub mod error;
pub mod hash;
pub mod inspect;
pub mod loader;
pub mod parse;
pub mod props;
pub mod security;
pub mod tailwind;
pub mod vfs;

use once_cell::sync::Lazy;
use std::sync::Arc;

pub use config::EngineConfig;
pub use editors::{EditRefusal, EditResult, StyleField, StyleUpdate, StyleValue};
pub use engine::{AnalysisResponse, AnalyzeOptions, SnippetEngine, MAIN_FILE_KEY};
pub use error::{EngineError, EngineResult};
pub use inspect::InspectIndex;
pub use parse::{Position, TextRange};
pub use vfs::ScanResult;

// -----------------------------------------------------------------------------
// Default engine
// -----------------------------------------------------------------------------

static DEFAULT_ENGINE: Lazy<SnippetEngine> = Lazy::new(SnippetEngine::default);

pub fn default_engine() -> &'static SnippetEngine {
    &DEFAULT_ENGINE
}

pub fn analyze(source: &str, options: AnalyzeOptions) -> EngineResult<AnalysisResponse> {
    DEFAULT_ENGINE.analyze(source, options)
}

pub fn insert_child(source: &str, line: usize, column: usize, jsx: &str) -> EngineResult<EditResult> {
    DEFAULT_ENGINE.insert_child(source, line, column, jsx)
}

pub fn apply_style_update(
    source: &str,
    line: usize,
    column: usize,
    update: &StyleUpdate,
) -> EngineResult<EditResult> {
    DEFAULT_ENGINE.apply_style_update(source, line, column, update)
}

pub fn apply_translate(source: &str, line: usize, column: usize, dx: f64, dy: f64) -> EngineResult<EditResult> {
    DEFAULT_ENGINE.apply_translate(source, line, column, dx, dy)
}

pub fn build_inspect_index(source: &str) -> EngineResult<Option<InspectIndex>> {
    DEFAULT_ENGINE.build_inspect_index(source)
}

pub fn scan(source: &str) -> Arc<ScanResult> {
    DEFAULT_ENGINE.scan(source)
}

/// Clear the default engine's caches and reload its backends on next use.
pub fn reset() {
    DEFAULT_ENGINE.reset()
}
