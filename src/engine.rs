//! The engine: owns the lazily loaded backends and the caches, and wires the
//! scanner, deriver, scanners and editors into the public operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{ClearPastThreshold, CssCache, SingleSlotMemo};
use crate::config::EngineConfig;
use crate::editors::{EditResult, Editor, StyleUpdate};
use crate::error::{ConfigError, EngineResult};
use crate::hash::hash_source;
use crate::inspect::InspectIndex;
use crate::loader::Loader;
use crate::parse::SourceParser;
use crate::props::{derive_props, DerivedProps, ExportedComponent, PropDefinition};
use crate::security::{scan_security, SecurityIssue};
use crate::tailwind::{compile_css, extract_candidates, TailwindCompiler, UtilityCompiler};
use crate::vfs::{scan_with_depth, LineSegment, ScanResult};

/// Key of the main block in [`AnalysisResponse::inspect_index_by_file`].
pub const MAIN_FILE_KEY: &str = "__main__";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzeOptions {
    pub include_tailwind: bool,
    pub include_inspect: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub exports: Vec<ExportedComponent>,
    pub props_schema: Vec<PropDefinition>,
    pub default_props: Map<String, Value>,
    pub duplicate_keys: Vec<String>,
    pub security_issues: Vec<SecurityIssue>,
    pub tailwind_css: Option<String>,
    pub source_hash: String,
    pub inspect_index_by_file: Option<BTreeMap<String, InspectIndex>>,
    pub line_map_segments: Vec<LineSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

pub struct SnippetEngine {
    config: EngineConfig,
    parser: Loader<SourceParser>,
    tailwind: Loader<Box<dyn TailwindCompiler>>,
    scans: SingleSlotMemo<ScanResult>,
    css: CssCache,
}

impl Default for SnippetEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SnippetEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_compiler(config, || Ok(Box::new(UtilityCompiler) as Box<dyn TailwindCompiler>))
    }

    /// Build an engine whose Tailwind backend comes from `factory`. The factory
    /// runs on first use, under the same timeout and cooldown as the parser.
    pub fn with_compiler<F>(config: EngineConfig, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn TailwindCompiler>, String> + Send + Sync + 'static,
    {
        let timeout = config.parser.load_timeout();
        let cooldown = config.parser.failure_cooldown();
        Self {
            parser: Loader::new("parser", timeout, cooldown, || Ok(SourceParser::new())),
            tailwind: Loader::new("tailwind compiler", timeout, cooldown, factory),
            scans: SingleSlotMemo::default(),
            css: CssCache::new(ClearPastThreshold(config.tailwind.cache_max_entries)),
            config,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        EngineConfig::from_json(json).map(Self::new)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Split `source` into its virtual files and expand imports. The most
    /// recent source is memoized.
    pub fn scan(&self, source: &str) -> Arc<ScanResult> {
        let depth = self.config.vfs.max_import_depth;
        self.scans
            .get_or_compute(source, || scan_with_depth(source, depth))
    }

    pub fn analyze(&self, source: &str, options: AnalyzeOptions) -> EngineResult<AnalysisResponse> {
        let scan = self.scan(source);
        let parser = self.parser.get()?;

        let mut response = AnalysisResponse {
            source_hash: hash_source(&scan.expanded_source),
            line_map_segments: scan.line_map_segments.clone(),
            ..AnalysisResponse::default()
        };

        let parsed = match parser.parse(&scan.expanded_source) {
            Ok(parsed) => parsed,
            Err(failure) => {
                tracing::warn!(error = %failure, "snippet did not parse, returning empty analysis");
                response.parse_error = Some(failure.to_string());
                return Ok(response);
            }
        };
        if !parsed.recovered.is_empty() {
            tracing::debug!(count = parsed.recovered.len(), "parser recovered from errors");
        }

        let DerivedProps {
            exports,
            props_schema,
            default_props,
            duplicate_keys,
        } = derive_props(&parsed.module);
        response.exports = exports;
        response.props_schema = props_schema;
        response.default_props = default_props;
        response.duplicate_keys = duplicate_keys;
        response.security_issues = scan_security(&parsed);

        if options.include_tailwind {
            let candidates = extract_candidates(&parsed.module);
            let compiler = self.tailwind.get()?;
            let css = compile_css(&**compiler, &self.css, &self.config.tailwind, &candidates)?;
            response.tailwind_css = Some(css.to_string());
        }

        if options.include_inspect {
            response.inspect_index_by_file = Some(self.inspect_files(&parser, &scan));
        }

        Ok(response)
    }

    /// One index per block, in each block's own coordinates. Blocks that fail
    /// to parse are left out.
    fn inspect_files(&self, parser: &SourceParser, scan: &ScanResult) -> BTreeMap<String, InspectIndex> {
        let max = self.config.inspect.max_text_ranges;
        std::iter::once((MAIN_FILE_KEY, scan.main_source.as_str()))
            .chain(scan.files.iter().map(|(name, text)| (name.as_str(), text.as_str())))
            .filter_map(|(name, text)| match parser.parse(text) {
                Ok(parsed) => Some((name.to_string(), InspectIndex::build(&parsed, max))),
                Err(failure) => {
                    tracing::debug!(file = name, error = %failure, "skipping inspect index");
                    None
                }
            })
            .collect()
    }

    /// Index of `source` as given, without file splitting. `None` when it does
    /// not parse.
    pub fn build_inspect_index(&self, source: &str) -> EngineResult<Option<InspectIndex>> {
        let parser = self.parser.get()?;
        Ok(parser
            .parse(source)
            .ok()
            .map(|parsed| InspectIndex::build(&parsed, self.config.inspect.max_text_ranges)))
    }

    pub fn insert_child(&self, source: &str, line: usize, column: usize, jsx: &str) -> EngineResult<EditResult> {
        let parser = self.parser.get()?;
        Ok(self.editor(&parser).insert_child(source, line, column, jsx))
    }

    pub fn apply_style_update(
        &self,
        source: &str,
        line: usize,
        column: usize,
        update: &StyleUpdate,
    ) -> EngineResult<EditResult> {
        let parser = self.parser.get()?;
        Ok(self.editor(&parser).apply_style_update(source, line, column, update))
    }

    pub fn apply_translate(
        &self,
        source: &str,
        line: usize,
        column: usize,
        dx: f64,
        dy: f64,
    ) -> EngineResult<EditResult> {
        let parser = self.parser.get()?;
        Ok(self.editor(&parser).apply_translate(source, line, column, dx, dy))
    }

    fn editor<'p>(&self, parser: &'p SourceParser) -> Editor<'p> {
        Editor::new(parser, &self.config.editor.indent_unit)
    }

    /// Drop the scan memo, the CSS cache and both loaded backends.
    pub fn reset(&self) {
        self.scans.reset();
        self.css.reset();
        self.parser.reset();
        self.tailwind.reset();
        tracing::debug!("engine reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineError, LoadError, TailwindError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CARD: &str = r#"
export default function Card({ title = "Hello", padded }: { title?: string; padded: boolean }) {
  return <div className="p-4 font-bold">{title}</div>;
}
"#;

    #[test]
    fn analyzes_props_and_hash() {
        let engine = SnippetEngine::default();
        let response = engine.analyze(CARD, AnalyzeOptions::default()).unwrap();
        assert_eq!(response.exports.len(), 1);
        assert!(response.exports[0].is_default);
        assert_eq!(response.default_props.get("title"), Some(&Value::from("Hello")));
        assert!(response.parse_error.is_none());
        assert!(response.tailwind_css.is_none());
        assert!(response.inspect_index_by_file.is_none());
        assert_eq!(response.source_hash, hash_source(CARD.trim_end()));
    }

    #[test]
    fn parse_failure_returns_defaults() {
        let engine = SnippetEngine::default();
        let response = engine
            .analyze("export function A( {", AnalyzeOptions { include_tailwind: true, include_inspect: true })
            .unwrap();
        assert!(response.parse_error.is_some());
        assert!(response.exports.is_empty());
        assert!(response.tailwind_css.is_none());
        assert!(!response.source_hash.is_empty());
        assert_eq!(response.line_map_segments.len(), 1);
    }

    #[test]
    fn tailwind_and_inspect_are_opt_in() {
        let engine = SnippetEngine::default();
        let response = engine
            .analyze(CARD, AnalyzeOptions { include_tailwind: true, include_inspect: true })
            .unwrap();
        let css = response.tailwind_css.unwrap();
        assert!(css.contains(".p-4"));
        assert!(css.contains(".font-bold"));
        let indexes = response.inspect_index_by_file.unwrap();
        assert_eq!(indexes.keys().collect::<Vec<_>>(), vec![MAIN_FILE_KEY]);
        assert_eq!(indexes[MAIN_FILE_KEY].elements.len(), 1);
    }

    #[test]
    fn compiler_limits_surface_as_errors() {
        let config = EngineConfig::from_json(r#"{"tailwind":{"maxCandidates":1}}"#).unwrap();
        let engine = SnippetEngine::new(config);
        let err = engine
            .analyze(CARD, AnalyzeOptions { include_tailwind: true, include_inspect: false })
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Tailwind(TailwindError::TooManyCandidates { count: 2, limit: 1 })
        );
    }

    #[test]
    fn compiler_backend_loads_once_and_failures_propagate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let engine = SnippetEngine::with_compiler(EngineConfig::default(), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Err("no compiler".to_string())
        });
        let options = AnalyzeOptions { include_tailwind: true, include_inspect: false };
        let first = engine.analyze(CARD, options).unwrap_err();
        assert!(matches!(first, EngineError::Load(LoadError::Failed { .. })));
        let second = engine.analyze(CARD, options).unwrap_err();
        assert!(matches!(second, EngineError::Load(LoadError::CoolingDown { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Analysis without Tailwind never touches the compiler.
        assert!(engine.analyze(CARD, AnalyzeOptions::default()).is_ok());
    }

    #[test]
    fn scan_is_memoized_until_reset() {
        let engine = SnippetEngine::default();
        let first = engine.scan(CARD);
        let second = engine.scan(CARD);
        assert!(Arc::ptr_eq(&first, &second));
        engine.reset();
        assert!(!Arc::ptr_eq(&first, &engine.scan(CARD)));
    }

    #[test]
    fn editors_go_through_the_engine() {
        let engine = SnippetEngine::from_json(r#"{"editor":{"indentUnit":"    "}}"#).unwrap();
        let result = engine
            .insert_child("const a = <div></div>;", 1, 12, "<b />")
            .unwrap();
        assert!(result.changed);
        assert!(result.source.contains("\n    <b />\n"));

        let moved = engine
            .apply_translate("const a = <div>x</div>;", 1, 12, 4.0, 0.0)
            .unwrap();
        assert!(moved.source.contains("translate: \"4px 0px\""));
    }

    #[test]
    fn inspect_index_is_none_for_broken_source() {
        let engine = SnippetEngine::default();
        assert!(engine.build_inspect_index("<div>").unwrap().is_none());
        let index = engine
            .build_inspect_index("const a = <div><span /></div>;")
            .unwrap()
            .unwrap();
        assert_eq!(index.elements.len(), 2);
    }
}
