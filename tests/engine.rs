use pretty_assertions::assert_eq;
use snippet_engine::editors::tokens;
use snippet_engine::hash::hash_source;
use snippet_engine::vfs::LineSegment;
use snippet_engine::{
    AnalyzeOptions, EditRefusal, Position, SnippetEngine, StyleField, StyleUpdate, MAIN_FILE_KEY,
};

const APP: &str = "// @snippet-file button
export function Button({ label = \"Hi\" }: { label?: string }) {
  return <button className=\"px-2 bg-blue-500\">{label}</button>;
}
// @snippet-file-end
import React from 'react';
// @import button
export default function App() {
  return <Button />;
}
";

fn all() -> AnalyzeOptions {
    AnalyzeOptions {
        include_tailwind: true,
        include_inspect: true,
    }
}

#[test]
fn expands_single_import() {
    let engine = SnippetEngine::default();
    let scan = engine.scan("// @snippet-file a\nexport const X = 1\n// @snippet-file-end\n// @import a\n");
    assert_eq!(scan.expanded_source, "export const X = 1");
    assert!(scan.has_file_blocks);
    assert_eq!(
        scan.line_map_segments,
        vec![LineSegment {
            file_name: Some("a".to_string()),
            expanded_start_line: 1,
            original_start_line: 1,
            line_count: 1,
        }]
    );
}

#[test]
fn source_without_file_blocks_round_trips() {
    let source = "export const A = () => <div />;\n\n\n";
    let scan = snippet_engine::vfs::scan(source);
    assert_eq!(scan.main_source, source.trim_end());
    assert_eq!(scan.expanded_source, source.trim_end());
    assert!(!scan.has_file_blocks);

    let again = snippet_engine::vfs::scan(&scan.expanded_source);
    assert_eq!(again.expanded_source, scan.expanded_source);
}

#[test]
fn line_map_covers_every_expanded_line() {
    let scan = snippet_engine::vfs::scan(APP);
    let total = scan.expanded_source.split('\n').count();

    let mut next = 1;
    for segment in &scan.line_map_segments {
        assert_eq!(segment.expanded_start_line, next);
        assert!(segment.line_count > 0);
        next += segment.line_count;
    }
    assert_eq!(next, total + 1);

    assert_eq!(scan.origin_of(1), Some((None, 1)));
    assert_eq!(scan.origin_of(2), Some((Some("button"), 1)));
    assert_eq!(scan.origin_of(5), Some((None, 3)));
    assert_eq!(scan.raw_line(Some("button"), 1), Some(2));
    assert_eq!(scan.raw_line(None, 3), Some(8));
}

#[test]
fn analyzes_virtual_files_end_to_end() {
    let engine = SnippetEngine::default();
    let response = engine.analyze(APP, all()).unwrap();

    let names: Vec<_> = response.exports.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Button", "default"]);
    assert_eq!(response.default_props["label"], serde_json::json!("Hi"));
    assert!(response.security_issues.is_empty());

    let css = response.tailwind_css.as_deref().unwrap();
    assert!(css.contains(".px-2"));
    assert!(css.contains(".bg-blue-500"));

    let indexes = response.inspect_index_by_file.as_ref().unwrap();
    assert!(indexes.contains_key(MAIN_FILE_KEY));
    let button = indexes["button"].find_match(2, 11).unwrap();
    assert_eq!(button.element_name.as_deref(), Some("button"));

    let json = serde_json::to_value(&response).unwrap();
    for key in ["propsSchema", "defaultProps", "sourceHash", "lineMapSegments", "inspectIndexByFile"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(json.get("parseError").is_none());
}

#[test]
fn prop_defaults_and_required_flags() {
    let engine = SnippetEngine::default();
    let source = "export function C({ a = 1, b }: { a?: number; b: string }) { return null; }";
    let response = engine.analyze(source, AnalyzeOptions::default()).unwrap();
    let prop = |key: &str| response.props_schema.iter().find(|p| p.key == key).unwrap();
    assert!(!prop("a").required);
    assert!(prop("b").required);
    assert_eq!(response.default_props["a"], serde_json::json!(1));
}

#[test]
fn unparseable_source_yields_default_analysis() {
    let engine = SnippetEngine::default();
    let response = engine.analyze("export default function (", all()).unwrap();
    assert!(response.parse_error.is_some());
    assert!(response.props_schema.is_empty());
    assert!(response.inspect_index_by_file.is_none());
    assert_eq!(response.source_hash, hash_source("export default function ("));
}

#[test]
fn hash_tracks_expanded_source() {
    let engine = SnippetEngine::default();
    let first = engine.analyze(APP, AnalyzeOptions::default()).unwrap();
    let second = engine.analyze(APP, AnalyzeOptions::default()).unwrap();
    assert_eq!(first.source_hash, second.source_hash);

    let edited = APP.replace("Hi", "Ho");
    let third = engine.analyze(&edited, AnalyzeOptions::default()).unwrap();
    assert_ne!(first.source_hash, third.source_hash);
}

#[test]
fn inserts_into_empty_element() {
    let engine = SnippetEngine::default();
    let result = engine.insert_child("<div></div>", 1, 2, "<Injected />").unwrap();
    assert!(result.changed);
    assert_eq!(result.source, "<div>\n  <Injected />\n</div>");
    assert_eq!(result.inserted_at, Some(Position::new(2, 3)));
}

#[test]
fn void_tags_never_take_children() {
    let engine = SnippetEngine::default();
    for tag in ["area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"] {
        let source = format!("const a = <{tag} />;");
        let result = engine.insert_child(&source, 1, 12, "<b />").unwrap();
        assert!(!result.changed, "{tag} accepted a child");
        assert_eq!(result.source, source);
        assert_eq!(result.reason, Some(EditRefusal::VoidTag { tag: tag.to_string() }));
    }
}

#[test]
fn class_rewrite_wins_over_inline_style() {
    let engine = SnippetEngine::default();
    let source = "export const A = () => (\n  <p className=\"text-sm\" style={{ fontSize: 12, color: \"red\" }}>x</p>\n);";
    let update: StyleUpdate = serde_json::from_str(r##"{"fontSize":"18px","color":"#0000ff"}"##).unwrap();
    let result = engine.apply_style_update(source, 2, 4, &update).unwrap();
    assert!(result.changed);

    let index = engine
        .build_inspect_index(&result.source)
        .unwrap()
        .expect("edited source parses");
    assert_eq!(index.elements.len(), 1);
    assert!(!result.source.contains("fontSize"));
    assert!(!result.source.contains("color:"));

    let classes = result
        .source
        .split("className=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap();
    assert!(classes
        .split_whitespace()
        .any(|c| tokens::matches_field(StyleField::FontSize, c)));
    assert!(classes.contains("text-[#0000ff]"));
}

#[test]
fn translate_accumulates_offsets() {
    let engine = SnippetEngine::default();
    let once = engine
        .apply_translate("const a = <div>x</div>;", 1, 12, 10.0, 5.0)
        .unwrap();
    let twice = engine.apply_translate(&once.source, 1, 12, -2.5, 0.0).unwrap();
    assert_eq!(
        twice.source,
        "const a = <div style={{ translate: \"7.5px 5px\" }}>x</div>;"
    );
}

#[test]
fn free_functions_use_the_default_engine() {
    let result = snippet_engine::insert_child("const a = <img />;", 1, 12, "<b />").unwrap();
    assert!(!result.changed);
    assert!(snippet_engine::build_inspect_index("const a = <br />;").unwrap().is_some());
    let response = snippet_engine::analyze("eval('x');", AnalyzeOptions::default()).unwrap();
    assert_eq!(response.security_issues.len(), 1);
    snippet_engine::reset();
    assert_eq!(snippet_engine::scan("x").main_source, "x");
}
