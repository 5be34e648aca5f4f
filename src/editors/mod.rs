//! Cursor-targeted, text-preserving edits.
//!
//! Every editor parses the raw source, picks the innermost JSX element that
//! encloses a 1-based `(line, column)` point, and splices new text into the
//! original string. Editors never fail with an error: a refused edit returns
//! the untouched source together with an [`EditRefusal`].

mod inline_style;
mod insert;
mod style;
pub mod tokens;
mod translate;

pub use style::{StyleField, StyleUpdate, StyleValue};
pub use translate::format_px;

use serde::{Serialize, Serializer};
use std::ops::Range;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::parse::{innermost, ParsedModule, Position, SourceParser, TextRange};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditRefusal {
    #[error("source is empty")]
    EmptySource,

    #[error("source could not be parsed: {0}")]
    Unparseable(String),

    #[error("no JSX element encloses {line}:{column}")]
    NoElementAtPoint { line: usize, column: usize },

    #[error("element has no usable tag location")]
    InvalidTagLocation,

    #[error("<{tag}> is a void element and cannot have children")]
    VoidTag { tag: String },

    #[error("<{tag}> is an SVG primitive and cannot take inserted children")]
    SvgPrimitive { tag: String },

    #[error("<{tag}> is self-closing")]
    SelfClosing { tag: String },

    #[error("<{tag}> has no closing tag")]
    MissingClosingTag { tag: String },

    #[error("<{tag}> already has inline content between its tags")]
    InlineContent { tag: String },

    #[error("nothing to insert")]
    EmptyInsertion,

    #[error("`{attr}` is not a static value the editor can rewrite")]
    DynamicAttribute { attr: String },

    #[error("no changes to apply")]
    NoChanges,
}

fn serialize_reason<S: Serializer>(reason: &Option<EditRefusal>, s: S) -> Result<S::Ok, S::Error> {
    match reason {
        Some(r) => s.serialize_str(&r.to_string()),
        None => s.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    pub source: String,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_at: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_reason")]
    pub reason: Option<EditRefusal>,
    /// Caller-facing notes about how the edit was carried out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl EditResult {
    pub fn applied(source: String) -> Self {
        Self {
            source,
            changed: true,
            inserted_at: None,
            reason: None,
            notices: Vec::new(),
        }
    }

    pub fn refused(source: &str, reason: EditRefusal) -> Self {
        tracing::debug!(%reason, "edit refused");
        Self {
            source: source.to_string(),
            changed: false,
            inserted_at: None,
            reason: Some(reason),
            notices: Vec::new(),
        }
    }

    fn with_notices(mut self, notices: Vec<String>) -> Self {
        self.notices = notices;
        self
    }
}

/// Replacement of a byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }
}

/// Apply non-overlapping edits, highest start first so earlier offsets stay valid.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start).then(b.range.end.cmp(&a.range.end)));
    let mut out = source.to_string();
    for edit in edits {
        out.replace_range(edit.range, &edit.text);
    }
    out
}

/// Shared entry point for the editors.
pub struct Editor<'p> {
    parser: &'p SourceParser,
    indent_unit: String,
}

impl<'p> Editor<'p> {
    pub fn new(parser: &'p SourceParser, indent_unit: impl Into<String>) -> Self {
        Self {
            parser,
            indent_unit: indent_unit.into(),
        }
    }

    /// Parse and find the innermost element at the point.
    fn locate<'s>(
        &self,
        source: &'s str,
        line: usize,
        column: usize,
    ) -> Result<(ParsedModule<'s>, JSXElement), EditRefusal> {
        if source.trim().is_empty() {
            return Err(EditRefusal::EmptySource);
        }
        let parsed = self
            .parser
            .parse(source)
            .map_err(|e| EditRefusal::Unparseable(e.to_string()))?;

        let mut ranges = RangeCollector {
            parsed: &parsed,
            found: Vec::new(),
        };
        parsed.module.visit_with(&mut ranges);
        let span = innermost(ranges.found, Position::new(line, column))
            .ok_or(EditRefusal::NoElementAtPoint { line, column })?;

        let mut finder = ElementFinder { span, found: None };
        parsed.module.visit_with(&mut finder);
        let element = finder.found.ok_or(EditRefusal::InvalidTagLocation)?;
        if element.opening.span.is_dummy() || parsed.source.byte_range(element.opening.span).is_empty() {
            return Err(EditRefusal::InvalidTagLocation);
        }
        Ok((parsed, element))
    }
}

struct RangeCollector<'p, 's> {
    parsed: &'p ParsedModule<'s>,
    found: Vec<(TextRange, swc_core::common::Span)>,
}

impl Visit for RangeCollector<'_, '_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        if !node.span.is_dummy() {
            self.found.push((self.parsed.source.range(node.span), node.span));
        }
        node.visit_children_with(self);
    }
}

struct ElementFinder {
    span: swc_core::common::Span,
    found: Option<JSXElement>,
}

impl Visit for ElementFinder {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        if self.found.is_some() {
            return;
        }
        if node.span == self.span {
            self.found = Some(node.clone());
            return;
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_apply_back_to_front() {
        let out = apply_edits(
            "abcdef",
            vec![
                TextEdit::insert(0, "<"),
                TextEdit::replace(2..4, "XY"),
                TextEdit::insert(6, ">"),
            ],
        );
        assert_eq!(out, "<abXYef>");
    }

    #[test]
    fn refusal_serializes_as_reason_string() {
        let result = EditResult::refused("src", EditRefusal::SelfClosing { tag: "img".into() });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["changed"], false);
        assert_eq!(json["reason"], "<img> is self-closing");
        assert_eq!(json["source"], "src");
        assert!(json.get("insertedAt").is_none());
    }

    #[test]
    fn locate_picks_innermost_element() {
        let parser = SourceParser::new();
        let editor = Editor::new(&parser, "  ");
        let src = "const a = (\n  <div>\n    <span>hi</span>\n  </div>\n);";
        let (_, el) = editor.locate(src, 3, 8).unwrap();
        assert_eq!(crate::ast::jsx_element_name(&el.opening.name), "span");
        let (_, el) = editor.locate(src, 4, 3).unwrap();
        assert_eq!(crate::ast::jsx_element_name(&el.opening.name), "div");
        assert_eq!(
            editor.locate(src, 1, 1).err(),
            Some(EditRefusal::NoElementAtPoint { line: 1, column: 1 })
        );
    }

    #[test]
    fn locate_reports_empty_and_broken_sources() {
        let parser = SourceParser::new();
        let editor = Editor::new(&parser, "  ");
        assert_eq!(editor.locate("  \n", 1, 1).err(), Some(EditRefusal::EmptySource));
        assert!(matches!(
            editor.locate("const = <div", 1, 1).err(),
            Some(EditRefusal::Unparseable(_))
        ));
    }
}
