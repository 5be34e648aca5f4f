//! Parsing and source coordinates.
//!
//! Sources are parsed as TSX modules. Spans produced by the parser are
//! absolute [`BytePos`] values starting at [`SPAN_BASE`]; [`SourceText`]
//! converts them to byte offsets into the source and to 1-based
//! `(line, column)` positions, where columns count Unicode scalar values.

use serde::Serialize;
use std::ops::Range;
use swc_core::{
    common::{BytePos, Span, Spanned},
    ecma::{
        ast::{EsVersion, Module},
        parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax},
    },
};

/// `BytePos(0)` is reserved for dummy spans, so byte 0 of the source lives at 1.
pub const SPAN_BASE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// 1-based range; `end_column` points just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl TextRange {
    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_column)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_column)
    }

    pub fn contains(&self, point: Position) -> bool {
        self.start() <= point && point < self.end()
    }

    /// Ranking key for "smallest": fewer lines first, then fewer columns.
    pub fn extent(&self) -> (usize, i64) {
        (
            self.end_line - self.start_line,
            self.end_column as i64 - self.start_column as i64,
        )
    }
}

/// Pick the innermost range containing `point`. Ties go to the later item,
/// which for a pre-order walk is the deeper node.
pub fn innermost<T>(items: impl IntoIterator<Item = (TextRange, T)>, point: Position) -> Option<T> {
    let mut best: Option<((usize, i64), T)> = None;
    for (range, item) in items {
        if !range.contains(point) {
            continue;
        }
        let extent = range.extent();
        match &best {
            Some((current, _)) if *current < extent => {}
            _ => best = Some((extent, item)),
        }
    }
    best.map(|(_, item)| item)
}

/// Source string plus a line-start table.
#[derive(Debug, Clone)]
pub struct SourceText<'s> {
    text: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> SourceText<'s> {
    pub fn new(text: &'s str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { text, line_starts }
    }

    pub fn text(&self) -> &'s str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte range of `span` in the source, clamped to its length.
    pub fn byte_range(&self, span: Span) -> Range<usize> {
        let lo = (span.lo.0.saturating_sub(SPAN_BASE) as usize).min(self.text.len());
        let hi = (span.hi.0.saturating_sub(SPAN_BASE) as usize).clamp(lo, self.text.len());
        lo..hi
    }

    pub fn slice(&self, span: Span) -> &'s str {
        &self.text[self.byte_range(span)]
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let start = self.line_starts[line_idx];
        let column = self.text[start..offset].chars().count() + 1;
        Position::new(line_idx + 1, column)
    }

    pub fn range(&self, span: Span) -> TextRange {
        let bytes = self.byte_range(span);
        self.range_of(bytes)
    }

    pub fn range_of(&self, bytes: Range<usize>) -> TextRange {
        let start = self.position(bytes.start);
        let end = self.position(bytes.end);
        TextRange {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
        }
    }

    /// Byte offset of a 1-based position; the column may sit one past the end
    /// of the line.
    pub fn offset(&self, point: Position) -> Option<usize> {
        let start = *self.line_starts.get(point.line.checked_sub(1)?)?;
        let line = self.line_text(point.line)?;
        let target = point.column.checked_sub(1)?;
        let mut chars = line.char_indices();
        for _ in 0..target {
            if chars.next().is_none() {
                return None;
            }
        }
        let within = chars.next().map(|(idx, _)| idx).unwrap_or(line.len());
        Some(start + within)
    }

    /// Text of a 1-based line without its newline.
    pub fn line_text(&self, line: usize) -> Option<&'s str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(&self.text[start..end])
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: usize) -> &'s str {
        let line = self.position(offset).line;
        let text = self.line_text(line).unwrap_or("");
        let trimmed = text.trim_start_matches([' ', '\t']);
        &text[..text.len() - trimmed.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseFailure {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

pub struct ParsedModule<'s> {
    pub module: Module,
    pub source: SourceText<'s>,
    /// Errors the parser recovered from.
    pub recovered: Vec<ParseFailure>,
}

/// TSX parser backend. Instances are created by the engine's parser loader.
#[derive(Debug, Clone)]
pub struct SourceParser {
    syntax: Syntax,
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser {
    pub fn new() -> Self {
        Self {
            syntax: Syntax::Typescript(TsSyntax {
                tsx: true,
                decorators: true,
                ..Default::default()
            }),
        }
    }

    pub fn parse<'s>(&self, source: &'s str) -> Result<ParsedModule<'s>, ParseFailure> {
        let text = SourceText::new(source);
        let end = SPAN_BASE + source.len() as u32;
        let input = StringInput::new(source, BytePos(SPAN_BASE), BytePos(end));
        let lexer = Lexer::new(self.syntax, EsVersion::EsNext, input, None);
        let mut parser = Parser::new_from(lexer);

        let result = parser.parse_module();
        let recovered: Vec<ParseFailure> = parser
            .take_errors()
            .into_iter()
            .map(|e| failure(&text, e))
            .collect();

        match result {
            Ok(module) => Ok(ParsedModule {
                module,
                source: text,
                recovered,
            }),
            Err(e) => Err(failure(&text, e)),
        }
    }
}

fn failure(text: &SourceText<'_>, e: swc_core::ecma::parser::error::Error) -> ParseFailure {
    let at = text.position(text.byte_range(e.span()).start);
    ParseFailure {
        message: e.kind().msg().to_string(),
        line: at.line,
        column: at.column,
    }
}
