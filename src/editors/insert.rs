use swc_core::ecma::ast::*;

use super::{apply_edits, EditRefusal, EditResult, Editor, TextEdit};
use crate::ast::jsx_element_name;
use crate::parse::{Position, SourceText};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// SVG shapes that render nothing meaningful for arbitrary children.
const SVG_PRIMITIVES: &[&str] = &[
    "path", "circle", "ellipse", "line", "polygon", "polyline", "rect", "stop", "use", "image",
];

impl Editor<'_> {
    /// Insert `jsx` as the last child of the element enclosing `(line, column)`.
    pub fn insert_child(&self, source: &str, line: usize, column: usize, jsx: &str) -> EditResult {
        let (parsed, element) = match self.locate(source, line, column) {
            Ok(found) => found,
            Err(reason) => return EditResult::refused(source, reason),
        };
        match plan_insert(&parsed.source, &element, jsx, &self.indent_unit) {
            Ok((edit, at)) => {
                tracing::debug!(line = at.line, column = at.column, "inserted child");
                let mut result = EditResult::applied(apply_edits(source, vec![edit]));
                result.inserted_at = Some(at);
                result
            }
            Err(reason) => EditResult::refused(source, reason),
        }
    }
}

fn plan_insert(
    source: &SourceText<'_>,
    element: &JSXElement,
    jsx: &str,
    indent_unit: &str,
) -> Result<(TextEdit, Position), EditRefusal> {
    let tag = jsx_element_name(&element.opening.name);
    if let JSXElementName::Ident(ident) = &element.opening.name {
        let name = &*ident.sym;
        if VOID_TAGS.contains(&name) {
            return Err(EditRefusal::VoidTag { tag });
        }
        if SVG_PRIMITIVES.contains(&name) {
            return Err(EditRefusal::SvgPrimitive { tag });
        }
    }
    if element.opening.self_closing {
        return Err(EditRefusal::SelfClosing { tag });
    }
    let closing = element
        .closing
        .as_ref()
        .ok_or_else(|| EditRefusal::MissingClosingTag { tag: tag.clone() })?;
    if jsx.trim().is_empty() {
        return Err(EditRefusal::EmptyInsertion);
    }

    let text = source.text();
    let open = source.byte_range(element.opening.span);
    let close_start = source.byte_range(closing.span).start;
    if close_start < open.end {
        return Err(EditRefusal::InvalidTagLocation);
    }

    let indent = source.indentation_at(open.start);
    let child_indent = format!("{indent}{indent_unit}");
    let child_column = child_indent.chars().count() + 1;
    let fragment = reindent(jsx, &child_indent);
    let between = &text[open.end..close_start];

    if !between.contains('\n') {
        if !between.trim().is_empty() {
            return Err(EditRefusal::InlineContent { tag });
        }
        let at = Position::new(source.position(open.end).line + 1, child_column);
        let edit = TextEdit::replace(open.end..close_start, format!("\n{fragment}\n{indent}"));
        return Ok((edit, at));
    }

    let close_line = source.position(close_start).line;
    let line_start = text[..close_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if text[line_start..close_start].trim().is_empty() {
        // closing tag starts its own line: add a line above it
        let at = Position::new(close_line, child_column);
        Ok((TextEdit::insert(line_start, format!("{fragment}\n")), at))
    } else {
        let at = Position::new(close_line + 1, child_column);
        let edit = TextEdit::insert(close_start, format!("\n{fragment}\n{indent}"));
        Ok((edit, at))
    }
}

fn leading_ws(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Trim the fragment, strip its common indentation, and prefix every
/// non-blank line with `indent`.
fn reindent(fragment: &str, indent: &str) -> String {
    let lines: Vec<&str> = fragment.trim().lines().collect();
    let common = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_ws(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if line.trim().is_empty() {
                String::new()
            } else if i == 0 {
                format!("{indent}{line}")
            } else {
                format!("{indent}{}", &line[common.min(leading_ws(line))..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
