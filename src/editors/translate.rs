use super::inline_style::{plan_style_edit, StyleAttr, StylePatch};
use super::{apply_edits, EditRefusal, EditResult, Editor};
use crate::ast::static_string;

/// Two decimals, trailing zeros stripped: `1.50` -> `1.5`, `2.00` -> `2`.
pub fn format_px(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn axis(part: &str) -> Option<f64> {
    let n: f64 = part.strip_suffix("px").unwrap_or(part).parse().ok()?;
    (part.ends_with("px") || n == 0.0).then_some(n)
}

/// `"12px 4.5px"` -> `(12.0, 4.5)`. A single value moves only the x axis.
fn parse_translate(value: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [x] => Some((axis(x)?, 0.0)),
        [x, y] => Some((axis(x)?, axis(y)?)),
        _ => None,
    }
}

impl Editor<'_> {
    /// Move the element at `(line, column)` by `(dx, dy)` pixels via its inline
    /// `translate` style entry.
    pub fn apply_translate(&self, source: &str, line: usize, column: usize, dx: f64, dy: f64) -> EditResult {
        if !dx.is_finite() || !dy.is_finite() {
            return EditResult::refused(source, EditRefusal::NoChanges);
        }
        let (parsed, element) = match self.locate(source, line, column) {
            Ok(found) => found,
            Err(reason) => return EditResult::refused(source, reason),
        };

        let style = StyleAttr::of(&element);
        if matches!(style, StyleAttr::Dynamic) {
            return EditResult::refused(
                source,
                EditRefusal::DynamicAttribute {
                    attr: "style".to_string(),
                },
            );
        }
        let (x, y) = match style.value_of("translate") {
            None => (0.0, 0.0),
            Some(expr) => match static_string(expr).as_deref().and_then(parse_translate) {
                Some(current) => current,
                None => {
                    return EditResult::refused(
                        source,
                        EditRefusal::DynamicAttribute {
                            attr: "style.translate".to_string(),
                        },
                    )
                }
            },
        };

        let value = format!("{}px {}px", format_px(x + dx), format_px(y + dy));
        let patch = StylePatch {
            sets: vec![(
                "translate".to_string(),
                serde_json::Value::String(value).to_string(),
            )],
            removes: Vec::new(),
        };
        match plan_style_edit(&parsed.source, &element, &patch, &self.indent_unit) {
            Ok(Some(edit)) => EditResult::applied(apply_edits(source, vec![edit])),
            Ok(None) => EditResult::refused(source, EditRefusal::NoChanges),
            Err(reason) => EditResult::refused(source, reason),
        }
    }
}
