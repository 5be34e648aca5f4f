use serde::{Deserialize, Deserializer};
use std::ops::Range;
use swc_core::common::Spanned;
use swc_core::ecma::ast::*;

use super::inline_style::{attr_insertion_point, plan_style_edit, StylePatch};
use super::tokens::{format_token, rewrite_class_list};
use super::{apply_edits, EditRefusal, EditResult, Editor, TextEdit};
use crate::ast::{format_js_number, is_class_attr, static_string, unwrap_expr};
use crate::parse::SourceText;

// -----------------------------------------------------------------------------
// Update payload
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleField {
    BackgroundColor,
    TextColor,
    FontSize,
    FontWeight,
    BorderColor,
    BorderWidth,
    BorderRadius,
}

impl StyleField {
    pub const ALL: [StyleField; 7] = [
        StyleField::BackgroundColor,
        StyleField::TextColor,
        StyleField::FontSize,
        StyleField::FontWeight,
        StyleField::BorderColor,
        StyleField::BorderWidth,
        StyleField::BorderRadius,
    ];

    /// Key of the field inside a React inline style object.
    pub fn css_property(self) -> &'static str {
        match self {
            StyleField::BackgroundColor => "backgroundColor",
            StyleField::TextColor => "color",
            StyleField::FontSize => "fontSize",
            StyleField::FontWeight => "fontWeight",
            StyleField::BorderColor => "borderColor",
            StyleField::BorderWidth => "borderWidth",
            StyleField::BorderRadius => "borderRadius",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(t) => Some(t),
            StyleValue::Number(_) => None,
        }
    }

    /// JS expression for an inline style entry.
    fn to_js(&self) -> String {
        match self {
            StyleValue::Number(n) => format_js_number(*n),
            StyleValue::Text(t) => serde_json::Value::String(t.clone()).to_string(),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

/// Absent field: leave alone. `null`: clear. Value: set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleUpdate {
    #[serde(default, deserialize_with = "present")]
    pub background_color: Option<Option<StyleValue>>,
    #[serde(default, alias = "color", deserialize_with = "present")]
    pub text_color: Option<Option<StyleValue>>,
    #[serde(default, deserialize_with = "present")]
    pub font_size: Option<Option<StyleValue>>,
    #[serde(default, deserialize_with = "present")]
    pub font_weight: Option<Option<StyleValue>>,
    #[serde(default, deserialize_with = "present")]
    pub border_color: Option<Option<StyleValue>>,
    #[serde(default, deserialize_with = "present")]
    pub border_width: Option<Option<StyleValue>>,
    #[serde(default, deserialize_with = "present")]
    pub border_radius: Option<Option<StyleValue>>,
}

fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<StyleValue>>, D::Error> {
    Option::<StyleValue>::deserialize(d).map(Some)
}

impl StyleUpdate {
    fn slot(&self, field: StyleField) -> &Option<Option<StyleValue>> {
        match field {
            StyleField::BackgroundColor => &self.background_color,
            StyleField::TextColor => &self.text_color,
            StyleField::FontSize => &self.font_size,
            StyleField::FontWeight => &self.font_weight,
            StyleField::BorderColor => &self.border_color,
            StyleField::BorderWidth => &self.border_width,
            StyleField::BorderRadius => &self.border_radius,
        }
    }

    fn slot_mut(&mut self, field: StyleField) -> &mut Option<Option<StyleValue>> {
        match field {
            StyleField::BackgroundColor => &mut self.background_color,
            StyleField::TextColor => &mut self.text_color,
            StyleField::FontSize => &mut self.font_size,
            StyleField::FontWeight => &mut self.font_weight,
            StyleField::BorderColor => &mut self.border_color,
            StyleField::BorderWidth => &mut self.border_width,
            StyleField::BorderRadius => &mut self.border_radius,
        }
    }

    pub fn set(mut self, field: StyleField, value: impl Into<StyleValue>) -> Self {
        *self.slot_mut(field) = Some(Some(value.into()));
        self
    }

    pub fn clear(mut self, field: StyleField) -> Self {
        *self.slot_mut(field) = Some(None);
        self
    }

    /// Fields present in the update, in a fixed order.
    pub fn entries(&self) -> Vec<(StyleField, Option<&StyleValue>)> {
        StyleField::ALL
            .iter()
            .filter_map(|&field| self.slot(field).as_ref().map(|v| (field, v.as_ref())))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// className targeting
// -----------------------------------------------------------------------------

enum ClassTarget {
    /// No class attribute; a new one goes at `insert_at`.
    Missing { insert_at: usize },
    /// Static value whose literal occupies `range`.
    Static {
        value: String,
        range: Range<usize>,
        quote: Option<char>,
    },
    Dynamic,
}

fn class_target(source: &SourceText<'_>, element: &JSXElement) -> ClassTarget {
    let attr = element
        .opening
        .attrs
        .iter()
        .filter_map(|a| match a {
            JSXAttrOrSpread::JSXAttr(attr) if is_class_attr(attr) => Some(attr),
            _ => None,
        })
        .last();
    let Some(attr) = attr else {
        return ClassTarget::Missing {
            insert_at: attr_insertion_point(source, element),
        };
    };
    match &attr.value {
        Some(JSXAttrValue::Lit(Lit::Str(s))) => {
            let range = source.byte_range(s.span);
            let quote = source.text()[range.clone()].chars().next();
            ClassTarget::Static {
                value: s.value.to_string(),
                range,
                quote,
            }
        }
        Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
            expr: JSXExpr::Expr(expr),
            ..
        })) => match static_string(expr) {
            Some(value) => ClassTarget::Static {
                value,
                range: source.byte_range(unwrap_expr(expr).span()),
                quote: None,
            },
            None => ClassTarget::Dynamic,
        },
        _ => ClassTarget::Dynamic,
    }
}

/// Attribute-string form when the quote allows it, else a JS string literal.
fn class_literal(value: &str, quote: Option<char>) -> String {
    match quote {
        Some(q @ ('"' | '\'')) if !value.contains(q) => format!("{q}{value}{q}"),
        Some(_) => format!("{{{}}}", serde_json::Value::String(value.to_string())),
        None => serde_json::Value::String(value.to_string()).to_string(),
    }
}

// -----------------------------------------------------------------------------
// Editor
// -----------------------------------------------------------------------------

impl Editor<'_> {
    /// Apply style fields to the element at `(line, column)`, preferring
    /// Tailwind classes and falling back to inline style entries.
    pub fn apply_style_update(
        &self,
        source: &str,
        line: usize,
        column: usize,
        update: &StyleUpdate,
    ) -> EditResult {
        let entries = update.entries();
        if entries.is_empty() {
            return EditResult::refused(source, EditRefusal::NoChanges);
        }
        let (parsed, element) = match self.locate(source, line, column) {
            Ok(found) => found,
            Err(reason) => return EditResult::refused(source, reason),
        };
        let text = &parsed.source;

        let mut edits: Vec<TextEdit> = Vec::new();
        let mut notices: Vec<String> = Vec::new();
        let mut patch = StylePatch::default();

        match class_target(text, &element) {
            ClassTarget::Dynamic => {
                notices.push(format!(
                    "className is dynamic; wrote {} field(s) as inline style instead",
                    entries.len()
                ));
                for (field, value) in &entries {
                    let key = field.css_property().to_string();
                    match value {
                        Some(v) => patch.sets.push((key, v.to_js())),
                        None => patch.removes.push(key),
                    }
                }
            }
            target => {
                let mut tokens: Vec<(StyleField, Option<String>)> = Vec::new();
                for (field, value) in &entries {
                    let key = field.css_property().to_string();
                    match value {
                        None => {
                            tokens.push((*field, None));
                            patch.removes.push(key);
                        }
                        Some(v) => match format_token(*field, v) {
                            Some(token) => {
                                tokens.push((*field, Some(token)));
                                patch.removes.push(key);
                            }
                            None => {
                                notices.push(format!(
                                    "{key} has no class form; wrote it as inline style"
                                ));
                                patch.sets.push((key, v.to_js()));
                            }
                        },
                    }
                }
                if let Some(edit) = class_edit(target, &tokens) {
                    edits.push(edit);
                }
            }
        }

        match plan_style_edit(text, &element, &patch, &self.indent_unit) {
            Ok(Some(edit)) => edits.push(edit),
            Ok(None) => {}
            Err(_) if patch.sets.is_empty() => {
                notices.push("style is dynamic; existing inline entries were left in place".into())
            }
            Err(reason) => return EditResult::refused(source, reason).with_notices(notices),
        }

        if edits.is_empty() {
            return EditResult::refused(source, EditRefusal::NoChanges).with_notices(notices);
        }
        tracing::debug!(edits = edits.len(), "applied style update");
        EditResult::applied(apply_edits(source, edits)).with_notices(notices)
    }
}

fn class_edit(target: ClassTarget, tokens: &[(StyleField, Option<String>)]) -> Option<TextEdit> {
    match target {
        ClassTarget::Missing { insert_at } => {
            let classes = rewrite_class_list("", tokens);
            (!classes.is_empty()).then(|| {
                TextEdit::insert(insert_at, format!(" className={}", class_literal(&classes, Some('"'))))
            })
        }
        ClassTarget::Static { value, range, quote } => {
            let classes = rewrite_class_list(&value, tokens);
            (classes != value).then(|| TextEdit::replace(range, class_literal(&classes, quote)))
        }
        ClassTarget::Dynamic => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SourceParser;
    use pretty_assertions::assert_eq;

    fn apply(src: &str, line: usize, column: usize, update: StyleUpdate) -> EditResult {
        let parser = SourceParser::new();
        Editor::new(&parser, "  ").apply_style_update(src, line, column, &update)
    }

    #[test]
    fn payload_distinguishes_null_from_absent() {
        let update: StyleUpdate =
            serde_json::from_str(r##"{"backgroundColor":"#fff","color":null,"borderWidth":2}"##).unwrap();
        assert_eq!(update.background_color, Some(Some(StyleValue::Text("#fff".into()))));
        assert_eq!(update.text_color, Some(None));
        assert_eq!(update.border_width, Some(Some(StyleValue::Number(2.0))));
        assert_eq!(update.font_size, None);
        assert_eq!(
            update.entries().iter().map(|(f, _)| *f).collect::<Vec<_>>(),
            vec![StyleField::BackgroundColor, StyleField::TextColor, StyleField::BorderWidth]
        );
    }

    #[test]
    fn rewrites_static_class_name() {
        let src = "const a = <div className=\"p-4 bg-red-500 text-white\">x</div>;";
        let result = apply(
            src,
            1,
            12,
            StyleUpdate::default()
                .set(StyleField::BackgroundColor, "#00FF00")
                .set(StyleField::BorderWidth, 2.0),
        );
        assert!(result.changed);
        assert_eq!(
            result.source,
            "const a = <div className=\"p-4 text-white bg-[#00ff00] border-2\">x</div>;"
        );
        assert!(result.notices.is_empty());
    }

    #[test]
    fn class_rewrite_removes_inline_entry_for_same_field() {
        let src = "const a = <div className=\"bg-red-500\" style={{ backgroundColor: \"red\", margin: 4 }}>x</div>;";
        let result = apply(src, 1, 12, StyleUpdate::default().set(StyleField::BackgroundColor, "#112233"));
        assert_eq!(
            result.source,
            "const a = <div className=\"bg-[#112233]\" style={{ margin: 4 }}>x</div>;"
        );
    }

    #[test]
    fn adds_class_name_when_missing() {
        let src = "const a = <span>x</span>;";
        let result = apply(src, 1, 12, StyleUpdate::default().set(StyleField::FontWeight, 600.0));
        assert_eq!(result.source, "const a = <span className=\"font-semibold\">x</span>;");
    }

    #[test]
    fn folds_concatenated_class_names() {
        let src = "const a = <p className={\"text-sm \" + \"italic\"}>x</p>;";
        let result = apply(src, 1, 12, StyleUpdate::default().set(StyleField::FontSize, 18.0));
        assert_eq!(result.source, "const a = <p className={\"italic text-lg\"}>x</p>;");
    }

    #[test]
    fn dynamic_class_name_falls_back_to_inline_style() {
        let src = "const a = <div className={cx(\"a\", b)} style={{ color: \"red\" }}>x</div>;";
        let result = apply(
            src,
            1,
            12,
            StyleUpdate::default()
                .set(StyleField::BackgroundColor, "#fff")
                .clear(StyleField::TextColor),
        );
        assert!(result.changed);
        assert_eq!(
            result.source,
            "const a = <div className={cx(\"a\", b)} style={{ backgroundColor: \"#fff\" }}>x</div>;"
        );
        assert_eq!(result.notices.len(), 1);
    }

    #[test]
    fn dynamic_class_and_style_is_refused() {
        let src = "const a = <div className={cx()} style={s}>x</div>;";
        let result = apply(src, 1, 12, StyleUpdate::default().set(StyleField::BackgroundColor, "#fff"));
        assert!(!result.changed);
        assert_eq!(result.source, src);
        assert_eq!(result.reason, Some(EditRefusal::DynamicAttribute { attr: "style".into() }));
    }

    #[test]
    fn unchanged_classes_report_no_changes() {
        let src = "const a = <div className=\"border\">x</div>;";
        let result = apply(src, 1, 12, StyleUpdate::default().set(StyleField::BorderWidth, 1.0));
        assert!(!result.changed);
        assert_eq!(result.reason, Some(EditRefusal::NoChanges));
    }

    #[test]
    fn empty_update_is_refused() {
        let result = apply("<div></div>", 1, 2, StyleUpdate::default());
        assert_eq!(result.reason, Some(EditRefusal::NoChanges));
    }
}
