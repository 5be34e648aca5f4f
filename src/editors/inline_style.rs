//! Reading and rewriting an element's inline `style={{ ... }}` object.

use swc_core::common::Spanned;
use swc_core::ecma::ast::*;

use super::{EditRefusal, TextEdit};
use crate::ast::{attr_expr, find_attr, prop_name_key};
use crate::parse::SourceText;

pub(crate) enum StyleAttr<'a> {
    Missing,
    Object { attr: &'a JSXAttr, object: &'a ObjectLit },
    /// `style={theme.box}`, `style="..."` and other shapes we can't rewrite.
    Dynamic,
}

impl<'a> StyleAttr<'a> {
    pub fn of(element: &'a JSXElement) -> Self {
        let Some(attr) = find_attr(&element.opening.attrs, "style") else {
            return StyleAttr::Missing;
        };
        match attr.value.as_ref().and_then(attr_expr) {
            Some(Expr::Object(object)) => StyleAttr::Object { attr, object },
            _ => StyleAttr::Dynamic,
        }
    }

    /// Value expression of the last `key` entry, if the object has one.
    pub fn value_of(&self, key: &str) -> Option<&'a Expr> {
        let StyleAttr::Object { object, .. } = *self else {
            return None;
        };
        object.props.iter().rev().find_map(|prop| match prop {
            PropOrSpread::Prop(p) => match &**p {
                Prop::KeyValue(kv) if prop_name_key(&kv.key).as_deref() == Some(key) => {
                    Some(&*kv.value)
                }
                _ => None,
            },
            _ => None,
        })
    }
}

/// Entries to write (`key`, rendered JS value) and keys to drop.
#[derive(Debug, Default)]
pub(crate) struct StylePatch {
    pub sets: Vec<(String, String)>,
    pub removes: Vec<String>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.removes.is_empty()
    }
}

struct Entry {
    key: Option<String>,
    text: String,
}

/// Text edit applying `patch` to the element's style attribute, or `None` when
/// nothing would change.
pub(crate) fn plan_style_edit(
    source: &SourceText<'_>,
    element: &JSXElement,
    patch: &StylePatch,
    indent_unit: &str,
) -> Result<Option<TextEdit>, EditRefusal> {
    if patch.is_empty() {
        return Ok(None);
    }
    match StyleAttr::of(element) {
        StyleAttr::Missing => {
            if patch.sets.is_empty() {
                return Ok(None);
            }
            let entries: Vec<String> = patch.sets.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            let at = attr_insertion_point(source, element);
            Ok(Some(TextEdit::insert(
                at,
                format!(" style={{{{ {} }}}}", entries.join(", ")),
            )))
        }
        StyleAttr::Dynamic => Err(EditRefusal::DynamicAttribute {
            attr: "style".to_string(),
        }),
        StyleAttr::Object { attr, object } => {
            let mut changed = false;
            let mut entries = Vec::with_capacity(object.props.len() + patch.sets.len());
            let mut written: Vec<&str> = Vec::new();

            for prop in &object.props {
                let entry = read_entry(source, prop);
                let Some(key) = entry.key.as_deref() else {
                    entries.push(entry.text);
                    continue;
                };
                if patch.removes.iter().any(|r| r == key) {
                    changed = true;
                    continue;
                }
                match patch.sets.iter().find(|(k, _)| k == key) {
                    Some((k, value)) => {
                        let text = set_entry(source, prop, k, value);
                        changed |= text != entry.text;
                        entries.push(text);
                        written.push(k.as_str());
                    }
                    None => entries.push(entry.text),
                }
            }
            for (key, value) in &patch.sets {
                if !written.contains(&key.as_str()) {
                    entries.push(format!("{key}: {value}"));
                    changed = true;
                }
            }

            if !changed {
                return Ok(None);
            }
            if entries.is_empty() {
                return Ok(Some(TextEdit::replace(remove_attr_range(source, attr), "")));
            }
            let text = render_object(source, object, &entries, indent_unit);
            Ok(Some(TextEdit::replace(source.byte_range(object.span), text)))
        }
    }
}

fn read_entry(source: &SourceText<'_>, prop: &PropOrSpread) -> Entry {
    match prop {
        PropOrSpread::Spread(s) => {
            let start = source.byte_range(s.dot3_token).start;
            let end = source.byte_range(s.expr.span()).end;
            Entry {
                key: None,
                text: source.text()[start..end].to_string(),
            }
        }
        PropOrSpread::Prop(p) => {
            let key = match &**p {
                Prop::KeyValue(kv) => prop_name_key(&kv.key),
                Prop::Shorthand(ident) => Some(ident.sym.to_string()),
                _ => None,
            };
            Entry {
                key,
                text: source.slice(p.span()).to_string(),
            }
        }
    }
}

/// Keep the original key text and separator, swap the value.
fn set_entry(source: &SourceText<'_>, prop: &PropOrSpread, key: &str, value: &str) -> String {
    if let PropOrSpread::Prop(p) = prop {
        if let Prop::KeyValue(kv) = &**p {
            let start = source.byte_range(p.span()).start;
            let value_start = source.byte_range(kv.value.span()).start;
            return format!("{}{value}", &source.text()[start..value_start]);
        }
    }
    format!("{key}: {value}")
}

fn render_object(
    source: &SourceText<'_>,
    object: &ObjectLit,
    entries: &[String],
    indent_unit: &str,
) -> String {
    let bytes = source.byte_range(object.span);
    if !source.text()[bytes.clone()].contains('\n') {
        return format!("{{ {} }}", entries.join(", "));
    }
    let close_indent = source.indentation_at(bytes.end.saturating_sub(1));
    let open_line = source.position(bytes.start).line;
    let entry_indent = object
        .props
        .first()
        .map(|p| source.byte_range(p.span()).start)
        .filter(|start| source.position(*start).line != open_line)
        .map(|start| source.indentation_at(start).to_string())
        .unwrap_or_else(|| format!("{close_indent}{indent_unit}"));
    let body: Vec<String> = entries
        .iter()
        .map(|e| format!("{entry_indent}{e},"))
        .collect();
    format!("{{\n{}\n{close_indent}}}", body.join("\n"))
}

/// Attribute range plus the whitespace separating it from the previous token.
fn remove_attr_range(source: &SourceText<'_>, attr: &JSXAttr) -> std::ops::Range<usize> {
    let range = source.byte_range(attr.span);
    let before = &source.text()[..range.start];
    let start = before.trim_end().len();
    start..range.end
}

/// Just after the tag name (and type arguments), where a new attribute can go.
pub(crate) fn attr_insertion_point(source: &SourceText<'_>, element: &JSXElement) -> usize {
    let span = match &element.opening.type_args {
        Some(args) => args.span,
        None => element.opening.name.span(),
    };
    source.byte_range(span).end
}
