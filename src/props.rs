//! Exported components and their prop schema.
//!
//! Every exported function component contributes the keys it destructures
//! from its props parameter. Defaults come from literal initializers, types
//! from the default's shape or the TypeScript annotation, and entries for the
//! same key are merged across components.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::ast::{
    entity_name, first_type_arg, literal_value, prop_name_key, unwrap_expr,
    PropType, ResolvedType, TypeMember, TypeScope,
};

/// Hops allowed from an export to its function (`export default memo(Button)`).
const MAX_INDIRECTION: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDefinition {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub prop_type: PropType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedComponent {
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedProps {
    pub exports: Vec<ExportedComponent>,
    pub props_schema: Vec<PropDefinition>,
    pub default_props: Map<String, Value>,
    pub duplicate_keys: Vec<String>,
}

impl DerivedProps {
    pub fn prop(&self, key: &str) -> Option<&PropDefinition> {
        self.props_schema.iter().find(|p| p.key == key)
    }
}

// -----------------------------------------------------------------------------
// Function bindings
// -----------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum FnBody<'a> {
    Block(&'a BlockStmt),
    Arrow(&'a BlockStmtOrExpr),
    Missing,
}

#[derive(Clone)]
struct ComponentFn<'a> {
    first_param: Option<&'a Pat>,
    body: FnBody<'a>,
    /// Props type from `const X: FC<Props> = ...`.
    declared_props: Option<&'a TsType>,
}

impl<'a> ComponentFn<'a> {
    fn from_function(f: &'a Function) -> Self {
        Self {
            first_param: f.params.first().map(|p| &p.pat),
            body: f.body.as_ref().map(FnBody::Block).unwrap_or(FnBody::Missing),
            declared_props: None,
        }
    }

    fn from_arrow(a: &'a ArrowExpr) -> Self {
        Self {
            first_param: a.params.first(),
            body: FnBody::Arrow(&a.body),
            declared_props: None,
        }
    }

    fn from_expr(expr: &'a Expr) -> Option<Self> {
        match unwrap_expr(expr) {
            Expr::Fn(f) => Some(Self::from_function(&f.function)),
            Expr::Arrow(a) => Some(Self::from_arrow(a)),
            _ => None,
        }
    }
}

struct LocalVar<'a> {
    init: &'a Expr,
    declared_props: Option<&'a TsType>,
}

#[derive(Default)]
struct Locals<'a> {
    fns: FxHashMap<String, ComponentFn<'a>>,
    vars: FxHashMap<String, LocalVar<'a>>,
}

impl<'a> Locals<'a> {
    fn collect(module: &'a Module) -> Self {
        let mut locals = Self::default();
        for item in &module.body {
            let decl = match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => decl,
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl { decl, .. })) => decl,
                _ => continue,
            };
            match decl {
                Decl::Fn(f) => {
                    locals
                        .fns
                        .insert(f.ident.sym.to_string(), ComponentFn::from_function(&f.function));
                }
                Decl::Var(v) => {
                    for d in &v.decls {
                        let (Some(name), Some(init)) = (d.name.as_ident(), d.init.as_deref()) else {
                            continue;
                        };
                        locals.vars.insert(
                            name.id.sym.to_string(),
                            LocalVar {
                                init,
                                declared_props: declared_props_type(name.type_ann.as_deref()),
                            },
                        );
                    }
                }
                _ => {}
            }
        }
        locals
    }

    fn resolve_name(&self, name: &str, hops: usize) -> Option<ComponentFn<'a>> {
        if let Some(f) = self.fns.get(name) {
            return Some(f.clone());
        }
        let var = self.vars.get(name)?;
        self.resolve_expr(var.init, var.declared_props, hops)
    }

    fn resolve_expr(
        &self,
        expr: &'a Expr,
        declared_props: Option<&'a TsType>,
        hops: usize,
    ) -> Option<ComponentFn<'a>> {
        if let Some(mut f) = ComponentFn::from_expr(expr) {
            f.declared_props = f.declared_props.or(declared_props);
            return Some(f);
        }
        if hops >= MAX_INDIRECTION {
            return None;
        }
        match unwrap_expr(expr) {
            Expr::Ident(i) => self.resolve_name(i.sym.as_ref(), hops + 1),
            Expr::Call(c) => {
                let arg = c.args.first().filter(|a| a.spread.is_none())?;
                self.resolve_expr(&arg.expr, declared_props, hops + 1)
            }
            _ => None,
        }
    }
}

/// `FC<P>`, `React.FC<P>`, `FunctionComponent<P>` → `P`.
fn declared_props_type(ann: Option<&TsTypeAnn>) -> Option<&TsType> {
    let TsType::TsTypeRef(r) = &*ann?.type_ann else {
        return None;
    };
    let name = entity_name(&r.type_name);
    let short = name.rsplit('.').next().unwrap_or(&name);
    match short {
        "FC" | "FunctionComponent" | "VFC" | "VoidFunctionComponent" => first_type_arg(r),
        _ => None,
    }
}

fn exported_components<'a>(module: &'a Module, locals: &Locals<'a>) -> Vec<(ExportedComponent, ComponentFn<'a>)> {
    let mut out = Vec::new();
    let mut push = |name: String, f: Option<ComponentFn<'a>>| {
        if let Some(f) = f {
            let is_default = name == "default";
            out.push((ExportedComponent { name, is_default }, f));
        }
    };
    for item in &module.body {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };
        match decl {
            ModuleDecl::ExportDefaultDecl(ed) => {
                if let DefaultDecl::Fn(f) = &ed.decl {
                    push("default".into(), Some(ComponentFn::from_function(&f.function)));
                }
            }
            ModuleDecl::ExportDefaultExpr(ee) => {
                push("default".into(), locals.resolve_expr(&ee.expr, None, 0));
            }
            ModuleDecl::ExportDecl(ed) => match &ed.decl {
                Decl::Fn(f) => push(
                    f.ident.sym.to_string(),
                    Some(ComponentFn::from_function(&f.function)),
                ),
                Decl::Var(v) => {
                    for d in &v.decls {
                        if let Some(name) = d.name.as_ident() {
                            let key = name.id.sym.to_string();
                            push(key.clone(), locals.resolve_name(&key, 0));
                        }
                    }
                }
                _ => {}
            },
            ModuleDecl::ExportNamed(named) if named.src.is_none() && !named.type_only => {
                for spec in &named.specifiers {
                    let ExportSpecifier::Named(spec) = spec else {
                        continue;
                    };
                    if spec.is_type_only {
                        continue;
                    }
                    let ModuleExportName::Ident(orig) = &spec.orig else {
                        continue;
                    };
                    let exported = spec
                        .exported
                        .as_ref()
                        .map(|e| match e {
                            ModuleExportName::Ident(i) => i.sym.to_string(),
                            ModuleExportName::Str(s) => s.value.to_string(),
                        })
                        .unwrap_or_else(|| orig.sym.to_string());
                    push(exported, locals.resolve_name(orig.sym.as_ref(), 0));
                }
            }
            _ => {}
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Destructured keys
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PropEntry {
    key: String,
    default: Option<Value>,
    resolved: Option<ResolvedType>,
    optional: bool,
}

/// Collects every `const { ... } = <name>` in a function body.
struct DestructureFinder<'n> {
    name: &'n str,
    found: Vec<ObjectPat>,
}

impl Visit for DestructureFinder<'_> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let (Pat::Object(obj), Some(init)) = (&d.name, &d.init) {
            if matches!(unwrap_expr(init), Expr::Ident(i) if i.sym.as_ref() == self.name) {
                self.found.push(obj.clone());
            }
        }
        d.visit_children_with(self);
    }
}

fn component_entries(f: &ComponentFn<'_>, scope: &TypeScope<'_>) -> Vec<PropEntry> {
    let Some(param) = f.first_param else {
        return Vec::new();
    };
    let param = match param {
        Pat::Assign(a) => &*a.left,
        other => other,
    };
    match param {
        Pat::Object(obj) => {
            let ann = obj.type_ann.as_deref().map(|a| &*a.type_ann).or(f.declared_props);
            pattern_entries(obj, ann, scope)
        }
        Pat::Ident(ident) => {
            let ann = ident
                .type_ann
                .as_deref()
                .map(|a| &*a.type_ann)
                .or(f.declared_props);
            let mut finder = DestructureFinder {
                name: ident.id.sym.as_ref(),
                found: Vec::new(),
            };
            match f.body {
                FnBody::Block(b) => b.visit_with(&mut finder),
                FnBody::Arrow(b) => b.visit_with(&mut finder),
                FnBody::Missing => {}
            }
            finder
                .found
                .iter()
                .flat_map(|obj| {
                    let own = obj.type_ann.as_deref().map(|a| &*a.type_ann);
                    pattern_entries(obj, own.or(ann), scope)
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

fn pattern_entries(obj: &ObjectPat, ann: Option<&TsType>, scope: &TypeScope<'_>) -> Vec<PropEntry> {
    let members: Vec<TypeMember<'_>> = ann.map(|t| scope.members(t)).unwrap_or_default();
    let member = |key: &str| members.iter().rev().find(|m| m.key == key);

    let mut out = Vec::new();
    for prop in &obj.props {
        let (key, default) = match prop {
            ObjectPatProp::Assign(a) => (
                a.key.id.sym.to_string(),
                a.value.as_deref().and_then(literal_value),
            ),
            ObjectPatProp::KeyValue(kv) => {
                let Some(key) = prop_name_key(&kv.key) else {
                    continue;
                };
                let default = match &*kv.value {
                    Pat::Assign(ap) => literal_value(&ap.right),
                    _ => None,
                };
                (key, default)
            }
            ObjectPatProp::Rest(_) => continue,
        };
        let (resolved, optional) = match member(&key) {
            Some(m) => (
                m.ty.and_then(|t| scope.resolve(t)),
                m.optional || m.ty.map(admits_undefined).unwrap_or(false),
            ),
            None => (None, false),
        };
        out.push(PropEntry {
            key,
            default,
            resolved,
            optional,
        });
    }
    out
}

fn admits_undefined(ty: &TsType) -> bool {
    match ty {
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(u)) => u
            .types
            .iter()
            .any(|t| matches!(&**t, TsType::TsKeywordType(k) if k.kind == TsKeywordTypeKind::TsUndefinedKeyword)),
        TsType::TsParenthesizedType(p) => admits_undefined(&p.type_ann),
        _ => false,
    }
}

fn type_of_default(value: &Value) -> Option<PropType> {
    match value {
        Value::String(_) => Some(PropType::String),
        Value::Number(_) => Some(PropType::Number),
        Value::Bool(_) => Some(PropType::Boolean),
        Value::Array(_) => Some(PropType::Array),
        Value::Object(_) => Some(PropType::Object),
        Value::Null => None,
    }
}

// -----------------------------------------------------------------------------
// Merge
// -----------------------------------------------------------------------------

struct MergedProp {
    key: String,
    prop_type: PropType,
    /// False when `prop_type` is the string fallback.
    type_known: bool,
    enum_values: Option<Vec<Value>>,
    default: Option<Value>,
    required: bool,
}

impl MergedProp {
    fn from_entry(entry: PropEntry) -> Self {
        let (prop_type, type_known, enum_values) = infer_type(&entry);
        let required = entry.default.is_none() && !entry.optional;
        Self {
            key: entry.key,
            prop_type,
            type_known,
            enum_values,
            default: entry.default,
            required,
        }
    }

    fn merge(&mut self, entry: PropEntry) {
        let incoming = MergedProp::from_entry(entry);
        if self.default.is_none() && incoming.default.is_some() {
            self.default = incoming.default;
        }
        let has_enum = self.prop_type == PropType::Enum && self.enum_values.is_some();
        if !has_enum
            && (incoming.prop_type == PropType::Enum || (!self.type_known && incoming.type_known))
        {
            self.prop_type = incoming.prop_type;
            self.type_known = incoming.type_known;
            self.enum_values = incoming.enum_values;
        }
        self.required = self.default.is_none() && (self.required || incoming.required);
    }

    fn into_definition(self) -> (PropDefinition, Option<Value>) {
        let definition = PropDefinition {
            label: humanize_key(&self.key),
            key: self.key,
            prop_type: self.prop_type,
            required: self.required,
            enum_values: self.enum_values,
        };
        (definition, self.default)
    }
}

/// An annotated enum wins; otherwise the default's shape, then the annotation.
fn infer_type(entry: &PropEntry) -> (PropType, bool, Option<Vec<Value>>) {
    if let Some(ResolvedType {
        kind: PropType::Enum,
        enum_values,
    }) = &entry.resolved
    {
        return (PropType::Enum, true, enum_values.clone());
    }
    if let Some(kind) = entry.default.as_ref().and_then(type_of_default) {
        return (kind, true, None);
    }
    match &entry.resolved {
        Some(r) => (r.kind, true, None),
        None => (PropType::String, false, None),
    }
}

/// `backgroundColor` → `Background Color`, `on_click` → `On Click`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn derive_props(module: &Module) -> DerivedProps {
    let scope = TypeScope::collect(module);
    let locals = Locals::collect(module);
    let components = exported_components(module, &locals);

    let mut merged: Vec<MergedProp> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut owners: BTreeMap<String, usize> = BTreeMap::new();
    let mut exports = Vec::with_capacity(components.len());

    for (export, f) in &components {
        exports.push(export.clone());
        let mut seen_here: Vec<String> = Vec::new();
        for entry in component_entries(f, &scope) {
            if !seen_here.contains(&entry.key) {
                seen_here.push(entry.key.clone());
            }
            match index.get(&entry.key) {
                Some(&idx) => merged[idx].merge(entry),
                None => {
                    index.insert(entry.key.clone(), merged.len());
                    merged.push(MergedProp::from_entry(entry));
                }
            }
        }
        for key in seen_here {
            *owners.entry(key).or_default() += 1;
        }
    }

    let mut props_schema = Vec::with_capacity(merged.len());
    let mut default_props = Map::new();
    for prop in merged {
        let (definition, default) = prop.into_definition();
        if let Some(default) = default {
            default_props.insert(definition.key.clone(), default);
        }
        props_schema.push(definition);
    }
    let duplicate_keys = owners
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(key, _)| key)
        .collect();

    DerivedProps {
        exports,
        props_schema,
        default_props,
        duplicate_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SourceParser;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn derive(src: &str) -> DerivedProps {
        let parsed = SourceParser::new().parse(src).unwrap();
        derive_props(&parsed.module)
    }

    #[test]
    fn defaults_and_required_from_annotation() {
        let d = derive("export default function C({ a = 1, b }: { a?: number; b: string }) { return null; }");
        let a = d.prop("a").unwrap();
        let b = d.prop("b").unwrap();
        assert!(!a.required);
        assert_eq!(a.prop_type, PropType::Number);
        assert!(b.required);
        assert_eq!(b.prop_type, PropType::String);
        assert_eq!(d.default_props.get("a"), Some(&json!(1)));
        assert_eq!(d.default_props.get("b"), None);
        assert_eq!(
            d.exports,
            vec![ExportedComponent { name: "default".into(), is_default: true }]
        );
    }

    #[test]
    fn schema_serializes_with_documented_shape() {
        let d = derive(r#"export function Badge({ tone = "info" }: { tone?: "info" | "warn" }) { return null; }"#);
        assert_eq!(
            serde_json::to_value(&d.props_schema).unwrap(),
            json!([{
                "key": "tone",
                "label": "Tone",
                "type": "enum",
                "required": false,
                "enumValues": ["info", "warn"]
            }])
        );
    }

    #[test]
    fn infers_types_from_default_shapes() {
        let d = derive(
            r#"export const Card = ({ title = "Hi", count = -2, on = false, items = [1, 2], style = { a: { b: 1 } }, fn = () => 1, n = null }) => null;"#,
        );
        let ty = |k: &str| d.prop(k).unwrap().prop_type;
        assert_eq!(ty("title"), PropType::String);
        assert_eq!(ty("count"), PropType::Number);
        assert_eq!(ty("on"), PropType::Boolean);
        assert_eq!(ty("items"), PropType::Array);
        assert_eq!(ty("style"), PropType::Object);
        assert_eq!(ty("fn"), PropType::String);
        assert!(d.prop("fn").unwrap().required);
        assert_eq!(d.default_props["count"], json!(-2));
        assert_eq!(d.default_props["style"], json!({"a": {"b": 1}}));
        assert_eq!(d.default_props["n"], Value::Null);
        assert!(!d.prop("n").unwrap().required);
        assert!(!d.default_props.contains_key("fn"));
    }

    #[test]
    fn identifier_param_scans_body_destructurings() {
        let d = derive(
            r#"
type Props = { size?: "sm" | "lg"; label: string; extra: number };
export default function Button(props: Props) {
  const { size = "sm" } = props;
  const { label, ...rest } = props;
  return <button>{label}</button>;
}"#,
        );
        let keys: Vec<&str> = d.props_schema.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["size", "label"]);
        let size = d.prop("size").unwrap();
        assert_eq!(size.prop_type, PropType::Enum);
        assert_eq!(size.enum_values, Some(vec![json!("sm"), json!("lg")]));
        assert!(d.prop("label").unwrap().required);
    }

    #[test]
    fn resolves_export_indirection() {
        let d = derive(
            r#"
import { memo } from "react";
function Inner({ a }) { return null; }
const Wrapped = memo(({ b = 2 }) => null);
const Alias = Inner;
export default memo(Inner);
export { Wrapped, Alias as Renamed };
export const NotAComponent = 42;
"#,
        );
        let names: Vec<&str> = d.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["default", "Wrapped", "Renamed"]);
        assert_eq!(d.duplicate_keys, vec!["a".to_string()]);
        assert_eq!(d.default_props["b"], json!(2));
    }

    #[test]
    fn merge_keeps_defaults_and_enums() {
        let d = derive(
            r#"
export function A({ tone, size = 3 }: { tone: "a" | "b"; size: number }) { return null; }
export function B({ tone = "a", size, label }) { return null; }
export function C({ label = "x", [key]: computed }) { return null; }
"#,
        );
        let tone = d.prop("tone").unwrap();
        assert_eq!(tone.prop_type, PropType::Enum);
        assert!(!tone.required);
        assert_eq!(d.default_props["tone"], json!("a"));
        assert_eq!(d.default_props["size"], json!(3));
        assert!(!d.prop("size").unwrap().required);
        assert!(!d.prop("label").unwrap().required);
        assert_eq!(
            d.duplicate_keys,
            vec!["label".to_string(), "size".to_string(), "tone".to_string()]
        );
        assert!(d.prop("key").is_none());
    }

    #[test]
    fn fc_annotation_supplies_props_type() {
        let d = derive(
            r#"
interface Props { variant?: "solid" | "ghost"; disabled: boolean }
export const Btn: React.FC<Props> = ({ variant, disabled }) => null;
"#,
        );
        let variant = d.prop("variant").unwrap();
        assert_eq!(variant.prop_type, PropType::Enum);
        assert!(!variant.required);
        assert_eq!(d.prop("disabled").unwrap().prop_type, PropType::Boolean);
        assert!(d.prop("disabled").unwrap().required);
    }

    #[test]
    fn renamed_and_defaulted_key_value_patterns() {
        let d = derive(
            "export default function X({ title: heading = 'T', maybe }: { title?: string; maybe: string | undefined }) { return null; }",
        );
        assert_eq!(d.default_props["title"], json!("T"));
        assert!(!d.prop("maybe").unwrap().required);
    }

    #[test]
    fn nullable_literal_union_ignores_null() {
        let d = derive(r#"export function X({ v }: { v: "a" | "b" | null }) { return null; }"#);
        assert_eq!(d.prop("v").unwrap().enum_values, Some(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn humanizes_keys() {
        assert_eq!(humanize_key("backgroundColor"), "Background Color");
        assert_eq!(humanize_key("on_click"), "On Click");
        assert_eq!(humanize_key("aria-label"), "Aria Label");
        assert_eq!(humanize_key("x"), "X");
        assert_eq!(humanize_key("htmlURL"), "Html URL");
    }
}
