//! Node-shape helpers shared by the deriver, editors, inspector and the
//! Tailwind extractor: JSX names and attributes, static literal extraction,
//! and TypeScript annotation resolution.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use serde_json::Value;
use swc_core::ecma::ast::*;

/// Depth cap for recursive walks over expressions and types.
pub const MAX_WALK_DEPTH: usize = 64;

// -----------------------------------------------------------------------------
// JSX names & attributes
// -----------------------------------------------------------------------------

/// `div`, `Foo.Bar.Baz`, `svg:rect`.
pub fn jsx_element_name(name: &JSXElementName) -> String {
    match name {
        JSXElementName::Ident(ident) => ident.sym.to_string(),
        JSXElementName::JSXMemberExpr(m) => {
            format!("{}.{}", jsx_object_name(&m.obj), m.prop.sym)
        }
        JSXElementName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

fn jsx_object_name(obj: &JSXObject) -> String {
    match obj {
        JSXObject::Ident(ident) => ident.sym.to_string(),
        JSXObject::JSXMemberExpr(m) => format!("{}.{}", jsx_object_name(&m.obj), m.prop.sym),
    }
}

pub fn jsx_attr_name(name: &JSXAttrName) -> String {
    match name {
        JSXAttrName::Ident(ident) => ident.sym.to_string(),
        JSXAttrName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

/// Last attribute named `name`; JSX lets later duplicates win.
pub fn find_attr<'a>(attrs: &'a [JSXAttrOrSpread], name: &str) -> Option<&'a JSXAttr> {
    attrs
        .iter()
        .filter_map(|a| match a {
            JSXAttrOrSpread::JSXAttr(attr) if jsx_attr_name(&attr.name) == name => Some(attr),
            _ => None,
        })
        .last()
}

pub fn is_class_attr(attr: &JSXAttr) -> bool {
    matches!(jsx_attr_name(&attr.name).as_str(), "className" | "class")
}

/// Expression inside `attr={...}`, if any.
pub fn attr_expr(value: &JSXAttrValue) -> Option<&Expr> {
    match value {
        JSXAttrValue::JSXExprContainer(JSXExprContainer {
            expr: JSXExpr::Expr(expr),
            ..
        }) => Some(unwrap_expr(expr)),
        _ => None,
    }
}

/// Static string value of an attribute: `"a"`, `{"a"}`, `` {`a`} ``, `{"a" + "b"}`.
pub fn attr_static_string(value: &JSXAttrValue) -> Option<String> {
    match value {
        JSXAttrValue::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        _ => attr_expr(value).and_then(static_string),
    }
}

// -----------------------------------------------------------------------------
// Expressions
// -----------------------------------------------------------------------------

/// Strip parentheses and TS-only wrappers (`as`, `satisfies`, `!`, `as const`).
pub fn unwrap_expr(mut expr: &Expr) -> &Expr {
    for _ in 0..MAX_WALK_DEPTH {
        expr = match expr {
            Expr::Paren(p) => &p.expr,
            Expr::TsAs(a) => &a.expr,
            Expr::TsSatisfies(s) => &s.expr,
            Expr::TsNonNull(n) => &n.expr,
            Expr::TsConstAssertion(c) => &c.expr,
            _ => return expr,
        };
    }
    expr
}

pub fn is_function_expr(expr: &Expr) -> bool {
    matches!(unwrap_expr(expr), Expr::Fn(_) | Expr::Arrow(_))
}

/// Compile-time string value: string literal, template without substitutions,
/// or `+` concatenation of those (numbers allowed as operands).
pub fn static_string(expr: &Expr) -> Option<String> {
    fold_string(expr, 0)
}

fn fold_string(expr: &Expr, depth: usize) -> Option<String> {
    if depth > MAX_WALK_DEPTH {
        return None;
    }
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        Expr::Tpl(t) => template_string(t),
        Expr::Bin(b) if b.op == BinaryOp::Add => {
            let left = fold_operand(&b.left, depth + 1)?;
            let right = fold_operand(&b.right, depth + 1)?;
            match (left, right) {
                (Operand::Num(_), Operand::Num(_)) => None,
                (l, r) => Some(format!("{}{}", l.into_string(), r.into_string())),
            }
        }
        _ => None,
    }
}

enum Operand {
    Str(String),
    Num(f64),
}

impl Operand {
    fn into_string(self) -> String {
        match self {
            Operand::Str(s) => s,
            Operand::Num(n) => format_js_number(n),
        }
    }
}

fn fold_operand(expr: &Expr, depth: usize) -> Option<Operand> {
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Num(n)) => Some(Operand::Num(n.value)),
        other => fold_string(other, depth).map(Operand::Str),
    }
}

pub fn template_string(t: &Tpl) -> Option<String> {
    if !t.exprs.is_empty() {
        return None;
    }
    Some(
        t.quasis
            .iter()
            .map(|q| {
                q.cooked
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| q.raw.to_string())
            })
            .collect(),
    )
}

/// Number formatting matching JS `String(n)` for the values we care about.
pub fn format_js_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub fn number_value(n: f64) -> Option<Value> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= 9_007_199_254_740_991.0 {
        Some(Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

/// JSON value of a literal initializer. Objects and arrays qualify only when
/// every element is itself a literal; `-<number>` is folded.
pub fn literal_value(expr: &Expr) -> Option<Value> {
    literal_value_at(expr, 0)
}

fn literal_value_at(expr: &Expr, depth: usize) -> Option<Value> {
    if depth > MAX_WALK_DEPTH {
        return None;
    }
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(s)) => Some(Value::String(s.value.to_string())),
        Expr::Lit(Lit::Num(n)) => number_value(n.value),
        Expr::Lit(Lit::Bool(b)) => Some(Value::Bool(b.value)),
        Expr::Lit(Lit::Null(_)) => Some(Value::Null),
        Expr::Tpl(t) => template_string(t).map(Value::String),
        Expr::Unary(u) if u.op == UnaryOp::Minus => match unwrap_expr(&u.arg) {
            Expr::Lit(Lit::Num(n)) => number_value(-n.value),
            _ => None,
        },
        Expr::Array(a) => {
            let mut out = Vec::with_capacity(a.elems.len());
            for el in &a.elems {
                match el {
                    Some(ExprOrSpread { spread: None, expr }) => {
                        out.push(literal_value_at(expr, depth + 1)?)
                    }
                    _ => return None,
                }
            }
            Some(Value::Array(out))
        }
        Expr::Object(o) => {
            let mut out = serde_json::Map::new();
            for prop in &o.props {
                let PropOrSpread::Prop(prop) = prop else {
                    return None;
                };
                let Prop::KeyValue(kv) = &**prop else {
                    return None;
                };
                let key = prop_name_key(&kv.key)?;
                out.insert(key, literal_value_at(&kv.value, depth + 1)?);
            }
            Some(Value::Object(out))
        }
        _ => None,
    }
}

/// Static key of an object property; computed keys yield `None`.
pub fn prop_name_key(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(i) => Some(i.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Num(n) => Some(format_js_number(n.value)),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Type annotations
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Enum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub kind: PropType,
    pub enum_values: Option<Vec<Value>>,
}

impl ResolvedType {
    fn plain(kind: PropType) -> Self {
        Self {
            kind,
            enum_values: None,
        }
    }

    fn enumeration(values: Vec<Value>) -> Self {
        Self {
            kind: PropType::Enum,
            enum_values: Some(values),
        }
    }

    /// Non-enum type an enum's values share.
    fn base(&self) -> PropType {
        match (&self.kind, &self.enum_values) {
            (PropType::Enum, Some(values)) if values.iter().all(Value::is_number) => {
                PropType::Number
            }
            (PropType::Enum, _) => PropType::String,
            (kind, _) => *kind,
        }
    }
}

enum TypeDecl<'a> {
    Alias(&'a TsType),
    Interface(&'a TsInterfaceDecl),
}

/// Local `type` aliases and `interface`s of a module, by name.
#[derive(Default)]
pub struct TypeScope<'a> {
    decls: FxHashMap<String, TypeDecl<'a>>,
}

/// One property of an object type.
pub struct TypeMember<'a> {
    pub key: String,
    pub optional: bool,
    pub ty: Option<&'a TsType>,
}

impl<'a> TypeScope<'a> {
    pub fn collect(module: &'a Module) -> Self {
        let mut scope = Self::default();
        for item in &module.body {
            let decl = match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => decl,
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl { decl, .. })) => decl,
                _ => continue,
            };
            match decl {
                Decl::TsTypeAlias(alias) => {
                    scope
                        .decls
                        .insert(alias.id.sym.to_string(), TypeDecl::Alias(&alias.type_ann));
                }
                Decl::TsInterface(iface) => {
                    scope
                        .decls
                        .insert(iface.id.sym.to_string(), TypeDecl::Interface(iface));
                }
                _ => {}
            }
        }
        scope
    }

    /// Resolve an annotation to a prop type. `None` means unresolved.
    pub fn resolve(&self, ty: &TsType) -> Option<ResolvedType> {
        self.resolve_at(ty, &mut FxHashSet::default(), 0)
    }

    fn resolve_at(
        &self,
        ty: &TsType,
        visiting: &mut FxHashSet<String>,
        depth: usize,
    ) -> Option<ResolvedType> {
        if depth > MAX_WALK_DEPTH {
            return None;
        }
        match ty {
            TsType::TsKeywordType(k) => match k.kind {
                TsKeywordTypeKind::TsStringKeyword => Some(ResolvedType::plain(PropType::String)),
                TsKeywordTypeKind::TsNumberKeyword | TsKeywordTypeKind::TsBigIntKeyword => {
                    Some(ResolvedType::plain(PropType::Number))
                }
                TsKeywordTypeKind::TsBooleanKeyword => Some(ResolvedType::plain(PropType::Boolean)),
                TsKeywordTypeKind::TsObjectKeyword => Some(ResolvedType::plain(PropType::Object)),
                _ => None,
            },
            TsType::TsLitType(lit) => match &lit.lit {
                TsLit::Str(s) => Some(ResolvedType::enumeration(vec![Value::String(
                    s.value.to_string(),
                )])),
                TsLit::Number(n) => number_value(n.value).map(|v| ResolvedType::enumeration(vec![v])),
                TsLit::Bool(_) => Some(ResolvedType::plain(PropType::Boolean)),
                TsLit::Tpl(_) => Some(ResolvedType::plain(PropType::String)),
                _ => None,
            },
            TsType::TsArrayType(_) | TsType::TsTupleType(_) => {
                Some(ResolvedType::plain(PropType::Array))
            }
            TsType::TsTypeLit(_) | TsType::TsMappedType(_) => {
                Some(ResolvedType::plain(PropType::Object))
            }
            TsType::TsParenthesizedType(p) => self.resolve_at(&p.type_ann, visiting, depth + 1),
            TsType::TsOptionalType(o) => self.resolve_at(&o.type_ann, visiting, depth + 1),
            TsType::TsTypeOperator(op) => self.resolve_at(&op.type_ann, visiting, depth + 1),
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(u)) => {
                self.resolve_union(&u.types, visiting, depth)
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(_)) => {
                Some(ResolvedType::plain(PropType::Object))
            }
            TsType::TsTypeRef(r) => self.resolve_ref(r, visiting, depth),
            _ => None,
        }
    }

    fn resolve_ref(
        &self,
        r: &TsTypeRef,
        visiting: &mut FxHashSet<String>,
        depth: usize,
    ) -> Option<ResolvedType> {
        let name = entity_name(&r.type_name);
        match name.as_str() {
            "Array" | "ReadonlyArray" => return Some(ResolvedType::plain(PropType::Array)),
            "Record" | "Partial" | "Required" | "Readonly" | "Pick" | "Omit" => {
                return Some(ResolvedType::plain(PropType::Object))
            }
            "String" => return Some(ResolvedType::plain(PropType::String)),
            "Number" => return Some(ResolvedType::plain(PropType::Number)),
            "Boolean" => return Some(ResolvedType::plain(PropType::Boolean)),
            _ => {}
        }
        if !visiting.insert(name.clone()) {
            return None;
        }
        let resolved = match self.decls.get(&name) {
            Some(TypeDecl::Alias(ty)) => self.resolve_at(ty, visiting, depth + 1),
            Some(TypeDecl::Interface(_)) => Some(ResolvedType::plain(PropType::Object)),
            None => None,
        };
        visiting.remove(&name);
        resolved
    }

    fn resolve_union(
        &self,
        types: &[Box<TsType>],
        visiting: &mut FxHashSet<String>,
        depth: usize,
    ) -> Option<ResolvedType> {
        let branches: Vec<Option<ResolvedType>> = types
            .iter()
            .filter(|t| !is_nullish_type(t))
            .map(|t| self.resolve_at(t, visiting, depth + 1))
            .collect();
        if branches.is_empty() {
            return None;
        }

        if branches.iter().all(|b| matches!(b, Some(r) if r.kind == PropType::Enum)) {
            let values: Vec<Value> = branches
                .iter()
                .flatten()
                .flat_map(|r| r.enum_values.clone().unwrap_or_default())
                .collect();
            let uniform = values.iter().all(Value::is_string) || values.iter().all(Value::is_number);
            if uniform {
                let mut deduped: Vec<Value> = Vec::with_capacity(values.len());
                for v in values {
                    if !deduped.contains(&v) {
                        deduped.push(v);
                    }
                }
                return Some(ResolvedType::enumeration(deduped));
            }
        }
        if branches
            .iter()
            .all(|b| matches!(b, Some(r) if r.kind == PropType::Boolean))
        {
            return Some(ResolvedType::plain(PropType::Boolean));
        }
        branches
            .iter()
            .flatten()
            .next()
            .map(|r| ResolvedType::plain(r.base()))
    }

    /// Properties of an object-shaped annotation (type literal, interface,
    /// alias of either, or an intersection of those).
    pub fn members(&self, ty: &'a TsType) -> Vec<TypeMember<'a>> {
        let mut out = Vec::new();
        self.members_at(ty, &mut out, &mut FxHashSet::default(), 0);
        out
    }

    fn members_at(
        &self,
        ty: &'a TsType,
        out: &mut Vec<TypeMember<'a>>,
        visiting: &mut FxHashSet<String>,
        depth: usize,
    ) {
        if depth > MAX_WALK_DEPTH {
            return;
        }
        match ty {
            TsType::TsTypeLit(lit) => push_members(&lit.members, out),
            TsType::TsParenthesizedType(p) => self.members_at(&p.type_ann, out, visiting, depth + 1),
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(i)) => {
                for t in &i.types {
                    self.members_at(t, out, visiting, depth + 1);
                }
            }
            TsType::TsTypeRef(r) => {
                let name = entity_name(&r.type_name);
                match name.as_str() {
                    // Partial<T>, Readonly<T>, and React's props helpers wrap the real shape.
                    "Partial" | "Readonly" | "Required" | "PropsWithChildren" | "React.PropsWithChildren" => {
                        if let Some(inner) = first_type_arg(r) {
                            let before = out.len();
                            self.members_at(inner, out, visiting, depth + 1);
                            if name == "Partial" {
                                for m in &mut out[before..] {
                                    m.optional = true;
                                }
                            }
                        }
                    }
                    _ => self.named_members(&name, out, visiting, depth),
                }
            }
            _ => {}
        }
    }

    fn named_members(
        &self,
        name: &str,
        out: &mut Vec<TypeMember<'a>>,
        visiting: &mut FxHashSet<String>,
        depth: usize,
    ) {
        if !visiting.insert(name.to_string()) {
            return;
        }
        match self.decls.get(name) {
            Some(TypeDecl::Alias(ty)) => self.members_at(ty, out, visiting, depth + 1),
            Some(TypeDecl::Interface(iface)) => {
                for parent in &iface.extends {
                    if let Expr::Ident(id) = &*parent.expr {
                        self.named_members(id.sym.as_ref(), out, visiting, depth + 1);
                    }
                }
                push_members(&iface.body.body, out);
            }
            None => {}
        }
        visiting.remove(name);
    }
}

fn push_members<'a>(elements: &'a [TsTypeElement], out: &mut Vec<TypeMember<'a>>) {
    for el in elements {
        let TsTypeElement::TsPropertySignature(sig) = el else {
            continue;
        };
        if sig.computed {
            continue;
        }
        let key = match &*sig.key {
            Expr::Ident(i) => i.sym.to_string(),
            Expr::Lit(Lit::Str(s)) => s.value.to_string(),
            _ => continue,
        };
        out.push(TypeMember {
            key,
            optional: sig.optional,
            ty: sig.type_ann.as_deref().map(|a| &*a.type_ann),
        });
    }
}

pub fn first_type_arg(r: &TsTypeRef) -> Option<&TsType> {
    r.type_params
        .as_ref()
        .and_then(|p| p.params.first())
        .map(|t| &**t)
}

pub fn entity_name(name: &TsEntityName) -> String {
    match name {
        TsEntityName::Ident(i) => i.sym.to_string(),
        TsEntityName::TsQualifiedName(q) => format!("{}.{}", entity_name(&q.left), q.right.sym),
        #[allow(unreachable_patterns)]
        _ => String::new(),
    }
}

pub fn is_nullish_type(ty: &TsType) -> bool {
    match ty {
        TsType::TsKeywordType(k) => matches!(
            k.kind,
            TsKeywordTypeKind::TsNullKeyword
                | TsKeywordTypeKind::TsUndefinedKeyword
                | TsKeywordTypeKind::TsVoidKeyword
        ),
        TsType::TsParenthesizedType(p) => is_nullish_type(&p.type_ann),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SourceParser;
    use serde_json::json;

    fn first_var_init(src: &str) -> Box<Expr> {
        let parsed = SourceParser::new().parse(src).unwrap();
        for item in parsed.module.body {
            if let ModuleItem::Stmt(Stmt::Decl(Decl::Var(v))) = item {
                return v.decls[0].init.clone().unwrap();
            }
        }
        panic!("no var decl in {src}");
    }

    fn alias_type(module: &Module, name: &str) -> TsType {
        for item in &module.body {
            if let ModuleItem::Stmt(Stmt::Decl(Decl::TsTypeAlias(a))) = item {
                if a.id.sym.as_ref() == name {
                    return (*a.type_ann).clone();
                }
            }
        }
        panic!("no alias {name}");
    }

    #[test]
    fn folds_static_strings() {
        assert_eq!(static_string(&first_var_init(r#"const a = "p-4";"#)).as_deref(), Some("p-4"));
        assert_eq!(static_string(&first_var_init("const a = `m-2 flex`;")).as_deref(), Some("m-2 flex"));
        assert_eq!(
            static_string(&first_var_init(r#"const a = "p-" + 4 + " " + `flex`;"#)).as_deref(),
            Some("p-4 flex")
        );
        assert_eq!(static_string(&first_var_init("const a = `p-${n}`;")), None);
        assert_eq!(static_string(&first_var_init(r#"const a = "p-" + n;"#)), None);
        assert_eq!(static_string(&first_var_init("const a = 1 + 2;")), None);
    }

    #[test]
    fn extracts_literal_values() {
        assert_eq!(literal_value(&first_var_init("const a = -3;")), Some(json!(-3)));
        assert_eq!(literal_value(&first_var_init("const a = 1.5;")), Some(json!(1.5)));
        assert_eq!(
            literal_value(&first_var_init(r#"const a = { x: [1, "two", { y: null }], 'z': true };"#)),
            Some(json!({"x": [1, "two", {"y": null}], "z": true}))
        );
        assert_eq!(literal_value(&first_var_init("const a = [1, b];")), None);
        assert_eq!(literal_value(&first_var_init("const a = { ...b };")), None);
        assert_eq!(literal_value(&first_var_init("const a = { [k]: 1 };")), None);
        assert_eq!(literal_value(&first_var_init("const a = -x;")), None);
    }

    #[test]
    fn resolves_unions_and_aliases() {
        let src = r#"
type Size = "sm" | "md" | "lg";
type Maybe = "a" | "b" | null;
type Mixed = "a" | 1;
type Nums = 1 | 2 | 3;
type Unknown = Foo | number;
type Flag = true | false;
type Items = Array<string>;
"#;
        let parsed = SourceParser::new().parse(src).unwrap();
        let scope = TypeScope::collect(&parsed.module);
        let resolve = |name: &str| scope.resolve(&alias_type(&parsed.module, name)).unwrap();

        assert_eq!(resolve("Size").kind, PropType::Enum);
        assert_eq!(resolve("Size").enum_values, Some(vec![json!("sm"), json!("md"), json!("lg")]));
        assert_eq!(resolve("Maybe").enum_values, Some(vec![json!("a"), json!("b")]));
        assert_eq!(resolve("Mixed").kind, PropType::String);
        assert_eq!(resolve("Nums").enum_values, Some(vec![json!(1), json!(2), json!(3)]));
        assert_eq!(resolve("Unknown").kind, PropType::Number);
        assert_eq!(resolve("Flag").kind, PropType::Boolean);
        assert_eq!(resolve("Items").kind, PropType::Array);
    }

    #[test]
    fn collects_members_through_interfaces() {
        let src = r#"
interface Base { id: string }
interface Props extends Base { title?: string; "data-x": number; [k]: string }
type Both = Props & { extra: boolean };
"#;
        let parsed = SourceParser::new().parse(src).unwrap();
        let scope = TypeScope::collect(&parsed.module);
        let both = alias_type(&parsed.module, "Both");
        let members = scope.members(&both);
        let keys: Vec<(&str, bool)> = members.iter().map(|m| (m.key.as_str(), m.optional)).collect();
        assert_eq!(
            keys,
            vec![("id", false), ("title", true), ("data-x", false), ("extra", false)]
        );
    }

    #[test]
    fn self_referential_alias_terminates() {
        let src = "type Loop = Loop | string;";
        let parsed = SourceParser::new().parse(src).unwrap();
        let scope = TypeScope::collect(&parsed.module);
        let resolved = scope.resolve(&alias_type(&parsed.module, "Loop")).unwrap();
        assert_eq!(resolved.kind, PropType::String);
    }
}
