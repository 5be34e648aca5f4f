//! Flags risky constructs in snippet source.

use serde::Serialize;
use swc_core::common::Span;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::ast::{attr_static_string, jsx_attr_name, static_string, unwrap_expr};
use crate::parse::{ParsedModule, SourceText};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityIssueKind {
    Eval,
    FunctionConstructor,
    DangerouslySetInnerHtml,
    JavascriptUrl,
    HtmlAssignment,
    DocumentWrite,
    UntrustedImport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityIssue {
    pub kind: SecurityIssueKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Import specifiers snippets may use without being flagged.
fn is_allowed_import(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || ["react", "react-dom"].iter().any(|pkg| {
            specifier == *pkg
                || specifier
                    .strip_prefix(pkg)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
}

struct Scanner<'p, 's> {
    source: &'p SourceText<'s>,
    issues: Vec<SecurityIssue>,
}

impl Scanner<'_, '_> {
    fn report(&mut self, kind: SecurityIssueKind, span: Span, message: impl Into<String>) {
        let at = self.source.position(self.source.byte_range(span).start);
        self.issues.push(SecurityIssue {
            kind,
            message: message.into(),
            line: at.line,
            column: at.column,
        });
    }

    fn check_import(&mut self, specifier: &str, span: Span) {
        if !is_allowed_import(specifier) {
            self.report(
                SecurityIssueKind::UntrustedImport,
                span,
                format!("import of `{specifier}` is outside the allowed modules"),
            );
        }
    }
}

fn ident_name(expr: &Expr) -> Option<&str> {
    match unwrap_expr(expr) {
        Expr::Ident(ident) => Some(&*ident.sym),
        _ => None,
    }
}

fn member_prop(member: &MemberExpr) -> Option<&str> {
    match &member.prop {
        MemberProp::Ident(ident) => Some(&*ident.sym),
        MemberProp::Computed(c) => match unwrap_expr(&c.expr) {
            Expr::Lit(Lit::Str(s)) => Some(&*s.value),
            _ => None,
        },
        _ => None,
    }
}

impl Visit for Scanner<'_, '_> {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        let specifier = node.src.value.to_string();
        self.check_import(&specifier, node.span);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        match &node.callee {
            Callee::Expr(callee) => {
                if let Some(name) = ident_name(callee) {
                    match name {
                        "eval" => self.report(
                            SecurityIssueKind::Eval,
                            node.span,
                            "`eval` executes arbitrary strings as code",
                        ),
                        "Function" => self.report(
                            SecurityIssueKind::FunctionConstructor,
                            node.span,
                            "`Function` builds code from strings",
                        ),
                        _ => {}
                    }
                } else if let Expr::Member(member) = unwrap_expr(callee) {
                    let is_document = ident_name(&member.obj) == Some("document");
                    if is_document && matches!(member_prop(member), Some("write" | "writeln")) {
                        self.report(
                            SecurityIssueKind::DocumentWrite,
                            node.span,
                            "`document.write` injects raw markup",
                        );
                    }
                }
            }
            Callee::Import(_) => {
                if let Some(specifier) = node.args.first().and_then(|a| static_string(&a.expr)) {
                    self.check_import(&specifier, node.span);
                }
            }
            Callee::Super(_) => {}
        }
        node.visit_children_with(self);
    }

    fn visit_new_expr(&mut self, node: &NewExpr) {
        if ident_name(&node.callee) == Some("Function") {
            self.report(
                SecurityIssueKind::FunctionConstructor,
                node.span,
                "`new Function` builds code from strings",
            );
        }
        node.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        if let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &node.left {
            if let Some(prop @ ("innerHTML" | "outerHTML")) = member_prop(member) {
                self.report(
                    SecurityIssueKind::HtmlAssignment,
                    node.span,
                    format!("assigning `{prop}` injects raw markup"),
                );
            }
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_attr(&mut self, node: &JSXAttr) {
        let name = jsx_attr_name(&node.name);
        if name == "dangerouslySetInnerHTML" {
            self.report(
                SecurityIssueKind::DangerouslySetInnerHtml,
                node.span,
                "`dangerouslySetInnerHTML` renders unescaped markup",
            );
        }
        if let Some(value) = node.value.as_ref().and_then(attr_static_string) {
            let compact: String = value
                .chars()
                .filter(|c| !c.is_whitespace() && !c.is_control())
                .collect();
            if compact.to_ascii_lowercase().starts_with("javascript:") {
                self.report(
                    SecurityIssueKind::JavascriptUrl,
                    node.span,
                    format!("`{name}` holds a javascript: URL"),
                );
            }
        }
        node.visit_children_with(self);
    }
}

pub fn scan_security(parsed: &ParsedModule<'_>) -> Vec<SecurityIssue> {
    let mut scanner = Scanner {
        source: &parsed.source,
        issues: Vec::new(),
    };
    parsed.module.visit_with(&mut scanner);
    scanner.issues.sort_by_key(|i| (i.line, i.column));
    scanner.issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SourceParser;

    fn kinds(src: &str) -> Vec<SecurityIssueKind> {
        let parsed = SourceParser::new().parse(src).unwrap();
        scan_security(&parsed).into_iter().map(|i| i.kind).collect()
    }

    #[test]
    fn clean_component_has_no_issues() {
        let src = "import React, { useState } from 'react';\nimport { createRoot } from 'react-dom/client';\nimport Card from './Card';\nexport default function A() { return <a href=\"/home\">x</a>; }";
        assert!(kinds(src).is_empty());
    }

    #[test]
    fn flags_code_execution() {
        let src = "eval('1');\nconst f = new Function('return 1');\nconst g = Function('x');";
        assert_eq!(
            kinds(src),
            vec![
                SecurityIssueKind::Eval,
                SecurityIssueKind::FunctionConstructor,
                SecurityIssueKind::FunctionConstructor,
            ]
        );
    }

    #[test]
    fn flags_markup_injection() {
        let src = "el.innerHTML = html;\ndocument.write('<p>');\nconst a = <div dangerouslySetInnerHTML={{ __html: x }} />;\nconst b = <a href=\" JavaScript:alert(1)\">x</a>;";
        assert_eq!(
            kinds(src),
            vec![
                SecurityIssueKind::HtmlAssignment,
                SecurityIssueKind::DocumentWrite,
                SecurityIssueKind::DangerouslySetInnerHtml,
                SecurityIssueKind::JavascriptUrl,
            ]
        );
    }

    #[test]
    fn flags_untrusted_imports_with_position() {
        let parsed = SourceParser::new()
            .parse("import a from './a';\n  import fs from 'fs';\nconst m = import('lodash');")
            .unwrap();
        let issues = scan_security(&parsed);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, SecurityIssueKind::UntrustedImport);
        assert_eq!((issues[0].line, issues[0].column), (2, 3));
        assert!(issues[0].message.contains("`fs`"));
        assert_eq!(issues[1].line, 3);
        assert!(!is_allowed_import("reactive"));
        assert!(is_allowed_import("react/jsx-runtime"));
    }
}
