//! Range index from source coordinates to JSX elements, for click-to-source.

use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::ast::{jsx_element_name, template_string, unwrap_expr};
use crate::parse::{innermost, ParsedModule, Position, SourceText, TextRange};

pub const INDEX_VERSION: u32 = 1;
pub const DEFAULT_MAX_TEXT_RANGES: usize = 120;
const MAX_JSX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Element,
    Fragment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectElement {
    pub element_range: TextRange,
    pub text_ranges: Vec<TextRange>,
    pub element_type: ElementType,
    pub element_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectIndex {
    pub version: u32,
    pub elements: Vec<InspectElement>,
}

impl InspectIndex {
    pub fn build(parsed: &ParsedModule<'_>, max_text_ranges: usize) -> Self {
        let mut collector = Collector {
            source: &parsed.source,
            max_text_ranges,
            depth: 0,
            elements: Vec::new(),
        };
        parsed.module.visit_with(&mut collector);
        Self {
            version: INDEX_VERSION,
            elements: collector.elements,
        }
    }

    /// Innermost element (or fragment) whose range contains the point.
    pub fn find_match(&self, line: usize, column: usize) -> Option<&InspectElement> {
        innermost(
            self.elements.iter().map(|e| (e.element_range, e)),
            Position::new(line, column),
        )
    }
}

struct Collector<'s, 'p> {
    source: &'p SourceText<'s>,
    max_text_ranges: usize,
    depth: usize,
    elements: Vec<InspectElement>,
}

impl Collector<'_, '_> {
    fn text_ranges(&self, children: &[JSXElementChild]) -> Vec<TextRange> {
        let mut out = Vec::new();
        for child in children {
            if out.len() >= self.max_text_ranges {
                break;
            }
            match child {
                JSXElementChild::JSXText(text) => {
                    let bytes = self.source.byte_range(text.span);
                    let raw = &self.source.text()[bytes.clone()];
                    let lead = raw.len() - raw.trim_start().len();
                    let trail = raw.len() - raw.trim_end().len();
                    if lead == raw.len() {
                        continue;
                    }
                    out.push(
                        self.source
                            .range_of(bytes.start + lead..bytes.end - trail),
                    );
                }
                JSXElementChild::JSXExprContainer(JSXExprContainer {
                    span,
                    expr: JSXExpr::Expr(expr),
                }) => {
                    let is_static = match unwrap_expr(expr) {
                        Expr::Lit(Lit::Str(_)) => true,
                        Expr::Tpl(t) => template_string(t).is_some(),
                        _ => false,
                    };
                    if is_static {
                        out.push(self.source.range(*span));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn descend<N: VisitWith<Self>>(&mut self, node: &N) {
        if self.depth >= MAX_JSX_DEPTH {
            return;
        }
        self.depth += 1;
        node.visit_children_with(self);
        self.depth -= 1;
    }
}

impl Visit for Collector<'_, '_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        self.elements.push(InspectElement {
            element_range: self.source.range(node.span),
            text_ranges: self.text_ranges(&node.children),
            element_type: ElementType::Element,
            element_name: Some(jsx_element_name(&node.opening.name)),
        });
        self.descend(node);
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        self.elements.push(InspectElement {
            element_range: self.source.range(node.span),
            text_ranges: self.text_ranges(&node.children),
            element_type: ElementType::Fragment,
            element_name: None,
        });
        self.descend(node);
    }
}
