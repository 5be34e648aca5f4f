//! Tailwind class-token shapes the style editor strips and writes.

use once_cell::sync::Lazy;
use regex::Regex;

use super::style::{StyleField, StyleValue};
use crate::ast::format_js_number;

const COLOR: &str = r"(?:inherit|current|transparent|black|white|[a-z]+-(?:50|[1-9]00|950)|\[(?:#[0-9a-fA-F]{3,8}|(?:rgb|rgba|hsl|hsla)\([^\]]*\)|[a-z]+)\])(?:/\d{1,3})?";

fn shape(pattern: &str) -> Regex {
    // `!important` tokens belong to the base category; `hover:` etc. do not
    Regex::new(&format!("^!?(?:{pattern})$")).unwrap()
}

static BG_COLOR: Lazy<Regex> = Lazy::new(|| shape(&format!("bg-{COLOR}")));
static TEXT_COLOR: Lazy<Regex> = Lazy::new(|| shape(&format!("text-{COLOR}")));
static BORDER_COLOR: Lazy<Regex> = Lazy::new(|| shape(&format!("border-{COLOR}")));
static TEXT_SIZE: Lazy<Regex> = Lazy::new(|| {
    shape(r"text-(?:xs|sm|base|lg|xl|[2-9]xl|\[\d+(?:\.\d+)?(?:px|rem|em)\])(?:/\S+)?")
});
static FONT_WEIGHT: Lazy<Regex> = Lazy::new(|| {
    shape(r"font-(?:thin|extralight|light|normal|medium|semibold|bold|extrabold|black|\[\d+\])")
});
static BORDER_WIDTH: Lazy<Regex> =
    Lazy::new(|| shape(r"border(?:-(?:0|2|4|8|\[\d+(?:\.\d+)?px\]))?"));
static RADIUS: Lazy<Regex> = Lazy::new(|| shape(r"rounded(?:-\S+)?"));
static HEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .unwrap()
});
static PALETTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:inherit|current|transparent|black|white|[a-z]+-(?:50|[1-9]00|950))$")
        .unwrap()
});

/// Does `token` belong to the utility category that `field` writes?
pub fn matches_field(field: StyleField, token: &str) -> bool {
    let re: &Regex = match field {
        StyleField::BackgroundColor => &BG_COLOR,
        StyleField::TextColor => &TEXT_COLOR,
        StyleField::BorderColor => &BORDER_COLOR,
        StyleField::FontSize => &TEXT_SIZE,
        StyleField::FontWeight => &FONT_WEIGHT,
        StyleField::BorderWidth => &BORDER_WIDTH,
        StyleField::BorderRadius => &RADIUS,
    };
    re.is_match(token)
}

/// `#ABC` -> `#aabbcc`; 4- and 8-digit forms keep their alpha.
pub fn normalize_hex(value: &str) -> Option<String> {
    let caps = HEX.captures(value.trim())?;
    let digits = caps[1].to_ascii_lowercase();
    let expanded: String = if digits.len() <= 4 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits
    };
    Some(format!("#{expanded}"))
}

fn color_token(prefix: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(hex) = normalize_hex(value) {
        return Some(format!("{prefix}-[{hex}]"));
    }
    if PALETTE.is_match(value) {
        return Some(format!("{prefix}-{value}"));
    }
    Some(format!("{prefix}-[{}]", value.replace(' ', "_")))
}

fn px_value(value: &StyleValue) -> Option<f64> {
    let px: f64 = match value {
        StyleValue::Number(n) => *n,
        StyleValue::Text(t) => {
            let t = t.trim();
            t.strip_suffix("px").unwrap_or(t).trim().parse().ok()?
        }
    };
    (px.is_finite() && px >= 0.0).then_some(px)
}

fn border_width_token(px: f64) -> String {
    match px {
        p if p == 0.0 => "border-0".to_string(),
        p if p == 1.0 => "border".to_string(),
        p if p == 2.0 || p == 4.0 || p == 8.0 => format!("border-{}", format_js_number(p)),
        p => format!("border-[{}px]", format_js_number(p)),
    }
}

const RADII: &[(f64, &str)] = &[
    (0.0, "rounded-none"),
    (2.0, "rounded-sm"),
    (4.0, "rounded"),
    (6.0, "rounded-md"),
    (8.0, "rounded-lg"),
    (12.0, "rounded-xl"),
    (16.0, "rounded-2xl"),
    (24.0, "rounded-3xl"),
    (9999.0, "rounded-full"),
];

const FONT_SIZES: &[(f64, &str)] = &[
    (12.0, "text-xs"),
    (14.0, "text-sm"),
    (16.0, "text-base"),
    (18.0, "text-lg"),
    (20.0, "text-xl"),
    (24.0, "text-2xl"),
    (30.0, "text-3xl"),
    (36.0, "text-4xl"),
    (48.0, "text-5xl"),
    (60.0, "text-6xl"),
    (72.0, "text-7xl"),
    (96.0, "text-8xl"),
    (128.0, "text-9xl"),
];

const WEIGHTS: &[&str] = &[
    "font-thin",
    "font-extralight",
    "font-light",
    "font-normal",
    "font-medium",
    "font-semibold",
    "font-bold",
    "font-extrabold",
    "font-black",
];

fn scaled_token(px: f64, table: &[(f64, &str)], prefix: &str) -> String {
    table
        .iter()
        .find(|(size, _)| *size == px)
        .map(|(_, token)| token.to_string())
        .unwrap_or_else(|| format!("{prefix}-[{}px]", format_js_number(px)))
}

fn font_weight_token(value: &StyleValue) -> Option<String> {
    let numeric = match value {
        StyleValue::Number(n) => *n,
        StyleValue::Text(t) => {
            let t = t.trim();
            let named = format!("font-{t}");
            if WEIGHTS.contains(&named.as_str()) {
                return Some(named);
            }
            t.parse().ok()?
        }
    };
    if !numeric.is_finite() {
        return None;
    }
    let step = (numeric / 100.0).round().clamp(1.0, 9.0) as usize;
    Some(WEIGHTS[step - 1].to_string())
}

/// Tailwind token for one field value, or `None` when the value can't be
/// expressed as a class.
pub fn format_token(field: StyleField, value: &StyleValue) -> Option<String> {
    match field {
        StyleField::BackgroundColor => color_token("bg", value.as_text()?),
        StyleField::TextColor => color_token("text", value.as_text()?),
        StyleField::BorderColor => color_token("border", value.as_text()?),
        StyleField::BorderWidth => px_value(value).map(border_width_token),
        StyleField::BorderRadius => px_value(value).map(|px| scaled_token(px, RADII, "rounded")),
        StyleField::FontSize => px_value(value).map(|px| scaled_token(px, FONT_SIZES, "text")),
        StyleField::FontWeight => font_weight_token(value),
    }
}

/// Strip same-category tokens for every updated field, then append the new
/// tokens in field order. Unrelated tokens keep their order.
pub fn rewrite_class_list(classes: &str, updates: &[(StyleField, Option<String>)]) -> String {
    let mut tokens: Vec<&str> = classes
        .split_whitespace()
        .filter(|token| !updates.iter().any(|(field, _)| matches_field(*field, token)))
        .collect();
    tokens.extend(updates.iter().filter_map(|(_, token)| token.as_deref()));
    tokens.join(" ")
}
