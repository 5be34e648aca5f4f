//! Built-in utility compiler for the Tailwind classes snippets use most.
//!
//! Each candidate is `variant:*` + optional `!` + optional `-` + utility.
//! Candidates the compiler doesn't understand produce no CSS.

use std::fmt::Write as _;

use super::palette;
use super::TailwindCompiler;
use crate::ast::format_js_number;

type Decls = Vec<(&'static str, String)>;

fn decl(prop: &'static str, value: impl Into<String>) -> Decls {
    vec![(prop, value.into())]
}

fn decls(props: &[&'static str], value: &str) -> Decls {
    props.iter().map(|p| (*p, value.to_string())).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UtilityCompiler;

impl TailwindCompiler for UtilityCompiler {
    fn compile(&self, candidates: &[String]) -> String {
        let mut rules: Vec<Rule> = candidates.iter().filter_map(|c| compile_candidate(c)).collect();
        // stable: candidate order is kept within each media group
        rules.sort_by_key(|r| r.media_rank);
        render(&rules)
    }
}

// -----------------------------------------------------------------------------
// Candidates & variants
// -----------------------------------------------------------------------------

const BREAKPOINTS: [(&str, u32); 5] = [
    ("sm", 640),
    ("md", 768),
    ("lg", 1024),
    ("xl", 1280),
    ("2xl", 1536),
];

fn pseudo_class(variant: &str) -> Option<&'static str> {
    Some(match variant {
        "hover" => ":hover",
        "focus" => ":focus",
        "focus-visible" => ":focus-visible",
        "focus-within" => ":focus-within",
        "active" => ":active",
        "disabled" => ":disabled",
        "visited" => ":visited",
        "first" => ":first-child",
        "last" => ":last-child",
        "odd" => ":nth-child(odd)",
        "even" => ":nth-child(even)",
        "placeholder" => "::placeholder",
        _ => return None,
    })
}

struct Rule {
    media_rank: usize,
    media: Option<String>,
    selector: String,
    decls: Decls,
}

/// Split on `:` outside of `[...]`.
fn split_variants(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

fn compile_candidate(raw: &str) -> Option<Rule> {
    let parts = split_variants(raw);
    let (utility, variants) = parts.split_last()?;

    let mut pseudo = String::new();
    let mut breakpoint: Option<usize> = None;
    let mut dark = false;
    for variant in variants {
        if *variant == "dark" {
            dark = true;
        } else if let Some(idx) = BREAKPOINTS.iter().position(|(name, _)| name == variant) {
            breakpoint = Some(breakpoint.map_or(idx, |b: usize| b.max(idx)));
        } else {
            pseudo.push_str(pseudo_class(variant)?);
        }
    }

    let (utility, important) = match utility.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (*utility, false),
    };
    let (utility, negative) = match utility.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (utility, false),
    };
    if utility.is_empty() {
        return None;
    }
    let mut decls = resolve(utility, negative)?;
    if important {
        for (_, value) in &mut decls {
            value.push_str(" !important");
        }
    }

    let mut media: Vec<String> = Vec::new();
    if let Some(idx) = breakpoint {
        media.push(format!("(min-width: {}px)", BREAKPOINTS[idx].1));
    }
    if dark {
        media.push("(prefers-color-scheme: dark)".to_string());
    }
    Some(Rule {
        media_rank: breakpoint.map_or(0, |b| b + 1) * 2 + usize::from(dark),
        media: (!media.is_empty()).then(|| media.join(" and ")),
        selector: format!(".{}{pseudo}", escape_class(raw)),
        decls,
    })
}

fn escape_class(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    for (i, c) in raw.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            let _ = write!(out, "\\3{c} ");
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

fn write_rule(out: &mut String, indent: &str, rule: &Rule) {
    let _ = writeln!(out, "{indent}{} {{", rule.selector);
    for (prop, value) in &rule.decls {
        let _ = writeln!(out, "{indent}  {prop}: {value};");
    }
    let _ = writeln!(out, "{indent}}}");
}

fn render(rules: &[Rule]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < rules.len() {
        match &rules[i].media {
            None => {
                write_rule(&mut out, "", &rules[i]);
                i += 1;
            }
            Some(media) => {
                let _ = writeln!(out, "@media {media} {{");
                while i < rules.len() && rules[i].media.as_ref() == Some(media) {
                    write_rule(&mut out, "  ", &rules[i]);
                    i += 1;
                }
                out.push_str("}\n");
            }
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Values
// -----------------------------------------------------------------------------

/// Contents of an arbitrary `[value]`, underscores read as spaces.
fn arbitrary(value: &str) -> Option<String> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    (!inner.is_empty()).then(|| inner.replace('_', " "))
}

fn is_length(value: &str) -> bool {
    value.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || ["calc(", "clamp(", "min(", "max("]
            .iter()
            .any(|f| value.starts_with(f))
}

fn negate(value: &str) -> String {
    if value == "0px" || value == "auto" {
        value.to_string()
    } else if value.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        format!("-{value}")
    } else {
        format!("calc({value} * -1)")
    }
}

fn trim_decimal(n: f64, places: usize) -> String {
    let fixed = format!("{n:.places$}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn spacing(value: &str, negative: bool) -> Option<String> {
    let v = match value {
        "px" => "1px".to_string(),
        "0" => "0px".to_string(),
        _ => match arbitrary(value) {
            Some(inner) => inner,
            None => {
                let n: f64 = value.parse().ok()?;
                if n < 0.0 || (n * 2.0).fract() != 0.0 {
                    return None;
                }
                format!("{}rem", format_js_number(n * 0.25))
            }
        },
    };
    Some(if negative { negate(&v) } else { v })
}

fn fraction(value: &str) -> Option<String> {
    let (a, b) = value.split_once('/')?;
    let a: u32 = a.parse().ok()?;
    let b: u32 = b.parse().ok()?;
    if b == 0 {
        return None;
    }
    Some(format!("{}%", trim_decimal(f64::from(a) / f64::from(b) * 100.0, 6)))
}

fn size(value: &str, screen: &str) -> Option<String> {
    Some(match value {
        "auto" => "auto".to_string(),
        "full" => "100%".to_string(),
        "screen" => screen.to_string(),
        "min" => "min-content".to_string(),
        "max" => "max-content".to_string(),
        "fit" => "fit-content".to_string(),
        _ => return fraction(value).or_else(|| spacing(value, false)),
    })
}

fn inset(value: &str, negative: bool) -> Option<String> {
    let v = match value {
        "auto" => "auto".to_string(),
        "full" => "100%".to_string(),
        _ => match fraction(value) {
            Some(f) => f,
            None => return spacing(value, negative),
        },
    };
    Some(if negative { negate(&v) } else { v })
}

fn max_width(value: &str) -> Option<String> {
    const SCALE: &[(&str, &str)] = &[
        ("none", "none"),
        ("xs", "20rem"),
        ("sm", "24rem"),
        ("md", "28rem"),
        ("lg", "32rem"),
        ("xl", "36rem"),
        ("2xl", "42rem"),
        ("3xl", "48rem"),
        ("4xl", "56rem"),
        ("5xl", "64rem"),
        ("6xl", "72rem"),
        ("7xl", "80rem"),
        ("prose", "65ch"),
    ];
    if let Some((_, v)) = SCALE.iter().find(|(k, _)| *k == value) {
        return Some(v.to_string());
    }
    if let Some(bp) = value.strip_prefix("screen-") {
        let (_, px) = BREAKPOINTS.iter().find(|(name, _)| *name == bp)?;
        return Some(format!("{px}px"));
    }
    size(value, "100vw")
}

fn split_alpha(value: &str) -> (&str, Option<f64>) {
    if let Some((base, alpha)) = value.rsplit_once('/') {
        let parsed = match arbitrary(alpha) {
            Some(inner) => inner.parse::<f64>().ok(),
            None => alpha.parse::<u32>().ok().filter(|a| *a <= 100).map(|a| f64::from(a) / 100.0),
        };
        if let Some(a) = parsed {
            return (base, Some(a));
        }
    }
    (value, None)
}

fn color(value: &str) -> Option<String> {
    let (base, alpha) = split_alpha(value);
    let resolved = match base {
        "inherit" => "inherit".to_string(),
        "current" => "currentColor".to_string(),
        "transparent" => "transparent".to_string(),
        other => match arbitrary(other) {
            Some(inner) if is_length(&inner) => return None,
            Some(inner) => inner,
            None => palette::lookup(other)?.to_string(),
        },
    };
    let Some(alpha) = alpha else {
        return Some(resolved);
    };
    Some(match palette::hex_rgb(&resolved) {
        Some((r, g, b)) => format!("rgb({r} {g} {b} / {})", format_js_number(alpha)),
        None => format!(
            "color-mix(in srgb, {resolved} {}%, transparent)",
            format_js_number(alpha * 100.0)
        ),
    })
}

const FONT_SIZES: &[(&str, &str, &str)] = &[
    ("xs", "0.75rem", "1rem"),
    ("sm", "0.875rem", "1.25rem"),
    ("base", "1rem", "1.5rem"),
    ("lg", "1.125rem", "1.75rem"),
    ("xl", "1.25rem", "1.75rem"),
    ("2xl", "1.5rem", "2rem"),
    ("3xl", "1.875rem", "2.25rem"),
    ("4xl", "2.25rem", "2.5rem"),
    ("5xl", "3rem", "1"),
    ("6xl", "3.75rem", "1"),
    ("7xl", "4.5rem", "1"),
    ("8xl", "6rem", "1"),
    ("9xl", "8rem", "1"),
];

fn text(value: &str) -> Option<Decls> {
    if let Some((_, size, line_height)) = FONT_SIZES.iter().find(|(k, _, _)| *k == value) {
        return Some(vec![
            ("font-size", size.to_string()),
            ("line-height", line_height.to_string()),
        ]);
    }
    if let Some(inner) = arbitrary(value) {
        if is_length(&inner) {
            return Some(decl("font-size", inner));
        }
    }
    color(value).map(|c| decl("color", c))
}

const FONT_WEIGHTS: &[(&str, &str)] = &[
    ("thin", "100"),
    ("extralight", "200"),
    ("light", "300"),
    ("normal", "400"),
    ("medium", "500"),
    ("semibold", "600"),
    ("bold", "700"),
    ("extrabold", "800"),
    ("black", "900"),
];

fn font(value: &str) -> Option<Decls> {
    if let Some((_, weight)) = FONT_WEIGHTS.iter().find(|(k, _)| *k == value) {
        return Some(decl("font-weight", *weight));
    }
    let family = match value {
        "sans" => "ui-sans-serif, system-ui, sans-serif",
        "serif" => "ui-serif, Georgia, Cambria, serif",
        "mono" => "ui-monospace, SFMono-Regular, Menlo, monospace",
        _ => {
            let inner = arbitrary(value)?;
            return Some(if inner.parse::<u32>().is_ok() {
                decl("font-weight", inner)
            } else {
                decl("font-family", inner)
            });
        }
    };
    Some(decl("font-family", family))
}

fn leading(value: &str) -> Option<String> {
    Some(
        match value {
            "none" => "1",
            "tight" => "1.25",
            "snug" => "1.375",
            "normal" => "1.5",
            "relaxed" => "1.625",
            "loose" => "2",
            _ => return arbitrary(value).or_else(|| spacing(value, false)),
        }
        .to_string(),
    )
}

fn tracking(value: &str, negative: bool) -> Option<String> {
    let v = match value {
        "tighter" => "-0.05em".to_string(),
        "tight" => "-0.025em".to_string(),
        "normal" => "0em".to_string(),
        "wide" => "0.025em".to_string(),
        "wider" => "0.05em".to_string(),
        "widest" => "0.1em".to_string(),
        _ => arbitrary(value)?,
    };
    Some(if negative { negate(&v) } else { v })
}

fn opacity(value: &str) -> Option<String> {
    if let Some(inner) = arbitrary(value) {
        return Some(inner);
    }
    let n: u32 = value.parse().ok()?;
    (n <= 100).then(|| format_js_number(f64::from(n) / 100.0))
}

fn integer(value: &str, negative: bool) -> Option<String> {
    if let Some(inner) = arbitrary(value) {
        return Some(inner);
    }
    let n: i64 = value.parse().ok()?;
    Some((if negative { -n } else { n }).to_string())
}

fn order(value: &str, negative: bool) -> Option<String> {
    match value {
        "first" => Some("-9999".into()),
        "last" => Some("9999".into()),
        "none" => Some("0".into()),
        _ => integer(value, negative),
    }
}

fn grid_template(value: &str) -> Option<String> {
    match value {
        "none" => Some("none".into()),
        "subgrid" => Some("subgrid".into()),
        _ => match arbitrary(value) {
            Some(inner) => Some(inner),
            None => {
                let n: u32 = value.parse().ok()?;
                (1..=12)
                    .contains(&n)
                    .then(|| format!("repeat({n}, minmax(0, 1fr))"))
            }
        },
    }
}

fn span(value: &str) -> Option<String> {
    if value == "full" {
        return Some("1 / -1".into());
    }
    let n: u32 = value.parse().ok()?;
    (n > 0).then(|| format!("span {n} / span {n}"))
}

fn border_width(value: Option<&str>) -> Option<String> {
    match value {
        None => Some("1px".into()),
        Some(n @ ("0" | "2" | "4" | "8")) => Some(format!("{n}px")),
        Some(v) => arbitrary(v).filter(|inner| is_length(inner)),
    }
}

fn radius(value: Option<&str>) -> Option<String> {
    Some(
        match value {
            None => "0.25rem",
            Some("none") => "0px",
            Some("sm") => "0.125rem",
            Some("md") => "0.375rem",
            Some("lg") => "0.5rem",
            Some("xl") => "0.75rem",
            Some("2xl") => "1rem",
            Some("3xl") => "1.5rem",
            Some("full") => "9999px",
            Some(v) => return arbitrary(v),
        }
        .to_string(),
    )
}

fn shadow(value: Option<&str>) -> Option<String> {
    Some(
        match value {
            None => "0 1px 3px 0 rgb(0 0 0 / 0.1), 0 1px 2px -1px rgb(0 0 0 / 0.1)",
            Some("sm") => "0 1px 2px 0 rgb(0 0 0 / 0.05)",
            Some("md") => "0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1)",
            Some("lg") => "0 10px 15px -3px rgb(0 0 0 / 0.1), 0 4px 6px -4px rgb(0 0 0 / 0.1)",
            Some("xl") => "0 20px 25px -5px rgb(0 0 0 / 0.1), 0 8px 10px -6px rgb(0 0 0 / 0.1)",
            Some("2xl") => "0 25px 50px -12px rgb(0 0 0 / 0.25)",
            Some("inner") => "inset 0 2px 4px 0 rgb(0 0 0 / 0.05)",
            Some("none") => "0 0 #0000",
            Some(v) => return arbitrary(v),
        }
        .to_string(),
    )
}

fn millis(value: &str) -> Option<String> {
    if let Some(inner) = arbitrary(value) {
        return Some(inner);
    }
    let n: u32 = value.parse().ok()?;
    Some(format!("{n}ms"))
}

// -----------------------------------------------------------------------------
// Utilities
// -----------------------------------------------------------------------------

type SideTable = &'static [(&'static str, &'static [&'static str])];

const PADDING: SideTable = &[
    ("p", &["padding"]),
    ("px", &["padding-left", "padding-right"]),
    ("py", &["padding-top", "padding-bottom"]),
    ("pt", &["padding-top"]),
    ("pr", &["padding-right"]),
    ("pb", &["padding-bottom"]),
    ("pl", &["padding-left"]),
];

const MARGIN: SideTable = &[
    ("m", &["margin"]),
    ("mx", &["margin-left", "margin-right"]),
    ("my", &["margin-top", "margin-bottom"]),
    ("mt", &["margin-top"]),
    ("mr", &["margin-right"]),
    ("mb", &["margin-bottom"]),
    ("ml", &["margin-left"]),
];

const INSET: SideTable = &[
    ("inset", &["inset"]),
    ("inset-x", &["left", "right"]),
    ("inset-y", &["top", "bottom"]),
    ("top", &["top"]),
    ("right", &["right"]),
    ("bottom", &["bottom"]),
    ("left", &["left"]),
];

const GAP: SideTable = &[
    ("gap", &["gap"]),
    ("gap-x", &["column-gap"]),
    ("gap-y", &["row-gap"]),
];

const BORDER: SideTable = &[
    ("border", &["border-width"]),
    ("border-x", &["border-left-width", "border-right-width"]),
    ("border-y", &["border-top-width", "border-bottom-width"]),
    ("border-t", &["border-top-width"]),
    ("border-r", &["border-right-width"]),
    ("border-b", &["border-bottom-width"]),
    ("border-l", &["border-left-width"]),
];

const ROUNDED: SideTable = &[
    ("rounded", &["border-radius"]),
    ("rounded-t", &["border-top-left-radius", "border-top-right-radius"]),
    ("rounded-r", &["border-top-right-radius", "border-bottom-right-radius"]),
    ("rounded-b", &["border-bottom-right-radius", "border-bottom-left-radius"]),
    ("rounded-l", &["border-top-left-radius", "border-bottom-left-radius"]),
    ("rounded-tl", &["border-top-left-radius"]),
    ("rounded-tr", &["border-top-right-radius"]),
    ("rounded-br", &["border-bottom-right-radius"]),
    ("rounded-bl", &["border-bottom-left-radius"]),
];

const SIDE_TABLES: [SideTable; 6] = [PADDING, MARGIN, INSET, GAP, BORDER, ROUNDED];

const PREFIXES: &[&str] = &[
    "w", "h", "size", "min-w", "min-h", "max-w", "max-h", "basis", "text", "bg", "fill", "stroke",
    "font", "leading", "tracking", "opacity", "z", "order", "grid-cols", "grid-rows", "col-span",
    "row-span", "shadow", "duration",
];

const NEGATABLE: &[&str] = &[
    "m", "mx", "my", "mt", "mr", "mb", "ml", "inset", "inset-x", "inset-y", "top", "right",
    "bottom", "left", "z", "order", "tracking",
];

fn side_props(table: SideTable, prefix: &str) -> Option<&'static [&'static str]> {
    table.iter().find(|(p, _)| *p == prefix).map(|(_, props)| *props)
}

/// Longest known prefix followed by `-value` (or the whole utility).
fn split_prefix(utility: &str) -> Option<(&str, Option<&str>)> {
    let side_keys = SIDE_TABLES.iter().flat_map(|t| t.iter().map(|(p, _)| *p));
    side_keys
        .chain(PREFIXES.iter().copied())
        .filter_map(|prefix| {
            if utility == prefix {
                Some((prefix, None))
            } else {
                let rest = utility.strip_prefix(prefix)?.strip_prefix('-')?;
                (!rest.is_empty()).then_some((prefix, Some(rest)))
            }
        })
        .max_by_key(|(prefix, _)| prefix.len())
}

fn resolve(utility: &str, negative: bool) -> Option<Decls> {
    if !negative {
        if let Some(found) = keyword(utility) {
            return Some(found);
        }
    }
    let (prefix, value) = split_prefix(utility)?;
    if negative && !NEGATABLE.contains(&prefix) {
        return None;
    }

    if let Some(props) = side_props(PADDING, prefix) {
        return Some(decls(props, &spacing(value?, false)?));
    }
    if let Some(props) = side_props(MARGIN, prefix) {
        let v = match value? {
            "auto" => "auto".to_string(),
            v => spacing(v, negative)?,
        };
        return Some(decls(props, &v));
    }
    if let Some(props) = side_props(INSET, prefix) {
        return Some(decls(props, &inset(value?, negative)?));
    }
    if let Some(props) = side_props(GAP, prefix) {
        return Some(decls(props, &spacing(value?, false)?));
    }
    if let Some(props) = side_props(BORDER, prefix) {
        if let Some(width) = border_width(value) {
            return Some(decls(props, &width));
        }
        return (prefix == "border")
            .then(|| color(value?))
            .flatten()
            .map(|c| decl("border-color", c));
    }
    if let Some(props) = side_props(ROUNDED, prefix) {
        return Some(decls(props, &radius(value)?));
    }

    if prefix == "shadow" {
        return Some(decl("box-shadow", shadow(value)?));
    }
    let value = value?;
    Some(match prefix {
        "w" => decl("width", size(value, "100vw")?),
        "h" => decl("height", size(value, "100vh")?),
        "size" => decls(&["width", "height"], &size(value, "100%")?),
        "min-w" => decl("min-width", size(value, "100vw")?),
        "min-h" => decl("min-height", size(value, "100vh")?),
        "max-w" => decl("max-width", max_width(value)?),
        "max-h" => decl("max-height", size(value, "100vh")?),
        "basis" => decl("flex-basis", size(value, "100vw")?),
        "text" => text(value)?,
        "bg" => decl("background-color", color(value)?),
        "fill" => decl("fill", color(value)?),
        "stroke" => decl("stroke", color(value)?),
        "font" => font(value)?,
        "leading" => decl("line-height", leading(value)?),
        "tracking" => decl("letter-spacing", tracking(value, negative)?),
        "opacity" => decl("opacity", opacity(value)?),
        "z" => match value {
            "auto" => decl("z-index", "auto"),
            _ => decl("z-index", integer(value, negative)?),
        },
        "order" => decl("order", order(value, negative)?),
        "grid-cols" => decl("grid-template-columns", grid_template(value)?),
        "grid-rows" => decl("grid-template-rows", grid_template(value)?),
        "col-span" => decl("grid-column", span(value)?),
        "row-span" => decl("grid-row", span(value)?),
        "duration" => decl("transition-duration", millis(value)?),
        _ => return None,
    })
}

fn flex_align(value: &str) -> Option<&'static str> {
    Some(match value {
        "start" => "flex-start",
        "end" => "flex-end",
        "center" => "center",
        "baseline" => "baseline",
        "stretch" => "stretch",
        _ => return None,
    })
}

fn distribute(value: &str) -> Option<&'static str> {
    Some(match value {
        "start" => "flex-start",
        "end" => "flex-end",
        "center" => "center",
        "between" => "space-between",
        "around" => "space-around",
        "evenly" => "space-evenly",
        "stretch" => "stretch",
        _ => return None,
    })
}

const TRANSITION_PROPS: &str = "color, background-color, border-color, text-decoration-color, fill, stroke, opacity, box-shadow, transform, filter, backdrop-filter";

fn transition(property: &str) -> Decls {
    vec![
        ("transition-property", property.to_string()),
        ("transition-timing-function", "cubic-bezier(0.4, 0, 0.2, 1)".to_string()),
        ("transition-duration", "150ms".to_string()),
    ]
}

/// Utilities that are a fixed name rather than `prefix-value`.
fn keyword(utility: &str) -> Option<Decls> {
    let found = match utility {
        "block" | "inline-block" | "inline" | "flex" | "inline-flex" | "grid" | "inline-grid"
        | "contents" | "table" | "flow-root" | "list-item" => decl("display", utility),
        "hidden" => decl("display", "none"),
        "static" | "fixed" | "absolute" | "relative" | "sticky" => decl("position", utility),
        "visible" => decl("visibility", "visible"),
        "invisible" => decl("visibility", "hidden"),
        "flex-row" => decl("flex-direction", "row"),
        "flex-row-reverse" => decl("flex-direction", "row-reverse"),
        "flex-col" => decl("flex-direction", "column"),
        "flex-col-reverse" => decl("flex-direction", "column-reverse"),
        "flex-wrap" => decl("flex-wrap", "wrap"),
        "flex-wrap-reverse" => decl("flex-wrap", "wrap-reverse"),
        "flex-nowrap" => decl("flex-wrap", "nowrap"),
        "flex-1" => decl("flex", "1 1 0%"),
        "flex-auto" => decl("flex", "1 1 auto"),
        "flex-initial" => decl("flex", "0 1 auto"),
        "flex-none" => decl("flex", "none"),
        "grow" => decl("flex-grow", "1"),
        "grow-0" => decl("flex-grow", "0"),
        "shrink" => decl("flex-shrink", "1"),
        "shrink-0" => decl("flex-shrink", "0"),
        "text-left" | "text-center" | "text-right" | "text-justify" | "text-start" | "text-end" => {
            decl("text-align", &utility[5..])
        }
        "italic" => decl("font-style", "italic"),
        "not-italic" => decl("font-style", "normal"),
        "underline" | "overline" | "line-through" => decl("text-decoration-line", utility),
        "no-underline" => decl("text-decoration-line", "none"),
        "uppercase" | "lowercase" | "capitalize" => decl("text-transform", utility),
        "normal-case" => decl("text-transform", "none"),
        "truncate" => vec![
            ("overflow", "hidden".to_string()),
            ("text-overflow", "ellipsis".to_string()),
            ("white-space", "nowrap".to_string()),
        ],
        "text-ellipsis" => decl("text-overflow", "ellipsis"),
        "text-clip" => decl("text-overflow", "clip"),
        "break-words" => decl("overflow-wrap", "break-word"),
        "break-all" => decl("word-break", "break-all"),
        "border-solid" | "border-dashed" | "border-dotted" | "border-double" | "border-hidden"
        | "border-none" => decl("border-style", &utility[7..]),
        "box-border" => decl("box-sizing", "border-box"),
        "box-content" => decl("box-sizing", "content-box"),
        "isolate" => decl("isolation", "isolate"),
        "antialiased" => vec![
            ("-webkit-font-smoothing", "antialiased".to_string()),
            ("-moz-osx-font-smoothing", "grayscale".to_string()),
        ],
        "sr-only" => vec![
            ("position", "absolute".to_string()),
            ("width", "1px".to_string()),
            ("height", "1px".to_string()),
            ("padding", "0".to_string()),
            ("margin", "-1px".to_string()),
            ("overflow", "hidden".to_string()),
            ("clip", "rect(0, 0, 0, 0)".to_string()),
            ("white-space", "nowrap".to_string()),
            ("border-width", "0".to_string()),
        ],
        "list-none" | "list-disc" | "list-decimal" => decl("list-style-type", &utility[5..]),
        "aspect-auto" => decl("aspect-ratio", "auto"),
        "aspect-square" => decl("aspect-ratio", "1 / 1"),
        "aspect-video" => decl("aspect-ratio", "16 / 9"),
        "pointer-events-none" => decl("pointer-events", "none"),
        "pointer-events-auto" => decl("pointer-events", "auto"),
        "transition" => transition(TRANSITION_PROPS),
        "transition-all" => transition("all"),
        "transition-colors" => transition(
            "color, background-color, border-color, text-decoration-color, fill, stroke",
        ),
        "transition-opacity" => transition("opacity"),
        "transition-none" => decl("transition-property", "none"),
        _ => return keyword_family(utility),
    };
    Some(found)
}

fn keyword_family(utility: &str) -> Option<Decls> {
    let (family, value) = utility.rsplit_once('-')?;
    Some(match family {
        "items" => decl("align-items", flex_align(value)?),
        "self" if value == "auto" => decl("align-self", "auto"),
        "self" => decl("align-self", flex_align(value)?),
        "justify" => decl("justify-content", distribute(value)?),
        "content" => decl("align-content", distribute(value)?),
        "place-items" => decl("place-items", flex_align(value)?),
        "place-content" => decl("place-content", distribute(value)?),
        "overflow" | "overflow-x" | "overflow-y" => match value {
            "auto" | "hidden" | "clip" | "visible" | "scroll" => decl(
                match family {
                    "overflow-x" => "overflow-x",
                    "overflow-y" => "overflow-y",
                    _ => "overflow",
                },
                value,
            ),
            _ => return None,
        },
        "whitespace" | "whitespace-pre" | "whitespace-break" => {
            let v = &utility["whitespace-".len()..];
            match v {
                "normal" | "nowrap" | "pre" | "pre-line" | "pre-wrap" | "break-spaces" => {
                    decl("white-space", v)
                }
                _ => return None,
            }
        }
        "cursor" | "cursor-not" => {
            let v = &utility["cursor-".len()..];
            match v {
                "auto" | "default" | "pointer" | "wait" | "text" | "move" | "not-allowed"
                | "grab" | "grabbing" | "help" | "crosshair" => decl("cursor", v),
                _ => return None,
            }
        }
        "select" => match value {
            "none" | "text" | "all" | "auto" => decl("user-select", value),
            _ => return None,
        },
        "object" | "object-scale" => {
            let v = &utility["object-".len()..];
            match v {
                "contain" | "cover" | "fill" | "none" | "scale-down" => decl("object-fit", v),
                _ => return None,
            }
        }
        _ => return None,
    })
}
