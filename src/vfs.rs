//! Virtual files inside one snippet source.
//!
//! ```text
//! // @snippet-file button
//! export function Button() { ... }
//! // @snippet-file-end
//! // @import button
//! export default function App() { return <Button />; }
//! ```
//!
//! [`scan`] splits the source into the main block plus named files and
//! produces the expanded source, where every `@import <name>` line is replaced
//! by that file's (recursively expanded) lines, along with a line map that
//! tags every expanded line with its origin.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 20;

static FILE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*//\s*@snippet-file\s+(\S.*?)\s*$").unwrap());
static FILE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*//\s*@snippet-file-end(?:\s+\S.*)?\s*$").unwrap());
static IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?://\s*)?@import\s+["']?([^\s"';]+)["']?\s*;?\s*$"#).unwrap());

/// Origin of a run of expanded lines. `file_name` is `None` for the main block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSegment {
    pub file_name: Option<String>,
    pub expanded_start_line: usize,
    pub original_start_line: usize,
    pub line_count: usize,
}

impl LineSegment {
    pub fn contains(&self, expanded_line: usize) -> bool {
        expanded_line >= self.expanded_start_line
            && expanded_line < self.expanded_start_line + self.line_count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub main_source: String,
    pub files: BTreeMap<String, String>,
    pub has_file_blocks: bool,
    pub expanded_source: String,
    pub line_map_segments: Vec<LineSegment>,
    /// File names in order of first appearance.
    pub file_order: Vec<String>,
    #[serde(skip)]
    main_raw_lines: Vec<usize>,
    #[serde(skip)]
    file_raw_lines: BTreeMap<String, Vec<usize>>,
}

impl ScanResult {
    /// Map a 1-based line of the main block (`None`) or a virtual file back to
    /// the 1-based line in the raw, unsplit source.
    pub fn raw_line(&self, file: Option<&str>, line: usize) -> Option<usize> {
        let lines = match file {
            None => &self.main_raw_lines,
            Some(name) => self.file_raw_lines.get(name)?,
        };
        line.checked_sub(1).and_then(|idx| lines.get(idx)).copied()
    }

    /// Resolve a 1-based expanded line to `(file, line within that file)`.
    pub fn origin_of(&self, expanded_line: usize) -> Option<(Option<&str>, usize)> {
        self.line_map_segments
            .iter()
            .find(|s| s.contains(expanded_line))
            .map(|s| {
                (
                    s.file_name.as_deref(),
                    s.original_start_line + (expanded_line - s.expanded_start_line),
                )
            })
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

fn line_count(text: &str) -> usize {
    split_lines(text).len()
}

/// Name referenced by an `@import` line, if the line is one.
pub fn import_target(line: &str) -> Option<&str> {
    IMPORT
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn open_marker(line: &str) -> Option<String> {
    FILE_OPEN
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

pub fn scan(source: &str) -> ScanResult {
    scan_with_depth(source, DEFAULT_MAX_IMPORT_DEPTH)
}

pub fn scan_with_depth(source: &str, max_depth: usize) -> ScanResult {
    let mut main_lines: Vec<&str> = Vec::new();
    let mut main_raw_lines = Vec::new();
    let mut buffers: FxHashMap<String, (Vec<&str>, Vec<usize>)> = FxHashMap::default();
    let mut file_order: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut has_file_blocks = false;

    for (idx, line) in split_lines(source).into_iter().enumerate() {
        let raw_line = idx + 1;
        if let Some(name) = open_marker(line) {
            has_file_blocks = true;
            if !buffers.contains_key(&name) {
                file_order.push(name.clone());
            }
            buffers.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if current.is_some() && FILE_END.is_match(line) {
            current = None;
            continue;
        }
        match &current {
            Some(name) => {
                let (lines, raws) = buffers.entry(name.clone()).or_default();
                lines.push(line);
                raws.push(raw_line);
            }
            None => {
                main_lines.push(line);
                main_raw_lines.push(raw_line);
            }
        }
    }

    let main_source = main_lines.join("\n").trim_end().to_string();
    main_raw_lines.truncate(line_count(&main_source));

    let mut files = BTreeMap::new();
    let mut file_raw_lines = BTreeMap::new();
    for (name, (lines, mut raws)) in buffers {
        let content = lines.join("\n").trim_end().to_string();
        raws.truncate(line_count(&content));
        files.insert(name.clone(), content);
        file_raw_lines.insert(name, raws);
    }

    let mut expander = Expander {
        files: &files,
        max_depth,
        active: FxHashSet::default(),
        out: Vec::new(),
        segments: Vec::new(),
    };
    expander.expand(&main_source, None, 0);
    let Expander {
        out, mut segments, ..
    } = expander;

    let expanded_source = out.join("\n").trim_end().to_string();
    trim_segments(&mut segments, line_count(&expanded_source));

    ScanResult {
        main_source,
        files,
        has_file_blocks,
        expanded_source,
        line_map_segments: segments,
        file_order,
        main_raw_lines,
        file_raw_lines,
    }
}

struct Expander<'a> {
    files: &'a BTreeMap<String, String>,
    max_depth: usize,
    /// Files currently being expanded on this branch.
    active: FxHashSet<String>,
    out: Vec<String>,
    segments: Vec<LineSegment>,
}

impl<'a> Expander<'a> {
    fn expand(&mut self, text: &str, file: Option<&str>, depth: usize) {
        for (idx, line) in split_lines(text).into_iter().enumerate() {
            if let Some(target) = import_target(line) {
                if let Some(content) = self.files.get(target) {
                    if depth < self.max_depth && !self.active.contains(target) {
                        self.active.insert(target.to_string());
                        self.expand(content, Some(target), depth + 1);
                        self.active.remove(target);
                        continue;
                    }
                    tracing::debug!(file = target, depth, "import left unexpanded (cycle or depth limit)");
                }
            }
            self.push_line(line, file, idx + 1);
        }
    }

    fn push_line(&mut self, line: &str, file: Option<&str>, original_line: usize) {
        self.out.push(line.to_string());
        let expanded_line = self.out.len();
        if let Some(last) = self.segments.last_mut() {
            if last.file_name.as_deref() == file
                && last.original_start_line + last.line_count == original_line
            {
                last.line_count += 1;
                return;
            }
        }
        self.segments.push(LineSegment {
            file_name: file.map(str::to_string),
            expanded_start_line: expanded_line,
            original_start_line: original_line,
            line_count: 1,
        });
    }
}

fn trim_segments(segments: &mut Vec<LineSegment>, total_lines: usize) {
    segments.retain(|s| s.expanded_start_line <= total_lines);
    if let Some(last) = segments.last_mut() {
        let end = last.expanded_start_line + last.line_count - 1;
        if end > total_lines {
            last.line_count -= end - total_lines;
        }
    }
}
