//! Loading - IDS recipe tables and Unihan definitions
//!
//! Bad rows are recorded in the [`LoadReport`] and skipped; they never stop the
//! rest of the file from loading.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::operators::APPROX_MARKER;
use crate::registry::Registry;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub rows: usize,
    pub registered: usize,
    pub rejected: usize,
    pub errors: Vec<RowError>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            rows: 0,
            registered: 0,
            rejected: 0,
            errors: vec![],
            loaded_at: Utc::now(),
        }
    }

    fn error(&mut self, line: usize, message: String) {
        warn!(source = %self.source, line, %message, "skipping row");
        self.errors.push(RowError { line, message });
    }
}

/// The recipes one IDS row contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdsRow {
    pub result: char,
    /// The candidate picked by the variant policy.
    pub primary: Option<String>,
    /// Candidates flagged `(X)`, always registered.
    pub alternates: Vec<String>,
}

/// Parse one tab-separated IDS row. Comments and blank lines yield `None`.
///
/// Columns: label, result character, then candidate cells `^recipe$flags`.
pub fn parse_ids_row(
    line: &str,
    line_num: usize,
    preferred_variant: char,
) -> Result<Option<IdsRow>, LoadError> {
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let malformed = |reason: String| LoadError::MalformedRow { line: line_num, reason };

    let columns: Vec<&str> = line.split('\t').collect();
    let result_column = columns
        .get(1)
        .ok_or_else(|| malformed("missing result column".to_string()))?;
    let mut result_chars = result_column.chars();
    let result = match (result_chars.next(), result_chars.next()) {
        (Some(c), None) => c,
        _ => return Err(malformed(format!("result {result_column:?} is not one character"))),
    };

    let mut candidates: Vec<(&str, &str)> = vec![];
    let mut alternates = vec![];
    for cell in &columns[2..] {
        let Some(cell) = cell.strip_prefix('^') else {
            continue;
        };
        let (recipe, flags) = cell
            .split_once('$')
            .ok_or_else(|| malformed(format!("candidate {cell:?} is missing '$'")))?;

        let len = recipe.chars().count();
        let approx = recipe.starts_with(APPROX_MARKER);
        if flags == "(UCS2003)" || flags == "(Z)" || len <= 1 || (approx && len <= 2) {
            continue;
        }
        if flags == "(X)" {
            alternates.push(recipe.to_string());
        } else {
            candidates.push((recipe, flags));
        }
    }

    Ok(Some(IdsRow {
        result,
        primary: select_candidate(&candidates, preferred_variant).map(str::to_string),
        alternates,
    }))
}

/// The candidate whose flags name the preferred variant, else the one with the
/// most flag characters (earliest on ties).
fn select_candidate<'a>(
    candidates: &[(&'a str, &str)],
    preferred_variant: char,
) -> Option<&'a str> {
    let preferred = candidates
        .iter()
        .find(|(_, flags)| flags.contains(preferred_variant));
    if let Some((recipe, _)) = preferred {
        return Some(*recipe);
    }
    let mut best: Option<(&'a str, usize)> = None;
    for (recipe, flags) in candidates {
        if best.map_or(true, |(_, len)| flags.len() > len) {
            best = Some((*recipe, flags.len()));
        }
    }
    best.map(|(recipe, _)| recipe)
}

/// Register every row of an IDS table.
pub fn load_ids_str(
    registry: &mut Registry,
    source: &str,
    content: &str,
    config: &Config,
) -> LoadReport {
    let mut report = LoadReport::new(source);
    for (i, line) in content.lines().enumerate() {
        let line_num = i + 1;
        let row = match parse_ids_row(line, line_num, config.preferred_variant) {
            Ok(Some(row)) => row,
            Ok(None) => continue,
            Err(e) => {
                report.error(line_num, e.to_string());
                continue;
            }
        };
        report.rows += 1;

        for recipe in row.primary.iter().chain(&row.alternates) {
            match registry.register_recipe(row.result, recipe) {
                Ok(outcome) if outcome.is_registered() => report.registered += 1,
                Ok(_) => report.rejected += 1,
                Err(e) => report.error(line_num, format!("{recipe} for {}: {e}", row.result)),
            }
        }
    }
    info!(
        source,
        rows = report.rows,
        registered = report.registered,
        errors = report.errors.len(),
        "loaded recipes"
    );
    report
}

pub fn load_ids_file(
    registry: &mut Registry,
    path: &Path,
    config: &Config,
) -> Result<LoadReport, LoadError> {
    let content = read(path)?;
    Ok(load_ids_str(registry, &path.display().to_string(), &content, config))
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// `U+6728` to `木`.
pub fn parse_code_point_label(label: &str) -> Option<char> {
    let hex = label.strip_prefix("U+")?;
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

const DROPPED_ANNOTATIONS: [&str; 8] = [
    "form",
    "same as",
    "variant",
    "dialect",
    "interchangeable",
    "archaic",
    "non-classical",
    "+",
];

/// Split a `kDefinition` value into the meanings worth keeping.
///
/// Entries about radicals are dropped. Japanese (`J`) and Cantonese (`Cant.`)
/// entries are kept only for the matching `dialect`. Cross-reference style
/// annotations are dropped; any other annotation is kept in parentheses.
pub fn clean_meanings(definition: &str, dialect: Option<char>) -> Vec<String> {
    let mut meanings = vec![];
    for entry in definition.split([',', ';']) {
        if entry.contains("radical") {
            continue;
        }
        let (annotations, text) = split_annotations(entry);
        let mut meaning = text;
        let mut japanese = false;
        let mut cantonese = false;
        for info in annotations {
            if info.contains('J') {
                japanese = true;
            } else if info.contains("Cant.") {
                cantonese = true;
            } else if !DROPPED_ANNOTATIONS.iter().any(|d| info.contains(d)) {
                meaning.push_str(&format!(" ({info})"));
            }
        }
        if (japanese && dialect != Some('J')) || (cantonese && dialect != Some('C')) {
            continue;
        }
        if !meaning.is_empty() {
            meanings.push(meaning);
        }
    }
    meanings
}

/// Parenthesised parts of `s`, and the remaining text with whitespace collapsed.
fn split_annotations(s: &str) -> (Vec<String>, String) {
    let mut annotations = vec![];
    let mut text = String::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => {
                if depth > 0 {
                    current.push(c);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    annotations.push(current.trim().to_string());
                    current.clear();
                } else {
                    current.push(c);
                }
            }
            _ if depth > 0 => current.push(c),
            _ => text.push(c),
        }
    }
    (annotations, text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Add the kept meanings of `definition` to `character`. Returns how many were added.
pub fn register_meanings(
    registry: &mut Registry,
    character: char,
    definition: &str,
    dialect: Option<char>,
) -> usize {
    let meanings = clean_meanings(definition, dialect);
    let added = meanings.len();
    for meaning in meanings {
        registry.add_meaning(character, meaning);
    }
    added
}

/// Load `kDefinition` rows of a Unihan readings file: `U+XXXX<TAB>field<TAB>value`.
pub fn load_meanings_str(
    registry: &mut Registry,
    source: &str,
    content: &str,
    config: &Config,
) -> LoadReport {
    let mut report = LoadReport::new(source);
    for (i, line) in content.lines().enumerate() {
        let line_num = i + 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.get(1) != Some(&"kDefinition") {
            continue;
        }
        report.rows += 1;
        let (Some(character), Some(definition)) =
            (parse_code_point_label(columns[0]), columns.get(2))
        else {
            report.error(line_num, format!("malformed definition row {line:?}"));
            continue;
        };
        if register_meanings(registry, character, definition, config.definition_dialect) > 0 {
            report.registered += 1;
        } else {
            report.rejected += 1;
        }
    }
    info!(source, characters = report.registered, "loaded meanings");
    report
}

pub fn load_meanings_file(
    registry: &mut Registry,
    path: &Path,
    config: &Config,
) -> Result<LoadReport, LoadError> {
    let content = read(path)?;
    Ok(load_meanings_str(registry, &path.display().to_string(), &content, config))
}
