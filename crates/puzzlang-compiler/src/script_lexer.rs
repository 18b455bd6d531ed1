//! Comment stripping and section splitting for game scripts.
//!
//! Comments are parenthesised and may nest or span lines. They are removed
//! before anything else, keeping every newline so later diagnostics report
//! the original line numbers.

use std::collections::HashMap;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::Diagnostics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Section {
    Objects,
    Legend,
    Sounds,
    CollisionLayers,
    Scripts,
    Rules,
    WinConditions,
    Levels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub value: T,
    pub line: usize,
}

/// A trimmed script line. Blank lines are kept: objects and levels use them
/// as separators.
pub type SourceLine = Located<String>;

#[derive(Debug, Default)]
pub struct ScriptSections {
    /// Lines before the first section header.
    pub prelude: Vec<SourceLine>,
    sections: HashMap<Section, Vec<SourceLine>>,
}

impl ScriptSections {
    pub fn lines(&self, section: Section) -> &[SourceLine] {
        self.sections.get(&section).map_or(&[], Vec::as_slice)
    }

    pub fn has(&self, section: Section) -> bool {
        self.sections.contains_key(&section)
    }
}

/// Replace every `( ... )` comment with spaces, keeping newlines.
pub fn strip_comments(input: &str, diags: &mut Diagnostics) -> String {
    let mut out = String::with_capacity(input.len());
    let mut depth = 0usize;
    let mut line = 1usize;
    let mut opened_at = 0usize;

    for ch in input.chars() {
        match ch {
            '(' => {
                if depth == 0 {
                    opened_at = line;
                }
                depth += 1;
                out.push(' ');
            }
            ')' if depth > 0 => {
                depth -= 1;
                out.push(' ');
            }
            '\n' => {
                line += 1;
                out.push('\n');
            }
            _ if depth > 0 => out.push(' '),
            _ => out.push(ch),
        }
    }

    if depth > 0 {
        diags.syntax(opened_at, "unterminated comment");
    }
    out
}

fn is_separator(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '=')
}

/// Split a script into its prelude and sections.
pub fn split_sections(input: &str, diags: &mut Diagnostics) -> ScriptSections {
    let stripped = strip_comments(input, diags);
    let mut result = ScriptSections::default();
    let mut current: Option<Section> = None;

    for (idx, raw) in stripped.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();

        if is_separator(text) {
            continue;
        }

        if let Ok(section) = Section::from_str(text) {
            if result.sections.contains_key(&section) {
                diags.syntax(line, format!("section {section} declared twice"));
            }
            result.sections.entry(section).or_default();
            current = Some(section);
            continue;
        }

        let located = Located {
            value: text.to_string(),
            line,
        };
        match current {
            None => result.prelude.push(located),
            Some(section) => result.sections.entry(section).or_default().push(located),
        }
    }

    log::debug!(
        "split script: {} prelude lines, {} sections",
        result.prelude.len(),
        result.sections.len()
    );
    result
}
