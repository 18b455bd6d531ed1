use std::collections::BTreeSet;
use std::str::FromStr;

use puzzlang_types::{ObjectId, WinCondition, WinQuantifier};

use crate::error::Diagnostics;
use crate::legend_parser::LegendTable;
use crate::script_lexer::SourceLine;

fn resolve(name: &str, line: usize, legend: &LegendTable, diags: &mut Diagnostics) -> Option<BTreeSet<ObjectId>> {
    let Some(kind) = legend.lookup(name) else {
        diags.undefined(line, name);
        return None;
    };
    if kind.is_aggregate() {
        diags.syntax(
            line,
            format!("win conditions cannot use the aggregate '{name}'"),
        );
        return None;
    }
    Some(kind.objects().clone())
}

/// Parse WINCONDITIONS: `no X`, `some X`, `all X on Y`, `no X on Y`,
/// `some X on Y`. `any` is a synonym of `some`.
pub fn parse_win_conditions(lines: &[SourceLine], legend: &LegendTable, diags: &mut Diagnostics) -> Vec<WinCondition> {
    let mut conditions = Vec::new();

    for line in lines.iter().filter(|l| !l.value.is_empty()) {
        let words: Vec<String> = line.value.split_whitespace().map(str::to_lowercase).collect();
        let Ok(quantifier) = WinQuantifier::from_str(&words[0]) else {
            diags.syntax(line.line, format!("unknown win quantifier '{}'", words[0]));
            continue;
        };

        let (subject, target) = match words.as_slice() {
            [_, subject] if quantifier != WinQuantifier::All => (subject, None),
            [_, subject, on, target] if on == "on" => (subject, Some(target)),
            _ => {
                diags.syntax(
                    line.line,
                    format!("malformed win condition '{}'", line.value),
                );
                continue;
            }
        };

        let subject = resolve(subject, line.line, legend, diags);
        let target = match target {
            Some(name) => resolve(name, line.line, legend, diags).map(Some),
            None => Some(None),
        };
        let (Some(subject), Some(target)) = (subject, target) else {
            continue;
        };
        conditions.push(WinCondition {
            quantifier,
            subject,
            target,
            line: line.line,
        });
    }

    log::debug!("compiled {} win conditions", conditions.len());
    conditions
}
