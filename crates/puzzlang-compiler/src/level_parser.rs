//! LEVELS section: blank-line separated grids interleaved with `message` lines.

use std::collections::BTreeSet;

use puzzlang_types::{LevelDef, LevelEntry, ObjectDef, ObjectId};

use crate::error::{Diagnostics, ErrorKind};
use crate::legend_parser::LegendTable;
use crate::script_lexer::SourceLine;

#[derive(Debug, Default)]
pub struct CompiledLevels {
    pub levels: Vec<LevelDef>,
    pub order: Vec<LevelEntry>,
}

struct LevelBuilder<'a> {
    objects: &'a [ObjectDef],
    legend: &'a LegendTable,
    background: Option<ObjectId>,
    out: CompiledLevels,
}

impl LevelBuilder<'_> {
    fn cell(&self, ch: char, line: usize, diags: &mut Diagnostics) -> Option<Vec<ObjectId>> {
        let symbol = ch.to_lowercase().to_string();
        let ids: BTreeSet<ObjectId> = match self.legend.lookup(&symbol) {
            None => {
                diags.undefined(line, &symbol);
                return None;
            }
            Some(kind) if kind.is_property() => {
                diags.syntax(
                    line,
                    format!("'{ch}' stands for one of several objects and cannot be placed in a level"),
                );
                return None;
            }
            Some(kind) => kind.objects().clone(),
        };

        let mut by_layer: Vec<Option<ObjectId>> = Vec::new();
        for id in &ids {
            let layer = self.objects.get(id.index()).map_or(0, |o| o.layer);
            if by_layer.len() <= layer {
                by_layer.resize(layer + 1, None);
            }
            if let Some(other) = by_layer[layer].replace(*id) {
                diags.push(
                    ErrorKind::LayerConflict,
                    line,
                    format!("'{ch}' puts objects {other} and {id} on the same collision layer"),
                );
                return None;
            }
        }

        let mut cell: Vec<ObjectId> = ids.into_iter().collect();
        if let Some(bg) = self.background {
            let bg_layer = self.objects.get(bg.index()).map_or(0, |o| o.layer);
            if by_layer.get(bg_layer).copied().flatten().is_none() {
                cell.push(bg);
                cell.sort_unstable();
            }
        }
        Some(cell)
    }

    fn finish_grid(&mut self, rows: &mut Vec<&SourceLine>, diags: &mut Diagnostics) {
        if rows.is_empty() {
            return;
        }
        let line = rows[0].line;
        let width = rows[0].value.chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        let mut ok = true;

        for row in rows.iter() {
            if row.value.chars().count() != width {
                diags.syntax(
                    row.line,
                    format!("level rows must all be {width} characters wide"),
                );
                ok = false;
                continue;
            }
            for ch in row.value.chars() {
                match self.cell(ch, row.line, diags) {
                    Some(cell) => cells.push(cell),
                    None => ok = false,
                }
            }
        }

        let height = rows.len();
        rows.clear();
        if !ok {
            return;
        }
        log::trace!("level {} at line {line}: {width}x{height}", self.out.levels.len());
        self.out.order.push(LevelEntry::Level(self.out.levels.len()));
        self.out.levels.push(LevelDef {
            width,
            height,
            cells,
            line,
        });
    }
}

fn message_text(text: &str) -> Option<&str> {
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (text, ""),
    };
    head.eq_ignore_ascii_case("message").then_some(rest)
}

/// Compile LEVELS. Cells hold sorted object ids with the background filled
/// in wherever the background layer is otherwise empty.
pub fn parse_levels(
    lines: &[SourceLine],
    objects: &[ObjectDef],
    legend: &LegendTable,
    diags: &mut Diagnostics,
) -> CompiledLevels {
    let mut builder = LevelBuilder {
        objects,
        legend,
        background: legend.background,
        out: CompiledLevels::default(),
    };
    let mut rows: Vec<&SourceLine> = Vec::new();

    for line in lines {
        if line.value.is_empty() {
            builder.finish_grid(&mut rows, diags);
            continue;
        }
        if let Some(text) = message_text(&line.value) {
            builder.finish_grid(&mut rows, diags);
            builder.out.order.push(LevelEntry::Message(text.to_string()));
            continue;
        }
        rows.push(line);
    }
    builder.finish_grid(&mut rows, diags);

    let out = builder.out;
    log::debug!(
        "compiled {} levels, {} entries in level order",
        out.levels.len(),
        out.order.len()
    );
    out
}
