//! Left-hand side matching.
//!
//! A row pattern is laid along the rule direction from a start cell. Rows
//! with an ellipsis match once per gap length. A multi-row rule matches every
//! combination of its rows' matches.

use puzzlang_types::{CellPattern, CellTerm, CompiledGame, Direction, ObjectId, RowPattern, Rule};

use crate::grid::Grid;

/// Grid cells bound to the non-ellipsis cells of one row, in pattern order.
pub type RowMatch = Vec<usize>;

/// One binding per rule row.
pub type RuleMatch = Vec<RowMatch>;

/// The first object of `term` present in `cell` whose movement satisfies the
/// term's qualifier.
pub fn matching_object(grid: &Grid, game: &CompiledGame, cell: usize, term: &CellTerm) -> Option<ObjectId> {
    term.objects.iter().copied().find(|&id| {
        let slot = grid.slot(cell, game.layer_of(id));
        slot.object == Some(id) && term.movement.accepts(slot.movement)
    })
}

pub fn cell_matches(grid: &Grid, game: &CompiledGame, cell: usize, terms: &[CellTerm]) -> bool {
    terms
        .iter()
        .all(|t| matching_object(grid, game, cell, t).is_some() != t.negated)
}

fn segment_at(
    grid: &Grid,
    game: &CompiledGame,
    start: usize,
    dir: Direction,
    segment: &[CellPattern],
    out: &mut RowMatch,
) -> Option<usize> {
    let mut cell = start;
    for (i, pattern) in segment.iter().enumerate() {
        if i > 0 {
            cell = grid.step(cell, dir)?;
        }
        if !cell_matches(grid, game, cell, pattern.terms()) {
            return None;
        }
        out.push(cell);
    }
    Some(cell)
}

/// Matches of one row starting at `start`.
fn row_matches_at(grid: &Grid, game: &CompiledGame, row: &RowPattern, dir: Direction, start: usize) -> Vec<RowMatch> {
    let Some(split) = row.iter().position(|c| matches!(c, CellPattern::Ellipsis)) else {
        let mut bound = Vec::with_capacity(row.len());
        return match segment_at(grid, game, start, dir, row, &mut bound) {
            Some(_) => vec![bound],
            None => Vec::new(),
        };
    };

    let (before, after) = (&row[..split], &row[split + 1..]);
    let mut head = Vec::with_capacity(row.len() - 1);
    let Some(last) = segment_at(grid, game, start, dir, before, &mut head) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    let mut gap_start = grid.step(last, dir);
    while let Some(cell) = gap_start {
        let mut bound = head.clone();
        if segment_at(grid, game, cell, dir, after, &mut bound).is_some() {
            found.push(bound);
        }
        gap_start = grid.step(cell, dir);
    }
    found
}

/// Every match of `row` in row-major scan order.
pub fn row_matches(grid: &Grid, game: &CompiledGame, row: &RowPattern, dir: Direction) -> Vec<RowMatch> {
    (0..grid.cell_count())
        .flat_map(|start| row_matches_at(grid, game, row, dir, start))
        .collect()
}

/// Every match of `rule`, the cartesian product of its rows' matches.
pub fn rule_matches(grid: &Grid, game: &CompiledGame, rule: &Rule) -> Vec<RuleMatch> {
    let mut combos: Vec<RuleMatch> = vec![Vec::new()];
    for row in &rule.lhs {
        let matches = row_matches(grid, game, row, rule.direction);
        if matches.is_empty() {
            return Vec::new();
        }
        combos = combos
            .into_iter()
            .flat_map(|prefix| {
                matches.iter().map(move |m| {
                    let mut next = prefix.clone();
                    next.push(m.clone());
                    next
                })
            })
            .collect();
    }
    combos
}

/// Whether a previously found match still holds.
pub fn still_matches(grid: &Grid, game: &CompiledGame, rule: &Rule, m: &RuleMatch) -> bool {
    rule.lhs.iter().zip(m).all(|(row, cells)| {
        row.iter()
            .filter(|c| !matches!(c, CellPattern::Ellipsis))
            .zip(cells)
            .all(|(pattern, &cell)| cell_matches(grid, game, cell, pattern.terms()))
    })
}
