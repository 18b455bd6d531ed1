use std::collections::BTreeSet;

use puzzlang_types::{CompiledGame, ObjectId, WinCondition, WinQuantifier};

use crate::grid::Grid;

fn holds_any(grid: &Grid, game: &CompiledGame, cell: usize, ids: &BTreeSet<ObjectId>) -> bool {
    ids.iter().any(|&id| grid.contains(cell, game.layer_of(id), id))
}

pub fn condition_holds(grid: &Grid, game: &CompiledGame, cond: &WinCondition) -> bool {
    let mut cells = 0..grid.cell_count();
    let on_target = |cell: usize| match &cond.target {
        Some(target) => holds_any(grid, game, cell, target),
        None => true,
    };
    let subject = |cell: usize| holds_any(grid, game, cell, &cond.subject);
    match cond.quantifier {
        WinQuantifier::No => !cells.any(|c| subject(c) && on_target(c)),
        WinQuantifier::Some => cells.any(|c| subject(c) && on_target(c)),
        WinQuantifier::All => cells.all(|c| !subject(c) || on_target(c)),
    }
}

/// True when the game declares at least one condition and all of them hold.
pub fn evaluate(grid: &Grid, game: &CompiledGame) -> bool {
    !game.win_conditions.is_empty() && game.win_conditions.iter().all(|c| condition_holds(grid, game, c))
}
