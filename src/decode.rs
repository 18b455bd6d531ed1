//! Rendering level contents back to legend text.

use puzzlang_types::{CompiledGame, LegendKind, LevelDef, ObjectId};

use crate::grid::Grid;

fn without_background(game: &CompiledGame, ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut rest: Vec<ObjectId> = ids.iter().copied().filter(|&id| id != game.background).collect();
    rest.sort_unstable();
    rest.dedup();
    rest
}

fn kind_matches(game: &CompiledGame, kind: &LegendKind, ids: &[ObjectId]) -> bool {
    let cell = without_background(game, ids);
    match kind {
        LegendKind::ExactSet(set) => {
            let wanted: Vec<ObjectId> = set.iter().copied().filter(|&id| id != game.background).collect();
            cell == wanted
        }
        LegendKind::AnyOf(set) => matches!(cell.as_slice(), [only] if set.contains(only)),
    }
}

/// Whether a cell holding `ids` is described by `symbol`. Background is
/// ignored on both sides; a property matches a cell holding exactly one of
/// its members.
pub fn symbol_matches(game: &CompiledGame, ids: &[ObjectId], symbol: &str) -> bool {
    game.lookup(symbol).is_some_and(|kind| kind_matches(game, kind, ids))
}

/// Text for one cell: a single-character legend symbol if one fits,
/// otherwise `{name+name}`.
///
/// Exact combinations win over object names, which win over `or` symbols
/// holding the cell's only non-background object.
pub fn symbol_for(game: &CompiledGame, ids: &[ObjectId]) -> String {
    let single_char = |s: &str| s.chars().count() == 1;
    let exact = |kind: &LegendKind| matches!(kind, LegendKind::ExactSet(_)) && kind_matches(game, kind, ids);
    let any_of = |kind: &LegendKind| matches!(kind, LegendKind::AnyOf(_)) && kind_matches(game, kind, ids);

    if let Some(entry) = game
        .legend
        .iter()
        .find(|e| single_char(&e.symbol) && exact(&e.kind))
    {
        return entry.symbol.clone();
    }
    if let Some((name, _)) = game.names.iter().find(|(name, kind)| single_char(name) && exact(kind)) {
        return name.clone();
    }
    if let Some(entry) = game
        .legend
        .iter()
        .find(|e| single_char(&e.symbol) && any_of(&e.kind))
    {
        return entry.symbol.clone();
    }

    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let names: Vec<&str> = sorted
        .iter()
        .filter_map(|&id| game.object(id))
        .map(|o| o.name.as_str())
        .collect();
    format!("{{{}}}", names.join("+"))
}

fn render(game: &CompiledGame, width: usize, height: usize, cell: impl Fn(usize) -> Vec<ObjectId>) -> String {
    let rows: Vec<String> = (0..height)
        .map(|r| (0..width).map(|c| symbol_for(game, &cell(r * width + c))).collect())
        .collect();
    rows.join("\n")
}

pub fn decode_grid(game: &CompiledGame, grid: &Grid) -> String {
    render(game, grid.width(), grid.height(), |cell| grid.objects(cell))
}

pub fn decode_level(game: &CompiledGame, level: &LevelDef) -> String {
    render(game, level.width, level.height, |cell| {
        level.cells.get(cell).cloned().unwrap_or_default()
    })
}
