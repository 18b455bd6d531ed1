//! Live level state: a flat arena of per-layer slots.
//!
//! Cell `i` owns slots `i * layers .. (i + 1) * layers`, so a cell can hold
//! at most one object per collision layer by construction.

use std::fmt;

use puzzlang_types::{CompiledGame, Direction, LevelDef, Movement, ObjectId};
use serde::Serialize;

/// Grid coordinates, row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Slot {
    pub object: Option<ObjectId>,
    pub movement: Option<Movement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Grid {
    width: usize,
    height: usize,
    layers: usize,
    slots: Vec<Slot>,
    /// Rigid unit that set each slot's movement this turn. Not part of the
    /// grid's observable state.
    #[serde(skip)]
    rigid: Vec<Option<u32>>,
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.slots == other.slots
    }
}

impl Eq for Grid {}

impl Grid {
    pub fn new(width: usize, height: usize, layers: usize) -> Self {
        let n = width * height * layers;
        Self {
            width,
            height,
            layers,
            slots: vec![Slot::default(); n],
            rigid: vec![None; n],
        }
    }

    /// Build the starting grid of `level`.
    pub fn from_level(level: &LevelDef, game: &CompiledGame) -> Self {
        let mut grid = Self::new(level.width, level.height, game.layer_count());
        for (cell, ids) in level.cells.iter().enumerate() {
            for &id in ids {
                grid.place(cell, game.layer_of(id), id, None);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn layer_count(&self) -> usize {
        self.layers
    }

    pub fn index(&self, loc: Location) -> Option<usize> {
        (loc.row < self.height && loc.col < self.width).then(|| loc.row * self.width + loc.col)
    }

    pub fn location(&self, cell: usize) -> Location {
        Location::new(cell / self.width.max(1), cell % self.width.max(1))
    }

    /// Neighbouring cell in `dir`, `None` off the edge.
    pub fn step(&self, cell: usize, dir: Direction) -> Option<usize> {
        let loc = self.location(cell);
        let (dr, dc) = dir.delta();
        let row = loc.row.checked_add_signed(dr as isize)?;
        let col = loc.col.checked_add_signed(dc as isize)?;
        self.index(Location::new(row, col))
    }

    fn slot_index(&self, cell: usize, layer: usize) -> usize {
        cell * self.layers + layer
    }

    pub fn slot(&self, cell: usize, layer: usize) -> Slot {
        self.slots
            .get(self.slot_index(cell, layer))
            .copied()
            .unwrap_or_default()
    }

    pub fn slots(&self, cell: usize) -> &[Slot] {
        let start = cell * self.layers;
        self.slots.get(start..start + self.layers).unwrap_or(&[])
    }

    /// Object ids in `cell`, sorted.
    pub fn objects(&self, cell: usize) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.slots(cell).iter().filter_map(|s| s.object).collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains(&self, cell: usize, layer: usize, id: ObjectId) -> bool {
        self.slot(cell, layer).object == Some(id)
    }

    /// Put `id` on `layer`, replacing whatever was there. Returns the
    /// replaced object.
    pub fn place(&mut self, cell: usize, layer: usize, id: ObjectId, movement: Option<Movement>) -> Option<ObjectId> {
        let i = self.slot_index(cell, layer);
        let slot = self.slots.get_mut(i)?;
        let previous = slot.object.replace(id);
        slot.movement = movement;
        if let Some(tag) = self.rigid.get_mut(i) {
            *tag = None;
        }
        previous.filter(|p| *p != id)
    }

    /// Empty `layer` of `cell`, returning what was there.
    pub fn remove(&mut self, cell: usize, layer: usize) -> Option<ObjectId> {
        let i = self.slot_index(cell, layer);
        let slot = self.slots.get_mut(i)?;
        slot.movement = None;
        if let Some(tag) = self.rigid.get_mut(i) {
            *tag = None;
        }
        slot.object.take()
    }

    pub fn set_movement(&mut self, cell: usize, layer: usize, movement: Option<Movement>) {
        let i = self.slot_index(cell, layer);
        if let Some(slot) = self.slots.get_mut(i) {
            slot.movement = movement;
        }
    }

    pub fn rigid_unit(&self, cell: usize, layer: usize) -> Option<u32> {
        self.rigid.get(self.slot_index(cell, layer)).copied().flatten()
    }

    pub fn set_rigid_unit(&mut self, cell: usize, layer: usize, unit: Option<u32>) {
        let i = self.slot_index(cell, layer);
        if let Some(tag) = self.rigid.get_mut(i) {
            *tag = unit;
        }
    }

    /// Move the contents of one slot into an empty slot of the same layer.
    pub fn transfer(&mut self, from: usize, to: usize, layer: usize) {
        let (src, dst) = (self.slot_index(from, layer), self.slot_index(to, layer));
        if src >= self.slots.len() || dst >= self.slots.len() {
            return;
        }
        self.slots[dst] = std::mem::take(&mut self.slots[src]);
        self.rigid[dst] = self.rigid[src].take();
    }

    pub fn clear_movements(&mut self) {
        for slot in &mut self.slots {
            slot.movement = None;
        }
        self.rigid.fill(None);
    }

    pub fn has_movement(&self) -> bool {
        self.slots.iter().any(|s| s.movement.is_some())
    }
}
