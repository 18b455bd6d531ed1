use serde::Serialize;

use crate::object::ObjectId;

/// A compiled level grid. `cells` is row-major, each cell's ids sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelDef {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<ObjectId>>,
    /// Line of the first grid row.
    pub line: usize,
}

impl LevelDef {
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

/// One step of the level ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LevelEntry {
    Message(String),
    /// Index into `CompiledGame::levels`.
    Level(usize),
}
