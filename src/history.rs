use std::collections::VecDeque;

use crate::grid::Grid;

/// Undo snapshots, oldest dropped first once `depth` is reached.
#[derive(Debug, Clone)]
pub struct History {
    depth: usize,
    snapshots: VecDeque<Grid>,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            snapshots: VecDeque::with_capacity(depth.min(64)),
        }
    }

    pub fn push(&mut self, grid: Grid) {
        if self.depth == 0 {
            return;
        }
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(grid);
    }

    pub fn pop(&mut self) -> Option<Grid> {
        self.snapshots.pop_back()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
