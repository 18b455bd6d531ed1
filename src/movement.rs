//! Movement resolution.
//!
//! Objects with a pending direction step into the neighbouring cell when
//! their layer is free there. Passes repeat until nothing moves, so a line
//! of objects moving the same way all advance. Whatever is still pending
//! afterwards is blocked.
//!
//! Movements set by a rigid rule carry a unit tag. If any member of a unit
//! ends up blocked, the grid goes back to how it was before resolution, the
//! whole unit's movements are dropped and resolution runs again.

use std::collections::BTreeSet;

use puzzlang_types::{Direction, Movement, ObjectId, ObjectSound};

use crate::grid::Grid;
use crate::sound::ObjectEvent;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub moved: Vec<(ObjectId, Direction)>,
    pub blocked: Vec<(ObjectId, Direction)>,
}

impl Resolution {
    pub fn any_moved(&self, ids: &BTreeSet<ObjectId>) -> bool {
        self.moved.iter().any(|(id, _)| ids.contains(id))
    }
}

fn pass(grid: &mut Grid) -> Vec<(ObjectId, Direction)> {
    let mut moved = Vec::new();
    loop {
        let mut progress = false;
        for cell in 0..grid.cell_count() {
            for layer in 0..grid.layer_count() {
                let slot = grid.slot(cell, layer);
                let (Some(id), Some(Movement::Move(dir))) = (slot.object, slot.movement) else {
                    continue;
                };
                let Some(target) = grid.step(cell, dir) else {
                    continue;
                };
                if grid.slot(target, layer).object.is_none() {
                    grid.transfer(cell, target, layer);
                    grid.set_movement(target, layer, None);
                    moved.push((id, dir));
                    progress = true;
                    log::trace!("{id} moved {dir} to {}", grid.location(target));
                }
            }
        }
        if !progress {
            return moved;
        }
    }
}

/// Rigid units with a member still waiting to move.
fn failed_units(grid: &Grid) -> BTreeSet<u32> {
    let mut failed = BTreeSet::new();
    for cell in 0..grid.cell_count() {
        for layer in 0..grid.layer_count() {
            if matches!(grid.slot(cell, layer).movement, Some(Movement::Move(_))) {
                failed.extend(grid.rigid_unit(cell, layer));
            }
        }
    }
    failed
}

fn cancel_units(grid: &mut Grid, units: &BTreeSet<u32>) {
    for cell in 0..grid.cell_count() {
        for layer in 0..grid.layer_count() {
            if grid.rigid_unit(cell, layer).is_some_and(|u| units.contains(&u)) {
                grid.set_movement(cell, layer, None);
                grid.set_rigid_unit(cell, layer, None);
            }
        }
    }
}

/// Resolve every pending movement and clear all movements afterwards.
pub fn resolve(grid: &mut Grid, events: &mut Vec<ObjectEvent>) -> Resolution {
    let mut start = grid.clone();
    let moved = loop {
        let moved = pass(grid);
        let failed = failed_units(grid);
        if failed.is_empty() {
            break moved;
        }
        log::trace!("rigid units {failed:?} blocked, retrying without them");
        *grid = start;
        cancel_units(grid, &failed);
        start = grid.clone();
    };

    let mut blocked = Vec::new();
    for cell in 0..grid.cell_count() {
        for layer in 0..grid.layer_count() {
            let slot = grid.slot(cell, layer);
            match (slot.object, slot.movement) {
                (Some(id), Some(Movement::Move(dir))) => blocked.push((id, dir)),
                (Some(id), Some(Movement::Action)) => events.push(ObjectEvent {
                    object: id,
                    event: ObjectSound::Action,
                    direction: None,
                }),
                _ => {}
            }
        }
    }
    grid.clear_movements();

    for &(object, dir) in &moved {
        events.push(ObjectEvent {
            object,
            event: ObjectSound::Move,
            direction: Some(dir),
        });
    }
    for &(object, dir) in &blocked {
        events.push(ObjectEvent {
            object,
            event: ObjectSound::CantMove,
            direction: Some(dir),
        });
    }
    log::trace!("{} moved, {} blocked", moved.len(), blocked.len());
    Resolution { moved, blocked }
}
