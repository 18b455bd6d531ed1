use std::collections::BTreeSet;

use bitflags::bitflags;
use serde::Serialize;

use crate::direction::{Direction, Movement};
use crate::object::ObjectId;

/// Movement condition (left-hand side) or movement effect (right-hand side)
/// of a cell term, with relative qualifiers already made absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MoveQualifier {
    Unspecified,
    Stationary,
    Moving,
    Toward(Direction),
    Action,
    /// Right-hand side only.
    RandomDir,
}

impl MoveQualifier {
    /// Whether an object with `movement` satisfies this qualifier on the
    /// left-hand side.
    pub fn accepts(self, movement: Option<Movement>) -> bool {
        match self {
            Self::Unspecified | Self::RandomDir => true,
            Self::Stationary => movement.is_none(),
            Self::Moving => movement.is_some(),
            Self::Toward(d) => movement == Some(Movement::Move(d)),
            Self::Action => movement == Some(Movement::Action),
        }
    }

    pub fn is_specified(self) -> bool {
        !matches!(self, Self::Unspecified)
    }
}

/// One `[no] [qualifier] name` entry of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CellTerm {
    /// Candidate objects. On the left a term matches if any one of them is
    /// present; on the right (outside random spawns) this holds one object.
    pub objects: BTreeSet<ObjectId>,
    pub negated: bool,
    pub movement: MoveQualifier,
    /// Right-hand `random X`: create one member of `objects` at random.
    pub random_spawn: bool,
}

impl CellTerm {
    pub fn present(objects: BTreeSet<ObjectId>, movement: MoveQualifier) -> Self {
        Self {
            objects,
            negated: false,
            movement,
            random_spawn: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CellPattern {
    Cell(Vec<CellTerm>),
    Ellipsis,
}

impl CellPattern {
    pub fn terms(&self) -> &[CellTerm] {
        match self {
            Self::Cell(terms) => terms,
            Self::Ellipsis => &[],
        }
    }
}

/// Cells laid out along the rule direction.
pub type RowPattern = Vec<CellPattern>;

bitflags! {
    /// Rule modifiers given as prefixes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct RuleFlags: u8 {
        const LATE   = 0b001;
        const RIGID  = 0b010;
        const RANDOM = 0b100;
    }
}

/// Commands written after the right-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RuleCommand {
    Cancel,
    Win,
    Restart,
    Again,
    Checkpoint,
    Message(String),
    Sfx(u8),
}

/// A rule expanded for a single absolute direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub line: usize,
    pub direction: Direction,
    pub flags: RuleFlags,
    pub lhs: Vec<RowPattern>,
    /// Empty when the rule only issues commands.
    pub rhs: Vec<RowPattern>,
    pub commands: Vec<RuleCommand>,
}

impl Rule {
    pub fn is_rigid(&self) -> bool {
        self.flags.contains(RuleFlags::RIGID)
    }
}

/// Rules joined with `+`, plus every direction expansion of them. A group
/// is iterated to its own fixpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleGroup {
    /// Source line of the first rule in the group.
    pub line: usize,
    pub flags: RuleFlags,
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn is_late(&self) -> bool {
        self.flags.contains(RuleFlags::LATE)
    }

    pub fn is_random(&self) -> bool {
        self.flags.contains(RuleFlags::RANDOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifier_acceptance() {
        let right = Some(Movement::Move(Direction::Right));
        assert!(MoveQualifier::Unspecified.accepts(None));
        assert!(MoveQualifier::Unspecified.accepts(right));
        assert!(MoveQualifier::Stationary.accepts(None));
        assert!(!MoveQualifier::Stationary.accepts(right));
        assert!(MoveQualifier::Moving.accepts(right));
        assert!(MoveQualifier::Moving.accepts(Some(Movement::Action)));
        assert!(!MoveQualifier::Moving.accepts(None));
        assert!(MoveQualifier::Toward(Direction::Right).accepts(right));
        assert!(!MoveQualifier::Toward(Direction::Left).accepts(right));
        assert!(MoveQualifier::Action.accepts(Some(Movement::Action)));
        assert!(!MoveQualifier::Action.accepts(right));
    }

    #[test]
    fn ellipsis_has_no_terms() {
        assert!(CellPattern::Ellipsis.terms().is_empty());
    }
}
