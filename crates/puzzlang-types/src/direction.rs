use bitflags::bitflags;
use serde::Serialize;
use strum::{Display, EnumCount, EnumIter, EnumString, FromRepr};

/// Absolute grid direction. Row 0 is the top of the level.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    EnumIter,
    EnumCount,
    EnumString,
    Display,
    FromRepr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// `(row, col)` offset of one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Quarter turn clockwise on screen: right becomes down.
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Quarter turn counter-clockwise on screen: right becomes up.
    pub const fn counter_clockwise(self) -> Self {
        self.clockwise().opposite()
    }

    pub const fn mask(self) -> DirectionMask {
        match self {
            Self::Up => DirectionMask::UP,
            Self::Down => DirectionMask::DOWN,
            Self::Left => DirectionMask::LEFT,
            Self::Right => DirectionMask::RIGHT,
        }
    }
}

bitflags! {
    /// Set of directions a rule is expanded for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct DirectionMask: u8 {
        const UP         = 0b0001;
        const DOWN       = 0b0010;
        const LEFT       = 0b0100;
        const RIGHT      = 0b1000;
        const VERTICAL   = Self::UP.bits() | Self::DOWN.bits();
        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
        const ORTHOGONAL = Self::VERTICAL.bits() | Self::HORIZONTAL.bits();
    }
}

impl DirectionMask {
    /// Rule prefix keyword to mask, `None` for anything else.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "up" => Some(Self::UP),
            "down" => Some(Self::DOWN),
            "left" => Some(Self::LEFT),
            "right" => Some(Self::RIGHT),
            "vertical" => Some(Self::VERTICAL),
            "horizontal" => Some(Self::HORIZONTAL),
            "orthogonal" | "any" => Some(Self::ORTHOGONAL),
            _ => None,
        }
    }

    /// Directions in the set, in `Direction` declaration order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        use strum::IntoEnumIterator;
        Direction::iter().filter(move |d| self.contains(d.mask()))
    }
}

/// Pending movement attached to an object during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Movement {
    Move(Direction),
    Action,
}
