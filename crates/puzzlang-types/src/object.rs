use std::fmt;

use serde::Serialize;

use crate::color::Color;

/// Dense object index, assigned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectId(pub u16);

impl ObjectId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sprite edge length in pixels.
pub const SPRITE_SIZE: usize = 5;

/// A 5x5 sprite; each pixel is a palette index into the object's colours or
/// `None` for transparent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sprite {
    pub pixels: [[Option<u8>; SPRITE_SIZE]; SPRITE_SIZE],
}

/// A compiled object definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDef {
    pub id: ObjectId,
    /// Lower-cased name.
    pub name: String,
    /// Lower-cased aliases declared on the name line.
    pub aliases: Vec<String>,
    pub colors: Vec<Color>,
    /// Free text from a `text` line, case kept.
    pub text: Option<String>,
    pub sprite: Option<Sprite>,
    /// Collision layer index; fixed once layers are compiled.
    pub layer: usize,
    pub line: usize,
}
