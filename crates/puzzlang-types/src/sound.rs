use serde::Serialize;
use strum::{EnumIter, EnumString};

use crate::direction::DirectionMask;
use crate::object::ObjectId;

/// Highest `sfxN` index.
pub const MAX_SFX: u8 = 10;

/// Events raised by the engine itself rather than by an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GlobalSound {
    StartGame,
    EndGame,
    StartLevel,
    EndLevel,
    Restart,
    Undo,
    ShowMessage,
    CloseMessage,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ObjectSound {
    Create,
    Destroy,
    Move,
    CantMove,
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundTrigger {
    Sfx(u8),
    Global(GlobalSound),
    Object {
        object: ObjectId,
        event: ObjectSound,
        /// Directions a `move`/`cantmove` sound is limited to; all if empty.
        directions: DirectionMask,
    },
}

/// A sound declaration: the trigger and the generator seed handed to the
/// audio side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoundDef {
    pub trigger: SoundTrigger,
    pub seed: u64,
    pub line: usize,
}
