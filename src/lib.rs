//! Turn engine for compiled puzzle scripts.
//!
//! [`puzzlang_compiler::compile`] turns script text into a
//! [`CompiledGame`]; a [`GameModel`] plays it one command at a time.

pub mod command;
pub mod config;
pub mod decode;
pub mod error;
pub mod grid;
pub mod history;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod movement;
pub mod rewrite;
pub mod sound;
pub mod win;

pub use command::Command;
pub use config::EngineConfig;
pub use error::ModelError;
pub use grid::{Grid, Location};
pub use model::{GameModel, State};
pub use sound::SoundEvent;

pub use puzzlang_compiler::{CompileError, compile};
pub use puzzlang_types::{CompiledGame, Direction, ObjectId};
