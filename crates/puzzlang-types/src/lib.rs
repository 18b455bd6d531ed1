pub mod color;
pub mod direction;
pub mod game;
pub mod legend;
pub mod level;
pub mod object;
pub mod prelude;
pub mod rule;
pub mod sound;
pub mod win;

pub use color::{Color, ColorParseError, NamedColor};
pub use direction::{Direction, DirectionMask, Movement};
pub use game::CompiledGame;
pub use legend::{LegendEntry, LegendKind};
pub use level::{LevelDef, LevelEntry};
pub use object::{ObjectDef, ObjectId, SPRITE_SIZE, Sprite};
pub use prelude::{PRELUDE_SETTINGS, Prelude, PreludeFlags};
pub use rule::{CellPattern, CellTerm, MoveQualifier, RowPattern, Rule, RuleCommand, RuleFlags, RuleGroup};
pub use sound::{GlobalSound, MAX_SFX, ObjectSound, SoundDef, SoundTrigger};
pub use win::{WinCondition, WinQuantifier};
