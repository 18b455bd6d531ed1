//! Sound events recorded for whoever plays audio. Nothing is played here.

use puzzlang_types::{CompiledGame, Direction, GlobalSound, ObjectId, ObjectSound, SoundTrigger};
use serde::Serialize;

/// A declared sound whose trigger fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoundEvent {
    pub trigger: SoundTrigger,
    pub seed: u64,
}

/// Something that happened to an object during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectEvent {
    pub object: ObjectId,
    pub event: ObjectSound,
    pub direction: Option<Direction>,
}

#[derive(Debug, Default)]
pub struct SoundQueue {
    events: Vec<SoundEvent>,
}

impl SoundQueue {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Forget events recorded after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    pub fn sfx(&mut self, game: &CompiledGame, n: u8) {
        self.push(game, SoundTrigger::Sfx(n));
    }

    pub fn global(&mut self, game: &CompiledGame, sound: GlobalSound) {
        self.push(game, SoundTrigger::Global(sound));
    }

    fn push(&mut self, game: &CompiledGame, trigger: SoundTrigger) {
        for seed in game.sound_seeds(trigger) {
            log::trace!("sound {trigger:?} ({seed})");
            self.events.push(SoundEvent { trigger, seed });
        }
    }

    pub fn object(&mut self, game: &CompiledGame, ev: ObjectEvent) {
        for def in &game.sounds {
            let SoundTrigger::Object {
                object,
                event,
                directions,
            } = def.trigger
            else {
                continue;
            };
            let direction_ok =
                directions.is_empty() || ev.direction.is_some_and(|d| directions.contains(d.mask()));
            if object == ev.object && event == ev.event && direction_ok {
                log::trace!("sound {:?} ({})", def.trigger, def.seed);
                self.events.push(SoundEvent {
                    trigger: def.trigger,
                    seed: def.seed,
                });
            }
        }
    }

    pub fn drain(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.events)
    }
}
