use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::legend::{LegendEntry, LegendKind};
use crate::level::{LevelDef, LevelEntry};
use crate::object::{ObjectDef, ObjectId};
use crate::prelude::Prelude;
use crate::rule::RuleGroup;
use crate::sound::{SoundDef, SoundTrigger};
use crate::win::WinCondition;

/// The immutable result of compiling a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledGame {
    pub title: String,
    pub prelude: Prelude,
    /// Indexed by `ObjectId`.
    pub objects: Vec<ObjectDef>,
    /// Entries of the LEGEND section, in source order.
    pub legend: Vec<LegendEntry>,
    /// Every resolvable name: object names, aliases and legend symbols.
    pub names: BTreeMap<String, LegendKind>,
    /// Object ids per collision layer, bottom layer first.
    pub layers: Vec<Vec<ObjectId>>,
    pub rules: Vec<RuleGroup>,
    pub late_rules: Vec<RuleGroup>,
    pub win_conditions: Vec<WinCondition>,
    pub levels: Vec<LevelDef>,
    pub level_order: Vec<LevelEntry>,
    pub sounds: Vec<SoundDef>,
    pub player: BTreeSet<ObjectId>,
    pub background: ObjectId,
}

impl CompiledGame {
    pub fn object(&self, id: ObjectId) -> Option<&ObjectDef> {
        self.objects.get(id.index())
    }

    /// Resolve an object by name or alias, falling back to a legend symbol
    /// that names exactly one object.
    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        let key = name.to_lowercase();
        self.objects
            .iter()
            .find(|o| o.name == key || o.aliases.contains(&key))
            .map(|o| o.id)
            .or_else(|| self.names.get(&key).and_then(LegendKind::single))
    }

    pub fn lookup(&self, name: &str) -> Option<&LegendKind> {
        self.names.get(&name.to_lowercase())
    }

    pub fn layer_of(&self, id: ObjectId) -> usize {
        self.objects.get(id.index()).map_or(0, |o| o.layer)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Seeds of every sound declared for `trigger`.
    pub fn sound_seeds(&self, trigger: SoundTrigger) -> impl Iterator<Item = u64> + '_ {
        self.sounds
            .iter()
            .filter(move |s| s.trigger == trigger)
            .map(|s| s.seed)
    }
}
