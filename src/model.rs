//! The live game: one loaded level, its undo history and the turn loop.
//!
//! A turn gives every player object the input movement, runs the early rule
//! groups to their fixpoints, resolves movement, runs the late groups, then
//! applies the commands the rules raised and checks the win conditions. The
//! turn works on a copy of the grid and is only committed once it finished
//! without error and was not cancelled.

use std::sync::Arc;

use puzzlang_rng::GameRng;
use puzzlang_types::{
    CompiledGame, Direction, GlobalSound, LevelEntry, Movement, ObjectDef, ObjectId, PreludeFlags, Rule, RuleCommand,
    RuleGroup,
};
use strum::Display;

use crate::command::{Command, parse_commands};
use crate::config::EngineConfig;
use crate::decode;
use crate::error::ModelError;
use crate::grid::{Grid, Location};
use crate::history::History;
use crate::matcher::{RuleMatch, rule_matches, still_matches};
use crate::movement;
use crate::rewrite::RewriteContext;
use crate::sound::{ObjectEvent, SoundEvent, SoundQueue};
use crate::win;

/// Where the model is, most pressing first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum State {
    Error,
    Done,
    Over,
    Msg,
    Unknown,
    Level,
}

/// What the rules asked for during one turn.
#[derive(Debug, Default)]
struct TurnOutcome {
    cancel: bool,
    restart: bool,
    win: bool,
    again: bool,
    checkpoint: bool,
    message: Option<String>,
    sfx: Vec<u8>,
    player_moved: bool,
}

impl TurnOutcome {
    fn queue(&mut self, commands: &[RuleCommand]) {
        for command in commands {
            match command {
                RuleCommand::Cancel => self.cancel = true,
                RuleCommand::Restart => self.restart = true,
                RuleCommand::Win => self.win = true,
                RuleCommand::Again => self.again = true,
                RuleCommand::Checkpoint => self.checkpoint = true,
                RuleCommand::Message(text) => {
                    self.message.get_or_insert_with(|| text.clone());
                }
                RuleCommand::Sfx(n) => {
                    if !self.sfx.contains(n) {
                        self.sfx.push(*n);
                    }
                }
            }
        }
    }
}

pub struct GameModel {
    game: Arc<CompiledGame>,
    config: EngineConfig,
    rng: GameRng,
    /// Position in the level ordering.
    entry: Option<usize>,
    /// Index of the loaded grid level.
    level: Option<usize>,
    grid: Option<Grid>,
    history: History,
    restart_point: Option<Grid>,
    sounds: SoundQueue,
    error: Option<ModelError>,
    in_message: bool,
    /// The shown message came from a rule rather than the level ordering.
    rule_message: bool,
    end_level: bool,
    game_over: bool,
    current_message: Option<String>,
    /// The last error, or the last command that ran.
    status: String,
    next_rigid_unit: u32,
}

impl GameModel {
    pub fn new(game: Arc<CompiledGame>, config: EngineConfig) -> Self {
        let mut sounds = SoundQueue::default();
        sounds.global(&game, GlobalSound::StartGame);
        Self {
            rng: GameRng::new(config.seed),
            history: History::new(config.undo_depth),
            game,
            config,
            entry: None,
            level: None,
            grid: None,
            restart_point: None,
            sounds,
            error: None,
            in_message: false,
            rule_message: false,
            end_level: false,
            game_over: false,
            current_message: None,
            status: String::new(),
            next_rigid_unit: 0,
        }
    }

    pub fn game(&self) -> &CompiledGame {
        &self.game
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn current_level(&self) -> Option<usize> {
        self.level
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ModelError> {
        self.error.as_ref()
    }

    pub fn in_level(&self) -> bool {
        self.grid.is_some() && !self.game_over
    }

    pub fn in_message(&self) -> bool {
        self.in_message
    }

    pub fn end_level(&self) -> bool {
        self.end_level
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn current_message(&self) -> Option<&str> {
        self.current_message.as_deref()
    }

    pub fn state(&self) -> State {
        if !self.ok() {
            State::Error
        } else if self.end_level {
            State::Done
        } else if self.game_over {
            State::Over
        } else if self.in_message {
            State::Msg
        } else if !self.in_level() {
            State::Unknown
        } else {
            State::Level
        }
    }

    /// The failing error's message after an error, otherwise the last
    /// command that ran. Empty before any command.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Sound events recorded since the last call.
    pub fn sound_events(&mut self) -> Vec<SoundEvent> {
        self.sounds.drain()
    }

    fn fail(&mut self, err: ModelError) -> ModelError {
        log::debug!("command failed: {err}");
        self.status = err.to_string();
        self.error = Some(err.clone());
        err
    }

    /// Run a comma-separated command list. Nothing runs if any entry fails
    /// to parse.
    pub fn accept_inputs(&mut self, input: &str) -> Result<(), ModelError> {
        let commands = parse_commands(input).map_err(|e| self.fail(e))?;
        for command in commands {
            self.execute(command)?;
            self.status = command.to_string();
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<(), ModelError> {
        if let Command::Level(n) = command {
            return self.load_level(n);
        }
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.game_over {
            log::debug!("game over, ignoring {command:?}");
            return Ok(());
        }
        if self.in_message {
            self.close_message();
            if self.rule_message && !self.end_level {
                self.rule_message = false;
                return Ok(());
            }
            return self.advance();
        }
        if self.end_level {
            return self.advance();
        }
        if self.grid.is_none() {
            return Err(self.fail(ModelError::NoLevelLoaded));
        }

        match command {
            Command::Move(dir) => self.turn(Some(Movement::Move(dir))),
            Command::Action if self.game.prelude.has(PreludeFlags::NOACTION) => Ok(()),
            Command::Action => self.turn(Some(Movement::Action)),
            Command::Undo => {
                self.undo();
                Ok(())
            }
            Command::Restart => {
                if !self.game.prelude.has(PreludeFlags::NORESTART) {
                    self.restart();
                }
                Ok(())
            }
            Command::Level(_) => Ok(()),
        }
    }

    fn close_message(&mut self) {
        self.in_message = false;
        self.current_message = None;
        self.sounds.global(&self.game, GlobalSound::CloseMessage);
    }

    /// Load grid level `n` (messages in the ordering are not counted) and
    /// clear any error.
    pub fn load_level(&mut self, n: usize) -> Result<(), ModelError> {
        if n >= self.game.levels.len() {
            return Err(self.fail(ModelError::LevelNotFound(n)));
        }
        self.error = None;
        self.entry = self
            .game
            .level_order
            .iter()
            .position(|e| *e == LevelEntry::Level(n));
        self.start_level(n)
    }

    fn start_level(&mut self, n: usize) -> Result<(), ModelError> {
        let Some(grid) = self.game.levels.get(n).map(|def| Grid::from_level(def, &self.game)) else {
            return Err(self.fail(ModelError::LevelNotFound(n)));
        };
        self.level = Some(n);
        self.restart_point = Some(grid.clone());
        self.grid = Some(grid);
        self.history.clear();
        self.in_message = false;
        self.rule_message = false;
        self.end_level = false;
        self.game_over = false;
        self.current_message = None;
        self.sounds.global(&self.game, GlobalSound::StartLevel);
        log::debug!("loaded level {n}");

        if self.game.prelude.has(PreludeFlags::RUN_RULES_ON_LEVEL_START) {
            self.tick()?;
            self.history.clear();
            self.restart_point.clone_from(&self.grid);
        }
        Ok(())
    }

    /// Move to the next entry of the level ordering.
    fn advance(&mut self) -> Result<(), ModelError> {
        self.end_level = false;
        self.rule_message = false;
        let next = self.entry.map_or(0, |e| e + 1);
        match self.game.level_order.get(next).cloned() {
            None => {
                log::debug!("level ordering exhausted");
                self.game_over = true;
                self.sounds.global(&self.game, GlobalSound::EndGame);
                Ok(())
            }
            Some(LevelEntry::Message(text)) => {
                self.entry = Some(next);
                self.level = None;
                self.grid = None;
                self.show_message(text);
                Ok(())
            }
            Some(LevelEntry::Level(n)) => {
                self.entry = Some(next);
                self.start_level(n)
            }
        }
    }

    fn show_message(&mut self, text: String) {
        log::debug!("message: {text}");
        self.in_message = true;
        self.current_message = Some(text);
        self.sounds.global(&self.game, GlobalSound::ShowMessage);
    }

    fn undo(&mut self) {
        if self.game.prelude.has(PreludeFlags::NOUNDO) {
            return;
        }
        if let Some(previous) = self.history.pop() {
            self.grid = Some(previous);
            self.sounds.global(&self.game, GlobalSound::Undo);
        }
    }

    fn restart(&mut self) {
        let Some(point) = self.restart_point.clone() else {
            return;
        };
        if let Some(current) = self.grid.replace(point) {
            self.history.push(current);
        }
        self.sounds.global(&self.game, GlobalSound::Restart);
    }

    /// Run a turn without player input.
    pub fn tick(&mut self) -> Result<(), ModelError> {
        let (_, again) = self.run_turn(None, false)?;
        self.again_chain(again)
    }

    fn turn(&mut self, input: Option<Movement>) -> Result<(), ModelError> {
        let (_, again) = self.run_turn(input, true)?;
        self.again_chain(again)
    }

    fn again_chain(&mut self, mut again: bool) -> Result<(), ModelError> {
        let mut ticks = 0;
        while again && ticks < self.config.max_again_turns && !self.end_level && !self.in_message {
            ticks += 1;
            let (changed, requested) = self.run_turn(None, false)?;
            again = changed && requested;
        }
        Ok(())
    }

    /// One turn. Returns whether the grid changed and whether `again` was
    /// requested.
    fn run_turn(&mut self, input: Option<Movement>, record: bool) -> Result<(bool, bool), ModelError> {
        let Some(before) = self.grid.clone() else {
            return Err(self.fail(ModelError::NoLevelLoaded));
        };
        let game = Arc::clone(&self.game);
        let mark = self.sounds.len();
        let mut grid = before.clone();

        let outcome = match self.simulate(&game, &mut grid, input) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.sounds.truncate(mark);
                return Err(self.fail(err));
            }
        };

        if outcome.cancel {
            log::trace!("turn cancelled");
            self.sounds.truncate(mark);
            self.sounds.global(&game, GlobalSound::Cancel);
            return Ok((false, false));
        }
        if outcome.restart {
            self.restart();
            return Ok((true, false));
        }
        let moved_by_input = matches!(input, Some(Movement::Move(_)));
        if moved_by_input && game.prelude.has(PreludeFlags::REQUIRE_PLAYER_MOVEMENT) && !outcome.player_moved {
            log::trace!("player did not move, reverting turn");
            self.sounds.truncate(mark);
            return Ok((false, false));
        }

        let changed = grid != before;
        if record && changed {
            self.history.push(before);
        }
        for n in &outcome.sfx {
            self.sounds.sfx(&game, *n);
        }
        if outcome.checkpoint {
            self.restart_point = Some(grid.clone());
        }
        let won = outcome.win || win::evaluate(&grid, &game);
        self.grid = Some(grid);

        if won {
            log::debug!("level complete");
            self.end_level = true;
            self.sounds.global(&game, GlobalSound::EndLevel);
        }
        if let Some(text) = outcome.message {
            self.rule_message = true;
            self.show_message(text);
        }
        Ok((changed, outcome.again))
    }

    fn simulate(
        &mut self,
        game: &CompiledGame,
        grid: &mut Grid,
        input: Option<Movement>,
    ) -> Result<TurnOutcome, ModelError> {
        let mut outcome = TurnOutcome::default();
        let mut events = Vec::new();

        if let Some(movement) = input {
            for &id in &game.player {
                let layer = game.layer_of(id);
                for cell in 0..grid.cell_count() {
                    if grid.contains(cell, layer, id) {
                        grid.set_movement(cell, layer, Some(movement));
                    }
                }
            }
        }

        self.run_groups(game, grid, &game.rules, &mut events, &mut outcome)?;
        let resolution = movement::resolve(grid, &mut events);
        outcome.player_moved = resolution.any_moved(&game.player);
        self.run_groups(game, grid, &game.late_rules, &mut events, &mut outcome)?;

        for event in events {
            self.sounds.object(game, event);
        }
        Ok(outcome)
    }

    fn run_groups(
        &mut self,
        game: &CompiledGame,
        grid: &mut Grid,
        groups: &[RuleGroup],
        events: &mut Vec<ObjectEvent>,
        outcome: &mut TurnOutcome,
    ) -> Result<(), ModelError> {
        for group in groups {
            if group.is_random() {
                self.apply_random(game, grid, group, events, outcome);
                continue;
            }
            let mut iterations = 0;
            loop {
                let mut changed = false;
                for rule in &group.rules {
                    changed |= self.apply_rule(game, grid, rule, events, outcome);
                }
                if !changed {
                    break;
                }
                iterations += 1;
                if iterations >= self.config.max_rule_iterations {
                    return Err(ModelError::RuleNontermination {
                        line: group.line,
                        iterations,
                    });
                }
            }
        }
        Ok(())
    }

    fn apply_rule(
        &mut self,
        game: &CompiledGame,
        grid: &mut Grid,
        rule: &Rule,
        events: &mut Vec<ObjectEvent>,
        outcome: &mut TurnOutcome,
    ) -> bool {
        let mut changed = false;
        for m in rule_matches(grid, game, rule) {
            if still_matches(grid, game, rule, &m) {
                changed |= self.rewrite(game, grid, rule, &m, events);
                outcome.queue(&rule.commands);
            }
        }
        changed
    }

    /// Apply one match chosen at random among every rule of the group.
    fn apply_random(
        &mut self,
        game: &CompiledGame,
        grid: &mut Grid,
        group: &RuleGroup,
        events: &mut Vec<ObjectEvent>,
        outcome: &mut TurnOutcome,
    ) {
        let candidates: Vec<(&Rule, RuleMatch)> = group
            .rules
            .iter()
            .flat_map(|rule| rule_matches(grid, game, rule).into_iter().map(move |m| (rule, m)))
            .collect();
        if let Some(i) = self.rng.pick_index(candidates.len()) {
            let (rule, m) = &candidates[i];
            self.rewrite(game, grid, rule, m, events);
            outcome.queue(&rule.commands);
        }
    }

    fn rewrite(
        &mut self,
        game: &CompiledGame,
        grid: &mut Grid,
        rule: &Rule,
        m: &RuleMatch,
        events: &mut Vec<ObjectEvent>,
    ) -> bool {
        let rigid_unit = rule.is_rigid().then(|| {
            self.next_rigid_unit = self.next_rigid_unit.wrapping_add(1);
            self.next_rigid_unit
        });
        RewriteContext {
            game,
            rng: &mut self.rng,
            events,
            rigid_unit,
        }
        .apply(grid, rule, m)
    }

    /// Linear index of `loc` on the loaded level.
    pub fn cell_at(&self, loc: Location) -> Option<usize> {
        self.grid.as_ref()?.index(loc)
    }

    /// Row and column of `cell` on the loaded level.
    pub fn location_of(&self, cell: usize) -> Option<Location> {
        let grid = self.grid.as_ref()?;
        (cell < grid.cell_count()).then(|| grid.location(cell))
    }

    /// Neighbour of `cell` in `dir` on the loaded level.
    pub fn step(&self, cell: usize, dir: Direction) -> Option<usize> {
        let grid = self.grid.as_ref()?;
        if cell >= grid.cell_count() {
            return None;
        }
        grid.step(cell, dir)
    }

    /// Sorted object ids in `cell`; empty off the grid or with no level.
    pub fn get_objects(&self, cell: usize) -> Vec<ObjectId> {
        self.grid.as_ref().map(|g| g.objects(cell)).unwrap_or_default()
    }

    pub fn get_object_id(&self, name: &str) -> Result<ObjectId, ModelError> {
        self.game
            .object_id(name)
            .ok_or_else(|| ModelError::UnknownObject(name.to_string()))
    }

    pub fn get_object(&self, id: ObjectId) -> Result<&ObjectDef, ModelError> {
        self.game.object(id).ok_or(ModelError::UnknownObjectId(id))
    }

    /// Text of level `index`: the live grid if it is loaded, otherwise its
    /// starting layout.
    pub fn decode_level(&self, index: usize) -> Result<String, ModelError> {
        match (&self.grid, self.level) {
            (Some(grid), Some(current)) if current == index => Ok(decode::decode_grid(&self.game, grid)),
            _ => self
                .game
                .levels
                .get(index)
                .map(|level| decode::decode_level(&self.game, level))
                .ok_or(ModelError::LevelNotFound(index)),
        }
    }

    /// Whether `cell` is described by legend `symbol`.
    pub fn symbol_matches(&self, cell: usize, symbol: &str) -> bool {
        decode::symbol_matches(&self.game, &self.get_objects(cell), symbol)
    }
}
