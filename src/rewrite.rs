//! Right-hand side application for one match.
//!
//! Per cell: left-hand objects the right-hand cell no longer mentions are
//! removed, `no X` removes X, listed objects are placed on their layer
//! (replacing that layer's occupant) and `random X` spawns one member of X.
//! Movement follows the right-hand qualifier; an unqualified object keeps
//! its movement unless it was qualified on the left or is new.

use puzzlang_rng::GameRng;
use puzzlang_types::{
    CellPattern, CellTerm, CompiledGame, Direction, MoveQualifier, Movement, ObjectId, ObjectSound, Rule,
};

use crate::grid::{Grid, Slot};
use crate::matcher::{RuleMatch, matching_object};
use crate::sound::ObjectEvent;

const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

/// Mutable state a rewrite draws on besides the grid.
pub struct RewriteContext<'a> {
    pub game: &'a CompiledGame,
    pub rng: &'a mut GameRng,
    pub events: &'a mut Vec<ObjectEvent>,
    /// Unit id to tag movements with when the rule is rigid.
    pub rigid_unit: Option<u32>,
}

impl RewriteContext<'_> {
    fn event(&mut self, object: ObjectId, event: ObjectSound) {
        self.events.push(ObjectEvent {
            object,
            event,
            direction: None,
        });
    }

    fn remove(&mut self, grid: &mut Grid, cell: usize, id: ObjectId) {
        let layer = self.game.layer_of(id);
        if grid.contains(cell, layer, id) {
            grid.remove(cell, layer);
            self.event(id, ObjectSound::Destroy);
        }
    }

    fn place(&mut self, grid: &mut Grid, cell: usize, id: ObjectId, movement: Option<Movement>) {
        let layer = self.game.layer_of(id);
        if grid.contains(cell, layer, id) {
            grid.set_movement(cell, layer, movement);
        } else {
            if let Some(old) = grid.place(cell, layer, id, movement) {
                self.event(old, ObjectSound::Destroy);
            }
            self.event(id, ObjectSound::Create);
        }
        if matches!(movement, Some(Movement::Move(_))) && self.rigid_unit.is_some() {
            grid.set_rigid_unit(cell, layer, self.rigid_unit);
        }
    }

    fn rewrite_cell(&mut self, grid: &mut Grid, cell: usize, lhs: &[CellTerm], rhs: &[CellTerm]) -> bool {
        let before: Vec<Slot> = grid.slots(cell).to_vec();

        let matched: Vec<(ObjectId, MoveQualifier)> = lhs
            .iter()
            .filter(|t| !t.negated)
            .filter_map(|t| matching_object(grid, self.game, cell, t).map(|id| (id, t.movement)))
            .collect();
        let placed: Vec<(ObjectId, MoveQualifier)> = rhs
            .iter()
            .filter(|t| !t.negated && !t.random_spawn)
            .flat_map(|t| t.objects.iter().map(move |id| (*id, t.movement)))
            .collect();

        for &(id, _) in &matched {
            if !placed.iter().any(|&(p, _)| p == id) {
                self.remove(grid, cell, id);
            }
        }
        for term in rhs.iter().filter(|t| t.negated) {
            for &id in &term.objects {
                self.remove(grid, cell, id);
            }
        }

        for &(id, qualifier) in &placed {
            let slot = grid.slot(cell, self.game.layer_of(id));
            let existing = slot.object == Some(id);
            let movement = match qualifier {
                MoveQualifier::Toward(d) => Some(Movement::Move(d)),
                MoveQualifier::Action => Some(Movement::Action),
                MoveQualifier::Stationary => None,
                MoveQualifier::RandomDir => self.rng.pick(&DIRECTIONS).copied().map(Movement::Move),
                MoveQualifier::Moving => slot.movement.filter(|_| existing),
                MoveQualifier::Unspecified => {
                    let qualified_on_left = matched.iter().any(|&(m, q)| m == id && q.is_specified());
                    slot.movement.filter(|_| existing && !qualified_on_left)
                }
            };
            self.place(grid, cell, id, movement);
        }

        for term in rhs.iter().filter(|t| t.random_spawn) {
            let members: Vec<ObjectId> = term.objects.iter().copied().collect();
            if let Some(&id) = self.rng.pick(&members) {
                self.place(grid, cell, id, None);
            }
        }

        grid.slots(cell) != before.as_slice()
    }

    /// Apply `rule` at `m`. Returns whether any cell changed.
    pub fn apply(&mut self, grid: &mut Grid, rule: &Rule, m: &RuleMatch) -> bool {
        if rule.rhs.is_empty() {
            return false;
        }
        let mut changed = false;
        for ((lrow, rrow), cells) in rule.lhs.iter().zip(&rule.rhs).zip(m) {
            let pairs = lrow
                .iter()
                .zip(rrow)
                .filter(|(l, _)| !matches!(l, CellPattern::Ellipsis));
            for ((l, r), &cell) in pairs.zip(cells) {
                changed |= self.rewrite_cell(grid, cell, l.terms(), r.terms());
            }
        }
        if changed {
            log::trace!("line {} ({}) rewrote {:?}", rule.line, rule.direction, m);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::rule_matches;

    const SCRIPT: &str = "\
OBJECTS
Background
black

Player
white

Crate
orange

Gem
green

Coin
yellow

LEGEND
. = Background
P = Player
* = Crate
G = Gem
Item = Gem or Coin

COLLISIONLAYERS
Background
Player, Crate, Gem, Coin

RULES
right [ > Player | Crate ] -> [ > Player | > Crate ]
right [ Player | Gem ] -> [ Player | Crate ]
right [ > Player | Crate ] -> [ Player | Crate ]
rigid right [ > Player | Crate ] -> [ > Player | > Crate ]

WINCONDITIONS

LEVELS
P*G
";

    fn setup() -> (CompiledGame, Grid) {
        let game = puzzlang_compiler::compile("rewrite", SCRIPT).expect("script compiles");
        let grid = Grid::from_level(&game.levels[0], &game);
        (game, grid)
    }

    fn right_player(game: &CompiledGame, grid: &mut Grid) {
        let player = game.object_id("player").expect("player");
        grid.set_movement(0, game.layer_of(player), Some(Movement::Move(Direction::Right)));
    }

    fn run(game: &CompiledGame, grid: &mut Grid, group: usize, cells: RuleMatch, events: &mut Vec<ObjectEvent>) -> bool {
        let mut rng = GameRng::new(1);
        let rule = &game.rules[group].rules[0];
        let mut ctx = RewriteContext {
            game,
            rng: &mut rng,
            events,
            rigid_unit: rule.is_rigid().then_some(9),
        };
        ctx.apply(grid, rule, &cells)
    }

    #[test]
    fn movement_is_passed_on() {
        let (game, mut grid) = setup();
        right_player(&game, &mut grid);
        let found = rule_matches(&grid, &game, &game.rules[0].rules[0]);
        assert_eq!(found.len(), 1);
        let mut events = Vec::new();
        assert!(run(&game, &mut grid, 0, found[0].clone(), &mut events));
        let layer = game.layer_of(game.object_id("crate").expect("crate"));
        assert_eq!(grid.slot(1, layer).movement, Some(Movement::Move(Direction::Right)));
        assert!(events.is_empty(), "nothing was created or destroyed");
        assert!(!run(&game, &mut grid, 0, found[0].clone(), &mut events), "second application is a no-op");
    }

    #[test]
    fn replacement_emits_create_and_destroy() {
        let (game, mut grid) = setup();
        let mut events = Vec::new();
        // Player | Gem does not match P*G directly; bind the cells by hand.
        assert!(run(&game, &mut grid, 1, vec![vec![0, 2]], &mut events));
        let gem = game.object_id("gem").expect("gem");
        let krate = game.object_id("crate").expect("crate");
        assert_eq!(grid.objects(2), vec![game.background, krate]);
        let kinds: Vec<(ObjectId, ObjectSound)> = events.iter().map(|e| (e.object, e.event)).collect();
        assert_eq!(kinds, vec![(gem, ObjectSound::Destroy), (krate, ObjectSound::Create)]);
    }

    #[test]
    fn unqualified_right_side_drops_left_movement() {
        let (game, mut grid) = setup();
        right_player(&game, &mut grid);
        let mut events = Vec::new();
        assert!(run(&game, &mut grid, 2, vec![vec![0, 1]], &mut events));
        assert!(!grid.has_movement());
    }

    #[test]
    fn rigid_rules_tag_their_movements() {
        let (game, mut grid) = setup();
        right_player(&game, &mut grid);
        let mut events = Vec::new();
        run(&game, &mut grid, 3, vec![vec![0, 1]], &mut events);
        let layer = game.layer_of(game.object_id("crate").expect("crate"));
        assert_eq!(grid.rigid_unit(1, layer), Some(9));
        assert_eq!(grid.rigid_unit(0, layer), Some(9));
    }
}
