use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;
use puzzlang::{Direction, EngineConfig, GameModel, Location, compile};

const GAMES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/games");

fn sbp(level: usize) -> GameModel {
    let path = Path::new(GAMES_DIR).join("simple_block_pushing.txt");
    let input = std::fs::read_to_string(&path).expect("read simple_block_pushing.txt");
    let game = compile("sbp", &input).expect("compile");
    let mut model = GameModel::new(Arc::new(game), EngineConfig::default());
    model.accept_inputs(&format!("level {level}")).expect("load level");
    model
}

fn direction() -> impl Strategy<Value = Direction> {
    (0u8..4).prop_map(|n| Direction::from_repr(n).unwrap_or(Direction::Up))
}

proptest! {
    /// Stepping away and back again returns to the starting cell.
    #[test]
    fn step_then_opposite_returns(level in 0usize..2, cell in 0usize..70, dir in direction()) {
        let model = sbp(level);
        let grid = model.grid().expect("loaded");
        let in_bounds = cell < grid.cell_count();
        match model.step(cell, dir) {
            Some(next) => {
                prop_assert!(in_bounds);
                prop_assert!(next < grid.cell_count());
                prop_assert_eq!(model.step(next, dir.opposite()), Some(cell));
            }
            None => {
                if in_bounds {
                    // Only a step off the edge fails.
                    let Location { row, col } = grid.location(cell);
                    let (dr, dc) = dir.delta();
                    let edge = (dr < 0 && row == 0)
                        || (dr > 0 && row + 1 == grid.height())
                        || (dc < 0 && col == 0)
                        || (dc > 0 && col + 1 == grid.width());
                    prop_assert!(edge);
                }
            }
        }
    }

    /// Random input sequences never panic and leave exactly one player.
    #[test]
    fn random_play_keeps_one_player(moves in proptest::collection::vec(0usize..6, 0..40)) {
        const WORDS: [&str; 6] = ["up", "down", "left", "right", "undo", "restart"];
        let mut model = sbp(1);
        let inputs: Vec<&str> = moves.iter().map(|&i| WORDS[i]).collect();
        prop_assert!(model.accept_inputs(&inputs.join(",")).is_ok());

        let player = model.get_object_id("player").expect("player");
        let grid = model.grid().expect("loaded");
        let players = (0..grid.cell_count()).filter(|&c| grid.objects(c).contains(&player)).count();
        prop_assert_eq!(players, 1);
    }
}
