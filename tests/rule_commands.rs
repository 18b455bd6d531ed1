//! Rule commands, rule modifiers and prelude flags, each on a tiny game.

use std::sync::Arc;

use puzzlang::{EngineConfig, GameModel, State, compile};
use puzzlang_types::{GlobalSound, SoundTrigger};

fn script(prelude: &str, sounds: &str, rules: &str, level: &str) -> String {
    format!(
        "\
{prelude}

OBJECTS
Background
black

Player
white

Wall
grey

Crate
orange

Target
red

Gem
green

Coin
yellow

LEGEND
. = Background
# = Wall
P = Player
* = Crate
O = Target
G = Gem
C = Coin
Item = Gem or Coin

SOUNDS
{sounds}

COLLISIONLAYERS
Background
Target
Player, Wall, Crate, Gem, Coin

RULES
{rules}

WINCONDITIONS

LEVELS
{level}
"
    )
}

fn load(prelude: &str, sounds: &str, rules: &str, level: &str, config: EngineConfig) -> GameModel {
    let text = script(prelude, sounds, rules, level);
    let game = compile("rules", &text).unwrap_or_else(|e| panic!("{e}: {:#?}", e.lines()));
    let mut model = GameModel::new(Arc::new(game), config);
    model.accept_inputs("level 0").expect("level 0 loads");
    model
}

fn game(rules: &str, level: &str) -> GameModel {
    load("", "", rules, level, EngineConfig::default())
}

fn text(model: &GameModel) -> String {
    model.decode_level(0).expect("decode")
}

fn play(model: &mut GameModel, inputs: &str) {
    model
        .accept_inputs(inputs)
        .unwrap_or_else(|e| panic!("inputs {inputs:?}: {e}"));
}

const PUSH: &str = "[ > Player | Crate ] -> [ > Player | > Crate ]";

#[test]
fn cancel_discards_the_turn() {
    let rules = format!("{PUSH}\nlate [ Crate | Wall ] -> cancel");
    let mut m = load("", "cancel 88", &rules, "P*.#", EngineConfig::default());
    m.sound_events();

    play(&mut m, "right");
    assert_eq!(text(&m), "p*.#");
    let events = m.sound_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].trigger, SoundTrigger::Global(GlobalSound::Cancel));

    play(&mut m, "undo");
    assert_eq!(text(&m), "p*.#", "a cancelled turn leaves no history");
}

#[test]
fn again_repeats_while_the_grid_changes() {
    let rules = "[ stationary Crate ] -> [ right Crate ] again";
    let mut m = game(rules, "P*...#");
    play(&mut m, "action");
    assert_eq!(text(&m), "p...*#");

    play(&mut m, "undo");
    assert_eq!(text(&m), "p*...#", "the whole chain is one undo step");
}

#[test]
fn again_chain_is_bounded() {
    let config = EngineConfig {
        max_again_turns: 1,
        ..EngineConfig::default()
    };
    let mut m = load("", "", "[ stationary Crate ] -> [ right Crate ] again", "P*...#", config);
    play(&mut m, "action");
    assert_eq!(text(&m), "p..*.#");
}

#[test]
fn message_holds_the_next_input() {
    let mut m = game("[ > Player | Gem ] -> [ > Player | ] message You found a Gem", "PG.");
    play(&mut m, "right");
    assert_eq!(text(&m), ".p.");
    assert_eq!(m.state(), State::Msg);
    assert_eq!(m.current_message(), Some("You found a Gem"));
    assert!(m.in_level());

    play(&mut m, "right");
    assert_eq!(text(&m), ".p.", "closing the message does not move");
    assert_eq!(m.state(), State::Level);
    assert_eq!(m.current_message(), None);

    play(&mut m, "right");
    assert_eq!(text(&m), "..p");
}

#[test]
fn win_command_ends_the_level() {
    let mut m = game("late [ Player Target ] -> win", "PO");
    play(&mut m, "right");
    assert!(m.end_level());
    assert_eq!(m.state(), State::Done);
}

#[test]
fn checkpoint_moves_the_restart_point() {
    let mut m = game("late [ Player Target ] -> checkpoint", "P.O..");
    let player = m.get_object_id("player").expect("player");
    play(&mut m, "right,right,right");
    assert!(m.get_objects(3).contains(&player));

    play(&mut m, "restart");
    assert!(m.get_objects(2).contains(&player));
}

#[test]
fn random_group_applies_one_match() {
    let mut m = game("random [ Gem ] -> [ Coin ]", "PGGG");
    play(&mut m, "action");
    assert_eq!(text(&m).matches('c').count(), 1);
    play(&mut m, "action");
    assert_eq!(text(&m).matches('c').count(), 2);

    let mut again = game("random [ Gem ] -> [ Coin ]", "PGGG");
    play(&mut again, "action,action");
    assert_eq!(text(&again), text(&m), "same seed, same choices");
}

#[test]
fn random_spawn_creates_one_member() {
    let mut m = game("[ action Player | no Item ] -> [ action Player | random Item ]", "P.");
    play(&mut m, "action");
    let out = text(&m);
    assert!(out == "pg" || out == "pc", "{out}");
    assert!(m.symbol_matches(1, "item"));
}

#[test]
fn rigid_unit_moves_together_or_not_at_all() {
    let level = "P*.\n.*#";
    let glue = "down [ right Crate | Crate ] -> [ right Crate | right Crate ]";

    let mut loose = game(&format!("{PUSH}\n{glue}"), level);
    play(&mut loose, "right");
    assert_eq!(text(&loose), ".p*\n.*#");

    let mut rigid = game(&format!("{PUSH}\nrigid {glue}"), level);
    play(&mut rigid, "right");
    assert_eq!(text(&rigid), "p*.\n.*#");
}

#[test]
fn late_rules_see_resolved_movement() {
    let mut m = game(&format!("{PUSH}\nlate [ Crate Target ] -> [ Wall Target ]"), "P*O");
    let wall = m.get_object_id("wall").expect("wall");
    play(&mut m, "right");
    assert!(m.get_objects(2).contains(&wall));
}

#[test]
fn require_player_movement_reverts_idle_turns() {
    let mut strict = load(
        "require_player_movement",
        "",
        "[ Gem ] -> [ Coin ]",
        "P#G",
        EngineConfig::default(),
    );
    play(&mut strict, "right");
    assert_eq!(text(&strict), "p#g");

    let mut lax = game("[ Gem ] -> [ Coin ]", "P#G");
    play(&mut lax, "right");
    assert_eq!(text(&lax), "p#c");
}

#[test]
fn rules_run_on_level_start() {
    let mut m = load(
        "run_rules_on_level_start",
        "",
        "[ Gem ] -> [ Coin ]",
        "PG",
        EngineConfig::default(),
    );
    assert_eq!(text(&m), "pc");
    play(&mut m, "undo");
    assert_eq!(text(&m), "pc");
}

#[test]
fn noundo_and_norestart() {
    let mut m = load("noundo\nnorestart", "", "", "P..", EngineConfig::default());
    play(&mut m, "right,undo");
    assert_eq!(text(&m), ".p.");
    play(&mut m, "restart");
    assert_eq!(text(&m), ".p.");
}

#[test]
fn noaction_ignores_action() {
    let mut m = load(
        "noaction",
        "",
        "[ action Player | Gem ] -> [ action Player | Coin ]",
        "PG",
        EngineConfig::default(),
    );
    play(&mut m, "action");
    assert_eq!(text(&m), "pg");
}

#[test]
fn sfx_command_records_its_sound() {
    let mut m = load(
        "",
        "sfx3 4242",
        "[ > Player | Gem ] -> [ > Player | ] sfx3",
        "PG",
        EngineConfig::default(),
    );
    m.sound_events();
    play(&mut m, "right");
    let events = m.sound_events();
    assert!(
        events
            .iter()
            .any(|e| e.trigger == SoundTrigger::Sfx(3) && e.seed == 4242),
        "{events:?}"
    );
}
