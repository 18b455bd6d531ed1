//! Compiler from puzzle script text to a [`CompiledGame`].
//!
//! Each section has its own compiler module. They all report into one
//! [`Diagnostics`] list and later sections still run when earlier ones had
//! problems, so [`compile`] returns every error it can find at once.

pub mod error;
pub mod layer_parser;
pub mod legend_parser;
pub mod level_parser;
pub mod object_parser;
pub mod prelude_parser;
pub mod rule_compiler;
pub mod rule_lexer;
pub mod rule_parser;
pub mod script_lexer;
pub mod sound_parser;
pub mod win_parser;

use puzzlang_types::CompiledGame;

pub use error::{CompileError, Diagnostic, ErrorKind};

use error::Diagnostics;
use rule_parser::{RuleParseError, parse_rule};
use script_lexer::Section;

/// Compile `script`. `title` names the game in diagnostics and in the
/// result.
pub fn compile(title: &str, script: &str) -> Result<CompiledGame, CompileError> {
    let mut diags = Diagnostics::default();
    let sections = script_lexer::split_sections(script, &mut diags);

    let prelude = prelude_parser::parse_prelude(&sections.prelude);
    let mut objects = object_parser::parse_objects(sections.lines(Section::Objects), &mut diags);
    let legend = legend_parser::parse_legend(sections.lines(Section::Legend), &objects, &mut diags);
    let sounds = sound_parser::parse_sounds(sections.lines(Section::Sounds), &legend, &mut diags);
    let layers = layer_parser::parse_layers(
        sections.lines(Section::CollisionLayers),
        &mut objects,
        &legend,
        &mut diags,
    );

    if sections.has(Section::Scripts) {
        log::debug!("ignoring SCRIPTS section");
    }

    let mut asts = Vec::new();
    for line in sections.lines(Section::Rules).iter().filter(|l| !l.value.is_empty()) {
        match parse_rule(line) {
            Ok(ast) => asts.push(ast),
            Err(RuleParseError::Unsupported { line, keyword }) => {
                diags.syntax(line, format!("'{keyword}' is not supported"));
            }
            Err(RuleParseError::Parse { line, msg }) => diags.syntax(line, msg),
        }
    }
    let rules = rule_compiler::compile_rules(&asts, &legend, &mut diags);

    let win_conditions =
        win_parser::parse_win_conditions(sections.lines(Section::WinConditions), &legend, &mut diags);
    let levels = level_parser::parse_levels(sections.lines(Section::Levels), &objects, &legend, &mut diags);

    let background = match legend.background {
        Some(id) if diags.is_empty() => id,
        _ => {
            let err = diags.into_error(title);
            log::debug!("{err}");
            return Err(err);
        }
    };

    log::debug!(
        "compiled {title:?}: {} objects, {} layers, {} levels",
        objects.len(),
        layers.len(),
        levels.levels.len()
    );
    Ok(CompiledGame {
        title: title.to_string(),
        prelude,
        objects,
        legend: legend.entries,
        names: legend.names,
        layers,
        rules: rules.early,
        late_rules: rules.late,
        win_conditions,
        levels: levels.levels,
        level_order: levels.order,
        sounds,
        player: legend.player,
        background,
    })
}
