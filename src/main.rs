use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use puzzlang::{EngineConfig, GameModel, compile, logging};

/// Compile a puzzle script and play a list of commands against it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Script file to load
    script: PathBuf,

    /// Engine settings (TOML); `PUZZLANG_*` variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Level to start on, counting grid levels only
    #[arg(short, long, default_value_t = 0)]
    level: usize,

    /// Commands to play, comma separated (e.g. "right,right,undo")
    #[arg(short, long)]
    inputs: Option<String>,

    /// Log every rule application and move
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = EngineConfig::load(cli.config.as_deref())?;
    let text = fs::read_to_string(&cli.script).wrap_err_with(|| format!("reading {}", cli.script.display()))?;
    let title = cli
        .script
        .file_stem()
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().into_owned());

    let game = compile(&title, &text)?;
    let mut model = GameModel::new(Arc::new(game), config);
    model.accept_inputs(&format!("level {}", cli.level))?;
    if let Some(inputs) = &cli.inputs {
        model.accept_inputs(inputs)?;
    }

    if let Some(level) = model.current_level() {
        println!("{}", model.decode_level(level)?);
    }
    if let Some(message) = model.current_message() {
        println!("{message}");
    }
    println!("state: {}", model.state());
    println!("status: {}", model.status());
    Ok(())
}
