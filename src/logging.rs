use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install the global logger.
///
/// `verbose` lowers the default filter from `info` to `trace`, which shows
/// every rule application and move. `RUST_LOG` still takes precedence.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // A second call finds a logger already installed; tests rely on that
    // being harmless.
    let _ = Builder::from_env(env).is_test(cfg!(test)).try_init();
}
