//! kilo - a minimal screen-oriented terminal editor
//!
//! kilo puts the terminal into raw mode, decodes keypresses (including
//! arrow and navigation escape sequences) and redraws the whole screen
//! with a single write per frame.
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Arrows | Move the cursor |
//! | Home / End | First / last column |
//! | PageUp / PageDown | Top / bottom row |
//! | Ctrl+Q | Quit |
//!
//! # Files
//!
//! - `~/.kilo/config.toml`: optional settings (see [`config`])
//! - `~/.kilo/kilo.log`: log output

mod config;
mod core;
mod editor;
mod ui;

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("kilo {}", VERSION);
}

fn print_help() {
    eprintln!("kilo {} - A minimal screen-oriented terminal editor", VERSION);
    eprintln!();
    eprintln!("Usage: kilo [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Arrows                Move the cursor");
    eprintln!("  Home, End             First / last column");
    eprintln!("  PageUp, PageDown      Top / bottom row");
    eprintln!("  Ctrl+Q                Quit");
    eprintln!();
    eprintln!("Configuration: ~/.kilo/config.toml");
}

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run,
    Help,
    Version,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut command = Command::Run;
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => command = Command::Help,
            "-v" | "--version" => command = Command::Version,
            arg => return Err(format!("Unknown argument: {}. Use -h for help.", arg)),
        }
    }
    Ok(command)
}

/// Send tracing output to `~/.kilo/kilo.log`; stdout belongs to the screen.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let dir = config::kilo_dir().context("Could not determine home directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let log_path = dir.join("kilo.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> ExitCode {
    match parse_args(env::args().skip(1)) {
        Ok(Command::Run) => {}
        Ok(Command::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            print_version();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            return ExitCode::FAILURE;
        }
    }

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Logging is best effort; the editor runs without it
    let _ = init_logging(&config);
    info!("kilo {} starting...", VERSION);
    if let Some(e) = config_error {
        warn!("{:#}; using default configuration", e);
    }

    run(&config)
}

#[cfg(not(unix))]
fn run(_config: &Config) -> ExitCode {
    eprintln!("kilo needs a POSIX terminal (termios).");
    ExitCode::FAILURE
}

#[cfg(unix)]
fn run(config: &Config) -> ExitCode {
    use crate::core::geometry;
    use crate::core::raw_mode::TtyMode;
    use crate::core::tty::Tty;

    let mut tty = match Tty::open() {
        Ok(tty) => tty,
        Err(e) => return die(&e, &mut std::io::stdout()),
    };
    let device = match TtyMode::new(&tty) {
        Ok(device) => device,
        Err(e) => return die(&e, &mut tty),
    };

    run_session(device, &mut tty, geometry::window_size, config)
}

/// Enable raw mode, resolve the screen size, run the editor and tear
/// everything down.
///
/// `window_size` is queried only once raw mode is active, so a fallback
/// cursor report is not echoed. The raw mode guard is dropped last, after
/// the final write to the terminal on every path.
#[cfg(unix)]
fn run_session<D, T, F>(device: D, tty: &mut T, window_size: F, config: &Config) -> ExitCode
where
    D: crate::core::raw_mode::ModeDevice,
    T: crate::core::tty::ByteSource + std::io::Write,
    F: FnOnce() -> std::io::Result<(u16, u16)>,
{
    use crate::core::geometry;
    use crate::core::raw_mode::RawMode;
    use crate::editor::Editor;
    use crate::ui::Renderer;

    let read_timeout = config.input.effective_read_timeout();
    let raw_mode = match RawMode::enable(device, read_timeout) {
        Ok(guard) => guard,
        Err(e) => return die(&e, tty),
    };

    let geometry = match geometry::resolve(window_size(), tty) {
        Ok(geometry) => geometry,
        Err(e) => return die(&e, tty),
    };
    info!("Terminal size: {}x{}", geometry.cols, geometry.rows);

    let mut editor = Editor::new(geometry, Renderer::new(&config.display));
    let code = match editor.run(tty) {
        Ok(()) => {
            info!("Session ended at {:?}", editor.cursor());
            ExitCode::SUCCESS
        }
        Err(e) => die(&e, tty),
    };

    drop(raw_mode);
    code
}

/// Report a fatal terminal error: clear the screen, home the cursor and
/// print the failing operation with the system error.
#[cfg(unix)]
fn die<W: std::io::Write>(err: &crate::core::tty::TtyError, out: &mut W) -> ExitCode {
    use tracing::error;

    let _ = editor::clear_screen(out);
    error!("{}", err);
    eprintln!("{}", err);
    ExitCode::FAILURE
}
