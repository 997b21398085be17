use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use drop_four::config::{AppConfig, LogConfig};
use drop_four::game::GameSession;
use drop_four::ui::{App, CrosstermInput, TerminalRenderer};

/// Play Drop Four in the terminal.
#[derive(Parser)]
#[command(name = "drop-four", about = "Two-player Connect Four style game")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "drop_four.toml")]
    config: PathBuf,

    /// Override board height (rows)
    #[arg(long)]
    rows: Option<usize>,

    /// Override board width (columns)
    #[arg(long)]
    cols: Option<usize>,

    /// Override the number of pieces in a row needed to win
    #[arg(long)]
    win_length: Option<usize>,

    /// Count diagonal lines as wins
    #[arg(long)]
    diagonal_wins: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(rows) = cli.rows {
        config.game.board_height = rows;
    }
    if let Some(cols) = cli.cols {
        config.game.board_width = cols;
    }
    if let Some(win_length) = cli.win_length {
        config.game.win_length = win_length;
    }
    if cli.diagonal_wins {
        config.game.diagonal_wins = true;
    }
    if cli.log_file.is_some() {
        config.log.file = cli.log_file;
    }
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging(&config.log)?;
    tracing::info!(
        rows = config.game.board_height,
        cols = config.game.board_width,
        win_length = config.game.win_length,
        diagonal_wins = config.game.diagonal_wins,
        "starting"
    );

    let session = GameSession::new(config.game)?;
    run(session, &config)
}

/// Install the file logger. The terminal is taken by the UI, so without a
/// log file no subscriber is installed.
fn init_logging(log: &LogConfig) -> Result<()> {
    let Some(path) = &log.file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(session: GameSession, config: &AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let renderer = TerminalRenderer::new(terminal, config.ui.cell_width);
    let tick = Duration::from_millis(config.ui.tick_ms);
    let mut app = App::new(session, renderer, CrosstermInput, tick);
    let res = app.run();

    // Restore terminal — always runs, even on error
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);

    if let Err(err) = &res {
        tracing::error!(error = %err, "game loop stopped");
    } else {
        tracing::info!(moves = app.session().history().len(), phase = %app.session().phase(), "exiting");
    }
    res.map_err(Into::into)
}
