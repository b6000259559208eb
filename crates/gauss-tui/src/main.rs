mod app;
mod game;
mod render;
mod stats;
mod theme;

use app::{App, AppAction, AppOptions};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::GameMode;
use stats::StatsManager;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use theme::ThemeName;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Row-reduction puzzles in the terminal
#[derive(Parser, Debug)]
#[command(name = "gauss", version, about, long_about = None)]
struct Cli {
    /// Coefficient size, 0..=100 (random when omitted)
    #[arg(short, long, env = "GAUSS_DIFFICULTY", value_parser = clap::value_parser!(u8).range(0..=100))]
    difficulty: Option<u8>,

    /// How close to solved the puzzle starts, 0..=100 (random when omitted)
    #[arg(short, long, env = "GAUSS_COMPRESSIBILITY", value_parser = clap::value_parser!(u8).range(0..=100))]
    compressibility: Option<u8>,

    /// Seed for the first puzzle
    #[arg(short, long, env = "GAUSS_SEED")]
    seed: Option<u64>,

    /// Scoring mode
    #[arg(short, long, env = "GAUSS_MODE", value_enum, default_value_t = GameMode::Fmc)]
    mode: GameMode,

    /// Color theme
    #[arg(short, long, env = "GAUSS_THEME", value_enum, default_value_t = ThemeName::Dark)]
    theme: ThemeName,

    /// Debug logging
    #[arg(short, long, env = "GAUSS_VERBOSE")]
    verbose: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = AppOptions {
        difficulty: cli.difficulty,
        compressibility: cli.compressibility,
        seed: cli.seed,
        mode: cli.mode,
        theme: cli.theme,
    };
    let mut app = App::new(options, StatsManager::load(), App::default_save_path());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    if let Err(e) = result {
        tracing::error!("terminal error: {}", e);
        eprintln!("Error: {}", e);
    }

    Ok(())
}

/// Log to a file so output never lands on the alternate screen
fn init_logging(verbose: bool) {
    let path = log_path();
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Logging disabled ({}): {}", path.display(), err);
            return;
        }
    };

    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}

fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gauss.log")
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        render::render(stdout, app)?;
        stdout.flush()?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    AppAction::Continue => {}
                    AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
