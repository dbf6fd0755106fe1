mod tui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use voxrunner::config::load_config;
use voxrunner::{Game, SessionState};

use tui::input::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// stderr belongs to the terminal UI, so logs go to a file
fn init_logging(dir: &Path, verbose: bool) -> anyhow::Result<()> {
    use simplelog::{Config, LevelFilter, WriteLogger};

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_path = dir.join("voxrunner.log");
    let log_file = File::create(&log_path)
        .with_context(|| format!("can't create log file {}", log_path.display()))?;
    WriteLogger::init(level, Config::default(), log_file).context("logger already set")?;
    log::info!("voxrunner starting (log level: {:?})", level);
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let project_dir: PathBuf = args
        .iter()
        .find(|a| !a.starts_with('-'))
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    init_logging(&std::env::temp_dir(), verbose)?;
    let cfg = load_config(&project_dir)
        .with_context(|| format!("bad config in {}", project_dir.display()))?;
    let mut game = Game::new(cfg, rand::random())?;

    terminal::enable_raw_mode()?;
    // Ask for key release events so a note stops when the key goes up.
    // Terminals without support fall back to the hold window in TuiState.
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let frame_time = Duration::from_millis(16); // ~60fps
    let mut last_tick = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let now = Instant::now();
        let hud = game.hud();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &hud, &tui_state, game.config(), now);
        })?;

        for event in tui::input::poll_input(frame_time)? {
            match event {
                InputEvent::Quit => {
                    log::info!("quit with score {}", game.session().score());
                    return Ok(());
                }
                InputEvent::StartPress => {
                    if game.session().state() == SessionState::Over {
                        game.restart()?;
                    }
                    if game.session().state() == SessionState::Ready {
                        game.start()?;
                    }
                }
                other => tui_state.apply(other, Instant::now()),
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick).as_secs_f32();
        last_tick = now;
        game.tick(elapsed, || tui_state.estimate(now));

        for event in game.drain_events() {
            tui_state.on_scale_event(event, now);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}
