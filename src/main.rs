use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    collections::VecDeque,
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use spiraling::{
    clock::SystemClock,
    config::{ConfigStore, FileConfigStore, Tuning},
    engine::{BackgroundEmission, Engine},
    runtime::{CrosstermEventSource, EngineEvent, FixedTicker, Runner},
    ui::{heading_overflows, SessionView},
    TICK_RATE_MS,
};

const MAX_VISIBLE_EMISSIONS: usize = 6;

/// generative typography tui where typing drives a simulated anxiety metric
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type and watch the piece spiral: keystrokes feed a simulated anxiety level that drives font weight, pulse cadence, and background murmurs. Rhythmic, even pressing calms it down; idling winds it up."
)]
struct Cli {
    /// max spread between key intervals (ms) still counted as fidgeting
    #[clap(long)]
    fidget_threshold: Option<u64>,

    /// anxiety decrease per fidgeting key press
    #[clap(long)]
    soothe_step: Option<f64>,

    /// anxiety level at session start
    #[clap(long)]
    initial_anxiety: Option<f64>,

    /// tuning config file to use instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, mut tuning: Tuning) -> Tuning {
        if let Some(t) = self.fidget_threshold {
            tuning.max_fidget_jitter_ms = t;
        }
        if let Some(s) = self.soothe_step {
            tuning.soothe_step = s;
        }
        if let Some(a) = self.initial_anxiety {
            tuning.initial_anxiety = a;
        }
        tuning
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let tuning = cli.apply(store.load());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // key-release events where the terminal supports them; elsewhere the
    // loop synthesizes key-up after each press
    let enhanced = execute!(
        stdout,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut engine = Engine::new(tuning, SystemClock);
    let res = run(&mut terminal, &mut engine);

    engine.shutdown();
    if enhanced {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    engine: &mut Engine<SystemClock>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let mut visible_emissions: VecDeque<BackgroundEmission> = VecDeque::new();
    let mut key_up_pending = false;
    let mut saw_release_event = false;

    loop {
        match runner.step() {
            EngineEvent::Quit => break,
            EngineEvent::KeyDown(key) => {
                engine.on_key_down(key);
                key_up_pending = true;
            }
            EngineEvent::KeyUp => {
                saw_release_event = true;
                key_up_pending = false;
                engine.on_key_up();
            }
            EngineEvent::Resize => {}
            EngineEvent::Tick => {
                if key_up_pending && !saw_release_event {
                    engine.on_key_up();
                    key_up_pending = false;
                }
                engine.tick();
            }
        }

        for emission in engine.drain_emissions() {
            if visible_emissions.len() == MAX_VISIBLE_EMISSIONS {
                visible_emissions.pop_front();
            }
            visible_emissions.push_back(emission);
        }

        let snapshot = engine.snapshot();
        if heading_overflows(&snapshot, terminal.size()?.width) {
            engine.on_heading_overflow();
        }

        let emissions: Vec<BackgroundEmission> =
            visible_emissions.iter().cloned().collect();
        let view = SessionView {
            snapshot: &snapshot,
            emissions: &emissions,
        };
        terminal.draw(|f| f.render_widget(&view, f.area()))?;
    }

    Ok(())
}
