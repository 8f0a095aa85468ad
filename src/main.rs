mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use space_shooter::clock::{Clock, SystemClock, Ticker};
use space_shooter::config::consts::DEFAULT_HOLD_WINDOW_MS;
use space_shooter::entities::RoundState;
use space_shooter::input::{Control, InputState};
use space_shooter::store::{FileStore, HighScoreStore, LeaderboardStore, MemoryStore};
use space_shooter::{Game, Rules, TickOutcome};

use display::TerminalSink;

/// How long the menu and game-over screens wait for input before redrawing.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "space_shooter", about = "Terminal arcade shooter")]
struct Cli {
    /// Directory holding the best score and leaderboard.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding the default simulation rules.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Seed for adversary spawning (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// How long a key counts as held after its last press on terminals
    /// that do not report key releases (ms).
    #[arg(long, default_value_t = DEFAULT_HOLD_WINDOW_MS)]
    hold_window_ms: u64,

    /// Write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Keep scores in memory only.
    #[arg(long)]
    no_save: bool,
}

// ── Key mapping ───────────────────────────────────────────────────────────────

fn control_for(code: &KeyCode) -> Option<Control> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Control::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Control::MoveRight),
        KeyCode::Char(' ') => Some(Control::Fire),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    /// The key was not a command.
    Continue,
    /// The key issued a command and is not also a control.
    Handled,
    Quit,
}

/// Apply a one-shot command key.  Held controls are handled separately.
fn command_for<H: HighScoreStore, L: LeaderboardStore>(
    game: &mut Game<H, L>,
    code: &KeyCode,
    modifiers: KeyModifiers,
) -> Flow {
    match (game.state(), code) {
        (_, KeyCode::Char('q') | KeyCode::Char('Q')) => Flow::Quit,
        (_, KeyCode::Char('c')) if modifiers.contains(KeyModifiers::CONTROL) => Flow::Quit,
        (RoundState::Menu, KeyCode::Esc) => Flow::Quit,
        (RoundState::Menu, KeyCode::Enter) => {
            game.start();
            Flow::Handled
        }
        (RoundState::GameOver, KeyCode::Char('r') | KeyCode::Char('R')) => {
            game.replay();
            Flow::Handled
        }
        (_, KeyCode::Esc | KeyCode::Char('m') | KeyCode::Char('M')) => {
            game.exit();
            Flow::Handled
        }
        _ => Flow::Continue,
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Drives the game until the player quits.
///
/// Events arrive from the reader thread over `rx` and are drained into the
/// input state before each tick, so a tick always samples a complete set of
/// held controls.  The ticker only runs while a round is being played.
fn run<W: Write, H: HighScoreStore, L: LeaderboardStore>(
    sink: &mut TerminalSink<W>,
    rx: &mpsc::Receiver<Event>,
    game: &mut Game<H, L>,
    mut input: InputState,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let clock = SystemClock::new();
    let mut ticker = Ticker::new(Duration::from_millis(game.rules().tick_interval_ms));
    let mut shown: Option<RoundState> = None;

    loop {
        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut events: Vec<Event> = rx.try_iter().collect();
        if events.is_empty() && game.state() != RoundState::Playing {
            match rx.recv_timeout(IDLE_POLL) {
                Ok(ev) => events.push(ev),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }

        let now = clock.now();
        for ev in events {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => match command_for(game, &code, modifiers) {
                        Flow::Quit => return Ok(()),
                        Flow::Handled => {}
                        Flow::Continue => {
                            // Controls only count once a round is running.
                            if let Some(control) = control_for(&code) {
                                if game.state() == RoundState::Playing {
                                    input.press(control, now);
                                }
                            }
                        }
                    },
                    KeyEventKind::Repeat => {
                        if let Some(control) = control_for(&code) {
                            if game.state() == RoundState::Playing {
                                input.press(control, now);
                            }
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(control) = control_for(&code) {
                            input.release(control);
                        }
                    }
                },
                Event::Resize(..) => shown = None,
                _ => {}
            }
        }

        // ── Keep the ticker in step with the round state ──────────────────────
        let state = game.state();
        if state == RoundState::Playing && !ticker.is_running() {
            ticker.start(now);
        } else if state != RoundState::Playing && ticker.is_running() {
            ticker.stop();
            input.release_all();
        }

        match state {
            RoundState::Playing => {
                if ticker.poll(now) {
                    let sample = input.sample(now);
                    if let TickOutcome::RoundOver(..) = game.step(now, sample, rng, sink)? {
                        ticker.stop();
                        input.release_all();
                    }
                }
                shown = Some(RoundState::Playing);
                thread::sleep(ticker.until_next(clock.now()));
            }
            RoundState::Menu if shown != Some(RoundState::Menu) => {
                display::draw_menu(sink.writer(), game.best_score(), game.leaderboard())?;
                shown = Some(RoundState::Menu);
            }
            RoundState::GameOver if shown != Some(RoundState::GameOver) => {
                display::draw_game_over(
                    sink.writer(),
                    game.last_round(),
                    game.best_score(),
                    game.leaderboard(),
                )?;
                shown = Some(RoundState::GameOver);
            }
            _ => {}
        }
    }
}

/// Build the game over the given stores and run it.
fn play<W: Write, H: HighScoreStore, L: LeaderboardStore>(
    sink: &mut TerminalSink<W>,
    rx: &mpsc::Receiver<Event>,
    rules: Rules,
    high_scores: H,
    boards: L,
    input: InputState,
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    let mut game = Game::new(rules, high_scores, boards).context("cannot start the game")?;
    run(sink, rx, &mut game, input, rng)?;
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    // The terminal is in raw alternate-screen mode, so stderr logging stays
    // off unless RUST_LOG asks for it.
    let default = if log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let rules = match &cli.rules {
        Some(path) => Rules::load(path)
            .with_context(|| format!("cannot load rules from {}", path.display()))?,
        None => Rules::default(),
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    let input = if keyboard_enhanced {
        InputState::new()
    } else {
        InputState::with_hold_window(Duration::from_millis(cli.hold_window_ms))
    };
    log::info!("keyboard enhancement: {keyboard_enhanced}");

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let mut sink = TerminalSink::new(out, &rules);
    let result = if cli.no_save {
        play(&mut sink, &rx, rules, MemoryStore::new(), MemoryStore::new(), input, &mut rng)
    } else {
        let store = FileStore::new(cli.data_dir.unwrap_or_else(FileStore::default_dir));
        log::info!("scores stored in {}", store.dir().display());
        play(&mut sink, &rx, rules, store.clone(), store, input, &mut rng)
    };

    // Always restore the terminal
    let out = sink.writer();
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
