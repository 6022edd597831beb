mod render;

use std::fs::File;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pacghost::config::{MIN_GRID_H, MIN_GRID_W};
use pacghost::{Dir, Flow, Game, Intent, MazeParams, SystemClock, Tuning};

use crate::render::Renderer;

const GRID_MARGIN_COLS: u16 = 4;
const GRID_MARGIN_ROWS: u16 = 4;

/// Collect every pellet in a random maze while dodging enemies. Bombs freeze
/// enemies caught in the blast, and kill you if you are too close.
#[derive(Parser, Debug)]
#[command(name = "pacghost", version)]
struct Args {
    /// Maze width in cells (default: fit the terminal)
    #[arg(long)]
    width: Option<usize>,

    /// Maze height in cells (default: fit the terminal)
    #[arg(long)]
    height: Option<usize>,

    /// Number of enemies
    #[arg(long, default_value_t = 6)]
    enemies: usize,

    /// Seed for maze layout and enemy decisions
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation tick interval in milliseconds
    #[arg(long, env = "PACGHOST_TICK_MS", default_value_t = 40)]
    tick_ms: u64,

    /// Render frames per second
    #[arg(long, env = "PACGHOST_FPS", default_value_t = 60)]
    fps: u64,

    /// Plain ASCII glyphs instead of emoji
    #[arg(long)]
    ascii: bool,

    /// Write logs to this file (RUST_LOG sets the filter)
    #[arg(long, env = "PACGHOST_LOG")]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &args);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_logging(path: Option<&PathBuf>) -> anyhow::Result<()> {
    // The terminal belongs to the game, so logs only go to a file.
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, args: &Args) -> anyhow::Result<()> {
    let params = maze_params(args)?;
    let tuning = Tuning {
        enemy_count: args.enemies,
        tick_interval: Duration::from_millis(args.tick_ms.max(1)),
        ..Tuning::default()
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, width = params.width, height = params.height, "starting");

    let rng = ChaCha8Rng::seed_from_u64(seed);
    let mut game = Game::new(params, tuning, SystemClock::new(), rng)?;
    let mut renderer = Renderer::new(args.ascii);
    let frame_time = Duration::from_micros(1_000_000 / args.fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if let Some(intent) = key_intent(key) {
                    if game.apply(intent)? == Flow::Quit {
                        return Ok(());
                    }
                }
            }
        }

        game.update();
        renderer.draw(stdout, game.world(), game.now())?;

        if game.world().is_over() {
            match wait_for_choice()? {
                Intent::Replay => {
                    game.apply(Intent::Replay)?;
                    renderer.invalidate();
                    continue;
                }
                _ => return Ok(()),
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn maze_params(args: &Args) -> io::Result<MazeParams> {
    let (term_w, term_h) = terminal::size()?;
    let fit_w = (term_w.saturating_sub(GRID_MARGIN_COLS) / 2) as usize;
    let fit_h = term_h.saturating_sub(GRID_MARGIN_ROWS) as usize;
    Ok(MazeParams::new(
        args.width.unwrap_or(fit_w.max(MIN_GRID_W)),
        args.height.unwrap_or(fit_h.max(MIN_GRID_H)),
    ))
}

/// Blocks until the player picks replay or quit.
fn wait_for_choice() -> io::Result<Intent> {
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match key_intent(key) {
                    Some(Intent::Replay) => return Ok(Intent::Replay),
                    Some(Intent::Quit) => return Ok(Intent::Quit),
                    _ => {}
                }
            }
        }
    }
}

fn key_intent(key: KeyEvent) -> Option<Intent> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {}
        _ => return None,
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Intent::Quit);
    }
    let intent = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Intent::Move(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Intent::Move(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Intent::Move(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Intent::Move(Dir::Right),
        KeyCode::Char('b') | KeyCode::Char(' ') => Intent::PlaceBomb,
        KeyCode::Char('p') | KeyCode::Char('P') => Intent::TogglePause,
        KeyCode::Char('r') | KeyCode::Char('R') => Intent::Replay,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_intents() {
        assert_eq!(key_intent(press(KeyCode::Char('h'))), Some(Intent::Move(Dir::Left)));
        assert_eq!(key_intent(press(KeyCode::Up)), Some(Intent::Move(Dir::Up)));
        assert_eq!(key_intent(press(KeyCode::Char('b'))), Some(Intent::PlaceBomb));
        assert_eq!(key_intent(press(KeyCode::Char('x'))), None);
        assert_eq!(
            key_intent(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Intent::Quit)
        );
    }

    #[test]
    fn args_parse() {
        let args = Args::parse_from(["pacghost", "--width", "40", "--seed", "7", "--ascii"]);
        assert_eq!(args.width, Some(40));
        assert_eq!(args.seed, Some(7));
        assert!(args.ascii);
        assert_eq!(args.enemies, 6);
    }
}
