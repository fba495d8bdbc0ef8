/// Entry point, CLI and screen loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{
    KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::history::{sort_leaderboard, LeaderboardRow, LevelHistory, SortKey};
use sim::level::{read_level_file, scan_levels, LevelEntry};
use sim::step::step;
use sim::world::{LevelSimulation, Session};
use ui::gamepad::GamepadState;
use ui::input::{InputState, IntentTracker, KeyMap};
use ui::renderer::{format_time, LeaderboardView, LevelSelectView, Renderer};
use ui::sound::{play_events, SoundEngine};

#[derive(Parser, Debug)]
#[command(name = "naphunters", version, about = "Cooperative two-player puzzle platformer for the terminal")]
struct Args {
    /// Team name recorded with completed levels
    #[arg(long)]
    team: Option<String>,

    /// Play a single level file, skipping level select
    #[arg(long)]
    level: Option<PathBuf>,

    /// Print the leaderboard and exit
    #[arg(long)]
    leaderboard: bool,

    /// Leaderboard column to sort by (team, level, time, points, timestamp)
    #[arg(long, default_value = "timestamp")]
    sort: String,

    /// Sort the leaderboard ascending instead of descending
    #[arg(long)]
    ascending: bool,
}

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Esc, KeyCode::Backspace];

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging();

    let config = GameConfig::load();
    let team = args.team.clone().unwrap_or_else(|| config.team_name.clone());
    let history = LevelHistory::open(&config.history_file).unwrap_or_else(|e| {
        warn!(error = %e, "history unavailable, results will not be saved");
        LevelHistory::in_memory()
    });

    if args.leaderboard {
        let key = parse_sort_key(&args.sort)?;
        print_leaderboard(&history, key, args.ascending);
        return Ok(());
    }

    let mut app = App::new(config, Session::new(team), history);
    if let Some(path) = &args.level {
        app.direct = true;
        app.start_level(path, &display_name(path));
    }

    let mut renderer = Renderer::new();
    renderer.init()?;

    let mut kb = InputState::new();
    kb.honor_release = enable_release_events();
    let mut gp = GamepadState::new(&app.config.gamepad);
    let sound = SoundEngine::new();

    let result = run(&mut app, &mut renderer, &mut kb, &mut gp, sound.as_ref());

    if kb.honor_release {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    renderer.cleanup()?;
    info!("exit");
    result
}

/// Log to a file; the terminal belongs to the renderer.
fn init_logging() {
    let path = std::env::var("NAPHUNTERS_LOG").unwrap_or_else(|_| "naphunters.log".to_string());
    let file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot open log file {path}: {e}");
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Ask the terminal for key release events. Returns whether it agreed.
fn enable_release_events() -> bool {
    if !crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false) {
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

fn parse_sort_key(name: &str) -> Result<SortKey, Box<dyn Error>> {
    SortKey::ALL
        .into_iter()
        .find(|k| k.label().eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("unknown sort column '{name}'").into())
}

fn print_leaderboard(history: &LevelHistory, key: SortKey, ascending: bool) {
    let mut rows = history.leaderboard();
    sort_leaderboard(&mut rows, key, ascending);
    if rows.is_empty() {
        println!("No completed levels yet.");
        return;
    }
    println!("{:<16} {:<20} {:>9} {:>6}  {}", "Team", "Level", "Time", "Snacks", "When");
    for r in rows {
        println!(
            "{:<16} {:<20} {:>9} {:>6}  {}",
            r.team, r.level, format_time(r.time), r.points, r.timestamp
        );
    }
}

fn display_name(path: &Path) -> String {
    path.file_stem().unwrap_or_default().to_string_lossy().to_string()
}

// ══════════════════════════════════════════════════════════════
// Screens
// ══════════════════════════════════════════════════════════════

enum Screen {
    LevelSelect,
    Playing(Box<LevelSimulation>),
    Leaderboard,
}

struct Board {
    rows: Vec<LeaderboardRow>,
    key: SortKey,
    ascending: bool,
    scroll: usize,
}

struct App {
    config: GameConfig,
    session: Session,
    history: LevelHistory,
    levels: Vec<LevelEntry>,
    cursor: usize,
    message: String,
    screen: Screen,
    board: Board,
    /// Started with `--level`: leaving the level exits.
    direct: bool,
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl App {
    fn new(config: GameConfig, session: Session, history: LevelHistory) -> Self {
        let levels = scan_levels(&config.levels_dir);
        info!(count = levels.len(), dir = %config.levels_dir.display(), "levels found");
        App {
            config,
            session,
            history,
            levels,
            cursor: 0,
            message: String::new(),
            screen: Screen::LevelSelect,
            board: Board { rows: vec![], key: SortKey::default(), ascending: false, scroll: 0 },
            direct: false,
        }
    }

    fn start_level(&mut self, path: &Path, fallback_name: &str) {
        let sim = match read_level_file(path) {
            Ok(data) => LevelSimulation::load(&data, self.session.clone(), self.config.sim),
            Err(e) => LevelSimulation::failed(fallback_name, e, self.session.clone(), self.config.sim),
        };
        self.screen = Screen::Playing(Box::new(sim));
    }

    /// Back to level select, or out of the program when started on one level.
    fn leave_level(&mut self) -> Flow {
        if self.direct {
            return Flow::Quit;
        }
        self.levels = scan_levels(&self.config.levels_dir);
        self.cursor = self.cursor.min(self.levels.len().saturating_sub(1));
        self.screen = Screen::LevelSelect;
        Flow::Continue
    }

    fn open_leaderboard(&mut self) {
        self.board.rows = self.history.leaderboard();
        self.board.scroll = 0;
        sort_leaderboard(&mut self.board.rows, self.board.key, self.board.ascending);
        self.screen = Screen::Leaderboard;
    }
}

fn run(
    app: &mut App,
    renderer: &mut Renderer,
    kb: &mut InputState,
    gp: &mut GamepadState,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn Error>> {
    let keymap = KeyMap::from_config(&app.config.controls);
    let mut intents = IntentTracker::default();
    let frame_sleep = Duration::from_millis(app.config.timing.frame_ms);
    let max_dt = app.config.timing.max_frame_dt;
    let mut last = Instant::now();

    loop {
        kb.drain_events();
        gp.update();
        if kb.ctrl_c_pressed() {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(max_dt);
        last = now;

        let quit_key = kb.was_pressed(KeyCode::Char('q')) && !keymap.is_bound(KeyCode::Char('q'));
        let back = kb.any_pressed(KEYS_BACK) || gp.cancel_pressed();

        let flow = match &mut app.screen {
            Screen::LevelSelect => {
                if quit_key {
                    Flow::Quit
                } else {
                    level_select_input(app, kb, gp, &mut intents);
                    Flow::Continue
                }
            }
            Screen::Leaderboard => {
                if quit_key {
                    Flow::Quit
                } else {
                    leaderboard_input(app, kb, back);
                    Flow::Continue
                }
            }
            Screen::Playing(sim) => {
                if quit_key {
                    Flow::Quit
                } else if sim.is_complete() {
                    if kb.anything_pressed() || gp.any_pressed() {
                        app.leave_level()
                    } else {
                        Flow::Continue
                    }
                } else if back {
                    app.leave_level()
                } else if sim.has_error() {
                    Flow::Continue
                } else {
                    let mut held = keymap.held_actions(kb);
                    held.extend(gp.held_actions().into_iter().map(|a| (gp.player(), a)));
                    for ev in intents.update(held) {
                        sim.handle_input(ev);
                    }
                    let events = step(sim, dt, &mut app.history);
                    if let Some(sfx) = sound {
                        play_events(sfx, &events);
                    }
                    Flow::Continue
                }
            }
        };
        if flow == Flow::Quit {
            break;
        }

        match &app.screen {
            Screen::LevelSelect => {
                let completed = app.history.completed_levels(&app.session.team_name);
                renderer.render_level_select(&LevelSelectView {
                    team: &app.session.team_name,
                    entries: &app.levels,
                    completed: &completed,
                    cursor: app.cursor,
                    message: &app.message,
                })?;
            }
            Screen::Leaderboard => {
                renderer.render_leaderboard(&LeaderboardView {
                    rows: &app.board.rows,
                    key: app.board.key,
                    ascending: app.board.ascending,
                    scroll: app.board.scroll,
                })?;
            }
            Screen::Playing(sim) => {
                renderer.render_level(&sim.snapshot(), &app.session.team_name)?;
            }
        }

        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

fn level_select_input(app: &mut App, kb: &InputState, gp: &GamepadState, intents: &mut IntentTracker) {
    let count = app.levels.len();
    if kb.any_pressed(&[KeyCode::Up, KeyCode::Char('w')]) && app.cursor > 0 {
        app.cursor -= 1;
    }
    if kb.any_pressed(&[KeyCode::Down, KeyCode::Char('s')]) && app.cursor + 1 < count {
        app.cursor += 1;
    }
    if kb.was_pressed(KeyCode::Char('l')) {
        app.open_leaderboard();
        return;
    }
    if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
        match app.levels.get(app.cursor).cloned() {
            Some(entry) => {
                app.message.clear();
                intents.reset();
                app.start_level(&entry.path, &entry.name);
            }
            None => {
                app.message = format!("Put level files in {}", app.config.levels_dir.display());
            }
        }
    }
}

fn leaderboard_input(app: &mut App, kb: &InputState, back: bool) {
    if back {
        app.screen = Screen::LevelSelect;
        return;
    }
    let board = &mut app.board;
    let mut resort = false;
    if kb.was_pressed(KeyCode::Tab) {
        let idx = SortKey::ALL.iter().position(|k| *k == board.key).unwrap_or(0);
        board.key = SortKey::ALL[(idx + 1) % SortKey::ALL.len()];
        resort = true;
    }
    if kb.was_pressed(KeyCode::Char('r')) {
        board.ascending = !board.ascending;
        resort = true;
    }
    if resort {
        sort_leaderboard(&mut board.rows, board.key, board.ascending);
        board.scroll = 0;
    }
    if kb.was_pressed(KeyCode::Up) {
        board.scroll = board.scroll.saturating_sub(1);
    }
    if kb.was_pressed(KeyCode::Down) && board.scroll + 1 < board.rows.len() {
        board.scroll += 1;
    }
}
