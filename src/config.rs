/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

use crate::domain::entity::PlayerColor;
use crate::domain::physics::{PhysicsParams, Viewport};
use crate::sim::world::SimConfig;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub timing: TimingConfig,
    pub controls: ControlsConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub history_file: PathBuf,
    pub team_name: String,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub frame_ms: u64,
    /// Upper bound on the dt handed to one simulation step.
    pub max_frame_dt: f32,
}

/// Key names per action, as understood by `ui::input::parse_key`.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ControlsConfig {
    pub blue: KeyBindings,
    pub red: KeyBindings,
}

impl ControlsConfig {
    pub fn for_player(&self, color: PlayerColor) -> &KeyBindings {
        match color {
            PlayerColor::Blue => &self.blue,
            PlayerColor::Red => &self.red,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    /// Player the pad drives.
    pub player: PlayerColor,
    pub jump: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    viewport: TomlViewport,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    controls: TomlControls,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_strip_height")]
    floor_strip_height: f32,
    #[serde(default = "default_push_threshold")]
    push_threshold: f32,
}

#[derive(Deserialize, Debug)]
struct TomlViewport {
    #[serde(default = "default_viewport_size")]
    width: u32,
    #[serde(default = "default_viewport_size")]
    height: u32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_max_frame_dt")]
    max_frame_dt: f32,
}

#[derive(Deserialize, Debug)]
struct TomlKeys {
    left: Vec<String>,
    right: Vec<String>,
    jump: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlControls {
    #[serde(default = "default_blue_keys")]
    blue: TomlKeys,
    #[serde(default = "default_red_keys")]
    red: TomlKeys,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_player")]
    player: String,
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_history_file")]
    history_file: String,
    #[serde(default = "default_team_name")]
    team_name: String,
}

// ── Defaults ──

fn default_tile_size() -> u32 { 64 }
fn default_gravity() -> f32 { 900.0 }
fn default_jump_velocity() -> f32 { -670.0 }
fn default_player_speed() -> f32 { 200.0 }
fn default_strip_height() -> f32 { 15.0 }
fn default_push_threshold() -> f32 { 16.0 }
fn default_viewport_size() -> u32 { 960 }   // 15 tiles of 64px
fn default_frame_ms() -> u64 { 16 }
fn default_max_frame_dt() -> f32 { 0.05 }

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
fn default_blue_keys() -> TomlKeys {
    TomlKeys { left: keys(&["a"]), right: keys(&["d"]), jump: keys(&["w"]) }
}
fn default_red_keys() -> TomlKeys {
    TomlKeys { left: keys(&["Left"]), right: keys(&["Right"]), jump: keys(&["Up"]) }
}
fn default_pad_player() -> String { "blue".into() }
fn default_pad_jump() -> Vec<String> { keys(&["A", "B"]) }
fn default_levels_dir() -> String { "levels".into() }
fn default_history_file() -> String { "history.json".into() }
fn default_team_name() -> String { "Team".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            tile_size: default_tile_size(),
            gravity: default_gravity(),
            jump_velocity: default_jump_velocity(),
            player_speed: default_player_speed(),
            floor_strip_height: default_strip_height(),
            push_threshold: default_push_threshold(),
        }
    }
}

impl Default for TomlViewport {
    fn default() -> Self {
        TomlViewport { width: default_viewport_size(), height: default_viewport_size() }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { frame_ms: default_frame_ms(), max_frame_dt: default_max_frame_dt() }
    }
}

impl Default for TomlControls {
    fn default() -> Self {
        TomlControls { blue: default_blue_keys(), red: default_red_keys() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { player: default_pad_player(), jump: default_pad_jump() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            history_file: default_history_file(),
            team_name: default_team_name(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let ph = &toml_cfg.physics;
        let tile_size = ph.tile_size.max(1) as f32;
        let sim = SimConfig {
            tile_size,
            physics: PhysicsParams {
                gravity: ph.gravity,
                jump_velocity: ph.jump_velocity,
                player_speed: ph.player_speed,
                floor_strip_height: ph.floor_strip_height.clamp(1.0, tile_size),
                push_threshold: ph.push_threshold,
            },
            viewport: Viewport {
                width: toml_cfg.viewport.width as f32,
                height: toml_cfg.viewport.height as f32,
            },
        };

        let pad_player = PlayerColor::from_name(&toml_cfg.gamepad.player).unwrap_or_else(|| {
            warn!(player = %toml_cfg.gamepad.player, "unknown gamepad player, using blue");
            PlayerColor::Blue
        });

        let bindings = |k: TomlKeys| KeyBindings { left: k.left, right: k.right, jump: k.jump };

        GameConfig {
            sim,
            timing: TimingConfig {
                frame_ms: toml_cfg.timing.frame_ms.max(1),
                max_frame_dt: toml_cfg.timing.max_frame_dt,
            },
            controls: ControlsConfig {
                blue: bindings(toml_cfg.controls.blue),
                red: bindings(toml_cfg.controls.red),
            },
            gamepad: GamepadConfig { player: pad_player, jump: toml_cfg.gamepad.jump },
            levels_dir,
            history_file: PathBuf::from(toml_cfg.general.history_file),
            team_name: toml_cfg.general.team_name,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/naphunters)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/naphunters");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "config.toml parse error, using defaults");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read config.toml");
                }
            }
        }
    }
    TomlConfig::default()
}
