/// LevelSimulation: the complete state of one running level.
///
/// ## Phases
///
///   Ready ──first update──▶ Playing ──all players on their beds──▶ Complete
///
/// A level that fails validation is created directly in `Error` and stays
/// there: updates and input are ignored and the load error is kept for
/// display. `Complete` is terminal; the front end drops the simulation
/// once a player presses anything.
///
/// Entities are owned here exclusively. Peers read each other only within
/// a step (blocks read players, players read block boxes).

use tracing::{info, warn};

use crate::domain::block::MovableBlock;
use crate::domain::entity::{Hazard, InputEvent, Pickup, PressurePlate};
use crate::domain::grid::TileGrid;
use crate::domain::physics::{PhysicsParams, Viewport};
use crate::domain::player::Player;
use crate::sim::level::{build_level, LevelData, LoadError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Ready,
    Playing,
    Complete,
    Error,
}

/// Explicit context for who is playing. Passed in, never global.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub team_name: String,
}

impl Session {
    pub fn new(team_name: impl Into<String>) -> Self {
        Session { team_name: team_name.into() }
    }
}

/// Geometry and physics constants for one simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    pub tile_size: f32,
    pub physics: PhysicsParams,
    pub viewport: Viewport,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tile_size: 64.0,
            physics: PhysicsParams::default(),
            viewport: Viewport::default(),
        }
    }
}

impl SimConfig {
    /// Playfield size in whole tiles.
    pub fn tile_counts(&self) -> (usize, usize) {
        let ts = self.tile_size.max(1.0);
        (
            (self.viewport.width / ts).floor() as usize,
            (self.viewport.height / ts).floor() as usize,
        )
    }

    /// Default physics on a playfield of exactly `cols × rows` tiles.
    pub fn for_tiles(cols: usize, rows: usize) -> Self {
        let base = SimConfig::default();
        SimConfig {
            viewport: Viewport {
                width: cols as f32 * base.tile_size,
                height: rows as f32 * base.tile_size,
            },
            ..base
        }
    }
}

#[derive(Debug)]
pub struct LevelSimulation {
    pub level_name: String,
    pub phase: Phase,
    pub session: Session,
    pub config: SimConfig,

    // ── Level ──
    pub grid: TileGrid,
    pub players: Vec<Player>,
    pub blocks: Vec<MovableBlock>,
    pub plates: Vec<PressurePlate>,
    pub pickups: Vec<Pickup>,
    pub hazards: Vec<Hazard>,

    // ── Tracking ──
    /// Seconds of simulated play, the sum of every stepped `dt`.
    pub elapsed: f64,
    /// Hazard state after the last step, for toggle detection.
    pub hazards_active: bool,
    pub load_error: Option<LoadError>,
}

/// Read-only view handed to the renderer each frame.
pub struct FrameSnapshot<'a> {
    pub level_name: &'a str,
    pub phase: Phase,
    pub grid: &'a TileGrid,
    pub players: &'a [Player],
    pub blocks: &'a [MovableBlock],
    pub plates: &'a [PressurePlate],
    pub pickups: &'a [Pickup],
    pub hazards: &'a [Hazard],
    pub elapsed: f64,
    pub total_points: u32,
    pub error: Option<&'a LoadError>,
}

impl LevelSimulation {
    /// Build a simulation from parsed level data. Validation failures
    /// produce a simulation in the `Error` phase.
    pub fn load(data: &LevelData, session: Session, config: SimConfig) -> Self {
        match build_level(data, &config) {
            Ok(layout) => {
                info!(
                    level = %data.name,
                    players = layout.players.len(),
                    blocks = layout.blocks.len(),
                    hazards = layout.hazards.len(),
                    snacks = layout.pickups.len(),
                    "level loaded"
                );
                LevelSimulation {
                    level_name: data.name.clone(),
                    phase: Phase::Ready,
                    session,
                    config,
                    grid: layout.grid,
                    players: layout.players,
                    blocks: layout.blocks,
                    plates: layout.plates,
                    pickups: layout.pickups,
                    hazards: layout.hazards,
                    elapsed: 0.0,
                    hazards_active: true,
                    load_error: None,
                }
            }
            Err(e) => Self::failed(&data.name, e, session, config),
        }
    }

    /// A simulation that only displays `error`.
    pub fn failed(level_name: &str, error: LoadError, session: Session, config: SimConfig) -> Self {
        warn!(level = %level_name, error = %error, "level failed to load");
        LevelSimulation {
            level_name: level_name.to_string(),
            phase: Phase::Error,
            session,
            config,
            grid: TileGrid::new(vec![], config.tile_size),
            players: vec![],
            blocks: vec![],
            plates: vec![],
            pickups: vec![],
            hazards: vec![],
            elapsed: 0.0,
            hazards_active: true,
            load_error: Some(error),
        }
    }

    /// Route a key intent to the player of that colour.
    /// Ignored once complete or when the level failed to load.
    pub fn handle_input(&mut self, event: InputEvent) {
        if !matches!(self.phase, Phase::Ready | Phase::Playing) {
            return;
        }
        if let Some(p) = self.players.iter_mut().find(|p| p.color == event.player) {
            p.handle_input(event.action, event.pressed);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn has_error(&self) -> bool {
        self.phase == Phase::Error
    }

    pub fn total_points(&self) -> u32 {
        self.players.iter().map(|p| p.score).sum()
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            level_name: &self.level_name,
            phase: self.phase,
            grid: &self.grid,
            players: &self.players,
            blocks: &self.blocks,
            plates: &self.plates,
            pickups: &self.pickups,
            hazards: &self.hazards,
            elapsed: self.elapsed,
            total_points: self.total_points(),
            error: self.load_error.as_ref(),
        }
    }
}
