/// The step function: advances a level by one frame of `dt` seconds.
///
/// Processing order (later stages read the results of earlier ones):
///   1. Blocks fall and are pushed by players
///   2. Pressure plates are evaluated (logical OR)
///   3. Hazards follow the plates and respawn touching players
///   4. Players move, jump and collide with floor strips and blocks
///   5. Pickups are collected, first player in scan order wins
///   6. Completion: every player on its own bed
///
/// `dt` is wall-clock time supplied by the caller. Nothing here blocks;
/// the history recorder is called at most once per simulation.

use tracing::{debug, info, warn};

use crate::domain::entity::InputAction;
use crate::domain::geometry::Rect;
use super::event::SimEvent;
use super::history::HistoryRecorder;
use super::world::{LevelSimulation, Phase};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(sim: &mut LevelSimulation, dt: f32, recorder: &mut dyn HistoryRecorder) -> Vec<SimEvent> {
    match sim.phase {
        Phase::Error | Phase::Complete => return vec![],
        Phase::Ready => sim.phase = Phase::Playing,
        Phase::Playing => {}
    }

    let mut events: Vec<SimEvent> = Vec::new();
    sim.elapsed += f64::from(dt);

    resolve_blocks(sim, dt);
    let any_pressed = resolve_plates(sim);
    resolve_hazards(sim, any_pressed, &mut events);
    resolve_players(sim, dt, &mut events);
    resolve_pickups(sim, &mut events);
    resolve_completion(sim, recorder, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// 1. Blocks
// ══════════════════════════════════════════════════════════════

fn resolve_blocks(sim: &mut LevelSimulation, dt: f32) {
    let cfg = sim.config;
    let mut cancels = Vec::new();
    for block in &mut sim.blocks {
        if let Some(c) = block.update(&sim.grid, &sim.players, &cfg.physics, &cfg.viewport, dt) {
            cancels.push(c);
        }
    }

    // A block pinned at the edge stops its pusher walking into it.
    for c in cancels {
        let Some(p) = sim.players.get_mut(c.player) else { continue };
        match c.action {
            InputAction::Left => p.moving_left = false,
            InputAction::Right => p.moving_right = false,
            InputAction::Jump => {}
        }
    }
}

// ══════════════════════════════════════════════════════════════
// 2–3. Plates and hazards
// ══════════════════════════════════════════════════════════════

fn resolve_plates(sim: &mut LevelSimulation) -> bool {
    let bodies: Vec<Rect> = sim.players.iter().map(|p| p.rect()).collect();
    let mut any = false;
    for plate in &mut sim.plates {
        any |= plate.update(&bodies);
    }
    any
}

/// Plates are wired globally: any pressed plate switches every hazard off.
fn resolve_hazards(sim: &mut LevelSimulation, any_pressed: bool, events: &mut Vec<SimEvent>) {
    let active = !any_pressed;
    if active != sim.hazards_active {
        sim.hazards_active = active;
        if !sim.hazards.is_empty() {
            debug!(active, "hazards toggled");
            events.push(SimEvent::HazardsToggled { active });
        }
    }

    for hazard in &mut sim.hazards {
        hazard.active = active;
        for (id, player) in sim.players.iter_mut().enumerate() {
            if hazard.touches(&player.rect()) {
                player.respawn();
                debug!(player = id, col = hazard.col, "player respawned by hazard");
                events.push(SimEvent::PlayerRespawned { player: id });
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// 4. Players
// ══════════════════════════════════════════════════════════════

fn resolve_players(sim: &mut LevelSimulation, dt: f32, events: &mut Vec<SimEvent>) {
    let cfg = sim.config;
    let block_rects: Vec<Rect> = sim.blocks.iter().map(|b| b.rect()).collect();
    for (id, player) in sim.players.iter_mut().enumerate() {
        let out = player.update(&sim.grid, &block_rects, &cfg.physics, &cfg.viewport, dt);
        if out.jumped {
            events.push(SimEvent::PlayerJumped { player: id });
        }
        if out.landed {
            events.push(SimEvent::PlayerLanded { player: id });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// 5. Pickups
// ══════════════════════════════════════════════════════════════

fn resolve_pickups(sim: &mut LevelSimulation, events: &mut Vec<SimEvent>) {
    for (id, player) in sim.players.iter_mut().enumerate() {
        let body = player.rect();
        sim.pickups.retain(|snack| {
            if !snack.region.intersects(&body) {
                return true;
            }
            player.score += 1;
            debug!(player = id, col = snack.col, row = snack.row, "snack collected");
            events.push(SimEvent::SnackCollected { player: id, col: snack.col, row: snack.row });
            false
        });
    }
}

// ══════════════════════════════════════════════════════════════
// 6. Completion
// ══════════════════════════════════════════════════════════════

fn resolve_completion(
    sim: &mut LevelSimulation,
    recorder: &mut dyn HistoryRecorder,
    events: &mut Vec<SimEvent>,
) {
    if sim.players.is_empty() || !sim.players.iter().all(|p| p.is_near_bed(&sim.grid)) {
        return;
    }

    sim.phase = Phase::Complete;
    for p in &mut sim.players {
        p.freeze();
    }

    let points = sim.total_points();
    let elapsed_secs = sim.elapsed;
    info!(level = %sim.level_name, team = %sim.session.team_name, elapsed_secs, points, "level complete");
    if let Err(e) = recorder.record_attempt(&sim.session.team_name, &sim.level_name, elapsed_secs, points) {
        warn!(error = %e, "could not record level completion");
    }
    events.push(SimEvent::LevelCompleted { elapsed_secs, points });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Facing, InputEvent, PlayerColor};
    use crate::domain::grid::grid_from;
    use crate::sim::history::HistoryError;
    use crate::sim::level::LevelData;
    use crate::sim::world::{Session, SimConfig};

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, String, f64, u32)>,
    }

    impl HistoryRecorder for Recorder {
        fn record_attempt(&mut self, team: &str, level: &str, secs: f64, points: u32) -> Result<(), HistoryError> {
            self.calls.push((team.into(), level.into(), secs, points));
            Ok(())
        }
    }

    fn sim_from(rows: &[&str]) -> LevelSimulation {
        let grid = grid_from(rows, 64.0)
            .rows()
            .iter()
            .map(|r| r.iter().map(|t| t.code()).collect())
            .collect();
        let data = LevelData { name: "Scenario".into(), grid };
        let sim = LevelSimulation::load(&data, Session::new("Team"), SimConfig::for_tiles(rows[0].len(), rows.len()));
        assert_eq!(sim.phase, Phase::Ready, "{:?}", sim.load_error);
        sim
    }

    fn place(sim: &mut LevelSimulation, id: usize, x: f32, y: f32) {
        sim.players[id].body.rect.x = x;
        sim.players[id].body.rect.y = y;
    }

    // ── phases ──

    #[test]
    fn first_step_starts_play() {
        let mut sim = sim_from(&["B..", "###"]);
        let mut rec = Recorder::default();
        step(&mut sim, DT, &mut rec);
        assert_eq!(sim.phase, Phase::Playing);
        assert!((sim.elapsed - f64::from(DT)).abs() < 1e-9);
    }

    #[test]
    fn error_phase_never_steps() {
        let data = LevelData { name: "bad".into(), grid: vec![vec![0, 1]] };
        let mut sim = LevelSimulation::load(&data, Session::new("t"), SimConfig::default());
        let mut rec = Recorder::default();
        assert!(step(&mut sim, DT, &mut rec).is_empty());
        assert_eq!(sim.phase, Phase::Error);
        assert_eq!(sim.elapsed, 0.0);
    }

    // ── free fall ──

    #[test]
    fn free_fall_lands_on_floor_row() {
        let mut rows = vec!["..............."; 15];
        rows[2] = "..B............";
        rows[10] = "###############";
        let mut sim = sim_from(&rows);
        let mut rec = Recorder::default();

        let mut landed_at = None;
        for _ in 0..120 {
            step(&mut sim, DT, &mut rec);
            if sim.players[0].body.grounded {
                landed_at = Some(sim.elapsed);
                break;
            }
        }

        let t = landed_at.expect("player never landed");
        let expected = (2.0 * 7.0 * 64.0 / 900.0f64).sqrt();
        assert!((t - expected).abs() < 0.05, "landed at {t}, expected ~{expected}");
        let p = &sim.players[0];
        assert_eq!(p.rect().bottom(), 640.0);
        assert_eq!(p.body.velocity, 0.0);
    }

    // ── plates and hazards ──

    #[test]
    fn any_pressed_plate_disables_hazards() {
        let mut sim = sim_from(&[
            "......",
            "......",
            "B_._^R",
            "######",
        ]);
        let mut rec = Recorder::default();

        place(&mut sim, 0, 64.0, 128.0);
        let ev = step(&mut sim, DT, &mut rec);
        assert!(ev.contains(&SimEvent::HazardsToggled { active: false }));
        assert!(sim.plates[0].pressed && !sim.plates[1].pressed);
        assert!(!sim.hazards[0].active);

        // red walks into the switched-off spray unharmed
        place(&mut sim, 1, 260.0, 128.0);
        step(&mut sim, DT, &mut rec);
        assert_eq!(sim.players[1].rect().x, 260.0);

        // releasing the plate re-arms the spray and red respawns
        place(&mut sim, 0, 0.0, 128.0);
        let ev = step(&mut sim, DT, &mut rec);
        assert!(sim.hazards[0].active);
        assert!(ev.contains(&SimEvent::HazardsToggled { active: true }));
        assert!(ev.contains(&SimEvent::PlayerRespawned { player: 1 }));
        assert_eq!((sim.players[1].rect().x, sim.players[1].rect().y), (320.0, 128.0));
    }

    #[test]
    fn plates_without_sprays_stay_quiet() {
        let mut sim = sim_from(&[
            "....",
            "B_.R",
            "####",
        ]);
        let mut rec = Recorder::default();

        place(&mut sim, 0, 64.0, 64.0);
        let ev = step(&mut sim, DT, &mut rec);
        assert!(sim.plates[0].pressed);
        assert!(!sim.hazards_active);
        assert!(!ev.iter().any(|e| matches!(e, SimEvent::HazardsToggled { .. })));

        place(&mut sim, 0, 0.0, 64.0);
        let ev = step(&mut sim, DT, &mut rec);
        assert!(sim.hazards_active);
        assert!(!ev.iter().any(|e| matches!(e, SimEvent::HazardsToggled { .. })));
    }

    // ── blocks ──

    #[test]
    fn walking_player_pushes_block() {
        let mut sim = sim_from(&[
            "......",
            ".BK...",
            "######",
        ]);
        let mut rec = Recorder::default();
        sim.handle_input(InputEvent::down(PlayerColor::Blue, InputAction::Right));

        step(&mut sim, DT, &mut rec);
        assert_eq!(sim.players[0].facing, Facing::Right);
        assert_eq!(sim.blocks[0].rect().x, 128.0);

        step(&mut sim, DT, &mut rec);
        assert_eq!(sim.blocks[0].pusher, Some(0));
        assert!((sim.blocks[0].rect().x - (128.0 + 200.0 * DT)).abs() < 1e-3);
    }

    #[test]
    fn block_at_right_edge_stops_its_pusher() {
        let mut sim = sim_from(&[
            "....",
            "..BK",
            "####",
        ]);
        let mut rec = Recorder::default();
        sim.handle_input(InputEvent::down(PlayerColor::Blue, InputAction::Right));

        for _ in 0..5 {
            step(&mut sim, DT, &mut rec);
        }
        assert_eq!(sim.blocks[0].rect().x, 192.0);
        assert!(!sim.players[0].moving_right);
        let stopped_at = sim.players[0].rect().x;
        assert!(stopped_at > 128.0 && stopped_at < 192.0);

        for _ in 0..25 {
            step(&mut sim, DT, &mut rec);
        }
        assert_eq!(sim.blocks[0].rect().x, 192.0);
        assert_eq!(sim.players[0].rect().x, stopped_at);
    }

    #[test]
    fn block_at_left_edge_stops_its_pusher() {
        let mut sim = sim_from(&[
            "....",
            "KB..",
            "####",
        ]);
        let mut rec = Recorder::default();
        sim.handle_input(InputEvent::down(PlayerColor::Blue, InputAction::Left));

        for _ in 0..5 {
            step(&mut sim, DT, &mut rec);
        }
        assert_eq!(sim.blocks[0].rect().x, 0.0);
        assert!(!sim.players[0].moving_left);
        let stopped_at = sim.players[0].rect().x;
        assert!(stopped_at > 0.0 && stopped_at < 64.0);

        for _ in 0..25 {
            step(&mut sim, DT, &mut rec);
        }
        assert_eq!(sim.blocks[0].rect().x, 0.0);
        assert_eq!(sim.players[0].rect().x, stopped_at);
    }

    #[test]
    fn player_can_stand_on_block() {
        let mut sim = sim_from(&[
            "......",
            "..B...",
            "..K...",
            "######",
        ]);
        let mut rec = Recorder::default();
        for _ in 0..30 {
            step(&mut sim, DT, &mut rec);
        }
        assert_eq!(sim.blocks[0].rect().bottom(), 192.0);
        assert_eq!(sim.players[0].rect().bottom(), 128.0);
    }

    // ── pickups ──

    #[test]
    fn shared_snack_goes_to_first_player_once() {
        let mut sim = sim_from(&[
            "..*...",
            "B....R",
            "######",
        ]);
        let mut rec = Recorder::default();
        place(&mut sim, 0, 128.0, 20.0);
        place(&mut sim, 1, 128.0, 20.0);
        let ev = step(&mut sim, DT, &mut rec);
        let collected: Vec<_> = ev.iter().filter(|e| matches!(e, SimEvent::SnackCollected { .. })).collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(sim.players[0].score, 1);
        assert_eq!(sim.players[1].score, 0);
        assert!(sim.pickups.is_empty());
    }

    // ── completion ──

    #[test]
    fn completion_fires_once_and_records() {
        let mut sim = sim_from(&[
            ".......",
            "Bbb.Rrr",
            "#######",
        ]);
        let mut rec = Recorder::default();
        sim.players[0].score = 2;
        place(&mut sim, 0, 40.0, 64.0);
        place(&mut sim, 1, 300.0, 64.0);
        sim.players[1].moving_right = true;

        let ev = step(&mut sim, DT, &mut rec);
        assert!(sim.is_complete());
        assert!(matches!(ev.last(), Some(SimEvent::LevelCompleted { points: 2, .. })));
        assert!(!sim.players[1].moving_right);

        for _ in 0..10 {
            assert!(step(&mut sim, DT, &mut rec).is_empty());
        }
        assert_eq!(rec.calls.len(), 1);
        assert_eq!(rec.calls[0].0, "Team");
        assert_eq!(rec.calls[0].1, "Scenario");
        assert_eq!(rec.calls[0].3, 2);
    }

    #[test]
    fn one_player_on_bed_is_not_enough() {
        let mut sim = sim_from(&[
            ".......",
            "Bbb.Rrr",
            "#######",
        ]);
        let mut rec = Recorder::default();
        place(&mut sim, 0, 40.0, 64.0);
        step(&mut sim, DT, &mut rec);
        assert_eq!(sim.phase, Phase::Playing);
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn level_without_players_never_completes() {
        let mut sim = sim_from(&[
            "...",
            "bbr",
            "###",
        ]);
        let mut rec = Recorder::default();
        assert!(sim.players.is_empty());
        for _ in 0..10 {
            step(&mut sim, DT, &mut rec);
        }
        assert_eq!(sim.phase, Phase::Playing);
        assert!(rec.calls.is_empty());
    }
}
