/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound; they never feed back
/// into the simulation.

use crate::domain::entity::PlayerId;

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    PlayerJumped { player: PlayerId },
    PlayerLanded { player: PlayerId },
    PlayerRespawned { player: PlayerId },
    SnackCollected { player: PlayerId, col: usize, row: usize },
    HazardsToggled { active: bool },
    LevelCompleted { elapsed_secs: f64, points: u32 },
}
