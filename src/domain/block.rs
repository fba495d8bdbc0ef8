/// Pushable block (Books): falls onto floor strips and slides when a
/// facing player presses against one of its sides.

use tracing::debug;

use super::entity::{Facing, InputAction, PlayerId};
use super::geometry::Rect;
use super::grid::TileGrid;
use super::physics::{FloorPolicy, KinematicBody, PhysicsParams, Viewport};
use super::player::Player;

#[derive(Clone, Debug)]
pub struct MovableBlock {
    pub body: KinematicBody,
    /// Player displacing the block this step. Reset every step.
    pub pusher: Option<PlayerId>,
}

/// Movement intent the block asks the simulation to cancel on its pusher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancelIntent {
    pub player: PlayerId,
    pub action: InputAction,
}

impl MovableBlock {
    pub fn new(col: usize, row: usize, tile_size: f32) -> Self {
        MovableBlock {
            body: KinematicBody::new(col as f32 * tile_size, row as f32 * tile_size, tile_size),
            pusher: None,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    pub fn update(
        &mut self,
        grid: &TileGrid,
        players: &[Player],
        params: &PhysicsParams,
        viewport: &Viewport,
        dt: f32,
    ) -> Option<CancelIntent> {
        self.pusher = None;
        self.body.begin_step();
        self.body.fall(params.gravity, dt);
        self.body.resolve_floor(grid, params, FloorPolicy::AnyOverlap);

        self.apply_pushes(players, params.push_threshold, dt);

        self.body.clamp_to_viewport(viewport);
        let hit = self.body.clamp_horizontal(viewport);
        if !(hit.left || hit.right) {
            return None;
        }

        let Some(id) = self.pusher else {
            debug!(x = self.body.rect.x, "block clamped at edge with no pusher");
            return None;
        };
        let facing = players.get(id).map(|p| p.facing);
        match facing {
            Some(Facing::Left) if hit.left => Some(CancelIntent { player: id, action: InputAction::Left }),
            Some(Facing::Right) if hit.right => Some(CancelIntent { player: id, action: InputAction::Right }),
            _ => None,
        }
    }

    /// Last matching player in iteration order wins.
    fn apply_pushes(&mut self, players: &[Player], threshold: f32, dt: f32) {
        for (id, player) in players.iter().enumerate() {
            let pr = player.rect();
            let br = self.body.rect;
            if !pr.intersects(&br) {
                continue;
            }
            match player.facing {
                Facing::Right if pr.right() <= br.left() + threshold => {
                    self.body.rect.x += player.speed * dt;
                    self.pusher = Some(id);
                }
                Facing::Left if pr.left() >= br.right() - threshold => {
                    self.body.rect.x -= player.speed * dt;
                    self.pusher = Some(id);
                }
                _ => {}
            }
        }
    }
}
