/// Player kinematics: horizontal intent, latched jump, gravity and
/// collision against floor strips and block tops.
///
/// Order inside one step is fixed: snapshot, horizontal move, jump +
/// vertical integration, floor strips, block boxes, viewport clamps.

use super::entity::{Facing, InputAction, PlayerColor};
use super::geometry::Rect;
use super::grid::TileGrid;
use super::physics::{floor_strips, FloorPolicy, KinematicBody, PhysicsParams, Viewport};
use super::tile::TileKind;

#[derive(Clone, Debug)]
pub struct Player {
    pub color: PlayerColor,
    pub body: KinematicBody,
    pub facing: Facing,
    pub moving_left: bool,
    pub moving_right: bool,
    pub jump_requested: bool,
    pub airborne: bool,
    pub score: u32,
    pub bed: TileKind,
    pub spawn: (f32, f32),
    pub speed: f32,
}

/// Edges observed during one player step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerStep {
    pub jumped: bool,
    pub landed: bool,
}

impl Player {
    pub fn new(color: PlayerColor, col: usize, row: usize, tile_size: f32, speed: f32) -> Self {
        let spawn = (col as f32 * tile_size, row as f32 * tile_size);
        Player {
            color,
            body: KinematicBody::new(spawn.0, spawn.1, tile_size),
            facing: Facing::Left,
            moving_left: false,
            moving_right: false,
            jump_requested: false,
            airborne: false,
            score: 0,
            bed: color.bed_tile(),
            spawn,
            speed,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    pub fn handle_input(&mut self, action: InputAction, pressed: bool) {
        match (action, pressed) {
            (InputAction::Left, p) => self.moving_left = p,
            (InputAction::Right, p) => self.moving_right = p,
            (InputAction::Jump, true) => {
                if !self.airborne {
                    self.jump_requested = true;
                }
            }
            (InputAction::Jump, false) => {}
        }
    }

    pub fn update(
        &mut self,
        grid: &TileGrid,
        blocks: &[Rect],
        params: &PhysicsParams,
        viewport: &Viewport,
        dt: f32,
    ) -> PlayerStep {
        let was_airborne = self.airborne;
        self.body.begin_step();
        self.move_horizontal(grid, params, viewport, dt);
        let jumped = self.move_vertical(grid, blocks, params, dt);

        if self.body.clamp_to_viewport(viewport).bottom {
            self.airborne = false;
        }

        PlayerStep {
            jumped,
            landed: was_airborne && !self.airborne && !jumped,
        }
    }

    fn move_horizontal(&mut self, grid: &TileGrid, params: &PhysicsParams, viewport: &Viewport, dt: f32) {
        let rect = &mut self.body.rect;
        if self.moving_left {
            rect.x -= self.speed * dt;
            rect.set_left(rect.left().max(0.0));
            self.facing = Facing::Left;
        } else if self.moving_right {
            rect.x += self.speed * dt;
            rect.set_right(rect.right().min(viewport.width));
            self.facing = Facing::Right;
        }

        // Walls are the same thin strips used for landing.
        for strip in floor_strips(grid, rect, params.floor_strip_height) {
            if !rect.intersects(&strip) {
                continue;
            }
            match self.facing {
                Facing::Right => rect.set_right(strip.left()),
                Facing::Left => rect.set_left(strip.right()),
            }
        }
    }

    fn move_vertical(&mut self, grid: &TileGrid, blocks: &[Rect], params: &PhysicsParams, dt: f32) -> bool {
        let mut jumped = false;
        if self.jump_requested && !self.airborne {
            self.body.velocity = params.jump_velocity;
            self.airborne = true;
            jumped = true;
        }
        self.jump_requested = false;

        self.body.fall(params.gravity, dt);

        let mut landed = self.body.resolve_floor(grid, params, FloorPolicy::FromAbove).landed;
        for block in blocks {
            landed |= self.body.resolve_vertical(block, FloorPolicy::FromAbove).landed;
        }
        if landed {
            self.airborne = false;
        }
        jumped
    }

    pub fn respawn(&mut self) {
        self.body.rect.x = self.spawn.0;
        self.body.rect.y = self.spawn.1;
        self.body.velocity = 0.0;
        self.body.grounded = false;
        self.airborne = false;
        self.moving_left = false;
        self.moving_right = false;
    }

    /// Drop all intents once the level is won.
    pub fn freeze(&mut self) {
        self.moving_left = false;
        self.moving_right = false;
        self.jump_requested = false;
    }

    pub fn is_near_bed(&self, grid: &TileGrid) -> bool {
        grid.overlaps_kind(&self.body.rect, self.bed)
    }
}
