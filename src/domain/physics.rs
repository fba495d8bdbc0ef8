/// Shared rectangle physics for players and pushable blocks.
///
/// ## Step contract
///
/// 1. `begin_step` snapshots the box into `prev_rect`.
/// 2. `fall` adds gravity unless grounded, always integrates `y`, then
///    clears `grounded` so contacts re-establish it every frame.
/// 3. Floor resolution tests the box against the *floor-top strip* of every
///    Floor cell it overlaps (recomputed from the current box, never cached).
/// 4. Viewport clamps run last: the bottom edge is a fallback floor,
///    the top edge only kills upward velocity.
///
/// ## Landing vs. ceiling
///
/// With `FloorPolicy::FromAbove` a contact is a landing only when falling and
/// the previous box was entirely above the strip, and a ceiling hit only when
/// rising and the previous box was entirely below it. A side graze matches
/// neither and is left alone. `FloorPolicy::AnyOverlap` lands on every
/// overlap regardless of history.

use super::geometry::Rect;
use super::grid::TileGrid;

/// Tunable constants, all in pixels and seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub player_speed: f32,
    pub floor_strip_height: f32,
    pub push_threshold: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        PhysicsParams {
            gravity: 900.0,
            jump_velocity: -670.0,
            player_speed: 200.0,
            floor_strip_height: 15.0,
            push_threshold: 16.0,
        }
    }
}

/// Pixel size of the playfield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport { width: 960.0, height: 960.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloorPolicy {
    /// Uses `prev_rect` to tell landings from ceiling hits (players).
    FromAbove,
    /// Any overlap snaps the body on top (blocks).
    AnyOverlap,
}

/// What a resolution pass did to the body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contact {
    pub landed: bool,
    pub ceiling: bool,
}

impl Contact {
    fn merge(&mut self, other: Contact) {
        self.landed |= other.landed;
        self.ceiling |= other.ceiling;
    }
}

/// Which viewport edges clamped the body this step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundsHit {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicBody {
    pub rect: Rect,
    pub prev_rect: Rect,
    pub velocity: f32,
    pub grounded: bool,
}

impl KinematicBody {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        let rect = Rect::new(x, y, size, size);
        KinematicBody { rect, prev_rect: rect, velocity: 0.0, grounded: false }
    }

    pub fn begin_step(&mut self) {
        self.prev_rect = self.rect;
    }

    pub fn fall(&mut self, gravity: f32, dt: f32) {
        if !self.grounded {
            self.velocity += gravity * dt;
        }
        self.rect.y += self.velocity * dt;
        self.grounded = false;
    }

    /// Vertical resolution against one solid rectangle.
    pub fn resolve_vertical(&mut self, solid: &Rect, policy: FloorPolicy) -> Contact {
        if !self.rect.intersects(solid) {
            return Contact::default();
        }
        match policy {
            FloorPolicy::AnyOverlap => {
                self.land_on(solid.top());
                Contact { landed: true, ceiling: false }
            }
            FloorPolicy::FromAbove => {
                if self.velocity > 0.0 && self.prev_rect.bottom() <= solid.top() {
                    self.land_on(solid.top());
                    Contact { landed: true, ceiling: false }
                } else if self.velocity < 0.0 && self.prev_rect.top() >= solid.bottom() {
                    self.rect.set_top(solid.bottom());
                    self.velocity = 0.0;
                    Contact { landed: false, ceiling: true }
                } else {
                    Contact::default()
                }
            }
        }
    }

    /// Vertical resolution against every floor strip under the box.
    pub fn resolve_floor(
        &mut self,
        grid: &TileGrid,
        params: &PhysicsParams,
        policy: FloorPolicy,
    ) -> Contact {
        let mut contact = Contact::default();
        for strip in floor_strips(grid, &self.rect, params.floor_strip_height) {
            contact.merge(self.resolve_vertical(&strip, policy));
        }
        contact
    }

    pub fn clamp_to_viewport(&mut self, viewport: &Viewport) -> BoundsHit {
        let mut hit = BoundsHit::default();
        if self.rect.bottom() > viewport.height {
            self.land_on(viewport.height);
            hit.bottom = true;
        }
        if self.rect.top() < 0.0 {
            self.rect.set_top(0.0);
            self.velocity = 0.0;
            hit.top = true;
        }
        hit
    }

    pub fn clamp_horizontal(&mut self, viewport: &Viewport) -> BoundsHit {
        let mut hit = BoundsHit::default();
        if self.rect.left() < 0.0 {
            self.rect.set_left(0.0);
            hit.left = true;
        }
        if self.rect.right() > viewport.width {
            self.rect.set_right(viewport.width);
            hit.right = true;
        }
        hit
    }

    fn land_on(&mut self, surface: f32) {
        self.rect.set_bottom(surface);
        self.velocity = 0.0;
        self.grounded = true;
    }
}

/// Floor-top strips of every Floor cell the box overlaps.
pub fn floor_strips(grid: &TileGrid, rect: &Rect, strip_height: f32) -> Vec<Rect> {
    grid.tiles_overlapping(rect)
        .into_iter()
        .filter(|&(c, r)| grid.tile_at(c as i32, r as i32).is_floor())
        .map(|(c, r)| grid.floor_strip(c, r, strip_height))
        .collect()
}
