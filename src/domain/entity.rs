/// Small entities and shared vocabulary: facing, player colour, input
/// intents, pressure plates, pickups and hazards.
/// Players and blocks carry physics and live in their own modules.

use super::geometry::Rect;
use super::grid::TileGrid;
use super::tile::TileKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Index into the simulation's player list. Never owns the player.
pub type PlayerId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PlayerColor {
    Red,
    Blue,
}

impl PlayerColor {
    pub fn bed_tile(self) -> TileKind {
        match self {
            PlayerColor::Red => TileKind::RedBed,
            PlayerColor::Blue => TileKind::BlueBed,
        }
    }

    pub fn from_spawn(tile: TileKind) -> Option<PlayerColor> {
        match tile {
            TileKind::RedPlayerSpawn => Some(PlayerColor::Red),
            TileKind::BluePlayerSpawn => Some(PlayerColor::Blue),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
        }
    }

    pub fn from_name(s: &str) -> Option<PlayerColor> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Some(PlayerColor::Red),
            "blue" => Some(PlayerColor::Blue),
            _ => None,
        }
    }
}

/// What a control binding asks a player to do.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum InputAction {
    Left,
    Right,
    Jump,
}

/// Discrete key-down / key-up intent addressed to one player.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InputEvent {
    pub player: PlayerColor,
    pub action: InputAction,
    pub pressed: bool,
}

impl InputEvent {
    pub fn down(player: PlayerColor, action: InputAction) -> Self {
        InputEvent { player, action, pressed: true }
    }

    pub fn up(player: PlayerColor, action: InputAction) -> Self {
        InputEvent { player, action, pressed: false }
    }
}

// ══════════════════════════════════════════════════════════════
// Pressure plate (Button)
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct PressurePlate {
    pub col: usize,
    pub row: usize,
    /// Inset quarter-tile from the sides, half-tile from the top.
    pub trigger: Rect,
    pub pressed: bool,
}

impl PressurePlate {
    pub fn new(col: usize, row: usize, tile_size: f32) -> Self {
        let q = tile_size / 4.0;
        let h = tile_size / 2.0;
        let trigger = Rect::new(col as f32 * tile_size + q, row as f32 * tile_size + h, h, h);
        PressurePlate { col, row, trigger, pressed: false }
    }

    pub fn update(&mut self, bodies: &[Rect]) -> bool {
        self.pressed = bodies.iter().any(|b| b.intersects(&self.trigger));
        self.pressed
    }
}

// ══════════════════════════════════════════════════════════════
// Pickup (Snack)
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Pickup {
    pub col: usize,
    pub row: usize,
    pub region: Rect,
}

impl Pickup {
    pub fn new(col: usize, row: usize, tile_size: f32) -> Self {
        let q = tile_size / 4.0;
        let h = tile_size / 2.0;
        let region = Rect::new(col as f32 * tile_size + q, row as f32 * tile_size, h, h);
        Pickup { col, row, region }
    }
}

// ══════════════════════════════════════════════════════════════
// Hazard (Spray)
// ══════════════════════════════════════════════════════════════

/// Visual piece of a hazard column, bottom cell first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HazardSegment {
    Off,
    Single,
    Bottom,
    Middle,
    Top,
}

#[derive(Clone, Debug)]
pub struct Hazard {
    pub col: usize,
    pub row: usize,
    pub height: usize,
    pub active: bool,
    pub region: Rect,
}

impl Hazard {
    /// Column rooted at a Spray cell, extended upward through
    /// empty or snack cells until anything else (or the top edge).
    pub fn from_grid(grid: &TileGrid, col: usize, row: usize) -> Self {
        let mut height = 1;
        while grid.tile_at(col as i32, row as i32 - height as i32).lets_spray_through() {
            height += 1;
        }
        let ts = grid.tile_size;
        let top_row = row + 1 - height;
        let region = Rect::new(col as f32 * ts, top_row as f32 * ts, ts, height as f32 * ts);
        Hazard { col, row, height, active: true, region }
    }

    pub fn touches(&self, body: &Rect) -> bool {
        self.active && self.region.intersects(body)
    }

    /// Segment to draw at `offset` cells above the base.
    pub fn segment(&self, offset: usize) -> HazardSegment {
        if !self.active {
            return HazardSegment::Off;
        }
        match (self.height, offset) {
            (1, _) => HazardSegment::Single,
            (_, 0) => HazardSegment::Bottom,
            (h, o) if o + 1 >= h => HazardSegment::Top,
            _ => HazardSegment::Middle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::grid_from;

    #[test]
    fn colours_map_to_their_tiles() {
        assert_eq!(PlayerColor::from_spawn(TileKind::RedPlayerSpawn), Some(PlayerColor::Red));
        assert_eq!(PlayerColor::Blue.bed_tile(), TileKind::BlueBed);
        assert_eq!(PlayerColor::from_name("BLUE"), Some(PlayerColor::Blue));
        assert_eq!(PlayerColor::from_spawn(TileKind::Floor), None);
    }

    #[test]
    fn plate_needs_body_on_lower_half() {
        let mut plate = PressurePlate::new(1, 1, 64.0);
        assert_eq!(plate.trigger, Rect::new(80.0, 96.0, 32.0, 32.0));
        // brushing the top half of the cell does not press it
        assert!(!plate.update(&[Rect::new(64.0, 32.0, 64.0, 64.0)]));
        assert!(plate.update(&[Rect::new(64.0, 64.0, 64.0, 64.0)]));
        assert!(plate.pressed);
    }

    #[test]
    fn pickup_region_is_inset() {
        let p = Pickup::new(2, 3, 64.0);
        assert_eq!(p.region, Rect::new(144.0, 192.0, 32.0, 32.0));
    }

    #[test]
    fn hazard_grows_through_empty_and_snack() {
        let g = grid_from(&["#.", "..", "*.", "^."], 64.0);
        let h = Hazard::from_grid(&g, 0, 3);
        assert_eq!(h.height, 3);
        assert_eq!(h.region, Rect::new(0.0, 64.0, 64.0, 192.0));
    }

    #[test]
    fn hazard_reaches_top_edge() {
        let g = grid_from(&["..", "^."], 64.0);
        let h = Hazard::from_grid(&g, 0, 1);
        assert_eq!(h.height, 2);
        assert_eq!(h.region.top(), 0.0);
    }

    #[test]
    fn hazard_segments_follow_height() {
        let g = grid_from(&["#", ".", ".", "^"], 64.0);
        let mut h = Hazard::from_grid(&g, 0, 3);
        assert_eq!(h.segment(0), HazardSegment::Bottom);
        assert_eq!(h.segment(1), HazardSegment::Middle);
        assert_eq!(h.segment(2), HazardSegment::Top);
        h.active = false;
        assert_eq!(h.segment(0), HazardSegment::Off);
        assert!(!h.touches(&Rect::new(0.0, 192.0, 64.0, 64.0)));

        let single = Hazard::from_grid(&grid_from(&["#", "^"], 64.0), 0, 1);
        assert_eq!(single.segment(0), HazardSegment::Single);
    }
}
