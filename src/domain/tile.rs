/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// The integer codes are the level-file encoding and must stay stable.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TileKind {
    Empty,
    Floor,
    RedPlayerSpawn,
    BluePlayerSpawn,
    RedBed,      // Two horizontally adjacent cells form one bed
    BlueBed,
    OutOfBounds, // Sentinel for lookups outside the grid
    Snack,
    Books,       // Pushable block spawn
    Button,      // Pressure plate
    Spray,       // Hazard base
}

impl TileKind {
    /// Decode a level-file integer. Unknown codes yield `None`.
    pub fn from_code(code: i64) -> Option<TileKind> {
        let kind = match code {
            0 => TileKind::Empty,
            1 => TileKind::Floor,
            2 => TileKind::RedPlayerSpawn,
            3 => TileKind::BluePlayerSpawn,
            4 => TileKind::RedBed,
            5 => TileKind::BlueBed,
            6 => TileKind::OutOfBounds,
            7 => TileKind::Snack,
            8 => TileKind::Books,
            9 => TileKind::Button,
            10 => TileKind::Spray,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> i64 {
        match self {
            TileKind::Empty => 0,
            TileKind::Floor => 1,
            TileKind::RedPlayerSpawn => 2,
            TileKind::BluePlayerSpawn => 3,
            TileKind::RedBed => 4,
            TileKind::BlueBed => 5,
            TileKind::OutOfBounds => 6,
            TileKind::Snack => 7,
            TileKind::Books => 8,
            TileKind::Button => 9,
            TileKind::Spray => 10,
        }
    }

    /// Only floor tiles take part in collision.
    pub fn is_floor(self) -> bool {
        matches!(self, TileKind::Floor)
    }

    /// Can a spray column extend through this cell?
    pub fn lets_spray_through(self) -> bool {
        matches!(self, TileKind::Empty | TileKind::Snack)
    }
}

impl Default for TileKind {
    fn default() -> Self {
        TileKind::Empty
    }
}
