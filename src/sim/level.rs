/// Level loading: JSON files, validation and entity creation.
///
/// ## File format
///   ```json
///   { "name": "Level 1", "grid": [[0, 0, 1], [3, 0, 2], ...] }
///   ```
/// `name` defaults to `"Level"`, a missing `grid` is an empty grid.
/// Grid dimensions must equal the viewport size in tiles.
///
/// ## Tile codes
///   0 Empty   1 Floor   2 Red spawn   3 Blue spawn   4 Red bed
///   5 Blue bed   6 Out-of-bounds   7 Snack   8 Books   9 Button
///   10 Spray
///
/// Entities are created by scanning rows top to bottom, columns left to
/// right, so player order (and therefore pickup priority) follows that scan.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::block::MovableBlock;
use crate::domain::entity::{Hazard, Pickup, PlayerColor, PressurePlate};
use crate::domain::grid::TileGrid;
use crate::domain::player::Player;
use crate::domain::tile::TileKind;
use crate::sim::world::SimConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read level {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level {} is not valid level JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("grid is {cols}x{rows}, expected {expected_cols}x{expected_rows}")]
    DimensionMismatch {
        cols: usize,
        rows: usize,
        expected_cols: usize,
        expected_rows: usize,
    },
    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },
    #[error("unknown tile code {code} at ({col}, {row})")]
    UnknownTile { code: i64, col: usize, row: usize },
    #[error("more than one {} player spawn", color.name())]
    DuplicateSpawn { color: PlayerColor },
}

fn default_name() -> String {
    "Level".to_string()
}

/// Level file contents as written on disk.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelData {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub grid: Vec<Vec<i64>>,
}

/// Everything a simulation needs from a validated level.
#[derive(Debug)]
pub struct LevelLayout {
    pub grid: TileGrid,
    pub players: Vec<Player>,
    pub blocks: Vec<MovableBlock>,
    pub plates: Vec<PressurePlate>,
    pub pickups: Vec<Pickup>,
    pub hazards: Vec<Hazard>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

pub fn parse_level(text: &str, path: &Path) -> Result<LevelData, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })
}

pub fn read_level_file(path: &Path) -> Result<LevelData, LoadError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    parse_level(&text, path)
}

/// Validate `data` against the configured playfield and create entities.
pub fn build_level(data: &LevelData, config: &SimConfig) -> Result<LevelLayout, LoadError> {
    let (expected_cols, expected_rows) = config.tile_counts();
    let rows = data.grid.len();
    let cols = data.grid.first().map_or(0, |r| r.len());
    if rows != expected_rows || cols != expected_cols {
        return Err(LoadError::DimensionMismatch { cols, rows, expected_cols, expected_rows });
    }

    let mut cells = Vec::with_capacity(rows);
    for (row, codes) in data.grid.iter().enumerate() {
        if codes.len() != cols {
            return Err(LoadError::RaggedRow { row, found: codes.len(), expected: cols });
        }
        let mut line = Vec::with_capacity(cols);
        for (col, &code) in codes.iter().enumerate() {
            let tile = TileKind::from_code(code).ok_or(LoadError::UnknownTile { code, col, row })?;
            line.push(tile);
        }
        cells.push(line);
    }

    let grid = TileGrid::new(cells, config.tile_size);
    let layout = populate(grid, config)?;

    for color in [PlayerColor::Red, PlayerColor::Blue] {
        let bed = color.bed_tile();
        for (col, row) in layout.grid.unpaired_beds(bed) {
            warn!(col, row, ?bed, "bed cell has no partner");
        }
    }
    Ok(layout)
}

fn populate(grid: TileGrid, config: &SimConfig) -> Result<LevelLayout, LoadError> {
    let ts = config.tile_size;
    let mut players: Vec<Player> = Vec::new();
    let mut blocks = Vec::new();
    let mut plates = Vec::new();
    let mut pickups = Vec::new();
    let mut hazards = Vec::new();

    for row in 0..grid.height {
        for col in 0..grid.width {
            match grid.tile_at(col as i32, row as i32) {
                tile @ (TileKind::RedPlayerSpawn | TileKind::BluePlayerSpawn) => {
                    let Some(color) = PlayerColor::from_spawn(tile) else { continue };
                    if players.iter().any(|p| p.color == color) {
                        return Err(LoadError::DuplicateSpawn { color });
                    }
                    players.push(Player::new(color, col, row, ts, config.physics.player_speed));
                }
                TileKind::Snack => pickups.push(Pickup::new(col, row, ts)),
                TileKind::Books => blocks.push(MovableBlock::new(col, row, ts)),
                TileKind::Button => plates.push(PressurePlate::new(col, row, ts)),
                TileKind::Spray => hazards.push(Hazard::from_grid(&grid, col, row)),
                TileKind::Empty
                | TileKind::Floor
                | TileKind::RedBed
                | TileKind::BlueBed
                | TileKind::OutOfBounds => {}
            }
        }
    }

    Ok(LevelLayout { grid, players, blocks, plates, pickups, hazards })
}

// ══════════════════════════════════════════════════════════════
// Level directory
// ══════════════════════════════════════════════════════════════

/// One selectable level file.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelEntry {
    pub path: PathBuf,
    pub name: String,
}

/// `*.json` files in `dir`, sorted by file name. Creates `dir` if missing.
/// Unreadable files are listed under their file name.
pub fn scan_levels(dir: &Path) -> Vec<LevelEntry> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "cannot create levels directory");
    }
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "json"))
        .collect();
    paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

    paths
        .into_iter()
        .map(|path| {
            let file_name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let name = match read_level_file(&path) {
                Ok(data) => data.name,
                Err(e) => {
                    warn!(error = %e, "level listed by file name");
                    file_name
                }
            };
            LevelEntry { path, name }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::grid_from;

    fn small_config(cols: usize, rows: usize) -> SimConfig {
        SimConfig::for_tiles(cols, rows)
    }

    fn codes(rows: &[&str]) -> Vec<Vec<i64>> {
        grid_from(rows, 64.0)
            .rows()
            .iter()
            .map(|r| r.iter().map(|t| t.code()).collect())
            .collect()
    }

    fn data(rows: &[&str]) -> LevelData {
        LevelData { name: "Test".into(), grid: codes(rows) }
    }

    // ── parsing ──

    #[test]
    fn missing_fields_take_defaults() {
        let d = parse_level("{}", Path::new("x.json")).unwrap();
        assert_eq!(d.name, "Level");
        assert!(d.grid.is_empty());
    }

    #[test]
    fn bad_json_is_parse_error() {
        let e = parse_level("{\"grid\": [[0,", Path::new("x.json")).unwrap_err();
        assert!(matches!(e, LoadError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let e = read_level_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(e, LoadError::Io { .. }));
    }

    // ── validation ──

    #[test]
    fn empty_grid_is_dimension_mismatch() {
        let d = LevelData { name: "e".into(), grid: vec![] };
        let e = build_level(&d, &SimConfig::default()).unwrap_err();
        assert!(matches!(e, LoadError::DimensionMismatch { expected_cols: 15, expected_rows: 15, .. }));
    }

    #[test]
    fn wrong_size_is_rejected() {
        let e = build_level(&data(&["...", "..."]), &small_config(3, 3)).unwrap_err();
        assert!(matches!(e, LoadError::DimensionMismatch { rows: 2, .. }));
    }

    #[test]
    fn ragged_row_is_rejected() {
        let mut d = data(&["...", "...", "..."]);
        d.grid[1].pop();
        let e = build_level(&d, &small_config(3, 3)).unwrap_err();
        assert!(matches!(e, LoadError::RaggedRow { row: 1, found: 2, expected: 3 }));
    }

    #[test]
    fn unknown_code_is_rejected() {
        let mut d = data(&["..", ".."]);
        d.grid[1][0] = 42;
        let e = build_level(&d, &small_config(2, 2)).unwrap_err();
        assert!(matches!(e, LoadError::UnknownTile { code: 42, col: 0, row: 1 }));
    }

    #[test]
    fn duplicate_spawn_is_rejected() {
        let e = build_level(&data(&["B.B", "###"]), &small_config(3, 2)).unwrap_err();
        assert!(matches!(e, LoadError::DuplicateSpawn { color: PlayerColor::Blue }));
    }

    // ── entities ──

    #[test]
    fn entities_follow_scan_order() {
        let layout = build_level(
            &data(&[
                "..*...",
                "R...^B",
                "K._.bb",
                "######",
            ]),
            &small_config(6, 4),
        )
        .unwrap();
        let colors: Vec<_> = layout.players.iter().map(|p| p.color).collect();
        assert_eq!(colors, vec![PlayerColor::Red, PlayerColor::Blue]);
        assert_eq!(layout.players[1].spawn, (320.0, 64.0));
        assert_eq!(layout.pickups.len(), 1);
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.plates.len(), 1);
        assert_eq!(layout.hazards.len(), 1);
        assert_eq!(layout.hazards[0].height, 2);
        assert_eq!(layout.grid.bed_anchor(TileKind::BlueBed), Some((4, 2)));
    }

    #[test]
    fn unpaired_bed_still_loads() {
        assert!(build_level(&data(&["r.", "##"]), &small_config(2, 2)).is_ok());
    }

    // ── directory ──

    #[test]
    fn scan_creates_dir_and_sorts_by_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("levels");
        assert!(scan_levels(&dir).is_empty());
        assert!(dir.is_dir());

        std::fs::write(dir.join("b.json"), r#"{"name": "Second", "grid": []}"#).unwrap();
        std::fs::write(dir.join("a.json"), r#"{"name": "First", "grid": []}"#).unwrap();
        std::fs::write(dir.join("c.json"), "garbage").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let names: Vec<String> = scan_levels(&dir).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["First", "Second", "c.json"]);
    }
}
