/// Static tile grid of one level.
///
/// Lookups never fail: anything outside `[0,width)×[0,height)` reads as
/// `TileKind::OutOfBounds`, and overlap queries are clipped to the grid.
/// The grid is fixed once a level is loaded.

use super::geometry::Rect;
use super::tile::TileKind;

#[derive(Clone, Debug)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    cells: Vec<Vec<TileKind>>,
}

impl TileGrid {
    /// Build from row-major cells. Rows are expected to be rectangular;
    /// the level loader validates that before calling this.
    pub fn new(cells: Vec<Vec<TileKind>>, tile_size: f32) -> Self {
        let height = cells.len();
        let width = cells.first().map_or(0, |r| r.len());
        TileGrid { width, height, tile_size, cells }
    }

    #[inline]
    pub fn tile_at(&self, col: i32, row: i32) -> TileKind {
        if col < 0 || row < 0 {
            return TileKind::OutOfBounds;
        }
        self.cells
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(TileKind::OutOfBounds)
    }

    pub fn rows(&self) -> &[Vec<TileKind>] {
        &self.cells
    }

    /// Every in-bounds cell whose tile square intersects `rect`,
    /// rows outer, columns inner.
    pub fn tiles_overlapping(&self, rect: &Rect) -> Vec<(usize, usize)> {
        let ts = self.tile_size;
        let c0 = (rect.left() / ts).floor() as i64;
        let c1 = (rect.right() / ts).ceil() as i64 - 1;
        let r0 = (rect.top() / ts).floor() as i64;
        let r1 = (rect.bottom() / ts).ceil() as i64 - 1;

        let c0 = c0.max(0);
        let r0 = r0.max(0);
        let c1 = c1.min(self.width as i64 - 1);
        let r1 = r1.min(self.height as i64 - 1);

        let mut out = Vec::new();
        for row in r0..=r1 {
            for col in c0..=c1 {
                out.push((col as usize, row as usize));
            }
        }
        out
    }

    /// Thin band at the top of a cell used for floor contact.
    pub fn floor_strip(&self, col: usize, row: usize, strip_height: f32) -> Rect {
        let ts = self.tile_size;
        Rect::new(col as f32 * ts, row as f32 * ts, ts, strip_height)
    }

    /// Does `rect` overlap any cell of the given kind?
    pub fn overlaps_kind(&self, rect: &Rect, kind: TileKind) -> bool {
        self.tiles_overlapping(rect)
            .into_iter()
            .any(|(c, r)| self.tile_at(c as i32, r as i32) == kind)
    }

    /// Left cell of the first horizontally paired bed of `kind`,
    /// scanning rows top to bottom.
    pub fn bed_anchor(&self, kind: TileKind) -> Option<(usize, usize)> {
        for (row, cells) in self.cells.iter().enumerate() {
            for col in 0..cells.len().saturating_sub(1) {
                if cells[col] == kind && cells[col + 1] == kind {
                    return Some((col, row));
                }
            }
        }
        None
    }

    /// Bed cells of `kind` with no same-kind horizontal neighbour.
    pub fn unpaired_beds(&self, kind: TileKind) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, &t) in cells.iter().enumerate() {
                if t != kind {
                    continue;
                }
                let left = col > 0 && cells[col - 1] == kind;
                let right = cells.get(col + 1) == Some(&kind);
                if !left && !right {
                    out.push((col, row));
                }
            }
        }
        out
    }
}

/// ASCII fixture grid for tests.
///
/// `#` floor, `R`/`B` red/blue spawn, `r`/`b` red/blue bed, `*` snack,
/// `K` books, `_` button, `^` spray, `X` out-of-bounds, anything else empty.
#[cfg(test)]
pub fn grid_from(rows: &[&str], tile_size: f32) -> TileGrid {
    let cells = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|ch| match ch {
                    '#' => TileKind::Floor,
                    'R' => TileKind::RedPlayerSpawn,
                    'B' => TileKind::BluePlayerSpawn,
                    'r' => TileKind::RedBed,
                    'b' => TileKind::BlueBed,
                    '*' => TileKind::Snack,
                    'K' => TileKind::Books,
                    '_' => TileKind::Button,
                    '^' => TileKind::Spray,
                    'X' => TileKind::OutOfBounds,
                    _ => TileKind::Empty,
                })
                .collect()
        })
        .collect();
    TileGrid::new(cells, tile_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(w: usize, h: usize) -> TileGrid {
        TileGrid::new(vec![vec![TileKind::Empty; w]; h], 64.0)
    }

    // ── tile_at ──

    #[test]
    fn outside_reads_as_out_of_bounds() {
        let g = open(3, 2);
        assert_eq!(g.tile_at(-1, 0), TileKind::OutOfBounds);
        assert_eq!(g.tile_at(0, -1), TileKind::OutOfBounds);
        assert_eq!(g.tile_at(3, 0), TileKind::OutOfBounds);
        assert_eq!(g.tile_at(0, 2), TileKind::OutOfBounds);
        assert_eq!(g.tile_at(2, 1), TileKind::Empty);
    }

    // ── tiles_overlapping ──

    #[test]
    fn aligned_box_covers_one_cell() {
        let g = open(15, 15);
        let r = Rect::new(128.0, 128.0, 64.0, 64.0);
        assert_eq!(g.tiles_overlapping(&r), vec![(2, 2)]);
    }

    #[test]
    fn offset_box_covers_four_cells_rows_first() {
        let g = open(15, 15);
        let r = Rect::new(100.0, 30.0, 64.0, 64.0);
        assert_eq!(
            g.tiles_overlapping(&r),
            vec![(1, 0), (2, 0), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn overlap_is_clipped_to_grid() {
        let g = open(4, 4);
        let r = Rect::new(-20.0, 220.0, 64.0, 64.0);
        assert_eq!(g.tiles_overlapping(&r), vec![(0, 3)]);
        let far = Rect::new(1000.0, 1000.0, 64.0, 64.0);
        assert!(g.tiles_overlapping(&far).is_empty());
    }

    #[test]
    fn overlap_matches_brute_force() {
        let g = open(6, 6);
        let ts = g.tile_size;
        let boxes = [
            Rect::new(0.0, 0.0, 64.0, 64.0),
            Rect::new(10.5, 63.9, 64.0, 64.0),
            Rect::new(127.0, 250.0, 64.0, 15.0),
            Rect::new(300.0, 300.0, 64.0, 64.0),
            Rect::new(64.0, 0.0, 0.5, 0.5),
        ];
        for p in boxes {
            let mut expected = Vec::new();
            for row in 0..g.height {
                for col in 0..g.width {
                    let cell = Rect::new(col as f32 * ts, row as f32 * ts, ts, ts);
                    if cell.intersects(&p) {
                        expected.push((col, row));
                    }
                }
            }
            assert_eq!(g.tiles_overlapping(&p), expected, "box {:?}", p);
        }
    }

    // ── beds ──

    #[test]
    fn bed_anchor_finds_left_cell_of_pair() {
        let g = grid_from(&["....", ".bb.", "r..."], 64.0);
        assert_eq!(g.bed_anchor(TileKind::BlueBed), Some((1, 1)));
        assert_eq!(g.bed_anchor(TileKind::RedBed), None);
        assert_eq!(g.unpaired_beds(TileKind::RedBed), vec![(0, 2)]);
        assert!(g.unpaired_beds(TileKind::BlueBed).is_empty());
    }

    #[test]
    fn floor_strip_sits_on_top_of_cell() {
        let g = open(15, 15);
        let s = g.floor_strip(3, 10, 15.0);
        assert_eq!((s.left(), s.top(), s.right(), s.bottom()), (192.0, 640.0, 256.0, 655.0));
    }
}
