/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads simulation state through `FrameSnapshot`.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Facing, HazardSegment, PlayerColor};
use crate::domain::geometry::Rect;
use crate::domain::tile::TileKind;
use crate::sim::history::{LeaderboardRow, SortKey};
use crate::sim::level::LevelEntry;
use crate::sim::world::{FrameSnapshot, Phase};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, also used
    /// for `Clear` so inter-row gaps match the cell colour.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }

    #[cfg(test)]
    fn ch(&self) -> char {
        self.as_str().chars().next().unwrap_or(' ')
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }

    /// One game tile = CELL_W terminal columns.
    fn put_tile(&mut self, col: usize, row: usize, glyph: Glyph) {
        let x = col * CELL_W;
        let y = MAP_ROW + row;
        self.set(x, y, Cell::from_char(glyph.0, glyph.2, glyph.3));
        self.set(x + 1, y, Cell::from_char(glyph.1, glyph.2, glyph.3));
    }
}

// ── Palette ──

/// Two characters plus fg / bg for one tile.
type Glyph = (char, char, Color, Color);

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const AMBER: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const DIM: Color = Color::DarkGrey;
const RED: Color = Color::Rgb { r: 230, g: 70, b: 70 };
const BLUE: Color = Color::Rgb { r: 80, g: 140, b: 255 };

fn player_fg(color: PlayerColor) -> Color {
    match color {
        PlayerColor::Red => RED,
        PlayerColor::Blue => BLUE,
    }
}

fn tile_glyph(kind: TileKind) -> Glyph {
    match kind {
        TileKind::Floor => ('█', '█', Color::Rgb { r: 120, g: 100, b: 80 }, Color::Rgb { r: 70, g: 55, b: 40 }),
        TileKind::RedBed => ('▄', '▄', RED, Color::Rgb { r: 60, g: 20, b: 20 }),
        TileKind::BlueBed => ('▄', '▄', BLUE, Color::Rgb { r: 20, g: 30, b: 70 }),
        TileKind::OutOfBounds => (' ', ' ', Color::Reset, Color::Rgb { r: 8, g: 8, b: 12 }),
        // Entity tiles are drawn from their live entities, spawns are just floor space.
        TileKind::Empty
        | TileKind::RedPlayerSpawn
        | TileKind::BluePlayerSpawn
        | TileKind::Snack
        | TileKind::Books
        | TileKind::Button
        | TileKind::Spray => (' ', ' ', Color::Reset, Color::Reset),
    }
}

fn hazard_glyph(segment: HazardSegment) -> Glyph {
    let spray = Color::Rgb { r: 120, g: 230, b: 200 };
    let mist = Color::Rgb { r: 20, g: 60, b: 55 };
    match segment {
        HazardSegment::Off => ('▁', '▁', DIM, Color::Reset),
        HazardSegment::Single => ('▲', '▲', spray, mist),
        HazardSegment::Bottom => ('╽', '╽', spray, mist),
        HazardSegment::Middle => ('┃', '┃', spray, mist),
        HazardSegment::Top => ('░', '░', spray, mist),
    }
}

/// Tile containing the centre of `rect`, clipped to the grid.
fn cell_of(rect: &Rect, tile_size: f32, width: usize, height: usize) -> (usize, usize) {
    let (cx, cy) = rect.center();
    let col = (cx / tile_size).floor().max(0.0) as usize;
    let row = (cy / tile_size).floor().max(0.0) as usize;
    (col.min(width.saturating_sub(1)), row.min(height.saturating_sub(1)))
}

pub fn format_time(secs: f64) -> String {
    let m = (secs / 60.0).floor() as u64;
    let s = secs - (m * 60) as f64;
    format!("{}:{:05.2}", m, s)
}

// ── Renderer ──

/// Which screen the last frame showed; a change forces a full repaint.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum View {
    LevelSelect,
    Level(Phase),
    Leaderboard,
}

/// Level-select screen input.
pub struct LevelSelectView<'a> {
    pub team: &'a str,
    pub entries: &'a [LevelEntry],
    pub completed: &'a [&'a str],
    pub cursor: usize,
    pub message: &'a str,
}

/// Leaderboard screen input.
pub struct LeaderboardView<'a> {
    pub rows: &'a [LeaderboardRow],
    pub key: SortKey,
    pub ascending: bool,
    pub scroll: usize,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_view: Option<View>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_view: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render_level(&mut self, snap: &FrameSnapshot, team: &str) -> io::Result<()> {
        self.begin(View::Level(snap.phase))?;
        self.compose_level(snap, team);
        self.finish()
    }

    pub fn render_level_select(&mut self, view: &LevelSelectView) -> io::Result<()> {
        self.begin(View::LevelSelect)?;
        self.compose_level_select(view);
        self.finish()
    }

    pub fn render_leaderboard(&mut self, view: &LeaderboardView) -> io::Result<()> {
        self.begin(View::Leaderboard)?;
        self.compose_leaderboard(view);
        self.finish()
    }

    fn begin(&mut self, view: View) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }
        if resized || self.last_view != Some(view) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_view = Some(view);
        }
        self.front.clear();
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.as_str()))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_level(&mut self, snap: &FrameSnapshot, team: &str) {
        if let Some(err) = snap.error {
            self.compose_error(snap.level_name, &err.to_string());
            return;
        }

        let grid = snap.grid;
        let ts = grid.tile_size;

        // ── HUD ──
        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = format!(
            " {}  │  {}  │  Time {}  │  Snacks {}  │  Spray {} ",
            snap.level_name,
            team,
            format_time(snap.elapsed),
            snap.total_points,
            if snap.hazards.iter().any(|h| h.active) { "ON" } else { "off" },
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Tiles ──
        for (row, cells) in grid.rows().iter().enumerate() {
            for (col, &kind) in cells.iter().enumerate() {
                self.front.put_tile(col, row, tile_glyph(kind));
            }
        }

        // ── Entities, back to front ──
        for plate in snap.plates {
            let glyph = if plate.pressed {
                ('▁', '▁', HI, Color::Reset)
            } else {
                ('▃', '▃', AMBER, Color::Reset)
            };
            self.front.put_tile(plate.col, plate.row, glyph);
        }

        for hazard in snap.hazards {
            for offset in 0..hazard.height {
                let segment = hazard.segment(offset);
                if segment == HazardSegment::Off && offset > 0 {
                    continue;
                }
                self.front.put_tile(hazard.col, hazard.row - offset, hazard_glyph(segment));
            }
        }

        for snack in snap.pickups {
            self.front.put_tile(snack.col, snack.row, ('◖', '◗', Color::Rgb { r: 230, g: 170, b: 90 }, Color::Reset));
        }

        for block in snap.blocks {
            let (col, row) = cell_of(&block.rect(), ts, grid.width, grid.height);
            let glyph = ('▤', '▤', Color::Rgb { r: 220, g: 200, b: 150 }, Color::Rgb { r: 110, g: 60, b: 40 });
            self.front.put_tile(col, row, glyph);
        }

        let asleep = snap.phase == Phase::Complete;
        for player in snap.players {
            let fg = player_fg(player.color);
            let anchor = if asleep { grid.bed_anchor(player.bed) } else { None };
            match anchor {
                // Sleeping pose stretches across the paired bed.
                Some((col, row)) => {
                    self.front.put_tile(col, row, ('☻', '~', fg, Color::Reset));
                    self.front.put_tile(col + 1, row, ('z', 'Z', fg, Color::Reset));
                }
                None => {
                    let (col, row) = cell_of(&player.rect(), ts, grid.width, grid.height);
                    let glyph = match player.facing {
                        Facing::Left => ('◂', '☻', fg, Color::Reset),
                        Facing::Right => ('☻', '▸', fg, Color::Reset),
                    };
                    self.front.put_tile(col, row, glyph);
                }
            }
        }

        // ── Help bar ──
        let help_row = MAP_ROW + grid.height + 1;
        let help = " Blue: A/D/W   Red: ←/→/↑   Esc: Levels   Q: Quit";
        self.front.put_str(0, help_row, help, DIM, Color::Reset);

        if snap.phase == Phase::Complete {
            self.compose_complete_popup(snap, grid.width * CELL_W, grid.height);
        }
    }

    fn compose_complete_popup(&mut self, snap: &FrameSnapshot, map_cols: usize, map_rows: usize) {
        let bg = Color::Rgb { r: 40, g: 40, b: 40 };
        let box_w = 34;
        let box_h = 7;
        let box_x = map_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + map_rows.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', Color::White, bg));
            }
        }
        self.front.put_str(box_x + 2, box_y + 1, "Level Complete!", AMBER, bg);
        let stats = format!("Time {}   Snacks {}", format_time(snap.elapsed), snap.total_points);
        self.front.put_str(box_x + 2, box_y + 3, &stats, Color::White, bg);
        self.front.put_str(box_x + 2, box_y + 5, "Press any key to continue...", HI, bg);
    }

    fn compose_error(&mut self, level_name: &str, message: &str) {
        self.front.put_str(2, 1, "Error in level data", RED, Color::Reset);
        self.front.put_str(2, 2, level_name, DIM, Color::Reset);

        // Wrap the message to the terminal width.
        let width = self.front.width.saturating_sub(4).max(20);
        let chars: Vec<char> = message.chars().collect();
        for (i, line) in chars.chunks(width).enumerate() {
            let text: String = line.iter().collect();
            self.front.put_str(2, 4 + i, &text, Color::White, Color::Reset);
        }
        let footer = 4 + chars.len().div_ceil(width) + 1;
        self.front.put_str(2, footer, "Esc: Back to level select", HI, Color::Reset);
    }

    fn compose_level_select(&mut self, view: &LevelSelectView) {
        let normal = Color::White;
        let cursor_bg = Color::Rgb { r: 30, g: 60, b: 30 };

        self.front.put_str(2, 1, "╔═══════════════════════════════════════════╗", AMBER, Color::Reset);
        self.front.put_str(2, 2, "║        NAP HUNTERS  ·  LEVEL SELECT       ║", AMBER, Color::Reset);
        self.front.put_str(2, 3, "╚═══════════════════════════════════════════╝", AMBER, Color::Reset);
        self.front.put_str(2, 4, &format!("  Team: {}", view.team), Color::Rgb { r: 255, g: 180, b: 80 }, Color::Reset);

        let list_top = 6;
        if view.entries.is_empty() {
            self.front.put_str(4, list_top, "No levels found.", DIM, Color::Reset);
        }

        let visible = 16_usize.min(self.front.height.saturating_sub(list_top + 4)).max(1);
        let scroll = view.cursor.saturating_sub(visible - 1);
        if scroll > 0 {
            self.front.put_str(2, list_top - 1, "    ▲ ▲ ▲", DIM, Color::Reset);
        }

        for (i, entry) in view.entries.iter().enumerate().skip(scroll).take(visible) {
            let row = list_top + i - scroll;
            let done = view.completed.contains(&entry.name.as_str());
            let mark = if done { "✓" } else { " " };
            let num = format!("{:>3}.", i + 1);
            let name: String = entry.name.chars().take(36).collect();

            if i == view.cursor {
                for x in 0..48.min(self.front.width) {
                    self.front.set(x, row, Cell::from_char(' ', normal, cursor_bg));
                }
                self.front.put_str(2, row, "▸", HI, cursor_bg);
                self.front.put_str(3, row, &num, HI, cursor_bg);
                self.front.put_str(8, row, &name, HI, cursor_bg);
                self.front.put_str(46, row, mark, HI, cursor_bg);
            } else {
                self.front.put_str(3, row, &num, DIM, Color::Reset);
                self.front.put_str(8, row, &name, normal, Color::Reset);
                self.front.put_str(46, row, mark, HI, Color::Reset);
            }
        }

        if scroll + visible < view.entries.len() {
            self.front.put_str(2, list_top + visible, "    ▼ ▼ ▼", DIM, Color::Reset);
        }

        let footer = list_top + visible + 2;
        self.front.put_str(2, footer, "  ENTER: Play   ↑↓: Select   L: Leaderboard   Q: Quit", DIM, Color::Reset);
        if !view.message.is_empty() {
            self.front.put_str(2, footer + 1, &format!("  {}", view.message), AMBER, Color::Reset);
        }
    }

    fn compose_leaderboard(&mut self, view: &LeaderboardView) {
        self.front.put_str(2, 1, "LEADERBOARD", AMBER, Color::Reset);
        let order = if view.ascending { "▲" } else { "▼" };
        self.front.put_str(2, 2, &format!("sorted by {} {}", view.key.label(), order), DIM, Color::Reset);

        let header = format!("{:<14} {:<18} {:>9} {:>6}  {:<19}", "Team", "Level", "Time", "Snacks", "When");
        self.front.put_str(2, 4, &header, Color::White, HUD_BG);

        let top = 5;
        let visible = self.front.height.saturating_sub(top + 3).max(1);
        if view.rows.is_empty() {
            self.front.put_str(2, top, "No completed levels yet.", DIM, Color::Reset);
        }
        for (i, r) in view.rows.iter().skip(view.scroll).take(visible).enumerate() {
            let line = format!(
                "{:<14} {:<18} {:>9} {:>6}  {:<19}",
                r.team.chars().take(14).collect::<String>(),
                r.level.chars().take(18).collect::<String>(),
                format_time(r.time),
                r.points,
                r.timestamp.chars().take(19).collect::<String>(),
            );
            self.front.put_str(2, top + i, &line, Color::White, Color::Reset);
        }

        let footer = top + visible + 1;
        self.front.put_str(2, footer, "Tab: Sort column   R: Reverse   ↑↓: Scroll   Esc: Back", DIM, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::grid_from;
    use crate::sim::level::LevelData;
    use crate::sim::world::{LevelSimulation, Session, SimConfig};

    fn renderer(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn sim(rows: &[&str]) -> LevelSimulation {
        let grid = grid_from(rows, 64.0).rows().iter().map(|r| r.iter().map(|t| t.code()).collect()).collect();
        let data = LevelData { name: "Nursery".into(), grid };
        LevelSimulation::load(&data, Session::new("T"), SimConfig::for_tiles(rows[0].len(), rows.len()))
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width).map(|x| r.front.get(x, y).ch()).collect()
    }

    #[test]
    fn time_is_minutes_and_seconds() {
        assert_eq!(format_time(5.5), "0:05.50");
        assert_eq!(format_time(75.25), "1:15.25");
    }

    #[test]
    fn entity_cell_uses_centre() {
        let r = Rect::new(100.0, 10.0, 64.0, 64.0);
        assert_eq!(cell_of(&r, 64.0, 15, 15), (2, 0));
        let off = Rect::new(-200.0, 2000.0, 64.0, 64.0);
        assert_eq!(cell_of(&off, 64.0, 15, 15), (0, 14));
    }

    #[test]
    fn players_and_floor_land_on_their_tiles() {
        let s = sim(&["B..R", "####"]);
        let mut r = renderer(40, 10);
        r.compose_level(&s.snapshot(), "T");
        // Blue at col 0 faces left by default.
        assert_eq!(r.front.get(1, MAP_ROW).ch(), '☻');
        assert_eq!(r.front.get(1, MAP_ROW).fg, BLUE);
        assert_eq!(r.front.get(6, MAP_ROW + 1).ch(), '█');
        assert!(row_text(&r, HUD_ROW).contains("Nursery"));
    }

    #[test]
    fn help_bar_is_the_same_before_and_during_play() {
        let mut s = sim(&["B..R", "####"]);
        let mut r = renderer(80, 10);
        let help_row = MAP_ROW + 2 + 1;
        r.compose_level(&s.snapshot(), "T");
        let ready = row_text(&r, help_row);
        assert!(ready.contains("Esc: Levels"));
        assert!(!ready.contains("clock"));
        s.phase = Phase::Playing;
        r.compose_level(&s.snapshot(), "T");
        assert_eq!(row_text(&r, help_row), ready);
    }

    #[test]
    fn completion_shows_popup_and_sleeping_pose() {
        let mut rows = vec!["...."; 10];
        rows.extend(["Bbb.", "####"]);
        let mut s = sim(&rows);
        s.phase = Phase::Complete;
        let mut r = renderer(40, 20);
        r.compose_level(&s.snapshot(), "T");
        assert_eq!(r.front.get(2, MAP_ROW + 10).ch(), '☻');
        assert_eq!(r.front.get(5, MAP_ROW + 10).ch(), 'Z');
        let text: String = (0..r.front.height).map(|y| row_text(&r, y)).collect();
        assert!(text.contains("Level Complete!"));
        assert!(text.contains("Press any key to continue..."));
    }

    #[test]
    fn failed_level_shows_error_screen() {
        let data = LevelData { name: "Broken".into(), grid: vec![vec![1, 99]] };
        let s = LevelSimulation::load(&data, Session::new("T"), SimConfig::for_tiles(2, 1));
        let mut r = renderer(60, 10);
        r.compose_level(&s.snapshot(), "T");
        assert!(row_text(&r, 1).starts_with("  Error in level data"));
        assert!(row_text(&r, 4).contains("99"));
    }

    #[test]
    fn level_select_marks_completed_levels() {
        let entries = vec![
            LevelEntry { path: "a.json".into(), name: "One".into() },
            LevelEntry { path: "b.json".into(), name: "Two".into() },
        ];
        let view = LevelSelectView { team: "T", entries: &entries, completed: &["Two"], cursor: 0, message: "" };
        let mut r = renderer(60, 30);
        r.compose_level_select(&view);
        assert_eq!(r.front.get(46, 6).ch(), ' ');
        assert_eq!(r.front.get(46, 7).ch(), '✓');
        assert_eq!(r.front.get(2, 6).ch(), '▸');
    }
}
