/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Board layout: every tile is a `tile_width` × `tile_height` block of
/// terminal cells, separated from its neighbours by a 1-cell gap of board
/// background. Empty cells draw nothing but the background.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;
use super::palette::{self, Palette};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// area around the board never shows the terminal's default color.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Fill a rectangle with one background color.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::new(' ', Color::White, bg));
            }
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Layout ──

const HUD_ROW: usize = 0;
const BOARD_ROW: usize = 2;
const BOARD_COL: usize = 2;
const GAP: usize = 1;

const HUD_BG: Color = Color::Rgb { r: 60, g: 58, b: 50 };
const MSG_BG: Color = Color::Rgb { r: 237, g: 194, b: 46 };

/// What the status lines should say besides the board itself.
pub struct Hud<'a> {
    pub message: &'a str,
    pub game_over: bool,
    pub gamepad: bool,
}

/// Text for a tile: the decimal value if it fits in `width` columns,
/// else `2^k` for powers of two, else the trailing digits.
pub fn tile_label(value: u32, width: usize) -> String {
    let s = value.to_string();
    if s.len() <= width {
        return s;
    }
    if value.is_power_of_two() {
        let pow = format!("2^{}", value.trailing_zeros());
        if pow.len() <= width {
            return pow;
        }
    }
    s[s.len() - width..].to_string()
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    tile_w: usize,
    tile_h: usize,
    palette: Palette,
}

impl Renderer {
    pub fn new(display: &DisplayConfig, palette: Palette) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            tile_w: display.tile_width,
            tile_h: display.tile_height,
            palette,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            terminal::SetTitle("2048"),
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, grid: &Grid, hud: &Hud) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.compose(grid, hud);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    /// Board footprint in terminal cells (width, height), gaps included.
    fn board_extent(&self, size: usize) -> (usize, usize) {
        (
            size * (self.tile_w + GAP) + GAP,
            size * (self.tile_h + GAP) + GAP,
        )
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, grid: &Grid, hud: &Hud) {
        self.front.clear();
        let buf_w = self.front.width;
        let size = grid.size();
        let (board_w, board_h) = self.board_extent(size);

        // ── HUD row ──
        let status = format!(
            " 2048   {size}x{size}   Best tile: {:<6}  Tiles: {}/{} ",
            grid.max_value(),
            grid.tile_count(),
            size * size,
        );
        self.front.fill_rect(0, HUD_ROW, buf_w, 1, HUD_BG);
        self.front.put_str(0, HUD_ROW, &status, palette::TEXT_LIGHT, HUD_BG);

        if BOARD_COL + board_w > buf_w || BOARD_ROW + board_h + 4 > self.front.height {
            self.front.put_str(
                1,
                BOARD_ROW,
                "Terminal too small for the board. Enlarge it or lower tile_width/tile_height.",
                Color::Rgb { r: 255, g: 120, b: 120 },
                Color::Reset,
            );
            return;
        }

        // ── Board ──
        self.front.fill_rect(BOARD_COL, BOARD_ROW, board_w, board_h, palette::BOARD_BG);
        for y in 0..size {
            for x in 0..size {
                if let Tile::Value(v) = grid.get(x, y) {
                    self.compose_tile(x, y, v);
                }
            }
        }

        // ── Message bar ──
        let msg_row = BOARD_ROW + board_h + 1;
        let message = if hud.game_over {
            "GAME OVER  -  no move can change the board. Press any key."
        } else {
            hud.message
        };
        if !message.is_empty() {
            let msg = format!(" {message} ");
            self.front.fill_rect(0, msg_row, buf_w, 1, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = msg_row + 2;
        let help = if hud.gamepad {
            " Arrows/WASD/HJKL: Move   Esc/Q: Quit   │  Pad: D-pad Move, Select Quit"
        } else {
            " Arrows/WASD/HJKL: Move   Esc/Q: Quit"
        };
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    /// One tile block with its label centered.
    fn compose_tile(&mut self, x: usize, y: usize, value: u32) {
        let col = BOARD_COL + GAP + x * (self.tile_w + GAP);
        let row = BOARD_ROW + GAP + y * (self.tile_h + GAP);
        let bg = self.palette.tile_color(value);
        self.front.fill_rect(col, row, self.tile_w, self.tile_h, bg);

        let label = tile_label(value, self.tile_w);
        let lx = col + (self.tile_w - label.len()) / 2;
        let ly = row + (self.tile_h - 1) / 2;
        self.front.put_str(lx, ly, &label, Palette::text_color(value), bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn renderer(tile_w: usize, tile_h: usize, w: usize, h: usize) -> Renderer {
        let display = DisplayConfig { tile_width: tile_w, tile_height: tile_h, palette: BTreeMap::new() };
        let mut r = Renderer::new(&display, Palette::default());
        r.front.resize(w, h);
        r
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width).map(|x| r.front.get(x, y).ch).collect()
    }

    const HUD: Hud<'static> = Hud { message: "", game_over: false, gamepad: false };

    #[test]
    fn labels_fit_the_tile() {
        assert_eq!(tile_label(2048, 8), "2048");
        assert_eq!(tile_label(131072, 5), "2^17");
        assert_eq!(tile_label(123456, 3), "456");
    }

    #[test]
    fn tile_is_tinted_and_labelled() {
        let mut r = renderer(6, 3, 60, 30);
        let mut g = Grid::new(2);
        g.set(1, 0, Tile::Value(16));
        r.compose(&g, &HUD);

        // Tile (1, 0): col = 2 + 1 + 1*7 = 10, row = 2 + 1 = 3; label row 4.
        let bg = Palette::default().tile_color(16);
        assert_eq!(r.front.get(10, 3).bg, bg);
        assert_eq!(r.front.get(15, 5).bg, bg);
        assert_eq!(r.front.get(12, 4).ch, '1');
        assert_eq!(r.front.get(13, 4).ch, '6');
        assert_eq!(r.front.get(12, 4).fg, palette::TEXT_LIGHT);
    }

    #[test]
    fn empty_cells_show_board_background() {
        let mut r = renderer(6, 3, 60, 30);
        let g = Grid::new(2);
        r.compose(&g, &HUD);
        // Tile (0, 0) origin
        assert_eq!(r.front.get(3, 3), Cell::new(' ', Color::White, palette::BOARD_BG));
        assert_eq!(r.front.get(5, 4).ch, ' ');
    }

    #[test]
    fn hud_reports_best_tile() {
        let mut r = renderer(4, 1, 80, 20);
        let mut g = Grid::new(3);
        g.set(0, 0, Tile::Value(64));
        r.compose(&g, &HUD);
        assert!(row_text(&r, HUD_ROW).contains("Best tile: 64"));
        assert!(row_text(&r, HUD_ROW).contains("3x3"));
    }

    #[test]
    fn game_over_banner_shown() {
        let mut r = renderer(4, 1, 80, 20);
        let g = Grid::new(2);
        r.compose(&g, &Hud { message: "", game_over: true, gamepad: false });
        let (_, board_h) = r.board_extent(2);
        assert!(row_text(&r, BOARD_ROW + board_h + 1).contains("GAME OVER"));
    }

    #[test]
    fn small_terminal_shows_hint_instead_of_board() {
        let mut r = renderer(8, 3, 20, 10);
        let g = Grid::new(5);
        r.compose(&g, &HUD);
        assert!(row_text(&r, BOARD_ROW).contains("Terminal too small"));
    }
}
