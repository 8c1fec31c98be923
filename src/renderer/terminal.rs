//! Terminal drawing surface
//!
//! Scales the 800x600 world onto the character grid and draws each asset
//! as a coloured glyph. Frames are composed in a cell buffer and written
//! out on `present`.

use std::io::{self, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};

use super::{DrawSurface, Flip, FontHandle, Rect, SpriteHandle, TextureHandle};
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::error::{GameError, Result};
use crate::platform::AssetLoader;

/// How an asset looks on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Glyph {
    ch: char,
    /// Alternate glyph for vertically flipped sprites
    flipped: char,
    fg: Color,
    bg: Color,
}

const SKY: Color = Color::Rgb { r: 112, g: 197, b: 206 };

/// Everything the terminal host can draw; a handle is an index here
const CATALOG: &[(&str, Glyph)] = &[
    ("background", Glyph { ch: ' ', flipped: ' ', fg: Color::White, bg: SKY }),
    ("actor-frame-1", Glyph { ch: 'v', flipped: '^', fg: Color::Yellow, bg: SKY }),
    ("actor-frame-2", Glyph { ch: '-', flipped: '-', fg: Color::Yellow, bg: SKY }),
    ("actor-frame-3", Glyph { ch: '^', flipped: 'v', fg: Color::Yellow, bg: SKY }),
    ("actor-frame-4", Glyph { ch: '-', flipped: '-', fg: Color::Yellow, bg: SKY }),
    ("obstacle", Glyph { ch: '▓', flipped: '▓', fg: Color::DarkGreen, bg: Color::Green }),
    ("banner-font", Glyph { ch: ' ', flipped: ' ', fg: Color::Red, bg: Color::Black }),
];

fn lookup(id: u32) -> Result<Glyph> {
    CATALOG
        .get(id as usize)
        .map(|(_, g)| *g)
        .ok_or_else(|| GameError::render("draw", format!("unknown handle {id}")))
}

/// Resolves asset names against the built-in glyph catalog
#[derive(Debug, Default)]
pub struct TerminalAssets {
    loaded: Vec<u32>,
}

impl TerminalAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles currently held
    pub fn loaded(&self) -> usize {
        self.loaded.len()
    }

    fn resolve(&mut self, name: &str) -> Result<u32> {
        let id = CATALOG
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or_else(|| GameError::resource(name, "no such asset"))? as u32;
        self.loaded.push(id);
        Ok(id)
    }

    fn release(&mut self, id: u32) {
        if let Some(i) = self.loaded.iter().position(|&l| l == id) {
            self.loaded.swap_remove(i);
        }
    }
}

impl AssetLoader for TerminalAssets {
    fn load_texture(&mut self, name: &str) -> Result<TextureHandle> {
        self.resolve(name).map(TextureHandle)
    }

    fn load_sprite(&mut self, name: &str) -> Result<SpriteHandle> {
        self.resolve(name).map(SpriteHandle)
    }

    fn load_font(&mut self, name: &str) -> Result<FontHandle> {
        self.resolve(name).map(FontHandle)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.release(texture.0);
    }

    fn release_sprite(&mut self, sprite: SpriteHandle) {
        self.release(sprite.0);
    }

    fn release_font(&mut self, font: FontHandle) {
        self.release(font.0);
    }
}

/// Raw mode on the alternate screen for as long as this lives
pub struct TerminalGuard(());

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )?;
        Ok(Self(()))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            ResetColor,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

const BLANK: Cell = Cell {
    ch: ' ',
    fg: Color::Reset,
    bg: Color::Reset,
};

pub struct TerminalSurface<W: Write> {
    out: W,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl TerminalSurface<io::Stdout> {
    /// Surface over stdout sized to the current terminal
    pub fn stdout() -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::with_size(io::stdout(), cols as usize, rows as usize))
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn with_size(out: W, cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            out,
            cols,
            rows,
            cells: vec![BLANK; cols * rows],
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Character at a grid position (for inspection)
    pub fn char_at(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col].ch)
    }

    /// World rect (screen orientation) to an inclusive-exclusive cell range
    fn to_cells(&self, r: Rect) -> (usize, usize, usize, usize) {
        let scale = |v: i32, world: i32, cells: usize| -> usize {
            let v = v.clamp(0, world) as i64;
            (v * cells as i64 / world as i64) as usize
        };
        let c0 = scale(r.x, WORLD_WIDTH, self.cols);
        let c1 = scale(r.x + r.w, WORLD_WIDTH, self.cols);
        let r0 = scale(r.y, WORLD_HEIGHT, self.rows);
        let r1 = scale(r.y + r.h, WORLD_HEIGHT, self.rows);
        // Anything with positive extent covers at least one cell
        let c1 = if r.w > 0 && c1 == c0 && c0 < self.cols { c0 + 1 } else { c1 };
        let r1 = if r.h > 0 && r1 == r0 && r0 < self.rows { r0 + 1 } else { r1 };
        (c0, c1, r0, r1)
    }

    fn fill(&mut self, dest: Option<Rect>, cell: Cell) {
        let dest = dest.unwrap_or(Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT));
        let (c0, c1, r0, r1) = self.to_cells(dest);
        for row in r0..r1 {
            for col in c0..c1 {
                self.cells[row * self.cols + col] = cell;
            }
        }
    }

    fn write_frame(&mut self) -> io::Result<()> {
        let mut last: Option<(Color, Color)> = None;
        for row in 0..self.rows {
            queue!(self.out, cursor::MoveTo(0, row as u16))?;
            for col in 0..self.cols {
                let cell = self.cells[row * self.cols + col];
                if last != Some((cell.fg, cell.bg)) {
                    queue!(self.out, SetForegroundColor(cell.fg), SetBackgroundColor(cell.bg))?;
                    last = Some((cell.fg, cell.bg));
                }
                queue!(self.out, Print(cell.ch))?;
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }
}

impl<W: Write> DrawSurface for TerminalSurface<W> {
    fn clear(&mut self) -> Result<()> {
        self.cells.fill(BLANK);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.write_frame()
            .map_err(|e| GameError::render("present frame", e))
    }

    fn draw_sprite(&mut self, sprite: SpriteHandle, dest: Rect, flip: Flip) -> Result<()> {
        let glyph = lookup(sprite.0)?;
        let ch = match flip {
            Flip::None => glyph.ch,
            Flip::Vertical => glyph.flipped,
        };
        self.fill(
            Some(dest),
            Cell {
                ch,
                fg: glyph.fg,
                bg: glyph.bg,
            },
        );
        Ok(())
    }

    fn draw_texture(&mut self, texture: TextureHandle, dest: Option<Rect>) -> Result<()> {
        let glyph = lookup(texture.0)?;
        self.fill(
            dest,
            Cell {
                ch: glyph.ch,
                fg: glyph.fg,
                bg: glyph.bg,
            },
        );
        Ok(())
    }

    fn draw_text(&mut self, font: FontHandle, text: &str, dest: Option<Rect>) -> Result<()> {
        let glyph = lookup(font.0)?;
        let dest = dest.unwrap_or(Rect::new(0, 0, WORLD_WIDTH, WORLD_HEIGHT));
        let (c0, c1, r0, r1) = self.to_cells(dest);

        let width = c1.saturating_sub(c0);
        let len = text.chars().count().min(width);
        let row = r0 + r1.saturating_sub(r0) / 2;
        if row >= self.rows {
            return Ok(());
        }
        let start = c0 + (width - len) / 2;
        for (i, ch) in text.chars().take(len).enumerate() {
            self.cells[row * self.cols + start + i] = Cell {
                ch,
                fg: glyph.fg,
                bg: glyph.bg,
            };
        }
        Ok(())
    }
}
