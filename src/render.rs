use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::game::{Game, Phase};
use crate::maze::{Pos, Tile};

const CELL_W: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Player,
    Hazard,
    Key,
    ExitLocked,
    ExitOpen,
    Wall,
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

impl Glyph {
    fn text(self) -> &'static str {
        match self {
            Glyph::Player => "@",
            Glyph::Hazard => "☠",
            Glyph::Key => "⚷",
            Glyph::ExitLocked => "▣",
            Glyph::ExitOpen => "□",
            Glyph::Wall => "██",
            Glyph::Empty => "· ",
        }
    }
}

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_phase: Option<Phase>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            last_phase: None,
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn draw<W: Write>(&mut self, out: &mut W, game: &Game) -> io::Result<()> {
        let (term_w, term_h) = terminal::size()?;
        self.draw_sized(out, game, term_w, term_h)
    }

    fn draw_sized<W: Write>(
        &mut self,
        out: &mut W,
        game: &Game,
        term_w: u16,
        term_h: u16,
    ) -> io::Result<()> {
        let width = game.grid.width();
        let height = game.grid.height();
        let board_w = width.saturating_mul(CELL_W);
        let board_h = height.saturating_add(2);
        let overlay = overlay_lines(game);
        let (panel_w, panel_h) = overlay.as_deref().map_or((0, 0), panel_size);
        let needed_w = board_w.max(panel_w);
        let needed_h = board_h.max(panel_h);

        if self.last.len() != width * height {
            *self = Renderer::new(width, height);
        }

        out.queue(MoveTo(0, 0))?;
        let fits = match (u16::try_from(needed_w), u16::try_from(needed_h)) {
            (Ok(w), Ok(h)) => term_w >= w && term_h >= h,
            _ => false,
        };
        if !fits {
            out.queue(Clear(ClearType::All))?;
            out.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        // Both casts are bounded by the terminal size checked above.
        let origin_x = (term_w - board_w as u16) / 2;
        let origin_y = (term_h - board_h as u16) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last_phase != Some(game.phase) {
            self.last_phase = Some(game.phase);
            self.needs_full = true;
        }
        let full = self.needs_full;
        if full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(game);
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            // The HUD is ASCII and may be wider than a small board.
            let room = usize::from(term_w - self.origin_x);
            out.queue(Print(&hud[..hud.len().min(room)]))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for y in 0..height {
            for x in 0..width {
                let cell = cell_for(game, Pos { x, y });
                let idx = y * width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, x, y, cell)?;
                }
            }
        }
        self.needs_full = false;

        // Overlays are painted only alongside a full repaint.
        if let (true, Some(lines)) = (full, overlay) {
            draw_overlay(out, term_w, term_h, &lines)?;
        }

        out.flush()
    }

    fn draw_cell<W: Write>(&self, out: &mut W, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = cell.glyph.text();
        out.queue(MoveTo(
            self.origin_x + (x * CELL_W) as u16,
            self.origin_y + y as u16,
        ))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            out.queue(Print(' '))?;
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

fn panel_inner_width(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|l| UnicodeWidthStr::width(l.as_str()))
        .max()
        .unwrap_or(0)
        + 2
}

fn panel_size(lines: &[String]) -> (usize, usize) {
    (panel_inner_width(lines) + 2, lines.len() + 2)
}

// The board is centred on the terminal, so centring the panel on the terminal
// also centres it over the board.
fn draw_overlay<W: Write>(
    out: &mut W,
    term_w: u16,
    term_h: u16,
    lines: &[String],
) -> io::Result<()> {
    let inner = panel_inner_width(lines);
    let (panel_w, panel_h) = panel_size(lines);
    let x0 = (term_w as usize).saturating_sub(panel_w) / 2;
    let y0 = (term_h as usize).saturating_sub(panel_h) / 2;

    let border = "─".repeat(inner);
    out.queue(SetForegroundColor(Color::Yellow))?;
    out.queue(MoveTo(x0 as u16, y0 as u16))?;
    out.queue(Print(format!("┌{}┐", border)))?;
    for (i, line) in lines.iter().enumerate() {
        let pad = inner - UnicodeWidthStr::width(line.as_str());
        let left = pad / 2;
        out.queue(MoveTo(x0 as u16, (y0 + 1 + i) as u16))?;
        out.queue(Print(format!(
            "│{}{}{}│",
            " ".repeat(left),
            line,
            " ".repeat(pad - left)
        )))?;
    }
    out.queue(MoveTo(x0 as u16, (y0 + panel_h - 1) as u16))?;
    out.queue(Print(format!("└{}┘", border)))?;
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(ResetColor)?;
    Ok(())
}

pub fn hud_line(game: &Game) -> String {
    format!(
        "Level: {}  Score: {}  Keys: {}/{}  (q to quit)",
        game.level,
        game.score,
        game.keys_total.saturating_sub(game.keys.len()),
        game.keys_total
    )
}

fn overlay_lines(game: &Game) -> Option<Vec<String>> {
    match game.phase {
        Phase::Playing => None,
        Phase::Menu => Some(menu_lines()),
        Phase::GameOver => Some(game_over_lines(game)),
    }
}

fn menu_lines() -> Vec<String> {
    vec![
        "KEY MAZE".to_string(),
        String::new(),
        "Collect every key,".to_string(),
        "then reach the exit.".to_string(),
        "Avoid the skulls.".to_string(),
        String::new(),
        "arrows / hjkl  move".to_string(),
        "Enter  start".to_string(),
        "q  quit".to_string(),
    ]
}

fn game_over_lines(game: &Game) -> Vec<String> {
    vec![
        "GAME OVER".to_string(),
        String::new(),
        format!("Score: {}", game.score),
        format!("Level: {}", game.level),
        String::new(),
        "Enter  restart".to_string(),
        "q  quit".to_string(),
    ]
}

pub fn cell_for(game: &Game, pos: Pos) -> Cell {
    if pos == game.player {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if game.hazard_at(pos) {
        return Cell {
            glyph: Glyph::Hazard,
            color: Color::Red,
        };
    }
    if game.keys.contains(&pos) {
        return Cell {
            glyph: Glyph::Key,
            color: Color::Green,
        };
    }
    if pos == game.exit {
        return if game.exit_unlocked() {
            Cell {
                glyph: Glyph::ExitOpen,
                color: Color::Cyan,
            }
        } else {
            Cell {
                glyph: Glyph::ExitLocked,
                color: Color::Magenta,
            }
        };
    }
    match game.grid.tile(pos) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::DarkYellow,
        },
        Tile::Empty => Cell {
            glyph: Glyph::Empty,
            color: Color::DarkGrey,
        },
    }
}
