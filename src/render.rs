use std::collections::HashMap;
use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use pacghost::{Pos, RunState, Tile, World};

const CELL_W: usize = 2;
const PELLET_ANIM_FPS: f64 = 6.0;
const PELLET_COLOR_FPS: f64 = 2.0;
const ENEMY_ANIM_FPS: f64 = 3.0;
const FUSE_WARNING: Duration = Duration::from_millis(1500);

const PELLET_COLORS: [Color; 4] = [Color::Cyan, Color::White, Color::Cyan, Color::Green];

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Enemy(u8),
    Frozen,
    Wall,
    Empty,
    Pellet(u8),
    Bomb { lit: bool },
    Explosion,
    Particle,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

/// Terminal renderer. Only redraws cells that changed since the last frame.
pub struct Renderer {
    ascii: bool,
    last: Vec<Cell>,
    last_hud: String,
    last_banner: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(ascii: bool) -> Self {
        Self {
            ascii,
            last: Vec::new(),
            last_hud: String::new(),
            last_banner: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces a full repaint on the next frame.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn draw(&mut self, stdout: &mut Stdout, world: &World, now: Duration) -> io::Result<()> {
        let grid = world.grid();
        let (term_w, term_h) = terminal::size()?;
        let Some((needed_w, needed_h)) = fit(grid.width(), grid.height(), term_w, term_h) else {
            stdout.queue(MoveTo(0, 0))?;
            stdout.queue(Clear(ClearType::All))?;
            stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                grid.width().saturating_mul(CELL_W),
                grid.height().saturating_add(2),
                term_w,
                term_h
            )))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        };

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        let cells = grid.width() * grid.height();
        if self.last.len() != cells {
            self.last = vec![BLANK; cells];
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(world, now);
        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(&hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let overlay = overlay(world, now);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let pos = Pos { x, y };
                let cell = overlay
                    .get(&pos)
                    .copied()
                    .unwrap_or_else(|| base_cell(world, pos, now));
                let idx = y * grid.width() + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(stdout, x, y, cell)?;
                }
            }
        }

        let banner = banner_line(world, now);
        if self.needs_full || banner != self.last_banner {
            stdout.queue(MoveTo(self.origin_x, self.origin_y + grid.height() as u16))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(SetForegroundColor(banner_color(world)))?;
            stdout.queue(Print(&banner))?;
            stdout.queue(ResetColor)?;
            self.last_banner = banner;
        }
        self.needs_full = false;

        stdout.flush()?;
        Ok(())
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = self.text(cell.glyph);
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                stdout.queue(Print(' '))?;
            }
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }

    fn text(&self, glyph: Glyph) -> &'static str {
        if self.ascii {
            match glyph {
                Glyph::Player => "P",
                Glyph::Enemy(0) => "E",
                Glyph::Enemy(_) => "e",
                Glyph::Frozen => "z",
                Glyph::Wall => "##",
                Glyph::Empty => " ",
                Glyph::Pellet(frame) => ["|", "/", "-", "\\"][frame as usize % 4],
                Glyph::Bomb { lit: false } => "B",
                Glyph::Bomb { lit: true } => "B.",
                Glyph::Explosion => "*",
                Glyph::Particle => ".",
            }
        } else {
            match glyph {
                Glyph::Player => "👻",
                Glyph::Enemy(0) => "👾",
                Glyph::Enemy(_) => "😈",
                Glyph::Frozen => "🧊",
                Glyph::Wall => "██",
                Glyph::Empty => " ",
                Glyph::Pellet(frame) => ["◐", "◓", "◑", "◒"][frame as usize % 4],
                Glyph::Bomb { lit: false } => "💣",
                Glyph::Bomb { lit: true } => "🧨",
                Glyph::Explosion => "✺",
                Glyph::Particle => "·",
            }
        }
    }
}

/// Columns and rows the board needs, `None` when it does not fit the terminal.
/// Every board coordinate is then below the terminal size.
fn fit(width: usize, height: usize, term_w: u16, term_h: u16) -> Option<(u16, u16)> {
    let needed_w = u16::try_from(width.checked_mul(CELL_W)?).ok()?;
    let needed_h = u16::try_from(height.checked_add(2)?).ok()?;
    (needed_w <= term_w && needed_h <= term_h).then_some((needed_w, needed_h))
}

fn frame(now: Duration, fps: f64, frames: u64) -> u8 {
    ((now.as_secs_f64() * fps) as u64 % frames) as u8
}

fn base_cell(world: &World, pos: Pos, now: Duration) -> Cell {
    match world.grid().tile(pos) {
        Some(Tile::Wall) => Cell {
            glyph: Glyph::Wall,
            color: Color::Magenta,
        },
        Some(Tile::Floor) if world.pellets().contains(&pos) => Cell {
            glyph: Glyph::Pellet(frame(now, PELLET_ANIM_FPS, 4)),
            color: PELLET_COLORS[frame(now, PELLET_COLOR_FPS, 4) as usize],
        },
        _ => BLANK,
    }
}

/// Entity layer, later entries drawn on top.
fn overlay(world: &World, now: Duration) -> HashMap<Pos, Cell> {
    let mut cells = HashMap::new();
    for p in world.particles() {
        if let Some(pos) = p.cell().filter(|pos| world.grid().in_bounds(*pos)) {
            cells.insert(
                pos,
                Cell {
                    glyph: Glyph::Particle,
                    color: Color::White,
                },
            );
        }
    }
    for bomb in world.bombs() {
        cells.insert(
            bomb.pos(),
            Cell {
                glyph: Glyph::Bomb {
                    lit: bomb.remaining(now) < FUSE_WARNING,
                },
                color: Color::Green,
            },
        );
    }
    for e in world.explosions() {
        cells.insert(
            e.pos,
            Cell {
                glyph: Glyph::Explosion,
                color: Color::Yellow,
            },
        );
    }
    let anim = frame(now, ENEMY_ANIM_FPS, 2);
    for enemy in world.enemies() {
        let glyph = if enemy.is_frozen(now) {
            Glyph::Frozen
        } else {
            Glyph::Enemy(anim)
        };
        cells.insert(
            enemy.pos,
            Cell {
                glyph,
                color: Color::Red,
            },
        );
    }
    cells.insert(
        world.player().pos,
        Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        },
    );
    cells
}

fn clock_text(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn hud_line(world: &World, now: Duration) -> String {
    format!(
        "Score: {}  Pellets: {}  Bomb: {:.1}s  Time: {}  (arrows/hjkl move, b bomb, p pause, q quit)",
        world.score(),
        world.pellets().len(),
        world.bomb_cooldown_left(now).as_secs_f64(),
        clock_text(world.elapsed(now)),
    )
}

fn banner_line(world: &World, now: Duration) -> String {
    match world.state() {
        RunState::Running => String::new(),
        RunState::Paused => " -- PAUSED -- (p to resume)".to_string(),
        RunState::GameOver { won: true } => format!(
            " YOU WIN! Score: {}  Time: {}  Press R to replay or Q to quit",
            world.score(),
            clock_text(world.elapsed(now)),
        ),
        RunState::GameOver { won: false } => format!(
            " GAME OVER! Score: {}  Press R to replay or Q to quit",
            world.score()
        ),
    }
}

fn banner_color(world: &World) -> Color {
    match world.state() {
        RunState::GameOver { won: true } => Color::Yellow,
        RunState::GameOver { won: false } => Color::Red,
        _ => Color::Cyan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_fits_only_when_terminal_is_large_enough() {
        assert_eq!(fit(36, 18, 80, 24), Some((72, 20)));
        assert_eq!(fit(36, 18, 71, 24), None);
        assert_eq!(fit(36, 18, 80, 19), None);
    }

    #[test]
    fn oversized_board_does_not_wrap_into_a_fit() {
        // 32_800 * 2 wraps to 64 as u16.
        assert_eq!(fit(32_800, 10, 200, 50), None);
        assert_eq!(fit(10, usize::MAX, 200, 50), None);
        assert_eq!(fit(usize::MAX, 10, u16::MAX, u16::MAX), None);
    }
}
