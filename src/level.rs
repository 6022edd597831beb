use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::components::{Dir, Pos, Tile};
use crate::config::MazeParams;
use crate::error::ConfigError;

/// Static playfield. Never mutated once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![tile; width]; height],
        }
    }

    /// Open room: floor everywhere except a one-cell wall border.
    pub fn room(width: usize, height: usize) -> Self {
        let mut grid = Self::filled(width, height, Tile::Floor);
        grid.wall_border();
        grid
    }

    /// Builds a grid from text rows, `#` for wall and anything else for floor.
    pub fn parse(rows: &[&str]) -> Self {
        let cells: Vec<Vec<Tile>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| if c == '#' { Tile::Wall } else { Tile::Floor })
                    .collect()
            })
            .collect();
        let height = cells.len();
        let width = cells.first().map_or(0, Vec::len);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        self.cells.get(pos.y).and_then(|row| row.get(pos.x)).copied()
    }

    pub fn is_floor(&self, pos: Pos) -> bool {
        self.tile(pos) == Some(Tile::Floor)
    }

    /// In-bounds floor neighbor of `pos` in direction `dir`.
    pub fn open_step(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        pos.step(dir).filter(|next| self.is_floor(*next))
    }

    pub fn floor_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, tile)| **tile == Tile::Floor)
                .map(move |(x, _)| Pos { x, y })
        })
    }

    fn set(&mut self, pos: Pos, tile: Tile) {
        self.cells[pos.y][pos.x] = tile;
    }

    fn wall_border(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        for x in 0..self.width {
            self.cells[0][x] = Tile::Wall;
            self.cells[self.height - 1][x] = Tile::Wall;
        }
        for y in 0..self.height {
            self.cells[y][0] = Tile::Wall;
            self.cells[y][self.width - 1] = Tile::Wall;
        }
    }
}

/// Result of maze generation: the grid plus its starting pellets.
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: Grid,
    pub pellets: HashSet<Pos>,
}

/// Carves a bordered maze: randomized walks from even-aligned seeds, then
/// straight corridor runs to break up dead ends.
pub fn generate(params: &MazeParams, rng: &mut impl Rng) -> Result<Level, ConfigError> {
    params.validate()?;
    let (width, height) = (params.width, params.height);
    let mut grid = Grid::filled(width, height, Tile::Wall);

    let walk_len = params.complexity_iterations();
    for _ in 0..params.density_iterations() {
        let mut x = rng.gen_range(1..(width / 2).max(2)) * 2;
        let mut y = rng.gen_range(1..(height / 2).max(2)) * 2;
        if x >= width || y >= height {
            continue;
        }
        grid.set(Pos { x, y }, Tile::Floor);
        for _ in 0..walk_len {
            let mut neighbors = Vec::with_capacity(4);
            if x > 1 {
                neighbors.push((x - 2, y));
            }
            if x + 2 < width {
                neighbors.push((x + 2, y));
            }
            if y > 1 {
                neighbors.push((x, y - 2));
            }
            if y + 2 < height {
                neighbors.push((x, y + 2));
            }
            let Some(&(nx, ny)) = neighbors.choose(rng) else {
                continue;
            };
            if grid.tile(Pos { x: nx, y: ny }) == Some(Tile::Wall) {
                grid.set(Pos { x: nx, y: ny }, Tile::Floor);
                grid.set(Pos { x: (nx + x) / 2, y: (ny + y) / 2 }, Tile::Floor);
                x = nx;
                y = ny;
            }
        }
    }

    open_corridors(&mut grid, params, rng);
    grid.wall_border();

    let pellets: HashSet<Pos> = grid.floor_cells().collect();
    if pellets.is_empty() {
        return Err(ConfigError::NoFloor);
    }
    debug!(width, height, floor = pellets.len(), "maze generated");
    Ok(Level { grid, pellets })
}

fn open_corridors(grid: &mut Grid, params: &MazeParams, rng: &mut impl Rng) {
    let (width, height) = (params.width, params.height);
    let max_len = params.max_corridor_len();
    for _ in 0..params.corridor_runs() {
        let mut x = rng.gen_range(1..=width - 2) as isize;
        let mut y = rng.gen_range(1..=height - 2) as isize;
        let len = rng.gen_range(3..=max_len);
        let (dx, dy) = Dir::ALL[rng.gen_range(0..4)].delta();
        for _ in 0..len {
            if x >= 1 && y >= 1 && x < width as isize - 1 && y < height as isize - 1 {
                grid.set(Pos::new(x as usize, y as usize), Tile::Floor);
            }
            x += dx;
            y += dy;
        }
    }
}

/// Player spawn: the grid center, or the first floor cell found in
/// square rings of growing radius around it.
pub fn find_spawn(grid: &Grid) -> Option<Pos> {
    let center = Pos::new(grid.width() / 2, grid.height() / 2);
    if grid.is_floor(center) {
        return Some(center);
    }
    let max_r = grid.width().max(grid.height()) as isize;
    for r in 1..max_r {
        for dx in -r..=r {
            for dy in -r..=r {
                if let Some(pos) = center.offset(dx, dy) {
                    if grid.is_floor(pos) {
                        return Some(pos);
                    }
                }
            }
        }
    }
    None
}

/// Up to `count` distinct floor cells farther than `min_distance` from `player`.
pub fn enemy_spawns(
    grid: &Grid,
    player: Pos,
    count: usize,
    min_distance: usize,
    rng: &mut impl Rng,
) -> Vec<Pos> {
    let mut candidates: Vec<Pos> = grid
        .floor_cells()
        .filter(|pos| pos.manhattan(player) > min_distance)
        .collect();
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}
