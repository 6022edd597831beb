use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbor one step away, `None` when it would leave the top/left edge.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Pos> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Pos { x, y })
    }

    pub fn step(self, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Expansion order used by the path finder and the wander step.
    pub const ALL: [Dir; 4] = [Dir::Right, Dir::Left, Dir::Down, Dir::Up];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Pos,
    pub last_move: Option<Duration>,
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            last_move: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub pos: Pos,
    /// Cannot move before this time.
    pub freeze_until: Duration,
    /// Next step suppressed before this time.
    pub move_cooldown: Duration,
}

impl Enemy {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            freeze_until: Duration::ZERO,
            move_cooldown: Duration::ZERO,
        }
    }

    pub fn is_frozen(&self, now: Duration) -> bool {
        self.freeze_until > now
    }

    pub fn ready(&self, now: Duration) -> bool {
        !self.is_frozen(now) && self.move_cooldown <= now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bomb {
    pos: Pos,
    placed_at: Duration,
    explode_at: Duration,
}

impl Bomb {
    pub fn new(pos: Pos, placed_at: Duration, fuse: Duration) -> Self {
        Self {
            pos,
            placed_at,
            explode_at: placed_at + fuse,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn placed_at(&self) -> Duration {
        self.placed_at
    }

    pub fn explode_at(&self) -> Duration {
        self.explode_at
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.explode_at
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.explode_at.saturating_sub(now)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub pos: Pos,
    pub expire_at: Duration,
}

/// Decorative spark. Position is sub-cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub expire_at: Duration,
}

impl Particle {
    /// Cell the particle currently covers, if it is still on the non-negative quadrant.
    pub fn cell(&self) -> Option<Pos> {
        let x = self.x.round();
        let y = self.y.round();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        Some(Pos::new(x as usize, y as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_stops_at_origin() {
        assert_eq!(Pos::new(0, 3).step(Dir::Left), None);
        assert_eq!(Pos::new(2, 0).step(Dir::Up), None);
        assert_eq!(Pos::new(2, 3).step(Dir::Down), Some(Pos::new(2, 4)));
    }

    #[test]
    fn bomb_fuse_is_fixed_at_placement() {
        let bomb = Bomb::new(Pos::new(1, 1), Duration::from_secs(3), Duration::from_secs(2));
        assert_eq!(bomb.explode_at(), Duration::from_secs(5));
        assert!(!bomb.is_due(Duration::from_millis(4999)));
        assert!(bomb.is_due(Duration::from_secs(5)));
        assert_eq!(bomb.remaining(Duration::from_secs(6)), Duration::ZERO);
    }

    #[test]
    fn particle_cell_clips_negative() {
        let p = Particle {
            x: -0.7,
            y: 2.2,
            vx: 0.0,
            vy: 0.0,
            expire_at: Duration::ZERO,
        };
        assert_eq!(p.cell(), None);
    }
}
