use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::components::{Bomb, Enemy, Explosion, Particle, Player, Pos};
use crate::config::{MazeParams, Tuning};
use crate::error::ConfigError;
use crate::ghost;
use crate::level::{self, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    GameOver { won: bool },
}

/// Everything live in one round. A new round builds a new `World`.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) grid: Grid,
    pub(crate) pellets: HashSet<Pos>,
    pub(crate) player: Player,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) bombs: Vec<Bomb>,
    pub(crate) explosions: Vec<Explosion>,
    pub(crate) particles: Vec<Particle>,
    pub(crate) score: u32,
    pub(crate) start_time: Duration,
    pub(crate) ended_at: Option<Duration>,
    pub(crate) last_bomb: Option<Duration>,
    pub(crate) state: RunState,
    pub(crate) tuning: Tuning,
}

impl World {
    /// Generates a maze and places the player at its center and the enemies
    /// away from the player.
    pub fn new_round(
        params: &MazeParams,
        tuning: Tuning,
        now: Duration,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let level = level::generate(params, rng)?;
        let spawn = level::find_spawn(&level.grid).ok_or(ConfigError::NoFloor)?;
        let enemies = level::enemy_spawns(
            &level.grid,
            spawn,
            tuning.enemy_count,
            tuning.enemy_min_spawn_distance,
            rng,
        );
        info!(
            width = params.width,
            height = params.height,
            pellets = level.pellets.len() - 1,
            enemies = enemies.len(),
            "round started"
        );
        Ok(Self::assemble(level.grid, level.pellets, spawn, enemies, tuning, now))
    }

    /// Round on a prepared grid. Every floor cell except the player's gets a pellet.
    pub fn with_layout(
        grid: Grid,
        player: Pos,
        enemies: Vec<Pos>,
        tuning: Tuning,
        now: Duration,
    ) -> Self {
        let pellets = grid.floor_cells().collect();
        Self::assemble(grid, pellets, player, enemies, tuning, now)
    }

    fn assemble(
        grid: Grid,
        mut pellets: HashSet<Pos>,
        player: Pos,
        enemies: Vec<Pos>,
        tuning: Tuning,
        now: Duration,
    ) -> Self {
        pellets.remove(&player);
        Self {
            grid,
            pellets,
            player: Player::new(player),
            enemies: enemies.into_iter().map(Enemy::new).collect(),
            bombs: Vec::new(),
            explosions: Vec::new(),
            particles: Vec::new(),
            score: 0,
            start_time: now,
            ended_at: None,
            last_bomb: None,
            state: RunState::Running,
            tuning,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pellets(&self) -> &HashSet<Pos> {
        &self.pellets
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, RunState::GameOver { .. })
    }

    /// Round time, stopped once the round is over.
    pub fn elapsed(&self, now: Duration) -> Duration {
        self.ended_at.unwrap_or(now).saturating_sub(self.start_time)
    }

    /// Time until another bomb may be placed.
    pub fn bomb_cooldown_left(&self, now: Duration) -> Duration {
        self.last_bomb
            .map(|t| (t + self.tuning.bomb_cooldown).saturating_sub(now))
            .unwrap_or_default()
    }

    /// Flips between running and paused. Has no effect once the round is over.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            over => over,
        };
        debug!(state = ?self.state, "pause toggled");
    }

    /// Advances the round by one tick. Does nothing unless running.
    pub fn tick(&mut self, now: Duration, rng: &mut impl Rng) {
        if self.state != RunState::Running {
            return;
        }

        self.detonate_bombs(now);
        if self.is_over() {
            return;
        }

        self.update_effects(now);

        ghost::move_enemies(
            &mut self.enemies,
            &self.grid,
            self.player.pos,
            now,
            &self.tuning,
            rng,
        );

        if self.enemies.iter().any(|e| e.pos == self.player.pos) {
            self.finish(false, now);
            return;
        }

        if self.pellets.is_empty() {
            self.finish(true, now);
        }
    }

    fn detonate_bombs(&mut self, now: Duration) {
        let (due, pending): (Vec<Bomb>, Vec<Bomb>) = std::mem::take(&mut self.bombs)
            .into_iter()
            .partition(|b| b.is_due(now));
        self.bombs = pending;

        let radius = self.tuning.bomb_radius;
        for bomb in due {
            let center = bomb.pos();
            let expire_at = now + self.tuning.explosion_life;
            let r = radius as isize;
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.unsigned_abs() + dy.unsigned_abs() > radius {
                        continue;
                    }
                    if let Some(pos) = center.offset(dx, dy).filter(|p| self.grid.in_bounds(*p)) {
                        self.explosions.push(Explosion { pos, expire_at });
                    }
                }
            }

            let mut frozen = 0;
            for enemy in &mut self.enemies {
                if enemy.pos.manhattan(center) <= radius {
                    enemy.freeze_until = now + self.tuning.freeze;
                    frozen += 1;
                }
            }
            info!(x = center.x, y = center.y, frozen, "bomb detonated");

            if self.player.pos.manhattan(center) <= radius {
                self.finish(false, now);
            }
        }
    }

    fn update_effects(&mut self, now: Duration) {
        self.explosions.retain(|e| e.expire_at > now);
        self.particles.retain(|p| p.expire_at > now);
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
        }
        trace!(
            explosions = self.explosions.len(),
            particles = self.particles.len(),
            "effects updated"
        );
    }

    fn finish(&mut self, won: bool, now: Duration) {
        if self.is_over() {
            return;
        }
        self.state = RunState::GameOver { won };
        self.ended_at = Some(now);
        info!(won, score = self.score, "game over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn room_world(enemies: Vec<Pos>) -> World {
        World::with_layout(
            Grid::room(10, 10),
            Pos::new(5, 5),
            enemies,
            Tuning::default(),
            Duration::ZERO,
        )
    }

    #[test]
    fn new_round_places_player_on_floor() {
        let mut rng = StdRng::seed_from_u64(11);
        let world = World::new_round(
            &MazeParams::new(40, 20),
            Tuning::default(),
            Duration::ZERO,
            &mut rng,
        )
        .unwrap();
        assert!(world.grid().is_floor(world.player().pos));
        assert!(!world.pellets().contains(&world.player().pos));
        assert!(world.enemies().len() <= 6);
        for enemy in world.enemies() {
            assert!(enemy.pos.manhattan(world.player().pos) > 8);
        }
        assert_eq!(world.state(), RunState::Running);
    }

    #[test]
    fn new_round_rejects_bad_tuning() {
        let mut rng = StdRng::seed_from_u64(11);
        let tuning = Tuning {
            chase_probability: 1.5,
            ..Tuning::default()
        };
        let result = World::new_round(&MazeParams::new(40, 20), tuning, Duration::ZERO, &mut rng);
        assert!(matches!(result, Err(ConfigError::ChaseProbability(p)) if p == 1.5));
    }

    #[test]
    fn bomb_waits_for_its_fuse() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut world = room_world(vec![]);
        world.bombs.push(Bomb::new(Pos::new(2, 2), secs(1.0), secs(2.0)));

        world.tick(secs(2.99), &mut rng);
        assert_eq!(world.bombs().len(), 1);
        assert!(world.explosions().is_empty());

        world.tick(secs(3.0), &mut rng);
        assert!(world.bombs().is_empty());
        assert!(!world.explosions().is_empty());
    }

    #[test]
    fn blast_is_clipped_to_grid() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut world = room_world(vec![]);
        world.bombs.push(Bomb::new(Pos::new(0, 0), Duration::ZERO, Duration::ZERO));
        world.tick(Duration::ZERO, &mut rng);
        // Cells with x + y <= 3 in the first quadrant.
        assert_eq!(world.explosions().len(), 10);
        assert_eq!(world.state(), RunState::Running);
    }

    #[test]
    fn second_blast_overwrites_freeze() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut world = room_world(vec![Pos::new(2, 2)]);
        world.bombs.push(Bomb::new(Pos::new(2, 3), Duration::ZERO, secs(1.0)));
        world.bombs.push(Bomb::new(Pos::new(1, 2), secs(2.0), secs(1.0)));

        world.tick(secs(1.0), &mut rng);
        assert_eq!(world.enemies()[0].freeze_until, secs(11.0));
        world.tick(secs(3.0), &mut rng);
        assert_eq!(world.enemies()[0].freeze_until, secs(13.0));
    }

    #[test]
    fn expired_effects_are_dropped_and_particles_drift() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut world = room_world(vec![]);
        world.explosions.push(Explosion {
            pos: Pos::new(1, 1),
            expire_at: secs(0.5),
        });
        world.particles.push(Particle {
            x: 3.0,
            y: 3.0,
            vx: 0.5,
            vy: -0.25,
            expire_at: secs(1.0),
        });

        world.tick(secs(0.5), &mut rng);
        assert!(world.explosions().is_empty());
        assert_eq!(world.particles()[0].x, 3.5);
        assert_eq!(world.particles()[0].y, 2.75);

        world.tick(secs(1.0), &mut rng);
        assert!(world.particles().is_empty());
    }

    #[test]
    fn enemy_on_player_ends_round() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut world = room_world(vec![Pos::new(5, 5)]);
        world.enemies[0].freeze_until = secs(100.0);
        world.tick(secs(1.0), &mut rng);
        assert_eq!(world.state(), RunState::GameOver { won: false });
    }

    #[test]
    fn paused_and_finished_rounds_do_not_advance() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut world = room_world(vec![]);
        world.bombs.push(Bomb::new(Pos::new(2, 2), Duration::ZERO, Duration::ZERO));
        world.toggle_pause();
        world.tick(secs(5.0), &mut rng);
        assert_eq!(world.bombs().len(), 1);

        world.toggle_pause();
        world.state = RunState::GameOver { won: true };
        world.toggle_pause();
        world.tick(secs(5.0), &mut rng);
        assert_eq!(world.bombs().len(), 1);
        assert_eq!(world.state(), RunState::GameOver { won: true });
    }

    #[test]
    fn cooldown_and_elapsed_for_hud() {
        let mut world = World::with_layout(
            Grid::room(6, 6),
            Pos::new(2, 2),
            vec![],
            Tuning::default(),
            secs(10.0),
        );
        assert_eq!(world.elapsed(secs(12.5)), secs(2.5));
        world.finish(true, secs(14.0));
        assert_eq!(world.elapsed(secs(20.0)), secs(4.0));
        assert_eq!(world.bomb_cooldown_left(secs(12.0)), Duration::ZERO);
        world.last_bomb = Some(secs(12.0));
        assert_eq!(world.bomb_cooldown_left(secs(13.0)), Duration::from_millis(1200));
    }
}
