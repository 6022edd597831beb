use std::f32::consts::TAU;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::components::{Bomb, Dir, Particle, Pos};
use crate::world::{RunState, World};

impl World {
    /// Moves the player one cell if the round is running, the step rate
    /// allows it and the target is floor. Returns whether the move happened.
    pub fn move_player(&mut self, dir: Dir, now: Duration, rng: &mut impl Rng) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        if let Some(last) = self.player.last_move {
            if now.saturating_sub(last) < self.tuning.player_step_min {
                return false;
            }
        }
        let Some(next) = self.grid.open_step(self.player.pos, dir) else {
            return false;
        };

        self.player.pos = next;
        self.player.last_move = Some(now);
        if self.pellets.remove(&next) {
            self.score += 1;
            self.burst(next, now, rng);
        }
        true
    }

    /// Drops a bomb on the player's cell unless the cooldown is still running.
    /// Allowed while paused, the fuse only burns once ticks resume.
    /// Returns whether a bomb was placed.
    pub fn place_bomb(&mut self, now: Duration) -> bool {
        if self.is_over() {
            return false;
        }
        if let Some(last) = self.last_bomb {
            if now.saturating_sub(last) < self.tuning.bomb_cooldown {
                return false;
            }
        }
        let pos = self.player.pos;
        if !self.grid.is_floor(pos) {
            return false;
        }

        self.bombs.push(Bomb::new(pos, now, self.tuning.bomb_fuse));
        self.last_bomb = Some(now);
        debug!(x = pos.x, y = pos.y, "bomb placed");
        true
    }

    fn burst(&mut self, at: Pos, now: Duration, rng: &mut impl Rng) {
        let expire_at = now + self.tuning.particle_life;
        for _ in 0..self.tuning.particles_per_pellet {
            let angle = rng.gen::<f32>() * TAU;
            let speed = 0.3 + rng.gen::<f32>() * 0.7;
            self.particles.push(Particle {
                x: at.x as f32,
                y: at.y as f32,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                expire_at,
            });
        }
    }
}
