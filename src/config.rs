use std::time::Duration;

use crate::error::ConfigError;

pub const MIN_GRID_W: usize = 36;
pub const MIN_GRID_H: usize = 18;
const MIN_SIDE: usize = 5;

/// Gameplay constants for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub enemy_count: usize,
    pub bomb_fuse: Duration,
    /// Manhattan radius of a blast.
    pub bomb_radius: usize,
    pub freeze: Duration,
    pub player_step_min: Duration,
    pub enemy_step_interval: Duration,
    pub bomb_cooldown: Duration,
    pub particle_life: Duration,
    pub explosion_life: Duration,
    pub particles_per_pellet: usize,
    /// Chance an enemy asks the path finder instead of wandering.
    pub chase_probability: f64,
    /// Max BFS nodes expanded per enemy step.
    pub path_budget: usize,
    pub tick_interval: Duration,
    /// Enemies spawn strictly farther than this (Manhattan) from the player.
    pub enemy_min_spawn_distance: usize,
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.chase_probability) {
            return Err(ConfigError::ChaseProbability(self.chase_probability));
        }
        Ok(())
    }

    /// Chase probability pinned to `0..=1`; NaN counts as never.
    pub fn chase_chance(&self) -> f64 {
        let p = self.chase_probability;
        if (0.0..=1.0).contains(&p) {
            p
        } else if p > 1.0 {
            1.0
        } else {
            0.0
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enemy_count: 6,
            bomb_fuse: Duration::from_millis(2000),
            bomb_radius: 3,
            freeze: Duration::from_secs(10),
            player_step_min: Duration::from_millis(60),
            enemy_step_interval: Duration::from_millis(550),
            bomb_cooldown: Duration::from_millis(2200),
            particle_life: Duration::from_millis(600),
            explosion_life: Duration::from_millis(600),
            particles_per_pellet: 6,
            chase_probability: 0.7,
            path_budget: 500,
            tick_interval: Duration::from_millis(40),
            enemy_min_spawn_distance: 8,
        }
    }
}

/// Size and carving knobs for the maze generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MazeParams {
    pub width: usize,
    pub height: usize,
    pub complexity: f32,
    pub density: f32,
}

impl MazeParams {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            complexity: 0.75,
            density: 0.75,
        }
    }

    /// Steps of each randomized walk.
    pub fn complexity_iterations(&self) -> usize {
        if self.complexity <= 0.0 {
            return 0;
        }
        (self.complexity * (5 * (self.width + self.height)) as f32) as usize
    }

    /// Number of randomized walks.
    pub fn density_iterations(&self) -> usize {
        if self.density <= 0.0 {
            return 0;
        }
        (self.density * ((self.width / 2) * (self.height / 2)) as f32) as usize
    }

    pub fn corridor_runs(&self) -> usize {
        (self.width * self.height / 80).max(10)
    }

    pub fn max_corridor_len(&self) -> usize {
        (self.width / 4).max(3).min(12)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(ConfigError::MazeTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.density_iterations() == 0 || self.complexity_iterations() == 0 {
            return Err(ConfigError::NoCarving {
                complexity: self.complexity,
                density: self.density,
            });
        }
        Ok(())
    }
}

impl Default for MazeParams {
    fn default() -> Self {
        Self::new(MIN_GRID_W, MIN_GRID_H)
    }
}
