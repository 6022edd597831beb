use std::time::Duration;

use rand::Rng;
use tracing::info;

use crate::clock::Clock;
use crate::components::Dir;
use crate::config::{MazeParams, Tuning};
use crate::error::ConfigError;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Dir),
    PlaceBomb,
    TogglePause,
    Quit,
    /// Start a fresh round. Only honoured once the current one is over.
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drives rounds: owns the live world, the clock and the random source.
pub struct Game<C, R> {
    params: MazeParams,
    tuning: Tuning,
    clock: C,
    rng: R,
    world: World,
    last_tick: Duration,
    round: u32,
}

impl<C: Clock, R: Rng> Game<C, R> {
    pub fn new(params: MazeParams, tuning: Tuning, clock: C, mut rng: R) -> Result<Self, ConfigError> {
        let now = clock.now();
        let world = World::new_round(&params, tuning.clone(), now, &mut rng)?;
        Ok(Self {
            params,
            tuning,
            clock,
            rng,
            world,
            last_tick: now,
            round: 1,
        })
    }

    /// Read-only view of the live round.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn apply(&mut self, intent: Intent) -> Result<Flow, ConfigError> {
        let now = self.clock.now();
        match intent {
            Intent::Move(dir) => {
                self.world.move_player(dir, now, &mut self.rng);
            }
            Intent::PlaceBomb => {
                self.world.place_bomb(now);
            }
            Intent::TogglePause => self.world.toggle_pause(),
            Intent::Quit => return Ok(Flow::Quit),
            Intent::Replay => {
                if self.world.is_over() {
                    self.restart()?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Runs one simulation tick if the tick interval has passed. Returns
    /// whether a tick ran.
    pub fn update(&mut self) -> bool {
        let now = self.clock.now();
        if now.saturating_sub(self.last_tick) < self.tuning.tick_interval {
            return false;
        }
        self.last_tick = now;
        self.world.tick(now, &mut self.rng);
        true
    }

    fn restart(&mut self) -> Result<(), ConfigError> {
        let now = self.clock.now();
        self.world = World::new_round(&self.params, self.tuning.clone(), now, &mut self.rng)?;
        self.last_tick = now;
        self.round += 1;
        info!(round = self.round, "replay");
        Ok(())
    }
}
