//! Maze chase game core: maze generation, bounded pursuit pathfinding and
//! the tick-driven round simulation. Terminal I/O lives in the binary.

pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod ghost;
pub mod level;
pub mod pathfind;
pub mod player;
pub mod world;

pub use clock::{Clock, ManualClock, SystemClock};
pub use components::{Bomb, Dir, Enemy, Explosion, Particle, Player, Pos, Tile};
pub use config::{MazeParams, Tuning};
pub use error::ConfigError;
pub use game::{Flow, Game, Intent};
pub use level::Grid;
pub use world::{RunState, World};
