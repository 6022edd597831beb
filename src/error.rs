use thiserror::Error;

/// Rejected maze parameters. Raised before any carving happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("maze must be at least 5x5, got {width}x{height}")]
    MazeTooSmall { width: usize, height: usize },

    #[error("complexity {complexity} and density {density} carve nothing on this grid")]
    NoCarving { complexity: f32, density: f32 },

    #[error("generated maze has no floor cells")]
    NoFloor,

    #[error("chase probability must be within 0..=1, got {0}")]
    ChaseProbability(f64),
}
