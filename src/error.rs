//! Configuration errors
//!
//! The simulation itself never fails at runtime; bad input is ignored. These
//! errors are raised only when settings or lanes are built.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Spacing is computed as distance / |speed|, so a still lane is undefined
    #[error("lane in row {row} has zero horizontal speed")]
    ZeroLaneSpeed { row: u32 },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
