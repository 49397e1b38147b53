//! Errors raised while assembling emotes.

use thiserror::Error;

/// Validation failures from [`crate::EmoteBuilder::build`] and easing lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("endTick must be bigger than 0, got {0}")]
    InvalidEndTick(i32),
    #[error("return tick ({return_tick}) has to be between 0 and endTick ({end_tick})")]
    InvalidReturnTick { return_tick: i32, end_tick: i32 },
    #[error("unknown easing: {0}")]
    UnknownEasing(String),
    #[error("unknown easing id: {0}")]
    UnknownEasingId(u8),
}

pub type Result<T> = std::result::Result<T, ModelError>;
