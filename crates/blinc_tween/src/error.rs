//! Tween error types

use thiserror::Error;

/// Errors surfaced by configuration and lookup APIs.
///
/// The tween lifecycle itself never fails: bad numeric input is coerced and
/// logged instead (see [`crate::value::parse_endpoint`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TweenError {
    /// No easing function is registered under this name
    #[error("Unknown easing function: {0}")]
    UnknownEasing(String),

    /// Frame rate must be at least 1
    #[error("Invalid frame rate: {0} fps")]
    InvalidFrameRate(u32),

    /// The process-wide clock was already installed or created
    #[error("Global tween clock already initialized")]
    ClockAlreadyInitialized,
}

/// Result type for tween operations
pub type Result<T> = std::result::Result<T, TweenError>;
