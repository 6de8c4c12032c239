// src/display/error.rs

use std::time::Duration;
use thiserror::Error;

/// Rejected screen geometry. Raised before any backend resource is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("screen dimensions {width}x{height} are not multiples of 8")]
    NotMultipleOf8 { width: usize, height: usize },
    #[error("screen dimensions {width}x{height} must be non-zero")]
    EmptyDimensions { width: usize, height: usize },
    #[error("screen of {width}x{height} pixels does not fit in memory")]
    TooManyPixels { width: usize, height: usize },
    #[error("pixel size must be at least 1")]
    ZeroPixelSize,
    #[error("window of {width}x{height} real pixels exceeds the backend limit of {max}")]
    WindowTooLarge { width: u64, height: u64, max: u64 },
}

/// Failures reported by a display backend. Fatal to the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("failed to connect to the display server: {0}")]
    ConnectionFailed(String),
    #[error("failed to create window: {0}")]
    WindowCreationFailed(String),
    #[error("failed to create drawing context: {0}")]
    ContextCreationFailed(String),
    #[error("rectangle {0} does not fit the backend coordinate space")]
    RectOutOfRange(String),
    #[error("unknown drawing context {0}")]
    UnknownContext(u32),
    #[error("connection to the display server was lost")]
    ConnectionLost,
}

/// Everything a [`DisplaySession`](super::DisplaySession) operation can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("no expose event arrived within {0:?}")]
    ExposeTimeout(Duration),
}
