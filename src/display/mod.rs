// src/display/mod.rs
//! Presentation of the virtual screen.
//!
//! - DisplayBackend: windowing primitives (Xlib, mock)
//! - DisplaySession: bitmap ownership and the first-expose state machine
//! - Errors: validation, backend and session failures

pub mod backend;
pub mod drivers;
pub mod error;
pub mod session;

pub use backend::{
    BackendEvent, ContextHandle, DisplayBackend, EventMask, Pixel, Screen, WindowHandle,
};
pub use error::{BackendError, SessionError, ValidationError};
pub use session::{DisplaySession, SessionState};
