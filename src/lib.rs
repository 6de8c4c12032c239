// src/lib.rs

//! A monochrome virtual screen.
//!
//! A fixed-size 1-bit framebuffer ([`Bitmap`]) is presented on a window,
//! each virtual pixel scaled to a `px_size × px_size` square of real pixels.
//! [`DisplaySession`] owns the bitmap and drives a [`DisplayBackend`]; the
//! first draw waits until the window is actually exposed.
//!
//! NB: "virtual pixels" (vpx) are cells of the bitmap, "real pixels" (rpx)
//! are pixels on the monitor.

pub mod bitmap;
pub mod config;
pub mod display;
pub mod rasterizer;

pub use bitmap::Bitmap;
pub use config::Config;
pub use display::{
    BackendError, DisplayBackend, DisplaySession, SessionError, SessionState, ValidationError,
};
pub use rasterizer::{extract_rects, Rect};
