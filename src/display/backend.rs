// src/display/backend.rs
//! DisplayBackend trait - the narrow set of windowing primitives the session needs.
//!
//! The session never talks to a windowing system directly. Everything it
//! needs (a connection, one window, one drawing context, rectangle fills,
//! area clears, flushes and a blocking event pump) goes through this trait,
//! so a real binding and a recording test double are interchangeable.
//!
//! ## Lifecycle
//! 1. `open_connection()` - connect to the display server
//! 2. `default_screen()` / `create_drawing_context()` / `create_window()` / `map_window()`
//! 3. `fill_rectangles()` / `clear_area()` / `flush()` / event pumping, any number of times
//! 4. `disconnect()` - consumes the connection and releases everything created on it

use crate::display::error::BackendError;
use crate::rasterizer::Rect;
use bitflags::bitflags;

/// Backend-assigned window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Backend-assigned drawing context identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub u32);

/// A colour value in the screen's native pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel(pub u64);

/// Properties of the default screen of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub root: WindowHandle,
    pub root_depth: u8,
    pub root_visual: u64,
    pub black_pixel: Pixel,
    pub white_pixel: Pixel,
}

bitflags! {
    /// Events a window asks the backend to deliver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const EXPOSURE = 1 << 0;
    }
}

/// Events delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Part of the window became visible and can receive drawing.
    Expose {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        /// Number of expose events still queued behind this one.
        count: u32,
    },
    /// Window was mapped.
    Map,
    /// Any other native event, identified by its native type code.
    Other { kind: i32 },
}

/// Windowing primitives consumed by [`DisplaySession`](super::DisplaySession).
///
/// A connection is an associated type so that each backend keeps whatever
/// native state it needs; it is handed back to `disconnect` by value, which
/// makes double release unrepresentable.
pub trait DisplayBackend {
    type Connection;

    fn open_connection(&mut self) -> Result<Self::Connection, BackendError>;

    fn default_screen(&mut self, conn: &Self::Connection) -> Screen;

    #[allow(clippy::too_many_arguments)]
    fn create_window(
        &mut self,
        conn: &Self::Connection,
        screen: &Screen,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        background: Pixel,
        event_mask: EventMask,
    ) -> Result<WindowHandle, BackendError>;

    fn map_window(&mut self, conn: &Self::Connection, window: WindowHandle)
        -> Result<(), BackendError>;

    /// Creates a drawing context on `drawable` with the given foreground.
    fn create_drawing_context(
        &mut self,
        conn: &Self::Connection,
        drawable: WindowHandle,
        foreground: Pixel,
    ) -> Result<ContextHandle, BackendError>;

    fn fill_rectangles(
        &mut self,
        conn: &Self::Connection,
        window: WindowHandle,
        context: ContextHandle,
        rects: &[Rect],
    ) -> Result<(), BackendError>;

    /// Clears an area of the window to its background, without generating
    /// expose events.
    fn clear_area(
        &mut self,
        conn: &Self::Connection,
        window: WindowHandle,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError>;

    fn flush(&mut self, conn: &Self::Connection) -> Result<(), BackendError>;

    /// Blocks until the next event arrives.
    fn wait_for_event(&mut self, conn: &Self::Connection) -> Result<BackendEvent, BackendError>;

    /// Returns the next queued event, if any, without blocking.
    fn poll_for_event(
        &mut self,
        conn: &Self::Connection,
    ) -> Result<Option<BackendEvent>, BackendError>;

    fn disconnect(&mut self, conn: Self::Connection);
}
