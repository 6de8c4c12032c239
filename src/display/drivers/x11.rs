// src/display/drivers/x11.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

//! Xlib implementation of [`DisplayBackend`].
//!
//! One connection per session. Drawing contexts are owned by the backend
//! and freed when the connection is handed back to `disconnect`; the display
//! itself is closed when the connection is dropped.

use crate::display::backend::{
    BackendEvent, ContextHandle, DisplayBackend, EventMask, Pixel, Screen, WindowHandle,
};
use crate::display::error::BackendError;
use crate::rasterizer::Rect;
use log::{debug, info, trace, warn};
use std::mem;
use std::ptr;

// X11 library imports
use libc::{c_int, c_uint, c_ulong};
use x11::xlib;

/// Owns an Xlib `Display` pointer and closes it on drop.
#[derive(Debug)]
struct ManagedDisplay {
    ptr: *mut xlib::Display,
}

impl ManagedDisplay {
    /// Opens the display named by the `DISPLAY` environment variable.
    fn open() -> Result<Self, BackendError> {
        let display_ptr = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display_ptr.is_null() {
            return Err(BackendError::ConnectionFailed(
                "XOpenDisplay returned null. Check DISPLAY environment variable or X server status."
                    .to_string(),
            ));
        }
        debug!("X display opened: {:p}", display_ptr);
        Ok(Self { ptr: display_ptr })
    }

    #[inline]
    fn raw(&self) -> *mut xlib::Display {
        self.ptr
    }
}

impl Drop for ManagedDisplay {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        info!("Closing X11 display connection: {:p}", self.ptr);
        let status = unsafe { xlib::XCloseDisplay(self.ptr) };
        if status != 0 {
            warn!(
                "XCloseDisplay returned non-zero status: {}. Display may not have closed cleanly.",
                status
            );
        }
    }
}

/// An open Xlib connection and its default screen number.
#[derive(Debug)]
pub struct XlibConnection {
    display: ManagedDisplay,
    screen: c_int,
}

impl XlibConnection {
    #[inline]
    fn display(&self) -> *mut xlib::Display {
        self.display.raw()
    }
}

/// Xlib display backend.
#[derive(Debug, Default)]
pub struct XlibBackend {
    contexts: Vec<xlib::GC>,
}

impl XlibBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn gc(&self, context: ContextHandle) -> Result<xlib::GC, BackendError> {
        self.contexts
            .get(context.0 as usize)
            .copied()
            .ok_or(BackendError::UnknownContext(context.0))
    }

    fn translate_event(event: &xlib::XEvent) -> BackendEvent {
        match event.get_type() {
            xlib::Expose => {
                let expose: xlib::XExposeEvent = unsafe { event.expose };
                BackendEvent::Expose {
                    x: expose.x,
                    y: expose.y,
                    width: expose.width as u32,
                    height: expose.height as u32,
                    count: expose.count as u32,
                }
            }
            xlib::MapNotify => BackendEvent::Map,
            kind => BackendEvent::Other { kind },
        }
    }
}

fn to_x_event_mask(mask: EventMask) -> libc::c_long {
    let mut x_mask = xlib::NoEventMask;
    if mask.contains(EventMask::EXPOSURE) {
        x_mask |= xlib::ExposureMask;
    }
    x_mask
}

fn to_x_rectangle(rect: &Rect) -> Result<xlib::XRectangle, BackendError> {
    let out_of_range = || BackendError::RectOutOfRange(format!("{:?}", rect));
    Ok(xlib::XRectangle {
        x: i16::try_from(rect.x).map_err(|_| out_of_range())?,
        y: i16::try_from(rect.y).map_err(|_| out_of_range())?,
        width: u16::try_from(rect.width).map_err(|_| out_of_range())?,
        height: u16::try_from(rect.height).map_err(|_| out_of_range())?,
    })
}

impl DisplayBackend for XlibBackend {
    type Connection = XlibConnection;

    fn open_connection(&mut self) -> Result<XlibConnection, BackendError> {
        info!("Establishing X11 server connection.");
        let display = ManagedDisplay::open()?;
        let screen = unsafe { xlib::XDefaultScreen(display.raw()) };
        debug!("Default screen number: {}", screen);
        Ok(XlibConnection { display, screen })
    }

    fn default_screen(&mut self, conn: &XlibConnection) -> Screen {
        let display = conn.display();
        let screen = conn.screen;
        // SAFETY: display is open for the lifetime of conn and screen came from it.
        unsafe {
            Screen {
                root: WindowHandle(xlib::XRootWindow(display, screen) as u64),
                root_depth: xlib::XDefaultDepth(display, screen) as u8,
                root_visual: xlib::XVisualIDFromVisual(xlib::XDefaultVisual(display, screen))
                    as u64,
                black_pixel: Pixel(xlib::XBlackPixel(display, screen) as u64),
                white_pixel: Pixel(xlib::XWhitePixel(display, screen) as u64),
            }
        }
    }

    fn create_window(
        &mut self,
        conn: &XlibConnection,
        screen: &Screen,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        background: Pixel,
        event_mask: EventMask,
    ) -> Result<WindowHandle, BackendError> {
        let display = conn.display();
        let window_id = unsafe {
            let mut attributes: xlib::XSetWindowAttributes = mem::zeroed();
            attributes.background_pixel = background.0 as c_ulong;
            attributes.event_mask = to_x_event_mask(event_mask);

            xlib::XCreateWindow(
                display,
                screen.root.0 as xlib::Window,
                x as c_int,
                y as c_int,
                width as c_uint,
                height as c_uint,
                0, // border width
                screen.root_depth as c_int,
                xlib::InputOutput as c_uint,
                xlib::XDefaultVisual(display, conn.screen),
                xlib::CWBackPixel | xlib::CWEventMask,
                &mut attributes,
            )
        };
        if window_id == 0 {
            return Err(BackendError::WindowCreationFailed(
                "XCreateWindow returned 0".to_string(),
            ));
        }
        debug!(
            "X window created (ID: {}), size: {}x{}px",
            window_id, width, height
        );
        Ok(WindowHandle(window_id as u64))
    }

    fn map_window(
        &mut self,
        conn: &XlibConnection,
        window: WindowHandle,
    ) -> Result<(), BackendError> {
        unsafe {
            xlib::XMapWindow(conn.display(), window.0 as xlib::Window);
        }
        debug!("X window {} mapped", window.0);
        Ok(())
    }

    fn create_drawing_context(
        &mut self,
        conn: &XlibConnection,
        drawable: WindowHandle,
        foreground: Pixel,
    ) -> Result<ContextHandle, BackendError> {
        let gc = unsafe {
            let mut values: xlib::XGCValues = mem::zeroed();
            values.foreground = foreground.0 as c_ulong;
            values.graphics_exposures = xlib::False;
            xlib::XCreateGC(
                conn.display(),
                drawable.0 as xlib::Drawable,
                (xlib::GCForeground | xlib::GCGraphicsExposures) as c_ulong,
                &mut values,
            )
        };
        if gc.is_null() {
            return Err(BackendError::ContextCreationFailed(
                "XCreateGC returned null".to_string(),
            ));
        }
        let handle = ContextHandle(self.contexts.len() as u32);
        self.contexts.push(gc);
        debug!(
            "Graphics Context {:?} created (foreground pixel {})",
            handle, foreground.0
        );
        Ok(handle)
    }

    fn fill_rectangles(
        &mut self,
        conn: &XlibConnection,
        window: WindowHandle,
        context: ContextHandle,
        rects: &[Rect],
    ) -> Result<(), BackendError> {
        let gc = self.gc(context)?;
        let mut x_rects = rects
            .iter()
            .map(to_x_rectangle)
            .collect::<Result<Vec<_>, _>>()?;
        if x_rects.is_empty() {
            return Ok(());
        }
        trace!("XFillRectangles: {} rectangles", x_rects.len());
        unsafe {
            xlib::XFillRectangles(
                conn.display(),
                window.0 as xlib::Drawable,
                gc,
                x_rects.as_mut_ptr(),
                x_rects.len() as c_int,
            );
        }
        Ok(())
    }

    fn clear_area(
        &mut self,
        conn: &XlibConnection,
        window: WindowHandle,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        unsafe {
            xlib::XClearArea(
                conn.display(),
                window.0 as xlib::Window,
                x as c_int,
                y as c_int,
                width as c_uint,
                height as c_uint,
                xlib::False,
            );
        }
        Ok(())
    }

    fn flush(&mut self, conn: &XlibConnection) -> Result<(), BackendError> {
        unsafe {
            xlib::XFlush(conn.display());
        }
        Ok(())
    }

    fn wait_for_event(&mut self, conn: &XlibConnection) -> Result<BackendEvent, BackendError> {
        let mut event: xlib::XEvent = unsafe { mem::zeroed() };
        unsafe {
            xlib::XNextEvent(conn.display(), &mut event);
        }
        Ok(Self::translate_event(&event))
    }

    fn poll_for_event(
        &mut self,
        conn: &XlibConnection,
    ) -> Result<Option<BackendEvent>, BackendError> {
        if unsafe { xlib::XPending(conn.display()) } <= 0 {
            return Ok(None);
        }
        self.wait_for_event(conn).map(Some)
    }

    fn disconnect(&mut self, conn: XlibConnection) {
        for gc in self.contexts.drain(..) {
            unsafe {
                xlib::XFreeGC(conn.display(), gc);
            }
        }
        // ManagedDisplay's Drop closes the display.
        drop(conn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_mask_maps_to_xlib_bits() {
        assert_eq!(to_x_event_mask(EventMask::empty()), xlib::NoEventMask);
        assert_eq!(to_x_event_mask(EventMask::EXPOSURE), xlib::ExposureMask);
    }

    #[test]
    fn rect_within_the_protocol_range_converts() {
        let rect = Rect::new(-4, i16::MAX as i32, 10, u16::MAX as u32);
        let x_rect = to_x_rectangle(&rect).unwrap();
        assert_eq!(
            (x_rect.x, x_rect.y, x_rect.width, x_rect.height),
            (-4, i16::MAX, 10, u16::MAX)
        );
    }

    #[test]
    fn rect_outside_the_protocol_range_is_rejected() {
        for rect in [
            Rect::new(i16::MAX as i32 + 1, 0, 1, 1),
            Rect::new(0, i16::MIN as i32 - 1, 1, 1),
            Rect::new(0, 0, u16::MAX as u32 + 1, 1),
            Rect::new(0, 0, 1, u32::MAX),
        ] {
            assert!(
                matches!(to_x_rectangle(&rect), Err(BackendError::RectOutOfRange(_))),
                "{rect:?}"
            );
        }
    }

    #[test]
    fn unknown_context_is_reported() {
        let backend = XlibBackend::new();
        assert_eq!(
            backend.gc(ContextHandle(0)).err(),
            Some(BackendError::UnknownContext(0))
        );
    }
}
