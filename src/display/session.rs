// src/display/session.rs
//! DisplaySession - owns the bitmap and drives a DisplayBackend.

use crate::bitmap::Bitmap;
use crate::config::ScreenConfig;
use crate::display::backend::{
    BackendEvent, ContextHandle, DisplayBackend, EventMask, WindowHandle,
};
use crate::display::error::{SessionError, ValidationError};
use crate::rasterizer::extract_rects;
use log::{debug, info, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

/// Largest window extent, in real pixels, along either axis. Rectangle
/// coordinates travel as signed 16-bit values on the X protocol.
pub const MAX_WINDOW_EXTENT: u64 = i16::MAX as u64;

/// Sleep between non-blocking polls while a bounded expose wait is pending.
const EXPOSE_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Presentation state of a session.
///
/// A session value only exists once construction succeeded, so there is no
/// uninitialized state. `Ready` is never left except for `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Window is mapped but the backend has not reported it visible yet.
    AwaitingFirstExpose,
    /// At least one expose event was seen; draws go straight to the backend.
    Ready,
    /// Backend resources were released.
    Closed,
}

struct Surface<C> {
    connection: C,
    window: WindowHandle,
    context: ContextHandle,
}

/// A monochrome virtual screen presented through a [`DisplayBackend`].
pub struct DisplaySession<B: DisplayBackend> {
    backend: B,
    surface: Option<Surface<B::Connection>>,
    bitmap: Bitmap,
    px_size: u16,
    window_width: u32,
    window_height: u32,
    state: SessionState,
    expose_timeout: Option<Duration>,
}

impl<B: DisplayBackend> DisplaySession<B> {
    /// Validates the geometry, then opens a window of
    /// `width * px_size × height * px_size` real pixels on `backend`.
    ///
    /// Geometry errors are reported before the backend is touched. If a
    /// backend step fails after the connection is open, the connection is
    /// released before the error is returned.
    pub fn new(
        mut backend: B,
        width: usize,
        height: usize,
        px_size: usize,
    ) -> Result<Self, SessionError> {
        let (px, window_width, window_height) = window_extent(width, height, px_size)?;
        let bitmap = Bitmap::new(width, height)?;

        info!(
            "DisplaySession: opening {}x{} vpx screen, px_size={} ({}x{} rpx)",
            width, height, px_size, window_width, window_height
        );

        let connection = backend.open_connection()?;
        let (window, context) =
            match create_surface(&mut backend, &connection, window_width, window_height) {
                Ok(handles) => handles,
                Err(e) => {
                    warn!("DisplaySession: surface creation failed, disconnecting: {}", e);
                    backend.disconnect(connection);
                    return Err(e);
                }
            };
        debug!(
            "DisplaySession: window {:?} mapped with context {:?}, awaiting first expose",
            window, context
        );

        Ok(Self {
            backend,
            surface: Some(Surface {
                connection,
                window,
                context,
            }),
            bitmap,
            px_size: px,
            window_width,
            window_height,
            state: SessionState::AwaitingFirstExpose,
            expose_timeout: None,
        })
    }

    /// Builds a session from the `screen` section of the configuration.
    pub fn from_config(backend: B, config: &ScreenConfig) -> Result<Self, SessionError> {
        let session = Self::new(backend, config.width, config.height, config.px_size)?;
        Ok(session.with_expose_timeout(config.expose_timeout()))
    }

    /// Bounds the wait for the first expose event. `None` waits forever.
    pub fn with_expose_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.expose_timeout = timeout;
        self
    }

    /// Presents the bitmap.
    ///
    /// The first call blocks until the backend reports the window exposed,
    /// discarding every other event received meanwhile. With an expose
    /// timeout configured, the wait gives up with
    /// [`SessionError::ExposeTimeout`] and the next call waits again.
    pub fn draw(&mut self) -> Result<(), SessionError> {
        let Some(surface) = self.surface.as_ref() else {
            warn!("DisplaySession: draw called on a closed session, ignoring");
            return Ok(());
        };

        let rects = extract_rects(&self.bitmap, self.px_size);

        if self.state == SessionState::AwaitingFirstExpose {
            wait_for_expose(&mut self.backend, &surface.connection, self.expose_timeout)?;
            self.state = SessionState::Ready;
            debug!("DisplaySession: first expose received, session ready");
        }

        trace!("DisplaySession: filling {} rectangles", rects.len());
        self.backend
            .fill_rectangles(&surface.connection, surface.window, surface.context, &rects)?;
        self.backend.flush(&surface.connection)?;
        Ok(())
    }

    /// Zeroes the bitmap and wipes the whole window to its background.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.bitmap.clear();

        let Some(surface) = self.surface.as_ref() else {
            warn!("DisplaySession: clear called on a closed session, ignoring");
            return Ok(());
        };
        self.backend.clear_area(
            &surface.connection,
            surface.window,
            0,
            0,
            self.window_width,
            self.window_height,
        )?;
        self.backend.flush(&surface.connection)?;
        Ok(())
    }

    /// Disconnects from the backend. Safe to call more than once.
    pub fn destroy(&mut self) {
        match self.surface.take() {
            Some(surface) => {
                info!("DisplaySession: closing window {:?}", surface.window);
                self.backend.disconnect(surface.connection);
                self.state = SessionState::Closed;
            }
            None => debug!("DisplaySession: already closed"),
        }
    }

    /// Toggles a virtual pixel. See [`Bitmap::set_pixel`].
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        self.bitmap.set_pixel(x, y);
    }

    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.bitmap.get_pixel(x, y)
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bitmap
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Width in virtual pixels.
    pub fn width(&self) -> usize {
        self.bitmap.width()
    }

    /// Height in virtual pixels.
    pub fn height(&self) -> usize {
        self.bitmap.height()
    }

    pub fn px_size(&self) -> u32 {
        u32::from(self.px_size)
    }

    /// Window size in real pixels.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn expose_timeout(&self) -> Option<Duration> {
        self.expose_timeout
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: DisplayBackend> Drop for DisplaySession<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Checks the real-pixel window size and returns it with the narrowed
/// pixel size. A single virtual pixel larger than the limit is rejected even
/// when the screen itself is empty.
fn window_extent(
    width: usize,
    height: usize,
    px_size: usize,
) -> Result<(u16, u32, u32), ValidationError> {
    if px_size == 0 {
        return Err(ValidationError::ZeroPixelSize);
    }
    let px = px_size as u64;
    let w = (width as u64).saturating_mul(px);
    let h = (height as u64).saturating_mul(px);
    if px > MAX_WINDOW_EXTENT || w > MAX_WINDOW_EXTENT || h > MAX_WINDOW_EXTENT {
        return Err(ValidationError::WindowTooLarge {
            width: w.max(px),
            height: h.max(px),
            max: MAX_WINDOW_EXTENT,
        });
    }
    // All three are at most i16::MAX here.
    Ok((px as u16, w as u32, h as u32))
}

fn create_surface<B: DisplayBackend>(
    backend: &mut B,
    conn: &B::Connection,
    width: u32,
    height: u32,
) -> Result<(WindowHandle, ContextHandle), SessionError> {
    let screen = backend.default_screen(conn);
    let context = backend.create_drawing_context(conn, screen.root, screen.black_pixel)?;
    let window = backend.create_window(
        conn,
        &screen,
        0,
        0,
        width,
        height,
        screen.white_pixel,
        EventMask::EXPOSURE,
    )?;
    backend.map_window(conn, window)?;
    backend.flush(conn)?;
    Ok((window, context))
}

fn wait_for_expose<B: DisplayBackend>(
    backend: &mut B,
    conn: &B::Connection,
    timeout: Option<Duration>,
) -> Result<(), SessionError> {
    let Some(timeout) = timeout else {
        return block_for_expose(backend, conn);
    };
    // A timeout too large to put on the clock is treated as no timeout.
    let Some(deadline) = Instant::now().checked_add(timeout) else {
        debug!("DisplaySession: expose timeout {:?} is unbounded, blocking", timeout);
        return block_for_expose(backend, conn);
    };

    loop {
        while let Some(event) = backend.poll_for_event(conn)? {
            if is_first_expose(&event) {
                return Ok(());
            }
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(SessionError::ExposeTimeout(timeout));
        }
        thread::sleep(EXPOSE_POLL_INTERVAL.min(deadline - now));
    }
}

fn block_for_expose<B: DisplayBackend>(
    backend: &mut B,
    conn: &B::Connection,
) -> Result<(), SessionError> {
    loop {
        let event = backend.wait_for_event(conn)?;
        if is_first_expose(&event) {
            return Ok(());
        }
    }
}

/// Logs `event` and reports whether it ends the first-expose wait.
fn is_first_expose(event: &BackendEvent) -> bool {
    match *event {
        BackendEvent::Expose {
            x,
            y,
            width,
            height,
            count,
        } => {
            debug!(
                "DisplaySession: first expose {}x{} at ({}, {}), {} more queued",
                width, height, x, y, count
            );
            true
        }
        _ => {
            trace!("DisplaySession: discarding {:?} before first expose", event);
            false
        }
    }
}
