// src/display/drivers/mock.rs

//! Recording display backend for tests.
//!
//! Every trait call is appended to a [`CallLog`] that outlives the session,
//! so tests can inspect what was sent even after the session is dropped.
//! Events come from a scripted queue first, then from an optional channel
//! feed. With neither available, waiting reports a lost connection instead
//! of hanging.

use crate::display::backend::{
    BackendEvent, ContextHandle, DisplayBackend, EventMask, Pixel, Screen, WindowHandle,
};
use crate::display::error::BackendError;
use crate::rasterizer::Rect;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};

pub const MOCK_ROOT_WINDOW: WindowHandle = WindowHandle(1);
pub const MOCK_BLACK_PIXEL: Pixel = Pixel(0x000000);
pub const MOCK_WHITE_PIXEL: Pixel = Pixel(0xffffff);

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    OpenConnection,
    DefaultScreen,
    CreateWindow {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        background: Pixel,
        event_mask: EventMask,
    },
    MapWindow(WindowHandle),
    CreateDrawingContext {
        drawable: WindowHandle,
        foreground: Pixel,
    },
    FillRectangles {
        window: WindowHandle,
        context: ContextHandle,
        rects: Vec<Rect>,
    },
    ClearArea {
        window: WindowHandle,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Flush,
    WaitForEvent,
    PollForEvent,
    Disconnect,
}

/// Shared handle to the calls recorded by a [`MockBackend`].
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<BackendCall>>>);

impl CallLog {
    fn lock(&self) -> MutexGuard<'_, Vec<BackendCall>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: BackendCall) {
        self.lock().push(call);
    }

    /// Snapshot of every call so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.lock().iter().filter(|c| pred(c)).count()
    }

    /// Rectangle batches submitted so far, in order.
    pub fn fills(&self) -> Vec<Vec<Rect>> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                BackendCall::FillRectangles { rects, .. } => Some(rects.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Connection token handed out by [`MockBackend`].
#[derive(Debug)]
pub struct MockConnection {
    id: u32,
}

impl MockConnection {
    pub fn id(&self) -> u32 {
        self.id
    }
}

pub struct MockBackend {
    log: CallLog,
    events: VecDeque<BackendEvent>,
    feed: Option<Receiver<BackendEvent>>,
    fail_connection: bool,
    next_id: u32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            events: VecDeque::new(),
            feed: None,
            fail_connection: false,
            next_id: 2,
        }
    }

    /// A backend whose blocking waits read from `feed` once the scripted
    /// queue is drained.
    pub fn with_event_feed(feed: Receiver<BackendEvent>) -> Self {
        Self {
            feed: Some(feed),
            ..Self::new()
        }
    }

    /// A backend that refuses every connection attempt.
    pub fn failing_connection() -> Self {
        Self {
            fail_connection: true,
            ..Self::new()
        }
    }

    pub fn push_event(&mut self, event: BackendEvent) {
        self.events.push_back(event);
    }

    /// Number of scripted events not consumed yet.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for MockBackend {
    type Connection = MockConnection;

    fn open_connection(&mut self) -> Result<MockConnection, BackendError> {
        self.log.record(BackendCall::OpenConnection);
        if self.fail_connection {
            return Err(BackendError::ConnectionFailed(
                "mock backend configured to refuse connections".to_string(),
            ));
        }
        let id = self.next_id();
        Ok(MockConnection { id })
    }

    fn default_screen(&mut self, _conn: &MockConnection) -> Screen {
        self.log.record(BackendCall::DefaultScreen);
        Screen {
            root: MOCK_ROOT_WINDOW,
            root_depth: 24,
            root_visual: 0x21,
            black_pixel: MOCK_BLACK_PIXEL,
            white_pixel: MOCK_WHITE_PIXEL,
        }
    }

    fn create_window(
        &mut self,
        _conn: &MockConnection,
        _screen: &Screen,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        background: Pixel,
        event_mask: EventMask,
    ) -> Result<WindowHandle, BackendError> {
        self.log.record(BackendCall::CreateWindow {
            x,
            y,
            width,
            height,
            background,
            event_mask,
        });
        Ok(WindowHandle(self.next_id() as u64))
    }

    fn map_window(
        &mut self,
        _conn: &MockConnection,
        window: WindowHandle,
    ) -> Result<(), BackendError> {
        self.log.record(BackendCall::MapWindow(window));
        Ok(())
    }

    fn create_drawing_context(
        &mut self,
        _conn: &MockConnection,
        drawable: WindowHandle,
        foreground: Pixel,
    ) -> Result<ContextHandle, BackendError> {
        self.log.record(BackendCall::CreateDrawingContext {
            drawable,
            foreground,
        });
        Ok(ContextHandle(self.next_id()))
    }

    fn fill_rectangles(
        &mut self,
        _conn: &MockConnection,
        window: WindowHandle,
        context: ContextHandle,
        rects: &[Rect],
    ) -> Result<(), BackendError> {
        self.log.record(BackendCall::FillRectangles {
            window,
            context,
            rects: rects.to_vec(),
        });
        Ok(())
    }

    fn clear_area(
        &mut self,
        _conn: &MockConnection,
        window: WindowHandle,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        self.log.record(BackendCall::ClearArea {
            window,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn flush(&mut self, _conn: &MockConnection) -> Result<(), BackendError> {
        self.log.record(BackendCall::Flush);
        Ok(())
    }

    fn wait_for_event(&mut self, _conn: &MockConnection) -> Result<BackendEvent, BackendError> {
        self.log.record(BackendCall::WaitForEvent);
        if let Some(event) = self.events.pop_front() {
            return Ok(event);
        }
        match &self.feed {
            Some(feed) => feed.recv().map_err(|_| BackendError::ConnectionLost),
            None => Err(BackendError::ConnectionLost),
        }
    }

    fn poll_for_event(
        &mut self,
        _conn: &MockConnection,
    ) -> Result<Option<BackendEvent>, BackendError> {
        self.log.record(BackendCall::PollForEvent);
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }
        match &self.feed {
            Some(feed) => match feed.try_recv() {
                Ok(event) => Ok(Some(event)),
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => Err(BackendError::ConnectionLost),
            },
            None => Ok(None),
        }
    }

    fn disconnect(&mut self, _conn: MockConnection) {
        self.log.record(BackendCall::Disconnect);
    }
}
