// src/rasterizer.rs

//! Converts a [`Bitmap`] into the filled rectangles the backend draws.
//!
//! Every set virtual pixel becomes one `px_size × px_size` rectangle. No
//! run-length or region merging is done: the pass is a single linear scan of
//! the packed storage with no allocation beyond the output vector.

use crate::bitmap::Bitmap;

/// An axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Builds one rectangle per set pixel, ordered by linear bitmap index.
///
/// Device coordinates that would not fit an `i32` saturate at `i32::MAX`;
/// the session keeps its windows well below that.
pub fn extract_rects(bitmap: &Bitmap, px_size: u16) -> Vec<Rect> {
    let scale = |v: usize| {
        i32::try_from(v.saturating_mul(usize::from(px_size))).unwrap_or(i32::MAX)
    };
    let side = u32::from(px_size);
    let mut rects = Vec::with_capacity(bitmap.count_set());
    rects.extend(
        bitmap
            .iter_set()
            .map(|(vx, vy)| Rect::new(scale(vx), scale(vy), side, side)),
    );
    rects
}
