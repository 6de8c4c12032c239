// src/bitmap.rs

//! Packed 1-bit-per-pixel framebuffer.
//!
//! Pixels are stored row-major, eight to a byte: virtual pixel `(x, y)` lives
//! in bit `x % 8` of byte `(x + width * y) / 8`. Both dimensions are multiples
//! of 8, so every byte holds exactly eight pixels of a single row.

use crate::display::error::ValidationError;

/// Number of pixels packed into one storage byte.
pub const PIXELS_PER_BYTE: usize = 8;

/// A fixed-size monochrome bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    bits: Box<[u8]>,
}

impl Bitmap {
    /// Allocates a zero-filled bitmap of `width × height` virtual pixels.
    ///
    /// Fails if either dimension is zero or not a multiple of 8, or if the
    /// pixel count does not fit in `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, ValidationError> {
        if width == 0 || height == 0 {
            return Err(ValidationError::EmptyDimensions { width, height });
        }
        if width % PIXELS_PER_BYTE != 0 || height % PIXELS_PER_BYTE != 0 {
            return Err(ValidationError::NotMultipleOf8 { width, height });
        }
        let len = width
            .checked_mul(height)
            .ok_or(ValidationError::TooManyPixels { width, height })?
            / PIXELS_PER_BYTE;
        Ok(Self {
            width,
            height,
            bits: vec![0u8; len].into_boxed_slice(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Packed storage, `width * height / 8` bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Toggles the pixel at `(x, y)`. Out-of-range coordinates are ignored.
    ///
    /// This is an XOR, not a set: drawing the same shape twice erases it.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        if let Some((byte, mask)) = self.locate(x, y) {
            self.bits[byte] ^= mask;
        }
    }

    /// Reads the pixel at `(x, y)`. Out-of-range coordinates read as unset.
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.locate(x, y)
            .is_some_and(|(byte, mask)| self.bits[byte] & mask != 0)
    }

    /// Zeroes every pixel.
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterates the coordinates of set pixels in increasing linear-index order.
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != 0)
            .flat_map(move |(j, &byte)| {
                (0..PIXELS_PER_BYTE)
                    .filter(move |i| byte & (1 << i) != 0)
                    .map(move |i| {
                        let index = j * PIXELS_PER_BYTE + i;
                        (index % width, index / width)
                    })
            })
    }

    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let byte = (x + self.width * y) / PIXELS_PER_BYTE;
        let mask = 1u8 << (x % PIXELS_PER_BYTE);
        Some((byte, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bitmap_is_zero_filled_with_packed_length() {
        let bitmap = Bitmap::new(16, 8).unwrap();
        assert_eq!(bitmap.as_bytes().len(), 16);
        assert!(bitmap.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_dimensions_that_are_not_multiples_of_8() {
        assert_eq!(
            Bitmap::new(7, 8),
            Err(ValidationError::NotMultipleOf8 { width: 7, height: 8 })
        );
        assert_eq!(
            Bitmap::new(8, 12),
            Err(ValidationError::NotMultipleOf8 { width: 8, height: 12 })
        );
        assert_eq!(
            Bitmap::new(0, 8),
            Err(ValidationError::EmptyDimensions { width: 0, height: 8 })
        );
    }

    #[test]
    fn rejects_dimensions_whose_pixel_count_overflows() {
        let side = usize::MAX - 7;
        assert_eq!(
            Bitmap::new(side, 16),
            Err(ValidationError::TooManyPixels {
                width: side,
                height: 16
            })
        );
    }

    #[test]
    fn set_pixel_flips_the_addressed_bit() {
        let mut bitmap = Bitmap::new(16, 8).unwrap();
        bitmap.set_pixel(3, 0);
        bitmap.set_pixel(9, 1);
        // (3, 0) -> byte 0, bit 3. (9, 1) -> index 25 -> byte 3, bit 1.
        assert_eq!(bitmap.as_bytes()[0], 0b0000_1000);
        assert_eq!(bitmap.as_bytes()[3], 0b0000_0010);
        assert!(bitmap.get_pixel(3, 0));
        assert!(bitmap.get_pixel(9, 1));
        assert!(!bitmap.get_pixel(4, 0));
    }

    #[test]
    fn toggling_twice_restores_every_byte() {
        let mut bitmap = Bitmap::new(24, 16).unwrap();
        bitmap.set_pixel(1, 1);
        bitmap.set_pixel(20, 15);
        for y in 0..16 {
            for x in 0..24 {
                let before = bitmap.clone();
                bitmap.set_pixel(x, y);
                assert_ne!(bitmap, before);
                bitmap.set_pixel(x, y);
                assert_eq!(bitmap.as_bytes(), before.as_bytes(), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn out_of_range_coordinates_are_ignored() {
        let mut bitmap = Bitmap::new(8, 8).unwrap();
        bitmap.set_pixel(2, 2);
        let before = bitmap.clone();
        for (x, y) in [(8, 0), (0, 8), (8, 8), (100, 3), (3, usize::MAX)] {
            bitmap.set_pixel(x, y);
            assert!(!bitmap.get_pixel(x, y));
        }
        assert_eq!(bitmap, before);
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut bitmap = Bitmap::new(8, 16).unwrap();
        bitmap.set_pixel(0, 0);
        bitmap.set_pixel(7, 15);
        assert_eq!(bitmap.count_set(), 2);
        bitmap.clear();
        assert_eq!(bitmap.count_set(), 0);
        assert!(bitmap.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn iter_set_walks_in_linear_index_order() {
        let mut bitmap = Bitmap::new(16, 8).unwrap();
        bitmap.set_pixel(5, 2);
        bitmap.set_pixel(15, 0);
        bitmap.set_pixel(0, 7);
        bitmap.set_pixel(2, 2);
        let set: Vec<_> = bitmap.iter_set().collect();
        assert_eq!(set, vec![(15, 0), (2, 2), (5, 2), (0, 7)]);
    }
}
