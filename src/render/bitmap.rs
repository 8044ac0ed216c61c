//! Bitmap - dense pixel buffers and the compositing primitives
//!
//! Every operation returns a new bitmap. Dimension mismatches are errors,
//! never silently resized.

use thiserror::Error;

use super::pixel::{Grey, Pixel, Rgba};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DimensionError {
    #[error("Cannot join {axis}: {first} != {second}")]
    JoinMismatch {
        axis: &'static str,
        first: u32,
        second: u32,
    },

    #[error("Cannot overlay {0}x{1} with {2}x{3}")]
    OverlayMismatch(u32, u32, u32, u32),

    #[error("Bitmap {width}x{height} at ({x}, {y}) does not fit on {canvas_width}x{canvas_height} canvas")]
    OutOfBounds {
        width: u32,
        height: u32,
        x: u32,
        y: u32,
        canvas_width: u32,
        canvas_height: u32,
    },

    #[error("Pixel buffer holds {actual} pixels, {width}x{height} needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<P: Pixel> {
    width: u32,
    height: u32,
    pixels: Vec<P>,
}

pub type GreyBitmap = Bitmap<Grey>;
pub type RgbaBitmap = Bitmap<Rgba>;

impl<P: Pixel> Bitmap<P> {
    /// A blank canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![P::default(); width as usize * height as usize],
        }
    }

    /// Row-major pixels, `width * height` of them.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<P>) -> Result<Self, DimensionError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(DimensionError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Option<P> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Returns false when `(x, y)` is outside the bitmap.
    pub fn set(&mut self, x: u32, y: u32, pixel: P) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = self.index(x, y);
        self.pixels[i] = pixel;
        true
    }

    fn row(&self, y: u32) -> &[P] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Pixel-wise [`Pixel::overlay`], `self` on top.
    pub fn overlay(&self, other: &Self) -> Result<Self, DimensionError> {
        if self.width != other.width || self.height != other.height {
            return Err(DimensionError::OverlayMismatch(
                self.width,
                self.height,
                other.width,
                other.height,
            ));
        }
        let pixels = self
            .pixels
            .iter()
            .zip(&other.pixels)
            .map(|(a, b)| a.overlay(*b))
            .collect();
        Ok(Self { width: self.width, height: self.height, pixels })
    }

    /// `other` to the right of `self`.
    pub fn join_horizontally(&self, other: &Self) -> Result<Self, DimensionError> {
        if self.height != other.height {
            return Err(DimensionError::JoinMismatch {
                axis: "height",
                first: self.height,
                second: other.height,
            });
        }
        let width = self.width + other.width;
        let mut pixels = Vec::with_capacity(width as usize * self.height as usize);
        for y in 0..self.height {
            pixels.extend_from_slice(self.row(y));
            pixels.extend_from_slice(other.row(y));
        }
        Ok(Self { width, height: self.height, pixels })
    }

    /// `other` below `self`.
    pub fn join_vertically(&self, other: &Self) -> Result<Self, DimensionError> {
        if self.width != other.width {
            return Err(DimensionError::JoinMismatch {
                axis: "width",
                first: self.width,
                second: other.width,
            });
        }
        let mut pixels = Vec::with_capacity(self.pixels.len() + other.pixels.len());
        pixels.extend_from_slice(&self.pixels);
        pixels.extend_from_slice(&other.pixels);
        Ok(Self {
            width: self.width,
            height: self.height + other.height,
            pixels,
        })
    }

    /// Copy onto a blank canvas with the top-left corner at `(x, y)`.
    pub fn place_on_canvas(
        &self,
        canvas_width: u32,
        canvas_height: u32,
        x: u32,
        y: u32,
    ) -> Result<Self, DimensionError> {
        let fits = x.checked_add(self.width).is_some_and(|r| r <= canvas_width)
            && y.checked_add(self.height).is_some_and(|b| b <= canvas_height);
        if !fits {
            return Err(DimensionError::OutOfBounds {
                width: self.width,
                height: self.height,
                x,
                y,
                canvas_width,
                canvas_height,
            });
        }
        let mut canvas = Self::new(canvas_width, canvas_height);
        for row in 0..self.height {
            let start = canvas.index(x, y + row);
            canvas.pixels[start..start + self.width as usize].copy_from_slice(self.row(row));
        }
        Ok(canvas)
    }

    /// Copy onto a blank canvas, centred. Odd margins leave the extra pixel
    /// right and below.
    pub fn place_centered(
        &self,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<Self, DimensionError> {
        let x = canvas_width.saturating_sub(self.width) / 2;
        let y = canvas_height.saturating_sub(self.height) / 2;
        self.place_on_canvas(canvas_width, canvas_height, x, y)
    }

    /// Mirror horizontally.
    pub fn mirror(&self) -> Self {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for y in 0..self.height {
            pixels.extend(self.row(y).iter().rev());
        }
        Self { width: self.width, height: self.height, pixels }
    }

    pub fn rotate180(&self) -> Self {
        let pixels = self.pixels.iter().rev().copied().collect();
        Self { width: self.width, height: self.height, pixels }
    }

    pub fn invert(&self) -> Self {
        let pixels = self.pixels.iter().map(|p| p.invert()).collect();
        Self { width: self.width, height: self.height, pixels }
    }

    /// Raw interleaved channel bytes, row-major.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * P::CHANNELS);
        for pixel in &self.pixels {
            pixel.write_bytes(&mut out);
        }
        out
    }

    pub fn convert<Q: Pixel + From<P>>(&self) -> Bitmap<Q> {
        Bitmap {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|p| Q::from(*p)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey(width: u32, height: u32, values: &[u8]) -> GreyBitmap {
        Bitmap::from_pixels(width, height, values.iter().map(|v| Grey(*v)).collect()).unwrap()
    }

    fn values(bitmap: &GreyBitmap) -> Vec<u8> {
        bitmap.pixels().iter().map(|p| p.0).collect()
    }

    #[test]
    fn test_buffer_size_checked() {
        assert!(matches!(
            GreyBitmap::from_pixels(2, 2, vec![Grey(0); 3]),
            Err(DimensionError::BufferSize { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn test_overlay_max() {
        let a = grey(2, 1, &[100, 0]);
        let b = grey(2, 1, &[200, 50]);
        assert_eq!(values(&a.overlay(&b).unwrap()), vec![200, 50]);
        assert!(a.overlay(&grey(1, 1, &[0])).is_err());
    }

    #[test]
    fn test_join_horizontally() {
        let left = grey(1, 2, &[1, 2]);
        let right = grey(2, 2, &[3, 4, 5, 6]);
        let joined = left.join_horizontally(&right).unwrap();
        assert_eq!((joined.width(), joined.height()), (3, 2));
        assert_eq!(values(&joined), vec![1, 3, 4, 2, 5, 6]);
    }

    #[test]
    fn test_join_vertically_uses_other_height() {
        let top = grey(2, 1, &[1, 2]);
        let bottom = grey(2, 2, &[3, 4, 5, 6]);
        let joined = top.join_vertically(&bottom).unwrap();
        assert_eq!((joined.width(), joined.height()), (2, 3));
        assert_eq!(values(&joined), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_join_mismatch() {
        let a = grey(1, 2, &[0, 0]);
        let b = grey(1, 1, &[0]);
        assert_eq!(
            a.join_horizontally(&b).unwrap_err(),
            DimensionError::JoinMismatch { axis: "height", first: 2, second: 1 }
        );
        assert!(grey(2, 1, &[0, 0]).join_vertically(&b).is_err());
    }

    #[test]
    fn test_place_on_canvas() {
        let dot = grey(1, 1, &[9]);
        let placed = dot.place_on_canvas(3, 2, 2, 1).unwrap();
        assert_eq!(values(&placed), vec![0, 0, 0, 0, 0, 9]);
        assert!(matches!(
            dot.place_on_canvas(3, 2, 3, 0),
            Err(DimensionError::OutOfBounds { .. })
        ));
        assert!(grey(4, 1, &[0; 4]).place_centered(3, 3).is_err());
    }

    #[test]
    fn test_place_centered() {
        let dot = grey(1, 1, &[9]);
        let placed = dot.place_centered(3, 3).unwrap();
        assert_eq!(placed.get(1, 1), Some(Grey(9)));
    }

    #[test]
    fn test_mirror_and_rotate() {
        let b = grey(2, 2, &[1, 2, 3, 4]);
        assert_eq!(values(&b.mirror()), vec![2, 1, 4, 3]);
        assert_eq!(values(&b.rotate180()), vec![4, 3, 2, 1]);
        assert_eq!(values(&b.invert()), vec![254, 253, 252, 251]);
    }

    #[test]
    fn test_to_bytes_rgba() {
        let b: RgbaBitmap = grey(1, 1, &[5]).convert();
        assert_eq!(b.to_bytes(), vec![255, 255, 255, 5]);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut b = GreyBitmap::new(1, 1);
        assert!(!b.set(1, 0, Grey(1)));
        assert!(b.set(0, 0, Grey(1)));
        assert_eq!(b.get(0, 0), Some(Grey(1)));
    }
}
