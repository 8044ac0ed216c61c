//! Pixel formats

use std::fmt::Debug;

/// A single pixel of a [`Bitmap`](super::Bitmap).
///
/// `Default` is the blank canvas value.
pub trait Pixel: Copy + Default + PartialEq + Debug {
    const CHANNELS: usize;

    /// Composite `other` with `self`, `self` taking precedence where it has ink.
    fn overlay(self, other: Self) -> Self;

    fn invert(self) -> Self;

    fn write_bytes(&self, out: &mut Vec<u8>);
}

/// 8-bit greyscale; brighter is more ink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grey(pub u8);

impl Pixel for Grey {
    const CHANNELS: usize = 1;

    /// Brighter dominates.
    fn overlay(self, other: Self) -> Self {
        Grey(self.0.max(other.0))
    }

    fn invert(self) -> Self {
        Grey(255 - self.0)
    }

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.push(self.0);
    }
}

/// 8 bits per channel, straight (not premultiplied) alpha.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }
}

impl Pixel for Rgba {
    const CHANNELS: usize = 4;

    /// Source-over: `self` is drawn on top of `other`.
    fn overlay(self, other: Self) -> Self {
        let a1 = self.alpha as f32 / 255.0;
        let a2 = other.alpha as f32 / 255.0;
        let alpha_out = a1 + a2 * (1.0 - a1);
        if alpha_out == 0.0 {
            return Rgba::default();
        }
        let blend = |c1: u8, c2: u8| {
            ((c1 as f32 * a1 + c2 as f32 * a2 * (1.0 - a1)) / alpha_out) as u8
        };
        Rgba {
            red: blend(self.red, other.red),
            green: blend(self.green, other.green),
            blue: blend(self.blue, other.blue),
            alpha: (alpha_out * 255.0) as u8,
        }
    }

    fn invert(self) -> Self {
        Rgba::new(255 - self.red, 255 - self.green, 255 - self.blue, self.alpha)
    }

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.red, self.green, self.blue, self.alpha]);
    }
}

/// Grey coverage becomes the alpha of white ink.
impl From<Grey> for Rgba {
    fn from(grey: Grey) -> Self {
        Rgba::new(255, 255, 255, grey.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_overlay_max() {
        assert_eq!(Grey(100).overlay(Grey(200)), Grey(200));
        assert_eq!(Grey(200).overlay(Grey(100)), Grey(200));
    }

    #[test]
    fn test_rgba_opaque_top_wins() {
        let top = Rgba::new(10, 20, 30, 255);
        let bottom = Rgba::new(200, 200, 200, 255);
        assert_eq!(top.overlay(bottom), top);
    }

    #[test]
    fn test_rgba_transparent_top_shows_bottom() {
        let bottom = Rgba::new(200, 100, 50, 255);
        assert_eq!(Rgba::new(0, 0, 0, 0).overlay(bottom), bottom);
    }

    #[test]
    fn test_rgba_both_transparent() {
        let clear = Rgba::new(90, 90, 90, 0);
        assert_eq!(clear.overlay(clear), Rgba::new(0, 0, 0, 0));
    }

    #[test]
    fn test_rgba_half_over_opaque() {
        let top = Rgba::new(255, 0, 0, 128);
        let bottom = Rgba::new(0, 0, 255, 255);
        let out = top.overlay(bottom);
        assert!(out.alpha >= 254);
        assert!(out.red > 120 && out.red < 135);
        assert!(out.blue > 120 && out.blue < 135);
    }

    #[test]
    fn test_grey_to_rgba() {
        assert_eq!(Rgba::from(Grey(7)), Rgba::new(255, 255, 255, 7));
    }
}
