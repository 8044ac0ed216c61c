//! Rendering - raster bitmaps composed from decomposition trees

pub mod bitmap;
pub mod engine;
pub mod glyph;
pub mod pixel;

pub use bitmap::{Bitmap, DimensionError, GreyBitmap, RgbaBitmap};
pub use engine::{Renderer, RenderError};
pub use glyph::{BlockGlyphSource, FontStack, GlyphSource, MemoryGlyphSource};
pub use pixel::{Grey, Pixel, Rgba};
