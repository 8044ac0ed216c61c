//! Glyph sources - the boundary to font rasterizers
//!
//! A source either has a glyph for a code point at the requested size or it
//! does not. The stack asks its sources in priority order.

use std::collections::HashMap;

use super::bitmap::GreyBitmap;
use super::pixel::Grey;

/// Supplies greyscale glyphs for code points.
pub trait GlyphSource: Send + Sync {
    fn name(&self) -> &str;

    /// A glyph no larger than `width` x `height`, or `None` when absent.
    fn glyph(&self, character: char, width: u32, height: u32) -> Option<GreyBitmap>;
}

/// Ordered font sources; the first that has a glyph wins.
#[derive(Default)]
pub struct FontStack {
    sources: Vec<Box<dyn GlyphSource>>,
}

impl FontStack {
    pub fn new() -> Self {
        Self { sources: vec![] }
    }

    pub fn with_source(mut self, source: impl GlyphSource + 'static) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: impl GlyphSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn try_get_glyph(&self, character: char, width: u32, height: u32) -> Option<GreyBitmap> {
        self.sources
            .iter()
            .find_map(|source| source.glyph(character, width, height))
    }
}

/// Glyph templates held in memory, scaled nearest-neighbour to the requested size.
#[derive(Debug, Default)]
pub struct MemoryGlyphSource {
    name: String,
    glyphs: HashMap<char, GreyBitmap>,
}

impl MemoryGlyphSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), glyphs: HashMap::new() }
    }

    pub fn insert(&mut self, character: char, template: GreyBitmap) {
        self.glyphs.insert(character, template);
    }

    pub fn with_glyph(mut self, character: char, template: GreyBitmap) -> Self {
        self.insert(character, template);
        self
    }
}

impl GlyphSource for MemoryGlyphSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn glyph(&self, character: char, width: u32, height: u32) -> Option<GreyBitmap> {
        let template = self.glyphs.get(&character)?;
        Some(scale_nearest(template, width, height))
    }
}

fn scale_nearest(template: &GreyBitmap, width: u32, height: u32) -> GreyBitmap {
    let mut out = GreyBitmap::new(width, height);
    if template.width() == 0 || template.height() == 0 {
        return out;
    }
    for y in 0..height {
        let sy = (y as u64 * template.height() as u64 / height as u64) as u32;
        for x in 0..width {
            let sx = (x as u64 * template.width() as u64 / width as u64) as u32;
            if let Some(p) = template.get(sx, sy) {
                out.set(x, y, p);
            }
        }
    }
    out
}

/// Draws every code point as an outlined box, for layout previews.
#[derive(Debug, Clone, Copy)]
pub struct BlockGlyphSource {
    pub ink: u8,
}

impl Default for BlockGlyphSource {
    fn default() -> Self {
        Self { ink: 255 }
    }
}

impl GlyphSource for BlockGlyphSource {
    fn name(&self) -> &str {
        "block"
    }

    fn glyph(&self, _character: char, width: u32, height: u32) -> Option<GreyBitmap> {
        let mut out = GreyBitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    out.set(x, y, Grey(self.ink));
                }
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(value: u8) -> GreyBitmap {
        GreyBitmap::from_pixels(1, 1, vec![Grey(value)]).unwrap()
    }

    #[test]
    fn test_stack_priority_order() {
        let fonts = FontStack::new()
            .with_source(MemoryGlyphSource::new("main").with_glyph('木', solid(10)))
            .with_source(
                MemoryGlyphSource::new("backup")
                    .with_glyph('木', solid(20))
                    .with_glyph('口', solid(30)),
            );

        assert_eq!(fonts.try_get_glyph('木', 1, 1).unwrap().get(0, 0), Some(Grey(10)));
        assert_eq!(fonts.try_get_glyph('口', 1, 1).unwrap().get(0, 0), Some(Grey(30)));
        assert!(fonts.try_get_glyph('火', 1, 1).is_none());
        assert_eq!(fonts.source_names(), vec!["main", "backup"]);
    }

    #[test]
    fn test_memory_source_scales() {
        let template = GreyBitmap::from_pixels(2, 1, vec![Grey(1), Grey(2)]).unwrap();
        let source = MemoryGlyphSource::new("mem").with_glyph('一', template);
        let glyph = source.glyph('一', 4, 2).unwrap();
        assert_eq!((glyph.width(), glyph.height()), (4, 2));
        let row: Vec<u8> = glyph.pixels()[..4].iter().map(|p| p.0).collect();
        assert_eq!(row, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_block_source_outline() {
        let glyph = BlockGlyphSource::default().glyph('x', 3, 3).unwrap();
        assert_eq!(glyph.get(0, 0), Some(Grey(255)));
        assert_eq!(glyph.get(1, 1), Some(Grey(0)));
        assert_eq!(BlockGlyphSource::default().glyph('x', 0, 5).unwrap().pixels().len(), 0);
    }
}
