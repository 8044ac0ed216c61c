//! Render Engine - lays out a decomposition tree on a canvas
//!
//! Each operator splits or nests the canvas with integer arithmetic. Leaves come
//! from the font stack, falling back to the leaf's first known recipe.

use thiserror::Error;
use tracing::trace;

use crate::ingredient::{Composite, Ingredient};
use crate::registry::Registry;

use super::bitmap::{DimensionError, GreyBitmap};
use super::glyph::FontStack;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Layout error: {0}")]
    Dimension(#[from] DimensionError),

    #[error("Character {0} has no glyph in any font and no recipe")]
    UnrenderableLeaf(char),

    #[error("Render recursion exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// Size and offset of the enclosed operand of a surround operator, as
/// functions of the canvas size.
struct Inset {
    size: fn(u32, u32) -> (u32, u32),
    offset: fn(u32, u32) -> (u32, u32),
}

fn inset(symbol: char) -> Option<Inset> {
    let inset = match symbol {
        '⿵' => Inset {
            size: |w, h| (thirds(w, 1), thirds(h, 2)),
            offset: |w, h| (thirds(w, 1), thirds(h, 1)),
        },
        '⿶' => Inset {
            size: |w, h| (thirds(w, 1), thirds(h, 2)),
            offset: |w, _| (thirds(w, 1), 0),
        },
        '⿷' => Inset {
            size: |w, h| (thirds(w, 2), thirds(h, 1)),
            offset: |w, h| (thirds(w, 1), thirds(h, 1)),
        },
        '⿸' => Inset {
            size: |w, h| (thirds(w, 2), thirds(h, 2)),
            offset: |w, h| (thirds(w, 1), thirds(h, 1)),
        },
        '⿹' => Inset {
            size: |w, h| (thirds(w, 2), thirds(h, 2)),
            offset: |_, h| (0, thirds(h, 1)),
        },
        '⿺' => Inset {
            size: |w, h| (thirds(w, 2), thirds(h, 2)),
            offset: |w, _| (thirds(w, 1), 0),
        },
        _ => return None,
    };
    Some(inset)
}

/// `n` thirds of `total`, rounded down. Widened so `2 * total` cannot overflow.
fn thirds(total: u32, n: u64) -> u32 {
    (u64::from(total) * n / 3) as u32
}

/// Split `total` in two; the first half takes the odd pixel.
pub fn split_halves(total: u32) -> [u32; 2] {
    [total / 2 + total % 2, total / 2]
}

/// Split `total` in three; a remainder of 1 goes to the first slot, 2 to the
/// first and second.
pub fn split_thirds(total: u32) -> [u32; 3] {
    let rest = total % 3;
    let third = total / 3;
    [
        third + u32::from(rest >= 1),
        third + u32::from(rest == 2),
        third,
    ]
}

pub struct Renderer<'a> {
    registry: &'a Registry,
    fonts: &'a FontStack,
    max_depth: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a Registry, fonts: &'a FontStack) -> Self {
        Self {
            registry,
            fonts,
            max_depth: registry.max_depth(),
        }
    }

    pub fn render(
        &self,
        tree: &Ingredient,
        width: u32,
        height: u32,
    ) -> Result<GreyBitmap, RenderError> {
        self.render_at(tree, width, height, 0)
    }

    fn render_at(
        &self,
        tree: &Ingredient,
        width: u32,
        height: u32,
        depth: usize,
    ) -> Result<GreyBitmap, RenderError> {
        if depth > self.max_depth {
            return Err(RenderError::TooDeep { limit: self.max_depth });
        }
        match tree {
            Ingredient::Leaf(c) => self.render_leaf(*c, width, height, depth),
            Ingredient::Composite(comp) => self.render_composite(comp, width, height, depth),
            Ingredient::Empty => Ok(GreyBitmap::new(width, height)),
        }
    }

    fn render_leaf(
        &self,
        character: char,
        width: u32,
        height: u32,
        depth: usize,
    ) -> Result<GreyBitmap, RenderError> {
        if let Some(glyph) = self.fonts.try_get_glyph(character, width, height) {
            return Ok(glyph.place_centered(width, height)?);
        }
        let recipe = self
            .registry
            .leaf(character)
            .and_then(|leaf| leaf.recipes().first())
            .ok_or(RenderError::UnrenderableLeaf(character))?;
        trace!(%character, %recipe, "no glyph, rendering from recipe");
        self.render_at(recipe, width, height, depth + 1)
    }

    fn render_composite(
        &self,
        comp: &Composite,
        width: u32,
        height: u32,
        depth: usize,
    ) -> Result<GreyBitmap, RenderError> {
        let ops = comp.operands();
        let sub = |i: usize, w: u32, h: u32| self.render_at(&ops[i], w, h, depth + 1);

        let bitmap = match comp.operator().symbol {
            '↔' => sub(0, width, height)?.mirror(),
            '↷' => sub(0, width, height)?.rotate180(),
            // Groups equivalent forms; never drawn.
            '⊖' => GreyBitmap::new(width, height),
            '⿰' => {
                let [left, right] = split_halves(width);
                sub(0, left, height)?.join_horizontally(&sub(1, right, height)?)?
            }
            '⿱' => {
                let [top, bottom] = split_halves(height);
                sub(0, width, top)?.join_vertically(&sub(1, width, bottom)?)?
            }
            '⿲' => {
                let [a, b, c] = split_thirds(width);
                sub(0, a, height)?
                    .join_horizontally(&sub(1, b, height)?)?
                    .join_horizontally(&sub(2, c, height)?)?
            }
            '⿳' => {
                let [a, b, c] = split_thirds(height);
                sub(0, width, a)?
                    .join_vertically(&sub(1, width, b)?)?
                    .join_vertically(&sub(2, width, c)?)?
            }
            '⿴' => {
                let inner = sub(1, width / 2, height / 2)?.place_centered(width, height)?;
                sub(0, width, height)?.overlay(&inner)?
            }
            '⿻' => sub(0, width, height)?.overlay(&sub(1, width, height)?)?,
            symbol => match inset(symbol) {
                Some(inset) => {
                    let (w, h) = (inset.size)(width, height);
                    let (x, y) = (inset.offset)(width, height);
                    let inner = sub(1, w, h)?.place_on_canvas(width, height, x, y)?;
                    sub(0, width, height)?.overlay(&inner)?
                }
                None => GreyBitmap::new(width, height),
            },
        };
        Ok(bitmap)
    }
}
