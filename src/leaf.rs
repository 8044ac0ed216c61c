//! Leaf records - per-code-point data owned by the registry

use serde::Serialize;

use crate::ingredient::Ingredient;
use crate::operators;

/// Which surround operators a leaf has been seen as the first operand of.
///
/// Bit 0 `⿸`, 1 `⿹`, 2 `⿺`, 3 `⿴`, 4 `⿵`, 5 `⿶`, 6 `⿷`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlacementFlags(u8);

impl PlacementFlags {
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Returns false for operators that carry no placement flag.
    pub fn get(&self, symbol: char) -> bool {
        match operators::lookup(symbol).and_then(|op| op.placement_bit()) {
            Some(bit) => self.0 & (1 << bit) != 0,
            None => false,
        }
    }

    /// Returns whether `symbol` has a placement flag at all.
    pub fn set(&mut self, symbol: char, value: bool) -> bool {
        let Some(bit) = operators::lookup(symbol).and_then(|op| op.placement_bit()) else {
            return false;
        };
        if value {
            self.0 |= 1 << bit;
        } else {
            self.0 &= !(1 << bit);
        }
        true
    }
}

/// An atomic ideograph or component.
#[derive(Debug, Clone)]
pub struct Leaf {
    character: char,
    meanings: Vec<String>,
    recipes: Vec<Ingredient>,
    alternates: Vec<char>,
    placement: PlacementFlags,
}

impl Leaf {
    pub fn new(character: char) -> Self {
        Self {
            character,
            meanings: vec![],
            recipes: vec![],
            alternates: vec![],
            placement: PlacementFlags::default(),
        }
    }

    pub fn character(&self) -> char {
        self.character
    }

    pub fn meanings(&self) -> &[String] {
        &self.meanings
    }

    /// Known decompositions that produce this character, in registration order.
    pub fn recipes(&self) -> &[Ingredient] {
        &self.recipes
    }

    /// Code points considered equivalent to this one.
    pub fn alternates(&self) -> &[char] {
        &self.alternates
    }

    pub fn placement(&self) -> PlacementFlags {
        self.placement
    }

    pub fn add_meaning(&mut self, meaning: impl Into<String>) {
        self.meanings.push(meaning.into());
    }

    pub fn add_recipe(&mut self, recipe: Ingredient) {
        self.recipes.push(recipe);
    }

    pub fn add_alternate(&mut self, character: char) {
        if character != self.character && !self.alternates.contains(&character) {
            self.alternates.push(character);
        }
    }

    pub fn can_be_placed_like(&self, symbol: char) -> bool {
        self.placement.get(symbol)
    }

    pub fn set_placement_flag(&mut self, symbol: char, value: bool) -> bool {
        self.placement.set(symbol, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_flags_roundtrip() {
        let mut leaf = Leaf::new('辶');
        assert!(!leaf.can_be_placed_like('⿺'));
        assert!(leaf.set_placement_flag('⿺', true));
        assert!(leaf.can_be_placed_like('⿺'));
        assert_eq!(leaf.placement().bits(), 1 << 2);
        assert!(leaf.set_placement_flag('⿺', false));
        assert_eq!(leaf.placement().bits(), 0);
    }

    #[test]
    fn test_placement_flags_ignore_non_surrounds() {
        let mut leaf = Leaf::new('木');
        assert!(!leaf.set_placement_flag('⿰', true));
        assert!(!leaf.set_placement_flag('口', true));
        assert_eq!(leaf.placement().bits(), 0);
    }

    #[test]
    fn test_alternates_deduplicated() {
        let mut leaf = Leaf::new('为');
        leaf.add_alternate('爲');
        leaf.add_alternate('爲');
        leaf.add_alternate('为');
        assert_eq!(leaf.alternates(), &['爲']);
    }
}
