//! Ingredient Model - Decomposition Trees
//!
//! A tree is either a leaf code point, a composite of operands under an
//! operator, or the empty placeholder used while editing.
//!
//! Equality for the unordered operator checks that every operand on each side
//! matches some operand on the other side. Matches are not consumed, so this is
//! containment in both directions rather than a true multiset comparison.

use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::operators::{self, Operator, APPROX_MARKER};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Unknown operator: {0}")]
    UnknownOperator(char),

    #[error("Operator {symbol} takes {expected} ingredients, got {actual}")]
    ArityMismatch {
        symbol: char,
        expected: usize,
        actual: usize,
    },
}

/// Operands combined under an operator. The operand count always equals the
/// operator's arity.
#[derive(Debug, Clone)]
pub struct Composite {
    operator: &'static Operator,
    operands: Vec<Ingredient>,
    approx: bool,
}

impl Composite {
    pub fn new(
        symbol: char,
        operands: Vec<Ingredient>,
        approx: bool,
    ) -> Result<Self, CompositionError> {
        let operator = operators::lookup(symbol).ok_or(CompositionError::UnknownOperator(symbol))?;
        Self::with_operator(operator, operands, approx)
    }

    pub fn with_operator(
        operator: &'static Operator,
        operands: Vec<Ingredient>,
        approx: bool,
    ) -> Result<Self, CompositionError> {
        if operands.len() != operator.arity() {
            return Err(CompositionError::ArityMismatch {
                symbol: operator.symbol,
                expected: operator.arity(),
                actual: operands.len(),
            });
        }
        Ok(Self { operator, operands, approx })
    }

    // Callers pass exactly two operands to a binary operator.
    fn pair(operator: &'static Operator, first: Ingredient, second: Ingredient) -> Self {
        Self {
            operator,
            operands: vec![first, second],
            approx: false,
        }
    }

    pub fn operator(&self) -> &'static Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Ingredient] {
        &self.operands
    }

    pub fn approx(&self) -> bool {
        self.approx
    }
}

impl PartialEq for Composite {
    fn eq(&self, other: &Self) -> bool {
        if self.operator.symbol != other.operator.symbol
            || self.approx != other.approx
            || self.operands.len() != other.operands.len()
        {
            return false;
        }
        if self.operator.ordered {
            self.operands.iter().zip(&other.operands).all(|(a, b)| a == b)
        } else {
            // Both directions: `==` must stay symmetric and agree with `Hash`.
            contained_in(&self.operands, &other.operands)
                && contained_in(&other.operands, &self.operands)
        }
    }
}

fn contained_in(needles: &[Ingredient], haystack: &[Ingredient]) -> bool {
    needles.iter().all(|n| haystack.iter().any(|h| n == h))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ingredient {
    Leaf(char),
    Composite(Composite),
    Empty,
}

// Reflexive and symmetric; see the module docs for the unordered operator.
impl Eq for Ingredient {}

impl Ingredient {
    pub fn composite(
        symbol: char,
        operands: Vec<Ingredient>,
        approx: bool,
    ) -> Result<Self, CompositionError> {
        Composite::new(symbol, operands, approx).map(Ingredient::Composite)
    }

    pub fn as_leaf(&self) -> Option<char> {
        match self {
            Ingredient::Leaf(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Ingredient::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Canonical textual form: approx marker, operator, then each operand's own
    /// canonical form. A leaf is its code point; `Empty` is the empty string.
    pub fn canonical_string(&self) -> String {
        self.to_string()
    }

    /// Visit every code point of the canonical form, in order.
    pub fn for_each_code_point(&self, f: &mut impl FnMut(char)) {
        match self {
            Ingredient::Leaf(c) => f(*c),
            Ingredient::Composite(comp) => {
                if comp.approx {
                    f(APPROX_MARKER);
                }
                f(comp.operator.symbol);
                for operand in &comp.operands {
                    operand.for_each_code_point(f);
                }
            }
            Ingredient::Empty => {}
        }
    }

    /// XOR of the canonical form's code points.
    ///
    /// Insensitive to operand order for every operator, ordered ones included.
    pub fn recipe_hash(&self) -> u32 {
        let mut hash = 0u32;
        self.for_each_code_point(&mut |c| hash ^= c as u32);
        hash
    }

    /// Put `character` to the left of this ingredient.
    pub fn add_left(self, character: char) -> Ingredient {
        self.attach(operators::side_by_side(), character, true)
    }

    pub fn add_right(self, character: char) -> Ingredient {
        self.attach(operators::side_by_side(), character, false)
    }

    pub fn add_above(self, character: char) -> Ingredient {
        self.attach(operators::stacked(), character, true)
    }

    pub fn add_below(self, character: char) -> Ingredient {
        self.attach(operators::stacked(), character, false)
    }

    fn attach(self, operator: &'static Operator, character: char, before: bool) -> Ingredient {
        let leaf = Ingredient::Leaf(character);
        match self {
            Ingredient::Empty => leaf,
            this if before => Ingredient::Composite(Composite::pair(operator, leaf, this)),
            this => Ingredient::Composite(Composite::pair(operator, this, leaf)),
        }
    }
}

impl Hash for Ingredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.recipe_hash());
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;

        let mut result = Ok(());
        self.for_each_code_point(&mut |c| {
            if result.is_ok() {
                result = f.write_char(c);
            }
        });
        result
    }
}

impl From<Composite> for Ingredient {
    fn from(composite: Composite) -> Self {
        Ingredient::Composite(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(c: char) -> Ingredient {
        Ingredient::Leaf(c)
    }

    #[test]
    fn test_arity_enforced() {
        let err = Composite::new('⿰', vec![leaf('木')], false).unwrap_err();
        assert_eq!(
            err,
            CompositionError::ArityMismatch { symbol: '⿰', expected: 2, actual: 1 }
        );
        assert_eq!(
            Composite::new('木', vec![], false).unwrap_err(),
            CompositionError::UnknownOperator('木')
        );
    }

    #[test]
    fn test_canonical_string() {
        let inner = Ingredient::composite('⿱', vec![leaf('十'), leaf('口')], false).unwrap();
        let outer = Ingredient::composite('⿰', vec![leaf('木'), inner], true).unwrap();
        assert_eq!(outer.canonical_string(), "〾⿰木⿱十口");
        assert_eq!(Ingredient::Empty.canonical_string(), "");
    }

    #[test]
    fn test_ordered_equality_positional() {
        let a = Ingredient::composite('⿰', vec![leaf('木'), leaf('口')], false).unwrap();
        let b = Ingredient::composite('⿰', vec![leaf('口'), leaf('木')], false).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_unordered_equality_ignores_order() {
        let a = Ingredient::composite('⿻', vec![leaf('十'), leaf('𠆢')], false).unwrap();
        let b = Ingredient::composite('⿻', vec![leaf('𠆢'), leaf('十')], false).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.recipe_hash(), b.recipe_hash());
    }

    #[test]
    fn test_unordered_equality_needs_both_sides_contained() {
        let doubled = Ingredient::composite('⿻', vec![leaf('十'), leaf('十')], false).unwrap();
        let mixed = Ingredient::composite('⿻', vec![leaf('十'), leaf('𠆢')], false).unwrap();
        assert_ne!(doubled, mixed);
        assert_ne!(mixed, doubled);
        assert_ne!(doubled.recipe_hash(), mixed.recipe_hash());
        assert_eq!(doubled, doubled.clone());
    }

    #[test]
    fn test_approx_flag_matters() {
        let a = Ingredient::composite('⿰', vec![leaf('木'), leaf('口')], false).unwrap();
        let b = Ingredient::composite('⿰', vec![leaf('木'), leaf('口')], true).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_xor_of_code_points() {
        let tree = Ingredient::composite('⿰', vec![leaf('木'), leaf('口')], false).unwrap();
        assert_eq!(tree.recipe_hash(), '⿰' as u32 ^ '木' as u32 ^ '口' as u32);
        // Same-leaf operands cancel out.
        let twin = Ingredient::composite('⿰', vec![leaf('木'), leaf('木')], false).unwrap();
        assert_eq!(twin.recipe_hash(), '⿰' as u32);
    }

    #[test]
    fn test_attach_onto_empty_yields_leaf() {
        assert_eq!(Ingredient::Empty.add_left('木'), leaf('木'));
        assert_eq!(Ingredient::Empty.add_below('口'), leaf('口'));
    }

    #[test]
    fn test_attach_builds_composites() {
        assert_eq!(leaf('木').add_right('口').canonical_string(), "⿰木口");
        assert_eq!(leaf('木').add_left('口').canonical_string(), "⿰口木");
        assert_eq!(leaf('木').add_above('十').canonical_string(), "⿱十木");
        assert_eq!(leaf('木').add_below('十').canonical_string(), "⿱木十");
    }

    #[test]
    fn test_variants_never_equal() {
        assert_ne!(leaf('木'), Ingredient::Empty);
        let tree = Ingredient::composite('↔', vec![leaf('木')], false).unwrap();
        assert_ne!(tree, leaf('木'));
    }
}
