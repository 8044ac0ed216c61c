//! Operator Registry - Ideographic Description Characters
//!
//! Fixed table of composition operators. Extend by adding rows.

use serde::Serialize;

/// Marks a decomposition as a best-effort match when it leads a recipe string.
pub const APPROX_MARKER: char = '〾';

/// How N operands are combined into one ideograph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Operator {
    pub symbol: char,
    pub arity: u8,
    pub ordered: bool,
}

impl Operator {
    const fn new(symbol: char, arity: u8, ordered: bool) -> Self {
        Self { symbol, arity, ordered }
    }

    pub fn arity(&self) -> usize {
        self.arity as usize
    }

    /// Index into a leaf's placement flags, for the surround operators only.
    pub fn placement_bit(&self) -> Option<u8> {
        match self.symbol {
            '⿸' => Some(0),
            '⿹' => Some(1),
            '⿺' => Some(2),
            '⿴' => Some(3),
            '⿵' => Some(4),
            '⿶' => Some(5),
            '⿷' => Some(6),
            _ => None,
        }
    }
}

pub static OPERATORS: [Operator; 15] = [
    Operator::new('↔', 1, true),
    Operator::new('↷', 1, true),
    Operator::new('⊖', 2, true),
    Operator::new('⿰', 2, true),
    Operator::new('⿱', 2, true),
    Operator::new('⿲', 3, true),
    Operator::new('⿳', 3, true),
    Operator::new('⿴', 2, true),
    Operator::new('⿵', 2, true),
    Operator::new('⿶', 2, true),
    Operator::new('⿷', 2, true),
    Operator::new('⿸', 2, true),
    Operator::new('⿹', 2, true),
    Operator::new('⿺', 2, true),
    Operator::new('⿻', 2, false),
];

/// `⿰`, used by the attach operations.
pub fn side_by_side() -> &'static Operator {
    &OPERATORS[3]
}

/// `⿱`, used by the attach operations.
pub fn stacked() -> &'static Operator {
    &OPERATORS[4]
}

/// Look up an operator by its symbol. Ordinary ideographs yield `None`.
pub fn lookup(symbol: char) -> Option<&'static Operator> {
    OPERATORS.iter().find(|op| op.symbol == symbol)
}

pub fn is_operator(symbol: char) -> bool {
    lookup(symbol).is_some()
}
