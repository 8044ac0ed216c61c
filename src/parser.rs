//! Recipe Parser - recursive descent over IDS strings
//!
//! Grammar: `recipe := '〾'? operator operand{arity}`, `operand := leaf | recipe`.
//! Operands carry no delimiters, so the extent of a nested recipe is computed by
//! walking its operator arities before the nested recipe is parsed.

use thiserror::Error;

use crate::ingredient::{Composite, CompositionError, Ingredient};
use crate::operators::{self, Operator, APPROX_MARKER};
use crate::registry::Registry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Expected operator at start of recipe, found {}", describe(.found))]
    ExpectedOperator { found: Option<char> },

    #[error("Not enough ingredients for {operator}: expected {expected}, found {found}")]
    NotEnoughIngredients {
        operator: char,
        expected: usize,
        found: usize,
    },

    #[error("Too many ingredients for {operator}: trailing input {remaining:?}")]
    TrailingInput { operator: char, remaining: String },

    #[error("Recipe nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

fn describe(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{c:?}"),
        None => "end of input".to_string(),
    }
}

/// Parses recipe strings, resolving leaves through the registry so that leaf
/// records are shared process-wide.
pub struct RecipeParser<'r> {
    registry: &'r mut Registry,
    max_depth: usize,
}

impl<'r> RecipeParser<'r> {
    pub fn new(registry: &'r mut Registry) -> Self {
        let max_depth = registry.max_depth();
        Self { registry, max_depth }
    }

    pub fn parse(&mut self, recipe: &str) -> Result<Ingredient, GrammarError> {
        let chars: Vec<char> = recipe.chars().collect();
        self.parse_recipe(&chars, 0)
    }

    /// `chars` must be exactly one recipe.
    fn parse_recipe(&mut self, chars: &[char], depth: usize) -> Result<Ingredient, GrammarError> {
        if depth > self.max_depth {
            return Err(GrammarError::TooDeep { limit: self.max_depth });
        }

        // The marker comes before the operator, which decides the arity.
        let (approx, body) = match chars.split_first() {
            Some((&APPROX_MARKER, rest)) => (true, rest),
            _ => (false, chars),
        };
        let operator = leading_operator(body)?;

        let mut operands = Vec::with_capacity(operator.arity());
        let mut pos = 1;
        for slot in 0..operator.arity() {
            let Some(&c) = body.get(pos) else {
                return Err(not_enough(operator, slot));
            };
            if operators::is_operator(c) {
                let len = recipe_len(body, pos, depth + 1, self.max_depth)?;
                operands.push(self.parse_recipe(&body[pos..pos + len], depth + 1)?);
                pos += len;
            } else {
                self.registry.get_or_create_leaf(c);
                operands.push(Ingredient::Leaf(c));
                pos += 1;
            }
        }

        if pos < body.len() {
            return Err(GrammarError::TrailingInput {
                operator: operator.symbol,
                remaining: body[pos..].iter().collect(),
            });
        }

        if let Some(first) = operands[0].as_leaf() {
            self.registry
                .get_or_create_leaf(first)
                .set_placement_flag(operator.symbol, true);
        }

        Ok(Composite::with_operator(operator, operands, approx)?.into())
    }
}

fn leading_operator(body: &[char]) -> Result<&'static Operator, GrammarError> {
    body.first()
        .and_then(|&c| operators::lookup(c))
        .ok_or(GrammarError::ExpectedOperator { found: body.first().copied() })
}

fn not_enough(operator: &Operator, found: usize) -> GrammarError {
    GrammarError::NotEnoughIngredients {
        operator: operator.symbol,
        expected: operator.arity(),
        found,
    }
}

/// Length in code points of the recipe starting at `start`, without building it.
fn recipe_len(
    chars: &[char],
    start: usize,
    depth: usize,
    max_depth: usize,
) -> Result<usize, GrammarError> {
    if depth > max_depth {
        return Err(GrammarError::TooDeep { limit: max_depth });
    }
    let operator = leading_operator(&chars[start..])?;
    let mut pos = start + 1;
    for slot in 0..operator.arity() {
        match chars.get(pos) {
            None => return Err(not_enough(operator, slot)),
            Some(&c) if operators::is_operator(c) => {
                pos += recipe_len(chars, pos, depth + 1, max_depth)?;
            }
            Some(_) => pos += 1,
        }
    }
    Ok(pos - start)
}
