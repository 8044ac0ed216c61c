//! Registry - leaf records and the recipe lookup table
//!
//! Built once at startup, then read by lookups and renders.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::ingredient::Ingredient;
use crate::leaf::Leaf;
use crate::parser::{GrammarError, RecipeParser};

/// What happened to a recipe handed to [`Registry::register_recipe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterOutcome {
    /// First registration of this tree.
    Registered,
    /// The tree was already known for another result; this one was appended.
    AddedResult,
    /// The tree was already known for this same result.
    Duplicate,
    /// The recipe names an unknown component.
    Placeholder,
}

impl RegisterOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered | Self::AddedResult)
    }
}

#[derive(Debug)]
pub struct Registry {
    leaves: HashMap<char, Leaf>,
    // Almost always a single result per tree.
    recipes: HashMap<Ingredient, Vec<char>>,
    unknown_markers: Vec<char>,
    max_depth: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            leaves: HashMap::new(),
            recipes: HashMap::new(),
            unknown_markers: config.unknown_markers.clone(),
            max_depth: config.max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The shared leaf for a code point, created on first use.
    pub fn get_or_create_leaf(&mut self, character: char) -> &mut Leaf {
        self.leaves
            .entry(character)
            .or_insert_with(|| Leaf::new(character))
    }

    pub fn leaf(&self, character: char) -> Option<&Leaf> {
        self.leaves.get(&character)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.values()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of distinct registered trees.
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn parse(&mut self, recipe: &str) -> Result<Ingredient, GrammarError> {
        RecipeParser::new(self).parse(recipe)
    }

    /// Register `recipe` as a way to obtain `result`.
    ///
    /// Grammar errors are returned; rejections are reported through the outcome.
    pub fn register_recipe(
        &mut self,
        result: char,
        recipe: &str,
    ) -> Result<RegisterOutcome, GrammarError> {
        if recipe.chars().any(|c| self.unknown_markers.contains(&c)) {
            debug!(%result, recipe, "recipe contains unknown component");
            return Ok(RegisterOutcome::Placeholder);
        }

        let tree = self.parse(recipe)?;
        let outcome = match self.recipes.get_mut(&tree) {
            Some(results) if results.contains(&result) => {
                debug!(%result, recipe, "recipe already registered");
                return Ok(RegisterOutcome::Duplicate);
            }
            Some(results) => {
                results.push(result);
                RegisterOutcome::AddedResult
            }
            None => {
                self.recipes.insert(tree.clone(), vec![result]);
                RegisterOutcome::Registered
            }
        };
        self.get_or_create_leaf(result).add_recipe(tree);
        Ok(outcome)
    }

    /// All known results for a tree structurally equal to `tree`.
    pub fn lookup(&self, tree: &Ingredient) -> Vec<&Leaf> {
        self.lookup_results(tree)
            .iter()
            .filter_map(|c| self.leaves.get(c))
            .collect()
    }

    pub fn lookup_results(&self, tree: &Ingredient) -> &[char] {
        self.recipes.get(tree).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_meaning(&mut self, character: char, meaning: impl Into<String>) {
        self.get_or_create_leaf(character).add_meaning(meaning);
    }

    /// Record `a` and `b` as equivalent code points of each other.
    pub fn add_alternate(&mut self, a: char, b: char) {
        self.get_or_create_leaf(a).add_alternate(b);
        self.get_or_create_leaf(b).add_alternate(a);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// A registry behind one coarse lock, for callers on several threads.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self { inner: Arc::new(RwLock::new(registry)) }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        let outcome = registry.register_recipe('林', "⿰木木").unwrap();
        assert_eq!(outcome, RegisterOutcome::Registered);

        let tree = registry.parse("⿰木木").unwrap();
        let results: Vec<_> = registry.lookup(&tree).iter().map(|l| l.character()).collect();
        assert_eq!(results, vec!['林']);
        assert_eq!(registry.leaf('林').unwrap().recipes(), &[tree]);
    }

    #[test]
    fn test_same_tree_same_result_is_duplicate() {
        let mut registry = Registry::new();
        registry.register_recipe('林', "⿰木木").unwrap();
        let outcome = registry.register_recipe('林', "⿰木木").unwrap();
        assert_eq!(outcome, RegisterOutcome::Duplicate);
        assert!(!outcome.is_registered());
        assert_eq!(registry.leaf('林').unwrap().recipes().len(), 1);
    }

    #[test]
    fn test_unordered_variant_is_duplicate() {
        let mut registry = Registry::new();
        registry.register_recipe('木', "⿻十𠆢").unwrap();
        let outcome = registry.register_recipe('木', "⿻𠆢十").unwrap();
        assert_eq!(outcome, RegisterOutcome::Duplicate);
    }

    #[test]
    fn test_unknown_component_rejected() {
        let mut registry = Registry::new();
        let outcome = registry.register_recipe('X', "⿰木？").unwrap();
        assert_eq!(outcome, RegisterOutcome::Placeholder);
        assert_eq!(registry.recipe_count(), 0);
        assert!(registry.leaf('木').is_none());
    }

    #[test]
    fn test_grammar_error_propagates() {
        let mut registry = Registry::new();
        assert!(registry.register_recipe('林', "⿰木").is_err());
        assert_eq!(registry.recipe_count(), 0);
    }

    #[test]
    fn test_lookup_missing_is_empty() {
        let mut registry = Registry::new();
        let tree = registry.parse("⿱日月").unwrap();
        assert!(registry.lookup(&tree).is_empty());
    }

    #[test]
    fn test_alternates_are_mutual() {
        let mut registry = Registry::new();
        registry.add_alternate('为', '爲');
        assert_eq!(registry.leaf('为').unwrap().alternates(), &['爲']);
        assert_eq!(registry.leaf('爲').unwrap().alternates(), &['为']);
    }

    #[test]
    fn test_shared_registry_across_threads() {
        let shared = SharedRegistry::default();
        shared.write().register_recipe('林', "⿰木木").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let tree = shared.write().parse("⿰木木").unwrap();
                    let registry = shared.read();
                    registry.lookup_results(&tree).to_vec()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec!['林']);
        }
    }
}
