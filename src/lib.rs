//! IdsForge Core - Ideographic Description Sequence Engine
//!
//! # The Laws
//! 1. Recipes Are Trees: every recipe parses to one operator-rooted tree or an error
//! 2. Canonical Form Is Identity: equal trees print and hash the same
//! 3. Order Matters Except For Overlay
//! 4. Layout Is Integer Exact: split pixels always add back to the cell
//! 5. Leaves Are Registered Once, Recipes Accumulate

pub mod config;
pub mod hashing;
pub mod ingredient;
pub mod leaf;
pub mod loading;
pub mod operators;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod render;

pub use config::{Config, ConfigError};
pub use hashing::{
    bitmap_digest, canonical_json, compute_job_hash, compute_manifest_hash, recipe_key,
};
pub use ingredient::{Composite, CompositionError, Ingredient};
pub use leaf::{Leaf, PlacementFlags};
pub use loading::{LoadError, LoadReport};
pub use operators::{Operator, APPROX_MARKER, OPERATORS};
pub use parser::{GrammarError, RecipeParser};
pub use pipeline::{CraftingPipeline, PipelineError, PixelFormat, RenderRequest, RenderedGlyph};
pub use registry::{RegisterOutcome, Registry, SharedRegistry};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
