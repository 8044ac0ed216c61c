//! Crafting Pipeline - Single Entry Point
//!
//! Owns the registry and the font stack. Loading, lookup and rendering for
//! outside callers go through here.

use std::path::Path;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::hashing::{bitmap_digest, compute_job_hash, compute_manifest_hash, recipe_key};
use crate::ingredient::Ingredient;
use crate::loading::{self, LoadError, LoadReport};
use crate::operators;
use crate::parser::GrammarError;
use crate::registry::Registry;
use crate::render::{FontStack, GreyBitmap, RenderError, Renderer, RgbaBitmap};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid recipe: {0}")]
    Grammar(#[from] GrammarError),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Grey,
    Rgba,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    /// A recipe string, or a single character.
    pub recipe: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub format: PixelFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedGlyph {
    pub id: String,
    pub recipe: String,
    pub recipe_key: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub job_hash: String,
    pub digest: String,
    pub data_base64: String,
    pub manifest_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupEntry {
    pub character: char,
    pub meanings: Vec<String>,
    pub recipes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    pub recipe: String,
    pub recipe_key: String,
    pub results: Vec<LookupEntry>,
}

pub struct CraftingPipeline {
    config: Config,
    registry: Registry,
    fonts: FontStack,
}

impl CraftingPipeline {
    pub fn new(config: Config) -> Self {
        let registry = Registry::with_config(&config);
        Self {
            config,
            registry,
            fonts: FontStack::new(),
        }
    }

    pub fn with_fonts(mut self, fonts: FontStack) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn load_recipes(&mut self, path: &Path) -> Result<LoadReport, PipelineError> {
        Ok(loading::load_ids_file(&mut self.registry, path, &self.config)?)
    }

    pub fn load_meanings(&mut self, path: &Path) -> Result<LoadReport, PipelineError> {
        Ok(loading::load_meanings_file(&mut self.registry, path, &self.config)?)
    }

    /// A single non-operator character is a leaf; anything else must parse as a recipe.
    pub fn resolve(&mut self, text: &str) -> Result<Ingredient, PipelineError> {
        let mut chars = text.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !operators::is_operator(c) {
                self.registry.get_or_create_leaf(c);
                return Ok(Ingredient::Leaf(c));
            }
        }
        Ok(self.registry.parse(text)?)
    }

    /// Every known result of `recipe`, with meanings and recipes.
    pub fn lookup(&mut self, recipe: &str) -> Result<LookupResult, PipelineError> {
        let tree = self.registry.parse(recipe)?;
        let results = self
            .registry
            .lookup(&tree)
            .into_iter()
            .map(|leaf| LookupEntry {
                character: leaf.character(),
                meanings: leaf.meanings().to_vec(),
                recipes: leaf.recipes().iter().map(Ingredient::canonical_string).collect(),
            })
            .collect();
        Ok(LookupResult {
            recipe: tree.canonical_string(),
            recipe_key: recipe_key(&tree),
            results,
        })
    }

    pub fn render(
        &self,
        tree: &Ingredient,
        width: u32,
        height: u32,
    ) -> Result<GreyBitmap, PipelineError> {
        Ok(Renderer::new(&self.registry, &self.fonts).render(tree, width, height)?)
    }

    /// Render a request and describe the output.
    pub fn render_recipe(
        &mut self,
        request: &RenderRequest,
    ) -> Result<RenderedGlyph, PipelineError> {
        let tree = self.resolve(&request.recipe)?;
        let bitmap = self.render(&tree, request.width, request.height)?;

        let (data, digest) = match request.format {
            PixelFormat::Grey => (bitmap.to_bytes(), bitmap_digest(&bitmap)),
            PixelFormat::Rgba => {
                let rgba: RgbaBitmap = bitmap.convert();
                (rgba.to_bytes(), bitmap_digest(&rgba))
            }
        };
        let canonical = tree.canonical_string();

        let mut glyph = RenderedGlyph {
            id: Uuid::new_v4().to_string(),
            job_hash: compute_job_hash(&canonical, request.width, request.height, ENGINE_VERSION),
            recipe_key: recipe_key(&tree),
            recipe: canonical,
            width: bitmap.width(),
            height: bitmap.height(),
            format: request.format,
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            digest,
            data_base64: base64::engine::general_purpose::STANDARD.encode(&data),
            manifest_hash: String::new(), // Computed after
        };
        glyph.manifest_hash = compute_manifest_hash(&glyph)?;
        Ok(glyph)
    }
}

impl Default for CraftingPipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Grey, MemoryGlyphSource};

    fn pipeline() -> CraftingPipeline {
        let glyph = GreyBitmap::from_pixels(1, 1, vec![Grey(255)]).unwrap();
        let fonts =
            FontStack::new().with_source(MemoryGlyphSource::new("test").with_glyph('木', glyph));
        let mut pipeline = CraftingPipeline::default().with_fonts(fonts);
        pipeline.registry_mut().register_recipe('林', "⿰木木").unwrap();
        pipeline.registry_mut().add_meaning('林', "forest");
        pipeline
    }

    #[test]
    fn test_lookup_reports_results() {
        let mut pipeline = pipeline();
        let result = pipeline.lookup("⿰木木").unwrap();
        assert_eq!(result.recipe, "⿰木木");
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].character, '林');
        assert_eq!(result.results[0].meanings, vec!["forest"]);
    }

    #[test]
    fn test_resolve_single_character_is_leaf() {
        let mut pipeline = pipeline();
        assert_eq!(pipeline.resolve("林").unwrap(), Ingredient::Leaf('林'));
        assert!(matches!(pipeline.resolve("⿰"), Err(PipelineError::Grammar(_))));
    }

    #[test]
    fn test_render_recipe_manifest() {
        let mut pipeline = pipeline();
        let request = RenderRequest {
            recipe: "林".to_string(),
            width: 4,
            height: 2,
            format: PixelFormat::Grey,
        };
        let glyph = pipeline.render_recipe(&request).unwrap();
        assert_eq!((glyph.width, glyph.height), (4, 2));
        assert_eq!(glyph.recipe, "林");
        let data = base64::engine::general_purpose::STANDARD
            .decode(&glyph.data_base64)
            .unwrap();
        assert_eq!(data, vec![255; 8]);
        assert!(!glyph.manifest_hash.is_empty());

        let again = pipeline.render_recipe(&request).unwrap();
        assert_eq!(glyph.job_hash, again.job_hash);
        assert_eq!(glyph.digest, again.digest);
    }

    #[test]
    fn test_render_rgba_payload() {
        let mut pipeline = pipeline();
        let request = RenderRequest {
            recipe: "⿰木木".to_string(),
            width: 2,
            height: 1,
            format: PixelFormat::Rgba,
        };
        let glyph = pipeline.render_recipe(&request).unwrap();
        let data = base64::engine::general_purpose::STANDARD
            .decode(&glyph.data_base64)
            .unwrap();
        assert_eq!(data.len(), 8);
    }

    #[test]
    fn test_render_unrenderable_is_error() {
        let mut pipeline = pipeline();
        let request = RenderRequest {
            recipe: "⿰木水".to_string(),
            width: 2,
            height: 2,
            format: PixelFormat::Grey,
        };
        assert!(matches!(
            pipeline.render_recipe(&request),
            Err(PipelineError::Render(RenderError::UnrenderableLeaf('水')))
        ));
    }
}
