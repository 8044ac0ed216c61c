//! Hashing - recipe keys and output digests
//!
//! Recipe lookup uses the XOR key on [`Ingredient`]; rendered output is
//! identified by SHA-256 over canonical bytes.

use sha2::{Digest, Sha256};
use serde::Serialize;
use serde_json::{to_string, Value};

use crate::ingredient::Ingredient;
use crate::render::{Bitmap, Pixel};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Lookup key of a tree, formatted for output.
pub fn recipe_key(tree: &Ingredient) -> String {
    format!("{:08x}", tree.recipe_hash())
}

/// Digest of a bitmap's dimensions and pixel bytes.
pub fn bitmap_digest<P: Pixel>(bitmap: &Bitmap<P>) -> String {
    let mut data = Vec::with_capacity(8 + bitmap.pixels().len() * P::CHANNELS);
    data.extend_from_slice(&bitmap.width().to_be_bytes());
    data.extend_from_slice(&bitmap.height().to_be_bytes());
    data.extend_from_slice(&bitmap.to_bytes());
    sha256_hex(&data)
}

/// Compute a render job hash for reproducibility
/// job_hash = sha256(canonical_recipe + width + height + engine_version)
pub fn compute_job_hash(
    canonical_recipe: &str,
    width: u32,
    height: u32,
    engine_version: &str,
) -> String {
    let combined = format!("{}:{}x{}:{}", canonical_recipe, width, height, engine_version);
    sha256_hex(combined.as_bytes())
}

/// Compute manifest hash over canonical JSON
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(manifest)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
