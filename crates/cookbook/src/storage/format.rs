//! On-disk encoding of recipe files.
//!
//! Recipes are written as pretty-printed JSON with a four-space indent so
//! that files edited by hand or produced by earlier tools keep their shape.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;
use crate::recipe::{Recipe, RecipeId};

/// Indentation used for recipe files.
pub const INDENT: &[u8] = b"    ";

/// Encode a recipe as the bytes of its file.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(recipe: &Recipe) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    recipe.serialize(&mut serializer)?;
    Ok(buf)
}

/// Decode a recipe file.
///
/// Files written before ids were stored get a deterministic id derived from
/// `file_name`.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid recipe object.
pub fn decode(bytes: &[u8], file_name: &str) -> Result<Recipe> {
    let mut recipe: Recipe = serde_json::from_slice(bytes)?;
    if recipe.id.is_nil() {
        recipe.id = RecipeId::from_file_name(file_name);
    }
    Ok(recipe)
}
