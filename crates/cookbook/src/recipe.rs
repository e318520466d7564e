//! Core recipe types for cookbook.
//!
//! This module defines the recipe record as it is stored on disk, the
//! category and duration vocabularies used for filtering, and the form draft
//! that is validated before anything is written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Error, Result};

/// File extension that marks a file in the recipe directory as a recipe.
pub const RECIPE_EXTENSION: &str = "json";

/// Shortest duration accepted from the form, in minutes.
pub const MIN_DURATION: u32 = 1;

/// Longest duration accepted from the form, in minutes.
pub const MAX_DURATION: u32 = 500;

/// Derive the storage file name for a recipe display name.
///
/// Lowercases the name and replaces spaces with underscores. The transform is
/// not injective: `"Pasta Bake"` and `"pasta bake"` share `pasta_bake.json`.
#[must_use]
pub fn derived_file_name(name: &str) -> String {
    format!(
        "{}.{RECIPE_EXTENSION}",
        name.to_lowercase().replace(' ', "_")
    )
}

/// Stable identifier of a recipe, independent of its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecipeId(Uuid);

impl RecipeId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier for a legacy file that predates stored ids.
    ///
    /// Deterministic in the file name so that reloading yields the same id
    /// until the recipe is saved with the id written into it.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, file_name.as_bytes()))
    }

    /// Whether this is the unset (all-zero) id.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The first eight hex digits, enough to tell recipes apart on screen.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Serialize for RecipeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecipeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self)
    }
}

/// Dietary category of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// No meat or fish.
    Vegetarian,
    /// No animal products.
    Vegan,
    /// Contains fish.
    Fish,
    /// Contains meat.
    Meat,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [Self::Vegetarian, Self::Vegan, Self::Fish, Self::Meat];

    /// Canonical capitalised label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Vegetarian => "Vegetarian",
            Self::Vegan => "Vegan",
            Self::Fish => "Fish",
            Self::Meat => "Meat",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a category label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::validation(format!(
                    "unknown category '{wanted}' (expected one of Vegetarian, Vegan, Fish, Meat)"
                ))
            })
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Coarse cooking-time class used for filtering and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DurationBucket {
    /// Under 15 minutes.
    Short,
    /// 15 to 30 minutes inclusive.
    Medium,
    /// Over 30 minutes.
    Long,
    /// No duration recorded.
    Unknown,
}

impl DurationBucket {
    /// All buckets in sort order.
    pub const ALL: [Self; 4] = [Self::Short, Self::Medium, Self::Long, Self::Unknown];

    /// Classify a duration in minutes.
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0..=14 => Self::Short,
            15..=30 => Self::Medium,
            _ => Self::Long,
        }
    }

    /// Classify an optional duration; a missing value is [`DurationBucket::Unknown`].
    #[must_use]
    pub fn classify(minutes: Option<u32>) -> Self {
        minutes.map_or(Self::Unknown, Self::from_minutes)
    }

    /// Sort rank: Short < Medium < Long < Unknown.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Short => 0,
            Self::Medium => 1,
            Self::Long => 2,
            Self::Unknown => 3,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DurationBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::validation(format!(
                    "unknown duration '{wanted}' (expected one of Short, Medium, Long, Unknown)"
                ))
            })
    }
}

/// A recipe as stored in its JSON file.
///
/// Keys this crate does not know about are kept in `extra` and written back
/// unchanged, so hand-added fields such as `description` survive an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable identifier. Nil when read from a file written without one.
    #[serde(default, skip_serializing_if = "RecipeId::is_nil")]
    pub id: RecipeId,

    /// Display name; also the source of the derived file name.
    pub name: String,

    /// Dietary category.
    pub category: Category,

    /// Cooking time in minutes, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    /// Ingredient lines in order.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Instruction steps in order.
    #[serde(default)]
    pub instructions: Vec<String>,

    /// Unrecognised keys carried through from disk.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Recipe {
    /// Create a recipe with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category, duration: Option<u32>) -> Self {
        Self {
            id: RecipeId::new(),
            name: name.into(),
            category,
            duration,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Set the ingredient lines.
    #[must_use]
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Set the instruction steps.
    #[must_use]
    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    /// The duration bucket of this recipe.
    #[must_use]
    pub fn bucket(&self) -> DurationBucket {
        DurationBucket::classify(self.duration)
    }

    /// The derived storage file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        derived_file_name(&self.name)
    }
}

/// Form input for adding or editing a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Recipe name as typed.
    pub name: String,
    /// Category as typed or selected; empty when nothing was chosen.
    pub category: String,
    /// Duration in minutes.
    pub duration: u32,
    /// Ingredient lines.
    pub ingredients: Vec<String>,
    /// Instruction lines.
    pub instructions: Vec<String>,
}

impl RecipeDraft {
    /// Split a multi-line text area into items, dropping blank lines.
    #[must_use]
    pub fn lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect()
    }

    /// Prefill a draft from an existing recipe for editing.
    #[must_use]
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            category: recipe.category.label().to_string(),
            duration: recipe.duration.unwrap_or(20),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
        }
    }

    /// Validate the draft and turn it into a recipe with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the name is blank or contains a path
    /// separator, the category is empty or unknown, or the duration is out of
    /// range.
    pub fn into_recipe(self, id: RecipeId) -> Result<Recipe> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation("recipe name required"));
        }
        if name.contains(['/', '\\']) {
            return Err(Error::validation(
                "recipe name cannot contain path separators",
            ));
        }
        if self.category.trim().is_empty() {
            return Err(Error::validation("category required"));
        }
        let category: Category = self.category.parse()?;
        if !(MIN_DURATION..=MAX_DURATION).contains(&self.duration) {
            return Err(Error::validation(format!(
                "duration must be between {MIN_DURATION} and {MAX_DURATION} minutes"
            )));
        }

        Ok(Recipe {
            id,
            name: name.to_string(),
            category,
            duration: Some(self.duration),
            ingredients: self.ingredients,
            instructions: self.instructions,
            extra: serde_json::Map::new(),
        })
    }
}
