//! Filtering, searching and ordering of the in-memory recipe set.
//!
//! Everything here is read-only over a slice of recipes that was just loaded
//! from disk; nothing is cached between interactions.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::recipe::{Category, DurationBucket, Recipe};

/// Case-insensitive substring matcher over recipe text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Normalize a query string into a matcher. Returns `None` for blank inputs.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    /// Whether the name, category, duration bucket, any ingredient or any
    /// instruction contains the query.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.matches_field(&recipe.name)
            || self.matches_field(recipe.category.label())
            || self.matches_field(recipe.bucket().label())
            || recipe.ingredients.iter().any(|line| self.matches_field(line))
            || recipe
                .instructions
                .iter()
                .any(|step| self.matches_field(step))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

/// Primary sort key. The remaining keys break ties in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Name, then category, then duration bucket.
    #[default]
    Name,
    /// Category, then name, then duration bucket.
    Category,
    /// Duration bucket, then name, then category.
    Duration,
}

impl SortKey {
    /// Compare two recipes under this key.
    #[must_use]
    pub fn compare(self, a: &Recipe, b: &Recipe) -> Ordering {
        let by_name = || a.name.cmp(&b.name);
        let by_category = || a.category.label().cmp(b.category.label());
        let by_bucket = || a.bucket().rank().cmp(&b.bucket().rank());

        match self {
            Self::Name => by_name().then_with(by_category).then_with(by_bucket),
            Self::Category => by_category().then_with(by_name).then_with(by_bucket),
            Self::Duration => by_bucket().then_with(by_name).then_with(by_category),
        }
    }
}

/// Filters, text search and ordering applied to the recipe list.
///
/// Category and duration filters are conjunctive; the text search matches if
/// any field matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeQuery {
    categories: BTreeSet<Category>,
    durations: BTreeSet<DurationBucket>,
    text: Option<TextMatcher>,
    sort: SortKey,
}

impl Default for RecipeQuery {
    /// Every category, every duration bucket, no text, sorted by name.
    fn default() -> Self {
        Self {
            categories: Category::ALL.into_iter().collect(),
            durations: DurationBucket::ALL.into_iter().collect(),
            text: None,
            sort: SortKey::default(),
        }
    }
}

impl RecipeQuery {
    /// A query that selects everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given categories. An empty selection matches nothing.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Restrict to the given duration buckets. An empty selection matches nothing.
    #[must_use]
    pub fn with_durations(mut self, durations: impl IntoIterator<Item = DurationBucket>) -> Self {
        self.durations = durations.into_iter().collect();
        self
    }

    /// Add a free-text search. Blank text clears the search.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = TextMatcher::new(text);
        self
    }

    /// Choose the primary sort key.
    #[must_use]
    pub fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Selected categories.
    #[must_use]
    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    /// Selected duration buckets.
    #[must_use]
    pub fn durations(&self) -> &BTreeSet<DurationBucket> {
        &self.durations
    }

    /// Whether a single recipe passes the filters and the text search.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.categories.contains(&recipe.category)
            && self.durations.contains(&recipe.bucket())
            && self.text.as_ref().map_or(true, |text| text.matches(recipe))
    }

    /// Filter and sort `recipes`. The sort is stable.
    #[must_use]
    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        let mut selected: Vec<&Recipe> = recipes.iter().filter(|r| self.matches(r)).collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        selected
    }
}

/// Pick one recipe uniformly at random, or `None` if there are none.
pub fn pick_random<'a, R: Rng + ?Sized>(recipes: &[&'a Recipe], rng: &mut R) -> Option<&'a Recipe> {
    recipes.choose(rng).copied()
}
