//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::query::{RecipeQuery, SortKey};
use crate::recipe::{Category, DurationBucket, RecipeDraft};

/// Filters shared by `list` and `random`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive text to look for in any field
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only these categories (repeatable; default is all)
    #[arg(long, value_enum)]
    pub category: Vec<CategoryArg>,

    /// Only these duration buckets (repeatable; default is all)
    #[arg(long, value_enum)]
    pub duration: Vec<DurationArg>,

    /// Primary sort key
    #[arg(long, value_enum, default_value = "name")]
    pub sort: SortArg,
}

impl FilterArgs {
    /// Build the query these flags describe.
    ///
    /// Omitting `--category` or `--duration` selects every value.
    #[must_use]
    pub fn to_query(&self) -> RecipeQuery {
        let mut query = RecipeQuery::new().sorted_by(self.sort.into());
        if !self.category.is_empty() {
            query = query.with_categories(self.category.iter().copied().map(Category::from));
        }
        if !self.duration.is_empty() {
            query = query.with_durations(self.duration.iter().copied().map(DurationBucket::from));
        }
        if let Some(text) = &self.search {
            query = query.with_text(text);
        }
        query
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Filters and ordering
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Recipe name (exact, or ignoring case)
    pub name: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Random command arguments.
#[derive(Debug, Args)]
pub struct RandomCommand {
    /// Filters the pick is drawn from
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Seed for a reproducible pick
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Fields of the add form.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Recipe name
    #[arg(long)]
    pub name: String,

    /// Category: vegetarian, vegan, fish or meat
    #[arg(long)]
    pub category: Option<String>,

    /// Cooking time in minutes (1-500)
    #[arg(long, default_value_t = 20)]
    pub duration: u32,

    /// Ingredient lines (repeatable; one value may hold several lines)
    #[arg(short, long = "ingredient")]
    pub ingredients: Vec<String>,

    /// Instruction steps (repeatable; one value may hold several lines)
    #[arg(short = 'n', long = "instruction")]
    pub instructions: Vec<String>,
}

/// Split every value into lines, dropping blank ones.
fn split_lines(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| RecipeDraft::lines(value))
        .collect()
}

impl AddCommand {
    /// The form as entered, before validation.
    #[must_use]
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            name: self.name.clone(),
            category: self.category.clone().unwrap_or_default(),
            duration: self.duration,
            ingredients: split_lines(&self.ingredients),
            instructions: split_lines(&self.instructions),
        }
    }
}

/// Edit command arguments. Only the given fields change.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Name of the recipe to edit
    pub recipe: String,

    /// New name; moves the recipe to a new file
    #[arg(long)]
    pub name: Option<String>,

    /// New category
    #[arg(long)]
    pub category: Option<String>,

    /// New cooking time in minutes
    #[arg(long)]
    pub duration: Option<u32>,

    /// Replacement ingredient lines (repeatable)
    #[arg(short, long = "ingredient")]
    pub ingredients: Vec<String>,

    /// Replacement instruction steps (repeatable)
    #[arg(short = 'n', long = "instruction")]
    pub instructions: Vec<String>,
}

impl EditCommand {
    /// Apply the given flags on top of a prefilled draft.
    #[must_use]
    pub fn apply_to(&self, mut draft: RecipeDraft) -> RecipeDraft {
        if let Some(name) = &self.name {
            draft.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            draft.category.clone_from(category);
        }
        if let Some(duration) = self.duration {
            draft.duration = duration;
        }
        if !self.ingredients.is_empty() {
            draft.ingredients = split_lines(&self.ingredients);
        }
        if !self.instructions.is_empty() {
            draft.instructions = split_lines(&self.instructions);
        }
        draft
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Name of the recipe to delete
    pub name: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Sync command arguments.
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Only list pending remote operations
    #[arg(long)]
    pub dry_run: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Category argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Vegetarian recipes
    Vegetarian,
    /// Vegan recipes
    Vegan,
    /// Fish recipes
    Fish,
    /// Meat recipes
    Meat,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Vegetarian => Self::Vegetarian,
            CategoryArg::Vegan => Self::Vegan,
            CategoryArg::Fish => Self::Fish,
            CategoryArg::Meat => Self::Meat,
        }
    }
}

/// Duration bucket argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DurationArg {
    /// Under 15 minutes
    Short,
    /// 15 to 30 minutes
    Medium,
    /// Over 30 minutes
    Long,
    /// No duration recorded
    Unknown,
}

impl From<DurationArg> for DurationBucket {
    fn from(arg: DurationArg) -> Self {
        match arg {
            DurationArg::Short => Self::Short,
            DurationArg::Medium => Self::Medium,
            DurationArg::Long => Self::Long,
            DurationArg::Unknown => Self::Unknown,
        }
    }
}

/// Sort key argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortArg {
    /// Name, then category, then duration
    #[default]
    Name,
    /// Category first
    Category,
    /// Duration bucket first
    Duration,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::Category => Self::Category,
            SortArg::Duration => Self::Duration,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;

    #[test]
    fn test_category_arg_conversion() {
        assert_eq!(Category::from(CategoryArg::Vegetarian), Category::Vegetarian);
        assert_eq!(Category::from(CategoryArg::Vegan), Category::Vegan);
        assert_eq!(Category::from(CategoryArg::Fish), Category::Fish);
        assert_eq!(Category::from(CategoryArg::Meat), Category::Meat);
    }

    #[test]
    fn test_duration_arg_conversion() {
        assert_eq!(DurationBucket::from(DurationArg::Short), DurationBucket::Short);
        assert_eq!(
            DurationBucket::from(DurationArg::Unknown),
            DurationBucket::Unknown
        );
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_empty_filter_selects_everything() {
        assert_eq!(FilterArgs::default().to_query(), RecipeQuery::new());
    }

    #[test]
    fn test_filter_to_query() {
        let filter = FilterArgs {
            search: Some("olive".to_string()),
            category: vec![CategoryArg::Vegan],
            duration: vec![DurationArg::Long],
            sort: SortArg::Duration,
        };
        let query = filter.to_query();

        let hit = Recipe::new("Pie", Category::Vegan, Some(40)).with_ingredients(["Olive Oil"]);
        let wrong_category = Recipe::new("Pie", Category::Meat, Some(40)).with_ingredients(["Olive Oil"]);
        assert!(query.matches(&hit));
        assert!(!query.matches(&wrong_category));
        assert_eq!(query.categories().len(), 1);
    }

    #[test]
    fn test_add_without_category_is_blank() {
        let cmd = AddCommand {
            name: "Soup".to_string(),
            category: None,
            duration: 20,
            ingredients: vec![],
            instructions: vec![],
        };
        let draft = cmd.to_draft();
        assert!(draft.category.is_empty());
        assert!(draft.into_recipe(crate::RecipeId::new()).is_err());
    }

    #[test]
    fn test_multi_line_values_become_separate_lines() {
        let cmd = AddCommand {
            name: "Soup".to_string(),
            category: Some("Vegan".to_string()),
            duration: 20,
            ingredients: vec!["Leek\nPotato\n\n".to_string(), "Salt".to_string()],
            instructions: vec!["Chop\r\n  \r\nBoil".to_string()],
        };

        let draft = cmd.to_draft();
        assert_eq!(draft.ingredients, vec!["Leek", "Potato", "Salt"]);
        assert_eq!(draft.instructions, vec!["Chop", "Boil"]);
    }

    #[test]
    fn test_edit_overrides_only_given_fields() {
        let recipe = Recipe::new("Soup", Category::Vegan, Some(25))
            .with_ingredients(["Leek"])
            .with_instructions(["Boil"]);
        let cmd = EditCommand {
            recipe: "Soup".to_string(),
            name: Some("Stew".to_string()),
            category: None,
            duration: None,
            ingredients: vec!["Beef".to_string()],
            instructions: vec![],
        };

        let draft = cmd.apply_to(RecipeDraft::from_recipe(&recipe));
        assert_eq!(draft.name, "Stew");
        assert_eq!(draft.category, "Vegan");
        assert_eq!(draft.duration, 25);
        assert_eq!(draft.ingredients, vec!["Beef"]);
        assert_eq!(draft.instructions, vec!["Boil"]);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
