//! Command-line interface for cookbook.
//!
//! This module provides the CLI structure and command handlers for the
//! `cookbook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, CategoryArg, ConfigCommand, DeleteCommand, DurationArg, EditCommand, FilterArgs,
    ListCommand, OutputFormat, RandomCommand, ShowCommand, SortArg, SyncCommand,
};

use crate::logging::Verbosity;

/// cookbook - Keep your recipes as plain JSON files
///
/// Browse, search and edit a directory of recipe files, optionally mirroring
/// every change into a repository.
#[derive(Debug, Parser)]
#[command(name = "cookbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List recipes, filtered and sorted
    List(ListCommand),

    /// Show one recipe
    Show(ShowCommand),

    /// Show a random recipe from the filtered set
    Random(RandomCommand),

    /// Add a new recipe
    Add(AddCommand),

    /// Change an existing recipe
    Edit(EditCommand),

    /// Delete a recipe after confirmation
    Delete(DeleteCommand),

    /// Retry remote operations that failed earlier
    Sync(SyncCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Sync(SyncCommand { dry_run: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "cookbook");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_list_filters() {
        let args = vec![
            "cookbook",
            "list",
            "--search",
            "olive",
            "--category",
            "vegan",
            "--category",
            "fish",
            "--duration",
            "long",
            "--sort",
            "duration",
            "--format",
            "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::List(list) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(list.filter.search.as_deref(), Some("olive"));
        assert_eq!(list.filter.category, vec![CategoryArg::Vegan, CategoryArg::Fish]);
        assert_eq!(list.filter.duration, vec![DurationArg::Long]);
        assert_eq!(list.filter.sort, SortArg::Duration);
        assert_eq!(list.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["cookbook", "list"]).unwrap();
        let Command::List(list) = cli.command else {
            panic!("expected list");
        };
        assert!(list.filter.category.is_empty());
        assert_eq!(list.filter.sort, SortArg::Name);
        assert_eq!(list.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_add() {
        let args = vec![
            "cookbook",
            "add",
            "--name",
            "Soup",
            "--category",
            "Vegan",
            "--duration",
            "25",
            "-i",
            "Leek",
            "-i",
            "Potato",
            "-n",
            "Boil",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Add(add) = cli.command else {
            panic!("expected add");
        };
        let draft = add.to_draft();
        assert_eq!(draft.name, "Soup");
        assert_eq!(draft.duration, 25);
        assert_eq!(draft.ingredients, vec!["Leek", "Potato"]);
        assert_eq!(draft.instructions, vec!["Boil"]);
    }

    #[test]
    fn test_parse_add_requires_name() {
        assert!(Cli::try_parse_from(["cookbook", "add", "--category", "Vegan"]).is_err());
    }

    #[test]
    fn test_parse_edit_rename() {
        let cli =
            Cli::try_parse_from(["cookbook", "edit", "Soup", "--name", "Stew"]).unwrap();
        let Command::Edit(edit) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(edit.recipe, "Soup");
        assert_eq!(edit.name.as_deref(), Some("Stew"));
    }

    #[test]
    fn test_parse_delete_yes() {
        let cli = Cli::try_parse_from(["cookbook", "delete", "Soup", "-y"]).unwrap();
        assert!(matches!(cli.command, Command::Delete(DeleteCommand { yes: true, .. })));
    }

    #[test]
    fn test_parse_random_seed() {
        let cli = Cli::try_parse_from(["cookbook", "random", "--seed", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Random(RandomCommand { seed: Some(7), .. })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["cookbook", "-c", "/custom/config.toml", "sync"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["cookbook", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["cookbook", "-q", "list"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["cookbook", "config", "validate", "-f", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
