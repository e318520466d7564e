//! `cookbook` - CLI for the recipe catalogue
//!
//! This binary lists, searches and edits the recipe directory and drives the
//! optional remote mirror.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cookbook::cli::{
    AddCommand, Cli, Command, ConfigCommand, DeleteCommand, EditCommand, ListCommand,
    OutputFormat, RandomCommand, ShowCommand, SyncCommand,
};
use cookbook::{init_logging, Config, Cookbook, Recipe, RemoteStatus};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config_path = cli.config;
    match cli.command {
        Command::List(cmd) => handle_list(&open_cookbook(config_path)?, &cmd),
        Command::Show(cmd) => handle_show(&mut open_cookbook(config_path)?, &cmd),
        Command::Random(cmd) => handle_random(&mut open_cookbook(config_path)?, &cmd),
        Command::Add(cmd) => handle_add(&mut open_cookbook(config_path)?, &cmd),
        Command::Edit(cmd) => handle_edit(&mut open_cookbook(config_path)?, &cmd),
        Command::Delete(cmd) => handle_delete(&mut open_cookbook(config_path)?, &cmd),
        Command::Sync(cmd) => handle_sync(&mut open_cookbook(config_path)?, &cmd),
        Command::Config(cmd) => handle_config(config_path, cmd),
    }
}

fn open_cookbook(config_path: Option<PathBuf>) -> anyhow::Result<Cookbook> {
    let config = Config::load_from(config_path).context("loading configuration")?;
    Cookbook::open(&config).with_context(|| {
        format!(
            "opening recipe directory {}",
            config.recipe_dir().display()
        )
    })
}

fn handle_list(cookbook: &Cookbook, cmd: &ListCommand) -> anyhow::Result<()> {
    let recipes = cookbook.browse(&cmd.filter.to_query());

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recipes)?),
        OutputFormat::Plain => {
            for recipe in &recipes {
                println!("{}", recipe.name);
            }
        }
        OutputFormat::Table => {
            println!("{:<32} {:<11} {:<8} {:>8}", "NAME", "CATEGORY", "LENGTH", "MINUTES");
            for recipe in &recipes {
                println!(
                    "{:<32} {:<11} {:<8} {:>8}",
                    recipe.name,
                    recipe.category,
                    recipe.bucket(),
                    recipe
                        .duration
                        .map_or_else(|| "-".to_string(), |d| d.to_string())
                );
            }
            println!();
            println!("{} of {} recipes", recipes.len(), cookbook.recipes().len());
        }
    }

    if !cookbook.skipped().is_empty() {
        eprintln!(
            "{} file(s) could not be read; run with -v for details",
            cookbook.skipped().len()
        );
    }
    Ok(())
}

fn handle_show(cookbook: &mut Cookbook, cmd: &ShowCommand) -> anyhow::Result<()> {
    let id = cookbook.find_by_name(&cmd.name)?.id;
    let recipe = cookbook.select(id)?;
    print_recipe(recipe, cmd.format)
}

fn handle_random(cookbook: &mut Cookbook, cmd: &RandomCommand) -> anyhow::Result<()> {
    let mut rng = match cmd.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cookbook.initial_view(&cmd.filter.to_query(), &mut rng)? {
        Some(recipe) => print_recipe(recipe, cmd.format),
        None => {
            eprintln!("No recipe matches the current filters.");
            Ok(())
        }
    }
}

fn handle_add(cookbook: &mut Cookbook, cmd: &AddCommand) -> anyhow::Result<()> {
    cookbook.start_new()?;
    let report = cookbook.create(cmd.to_draft())?;

    println!(
        "Added '{}' ({})",
        report.recipe.name,
        report.path.display()
    );
    report_remote(&report.remote);
    Ok(())
}

fn handle_edit(cookbook: &mut Cookbook, cmd: &EditCommand) -> anyhow::Result<()> {
    let id = cookbook.find_by_name(&cmd.recipe)?.id;
    let draft = cmd.apply_to(cookbook.start_edit(id)?);
    let report = cookbook.update(id, draft)?;

    match &report.renamed_from {
        Some(from) => println!(
            "Saved '{}' ({}, moved from {})",
            report.recipe.name,
            report.path.display(),
            from
        ),
        None => println!("Saved '{}' ({})", report.recipe.name, report.path.display()),
    }
    report_remote(&report.remote);
    Ok(())
}

fn handle_delete(cookbook: &mut Cookbook, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let id = cookbook.find_by_name(&cmd.name)?.id;
    let name = cookbook.request_delete(id)?.name.clone();

    if !cmd.yes && !confirm(&format!("Delete '{name}'?"))? {
        cookbook.cancel()?;
        println!("Kept '{name}'.");
        return Ok(());
    }

    let report = cookbook.confirm_delete()?;
    if report.removed_locally {
        println!("Deleted '{}'", report.name);
    } else {
        println!("'{}' had no file to delete", report.name);
    }
    report_remote(&report.remote);
    Ok(())
}

fn handle_sync(cookbook: &mut Cookbook, cmd: &SyncCommand) -> anyhow::Result<()> {
    if !cookbook.is_mirrored() {
        anyhow::bail!("remote mirroring is disabled; set [remote] enabled = true to sync");
    }

    let pending: Vec<_> = cookbook
        .pending()?
        .into_iter()
        .filter(|entry| entry.intent.is_remote())
        .collect();

    if cmd.dry_run || pending.is_empty() {
        if pending.is_empty() {
            println!("Nothing to sync.");
        }
        for entry in &pending {
            println!(
                "{}  {}",
                entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                entry.intent
            );
        }
        return Ok(());
    }

    let report = cookbook.sync_pending()?;
    for intent in &report.synced {
        println!("synced   {intent}");
    }
    for intent in &report.dropped {
        println!("dropped  {intent}");
    }
    for (intent, error) in &report.failed {
        println!("failed   {intent}: {error}");
    }

    if !report.failed.is_empty() {
        anyhow::bail!("{} operation(s) still pending", report.failed.len());
    }
    Ok(())
}

fn handle_config(path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(path).context("loading configuration")?;
            if json {
                let mut value = serde_json::to_value(&config)?;
                if let Some(token) = value.pointer_mut("/remote/token") {
                    if !token.is_null() {
                        *token = serde_json::Value::from("<redacted>");
                    }
                }
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let remote = &config.remote;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Recipe directory:   {}", config.recipe_dir().display());
                println!();
                println!("[Remote]");
                println!("  Enabled:            {}", remote.enabled);
                println!(
                    "  Repository:         {}",
                    remote.repository.as_deref().unwrap_or("(not set)")
                );
                println!("  Branch:             {}", remote.branch);
                println!("  Path prefix:        {}", remote.path_prefix);
                println!("  API URL:            {}", remote.api_url);
                println!(
                    "  Token:              {}",
                    if remote.token.is_some() { "set" } else { "(not set)" }
                );
                println!("  Timeout (seconds):  {}", remote.timeout_secs);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                path.unwrap_or_else(Config::default_config_path).display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => anyhow::bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_recipe(recipe: &Recipe, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(recipe)?);
        return Ok(());
    }

    println!("{}", recipe.name);
    println!("{}", "=".repeat(recipe.name.chars().count()));
    println!("Category:  {}", recipe.category);
    match recipe.duration {
        Some(minutes) => println!("Duration:  {minutes} minutes ({})", recipe.bucket()),
        None => println!("Duration:  {}", recipe.bucket()),
    }
    println!();
    println!("Ingredients:");
    for line in &recipe.ingredients {
        println!("  - {line}");
    }
    println!();
    println!("Instructions:");
    for (step, line) in recipe.instructions.iter().enumerate() {
        println!("  {}. {line}", step + 1);
    }
    Ok(())
}

fn report_remote(status: &RemoteStatus) {
    match status {
        RemoteStatus::Disabled => {}
        RemoteStatus::Synced => println!("Mirrored to remote."),
        RemoteStatus::Failed(message) => {
            eprintln!("Saved locally, but the remote mirror failed: {message}");
            eprintln!("Run `cookbook sync` to retry.");
        }
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
