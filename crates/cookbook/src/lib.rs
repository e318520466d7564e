//! `cookbook` - A personal recipe catalogue kept as one JSON file per recipe
//!
//! This library provides the recipe store, the optional remote mirror that
//! copies every change into a repository through a contents API, and the
//! filtering, search and sort rules used to browse the collection.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod journal;
pub mod logging;
pub mod mirror;
pub mod query;
pub mod recipe;
pub mod storage;
pub mod view;

pub use app::{Cookbook, DeleteReport, Mutation, RemoteStatus, SyncReport};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use mirror::RemoteMirror;
pub use query::{RecipeQuery, SortKey};
pub use recipe::{Category, DurationBucket, Recipe, RecipeDraft, RecipeId};
pub use storage::RecipeStore;
pub use view::{Action, ViewState};
