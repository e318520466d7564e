//! Storage layer for cookbook.
//!
//! Recipes live one per file in a single directory. The file name is derived
//! from the recipe's display name (see [`derived_file_name`]), so renaming a
//! recipe moves its file and two names that derive to the same file share it.
//!
//! Provides:
//! - Directory listing that skips unreadable files instead of failing
//! - Unconditional overwrite on save
//! - Rename as write-new-then-delete-old, journaled so it can be finished later
//! - Delete that reports whether a file was removed

pub mod format;
pub mod recovery;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::journal::{Intent, Journal};
use crate::recipe::{derived_file_name, Recipe, RecipeId, RECIPE_EXTENSION};

pub use recovery::Recovered;

/// A file in the recipe directory that could not be read as a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// File name within the recipe directory.
    pub file_name: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of scanning the recipe directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    /// Recipes that parsed, ordered by file name.
    pub recipes: Vec<Recipe>,
    /// Files that looked like recipes but did not parse.
    pub skipped: Vec<SkippedFile>,
}

/// What a save-with-rename did on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The derived file did not change; the file was overwritten in place.
    InPlace {
        /// Path written.
        path: PathBuf,
    },
    /// The recipe moved to a new file and the old one was removed.
    Moved {
        /// Old file name.
        from: String,
        /// New file name.
        to: String,
        /// Path written.
        path: PathBuf,
    },
    /// The new file was written but the old one could not be removed. The
    /// rename stays journaled and is finished the next time the store opens.
    OldFileKept {
        /// Old file name, still on disk.
        from: String,
        /// New file name.
        to: String,
        /// Path written.
        path: PathBuf,
    },
}

impl RenameOutcome {
    /// Path of the file that now holds the recipe.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::InPlace { path } | Self::Moved { path, .. } | Self::OldFileKept { path, .. } => {
                path
            }
        }
    }
}

/// File-per-recipe store rooted at a directory.
#[derive(Debug)]
pub struct RecipeStore {
    /// Directory holding the recipe files.
    dir: PathBuf,
    /// Intent log for renames and remote sync.
    journal: Journal,
}

impl RecipeStore {
    /// Open a store at `dir`, creating the directory if needed.
    ///
    /// Any rename left half done by an earlier run is finished or abandoned
    /// before the store is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the journal
    /// cannot be replayed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
            info!("Created recipe directory {}", dir.display());
        }

        let journal = Journal::in_dir(&dir);
        let recovered = recovery::recover_renames(&dir, &journal)?;
        if !recovered.is_empty() {
            info!("Recovered {} interrupted rename(s)", recovered.len());
        }

        debug!("Opened recipe store at {}", dir.display());
        Ok(Self { dir, journal })
    }

    /// Directory holding the recipe files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The store's intent journal.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Name of the file a recipe with this name is stored in.
    #[must_use]
    pub fn file_name_for(name: &str) -> String {
        derived_file_name(name)
    }

    /// Path of the file a recipe with this name is stored in.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(Self::file_name_for(name))
    }

    /// Scan the directory and parse every recipe file.
    ///
    /// Files that fail to read or parse are logged, reported in
    /// [`Listing::skipped`], and otherwise ignored. A file whose stored id
    /// repeats one already listed (a copied file, say) is given the id
    /// derived from its own file name, so every listed recipe has a
    /// distinct id; saving it persists the new id.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory itself cannot be read.
    pub fn list(&self) -> Result<Listing> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == RECIPE_EXTENSION)
            })
            .collect();
        paths.sort();

        let mut listing = Listing::default();
        let mut seen = HashSet::new();
        for path in paths {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let parsed = fs::read(&path)
                .map_err(Error::from)
                .and_then(|bytes| format::decode(&bytes, &file_name));

            match parsed {
                Ok(mut recipe) => {
                    if !seen.insert(recipe.id) {
                        let mut rekeyed = RecipeId::from_file_name(&file_name);
                        if seen.contains(&rekeyed) {
                            rekeyed = RecipeId::new();
                        }
                        warn!(
                            "{} repeats the id {} of another recipe; using {} instead",
                            file_name, recipe.id, rekeyed
                        );
                        recipe.id = rekeyed;
                        seen.insert(rekeyed);
                    }
                    listing.recipes.push(recipe);
                }
                Err(e) => {
                    warn!("Could not read {}: {}", file_name, e);
                    listing.skipped.push(SkippedFile {
                        file_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Listed {} recipes ({} skipped) from {}",
            listing.recipes.len(),
            listing.skipped.len(),
            self.dir.display()
        );
        Ok(listing)
    }

    /// All readable recipes.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn recipes(&self) -> Result<Vec<Recipe>> {
        Ok(self.list()?.recipes)
    }

    /// Write a recipe to the file derived from its name.
    ///
    /// Overwrites unconditionally. When the file belonged to a different
    /// recipe (its name derives to the same file), that recipe is lost; this
    /// is logged but not prevented.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe cannot be encoded or written.
    pub fn save(&self, recipe: &Recipe) -> Result<PathBuf> {
        let file_name = recipe.file_name();
        let path = self.dir.join(&file_name);

        if let Some(previous) = self.read_file(&path, &file_name) {
            if previous.id != recipe.id {
                warn!(
                    "Saving '{}' overwrites '{}' stored in {}",
                    recipe.name, previous.name, file_name
                );
            }
        }

        let bytes = format::encode(recipe)?;
        fs::write(&path, bytes).map_err(|source| Error::FileWrite {
            path: path.clone(),
            source,
        })?;

        debug!("Saved '{}' to {}", recipe.name, path.display());
        Ok(path)
    }

    /// Save a recipe that was previously stored under `old_name`.
    ///
    /// The recipe is written under the file derived from its current name;
    /// the old file is removed only if the derived files differ. The rename is
    /// journaled for the duration so an interruption between the two steps is
    /// repaired the next time the store is opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the new file cannot be written or the journal
    /// cannot be updated. Failure to remove the old file is logged and leaves
    /// the intent pending.
    pub fn rename_if_needed(&self, old_name: &str, recipe: &Recipe) -> Result<RenameOutcome> {
        let from = derived_file_name(old_name);
        let to = recipe.file_name();

        if from == to {
            let path = self.save(recipe)?;
            return Ok(RenameOutcome::InPlace { path });
        }

        let intent = Intent::Rename {
            id: recipe.id,
            from: from.clone(),
            to: to.clone(),
        };
        self.journal.record(intent.clone())?;

        let path = self.save(recipe)?;

        let old_path = self.dir.join(&from);
        match fs::remove_file(&old_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Old file {} was already gone", from);
            }
            Err(e) => {
                warn!(
                    "Renamed '{}' but could not remove {}: {}",
                    recipe.name, from, e
                );
                return Ok(RenameOutcome::OldFileKept { from, to, path });
            }
        }

        self.journal.complete(&intent)?;
        info!("Renamed {} -> {}", from, to);
        Ok(RenameOutcome::Moved { from, to, path })
    }

    /// Delete the file derived from `name`.
    ///
    /// Returns `true` if a file was removed and `false` if there was nothing
    /// to remove or removal failed. Never returns an error.
    #[must_use]
    pub fn delete(&self, name: &str) -> bool {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Nothing to delete at {}", path.display());
                false
            }
            Err(e) => {
                warn!("Could not delete {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Raw bytes of a recipe file, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn read_bytes(&self, file_name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.dir.join(file_name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_file(&self, path: &Path, file_name: &str) -> Option<Recipe> {
        let bytes = fs::read(path).ok()?;
        format::decode(&bytes, file_name).ok()
    }
}
