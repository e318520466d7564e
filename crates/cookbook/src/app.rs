//! A cookbook session: one user working through a sequence of actions.
//!
//! Every mutation follows the same order:
//! 1. validate the input (nothing is written on failure)
//! 2. journal the remote intent, if mirroring is enabled
//! 3. change the local directory
//! 4. mirror the change, best effort
//! 5. reload the recipe set
//!
//! The local directory is the source of truth. A mirror failure is reported
//! in the returned [`RemoteStatus`] and left in the journal for
//! [`Cookbook::sync_pending`]; it never rolls back the local change.

use std::fmt;
use std::path::PathBuf;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::journal::{Intent, JournalEntry};
use crate::mirror::{self, RemoteMirror};
use crate::query::{pick_random, RecipeQuery};
use crate::recipe::{derived_file_name, Recipe, RecipeDraft, RecipeId};
use crate::storage::{RecipeStore, RenameOutcome, SkippedFile};
use crate::view::{Action, ViewState};

/// How the remote side of a mutation went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Mirroring is not enabled.
    Disabled,
    /// The remote reflects the change.
    Synced,
    /// The remote call failed; the local change stands.
    Failed(String),
}

impl RemoteStatus {
    /// Whether the remote call failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Combine the status of two remote calls made for one mutation.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Failed(a), Self::Failed(b)) => Self::Failed(format!("{a}; {b}")),
            (failed @ Self::Failed(_), _) | (_, failed @ Self::Failed(_)) => failed,
            (Self::Synced, _) | (_, Self::Synced) => Self::Synced,
            (Self::Disabled, Self::Disabled) => Self::Disabled,
        }
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "not mirrored"),
            Self::Synced => write!(f, "mirrored"),
            Self::Failed(message) => write!(f, "mirror failed: {message}"),
        }
    }
}

/// Result of creating or updating a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// The recipe as written.
    pub recipe: Recipe,
    /// File now holding it.
    pub path: PathBuf,
    /// Previous file name, when the save moved the recipe.
    pub renamed_from: Option<String>,
    /// Remote outcome.
    pub remote: RemoteStatus,
}

/// Result of a confirmed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    /// Name of the deleted recipe.
    pub name: String,
    /// Whether a local file was removed.
    pub removed_locally: bool,
    /// Remote outcome.
    pub remote: RemoteStatus,
}

/// Result of replaying journaled remote operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Operations that reached the remote.
    pub synced: Vec<Intent>,
    /// Operations that failed again, with the error.
    pub failed: Vec<(Intent, String)>,
    /// Pushes dropped because the local file no longer exists.
    pub dropped: Vec<Intent>,
}

/// A single-user session over a recipe directory.
#[derive(Debug)]
pub struct Cookbook {
    store: RecipeStore,
    mirror: Option<RemoteMirror>,
    view: ViewState,
    recipes: Vec<Recipe>,
    skipped: Vec<SkippedFile>,
}

impl Cookbook {
    /// Start a session over `store`, optionally mirroring to `mirror`.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe directory cannot be read.
    pub fn new(store: RecipeStore, mirror: Option<RemoteMirror>) -> Result<Self> {
        let mut cookbook = Self {
            store,
            mirror,
            view: ViewState::default(),
            recipes: Vec::new(),
            skipped: Vec::new(),
        };
        cookbook.load()?;
        Ok(cookbook)
    }

    /// Start a session from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the mirror is
    /// enabled but misconfigured.
    pub fn open(config: &Config) -> Result<Self> {
        let store = RecipeStore::open(config.recipe_dir())?;
        let mirror = mirror::from_settings(&config.remote)?;
        Self::new(store, mirror)
    }

    /// Re-read every recipe from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe directory cannot be read.
    pub fn load(&mut self) -> Result<&[Recipe]> {
        let listing = self.store.list()?;
        self.recipes = listing.recipes;
        self.skipped = listing.skipped;
        Ok(&self.recipes)
    }

    /// Recipes as of the last reload, in file order.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Files skipped during the last reload.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Current view state.
    #[must_use]
    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Whether changes are mirrored.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirror.is_some()
    }

    /// The recipe the view is about, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Recipe> {
        let id = self.view.selected()?;
        self.find(id)
    }

    /// Look up a loaded recipe by id.
    #[must_use]
    pub fn find(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Look up a loaded recipe by name, exact match first, then ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameNotFound`] if nothing matches.
    pub fn find_by_name(&self, name: &str) -> Result<&Recipe> {
        self.recipes
            .iter()
            .find(|recipe| recipe.name == name)
            .or_else(|| {
                self.recipes
                    .iter()
                    .find(|recipe| recipe.name.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| Error::NameNotFound(name.to_string()))
    }

    /// Filtered and sorted view of the loaded recipes.
    #[must_use]
    pub fn browse(&self, query: &RecipeQuery) -> Vec<&Recipe> {
        query.apply(&self.recipes)
    }

    /// Apply a view action without touching storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the action is not allowed now.
    pub fn dispatch(&mut self, action: Action) -> Result<ViewState> {
        let next = self.view.apply(action)?;
        debug!("{} -> {} ({})", self.view, next, action);
        self.view = next;
        Ok(next)
    }

    /// Open a recipe.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe does not exist or a delete is pending.
    pub fn select(&mut self, id: RecipeId) -> Result<&Recipe> {
        self.load()?;
        if self.find(id).is_none() {
            return Err(Error::RecipeNotFound(id));
        }
        self.dispatch(Action::Select(id))?;
        self.find(id).ok_or(Error::RecipeNotFound(id))
    }

    /// Open a random recipe from the filtered set.
    ///
    /// Returns `None`, leaving the view unchanged, when the filter matches
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or a delete is
    /// pending.
    pub fn random<R: Rng + ?Sized>(
        &mut self,
        query: &RecipeQuery,
        rng: &mut R,
    ) -> Result<Option<&Recipe>> {
        self.load()?;
        let Some(id) = pick_random(&self.browse(query), rng).map(|recipe| recipe.id) else {
            return Ok(None);
        };
        self.dispatch(Action::Random(id))?;
        Ok(self.find(id))
    }

    /// The recipe to show when the session starts.
    ///
    /// While browsing, a random recipe from the filtered set is opened;
    /// otherwise the current recipe is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn initial_view<R: Rng + ?Sized>(
        &mut self,
        query: &RecipeQuery,
        rng: &mut R,
    ) -> Result<Option<&Recipe>> {
        if self.view == ViewState::Browsing {
            return self.random(query, rng);
        }
        Ok(self.current())
    }

    /// Open the new-recipe form.
    ///
    /// # Errors
    ///
    /// Returns an error if a delete is pending.
    pub fn start_new(&mut self) -> Result<()> {
        self.dispatch(Action::New)?;
        Ok(())
    }

    /// Open the edit form for a recipe, prefilled with its fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe does not exist or a delete is pending.
    pub fn start_edit(&mut self, id: RecipeId) -> Result<RecipeDraft> {
        if self.view != ViewState::Editing(id) {
            if self.view != ViewState::Viewing(id) {
                self.select(id)?;
            }
            self.dispatch(Action::Edit)?;
        }
        self.find(id)
            .map(RecipeDraft::from_recipe)
            .ok_or(Error::RecipeNotFound(id))
    }

    /// Save a new recipe from the add form.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written, or an error if
    /// the local write fails. Remote failures are reported in the result.
    pub fn create(&mut self, draft: RecipeDraft) -> Result<Mutation> {
        if self.view != ViewState::Adding {
            self.start_new()?;
        }

        let recipe = draft.into_recipe(RecipeId::new())?;
        let file_name = recipe.file_name();

        let push = Intent::Push {
            file: file_name.clone(),
        };
        self.journal_remote(&push)?;

        let path = self.store.save(&recipe)?;
        info!("Saved {}", recipe.name);

        let remote = self.run_remote(&push)?;
        self.load()?;
        self.dispatch(Action::Save(recipe.id))?;

        Ok(Mutation {
            recipe,
            path,
            renamed_from: None,
            remote,
        })
    }

    /// Save changes to an existing recipe from the edit form.
    ///
    /// If the name change moves the recipe to another file, the old file is
    /// removed locally and remotely. When the old local file cannot be
    /// removed, its remote copy is kept too and the removal stays pending.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written, an error if
    /// the recipe does not exist, or an error if the local write fails.
    pub fn update(&mut self, id: RecipeId, draft: RecipeDraft) -> Result<Mutation> {
        self.load()?;
        let existing = self.find(id).cloned().ok_or(Error::RecipeNotFound(id))?;
        if self.view != ViewState::Editing(id) {
            self.start_edit(id)?;
        }

        let mut recipe = draft.into_recipe(id)?;
        recipe.extra = existing.extra.clone();

        let old_file = derived_file_name(&existing.name);
        let new_file = recipe.file_name();

        let push = Intent::Push {
            file: new_file.clone(),
        };
        let remove = Intent::Remove {
            file: old_file.clone(),
        };
        let moves = old_file != new_file;
        if moves {
            self.journal_remote(&remove)?;
        }
        self.journal_remote(&push)?;

        let outcome = self.store.rename_if_needed(&existing.name, &recipe)?;

        let mut remote = self.run_remote(&push)?;
        if moves {
            remote = remote.merge(self.run_remote(&remove)?);
        }

        self.load()?;
        self.dispatch(Action::Save(id))?;

        let (path, renamed_from) = match outcome {
            RenameOutcome::InPlace { path } => (path, None),
            RenameOutcome::Moved { from, path, .. }
            | RenameOutcome::OldFileKept { from, path, .. } => (path, Some(from)),
        };
        Ok(Mutation {
            recipe,
            path,
            renamed_from,
            remote,
        })
    }

    /// Ask to delete a recipe. Nothing is removed until
    /// [`Cookbook::confirm_delete`].
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe does not exist or another delete is
    /// pending.
    pub fn request_delete(&mut self, id: RecipeId) -> Result<&Recipe> {
        if !matches!(self.view, ViewState::Viewing(v) | ViewState::Editing(v) if v == id) {
            self.select(id)?;
        }
        self.dispatch(Action::RequestDelete)?;
        self.find(id).ok_or(Error::RecipeNotFound(id))
    }

    /// Carry out the pending delete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if no delete is pending, or an
    /// error if the journal cannot be written.
    pub fn confirm_delete(&mut self) -> Result<DeleteReport> {
        let ViewState::ConfirmingDelete(id) = self.view else {
            return Err(Error::InvalidTransition {
                state: self.view,
                action: Action::ConfirmDelete,
            });
        };

        self.load()?;
        let Some(recipe) = self.find(id).cloned() else {
            warn!("Recipe {} disappeared before the delete was confirmed", id);
            self.dispatch(Action::ConfirmDelete)?;
            return Err(Error::RecipeNotFound(id));
        };

        let remove = Intent::Remove {
            file: recipe.file_name(),
        };
        self.journal_remote(&remove)?;

        let removed_locally = self.store.delete(&recipe.name);
        if !removed_locally {
            warn!("No local file removed for '{}'", recipe.name);
        }

        let remote = self.run_remote(&remove)?;
        self.dispatch(Action::ConfirmDelete)?;
        self.load()?;

        Ok(DeleteReport {
            name: recipe.name,
            removed_locally,
            remote,
        })
    }

    /// Back out of the current form or prompt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] when there is nothing to cancel.
    pub fn cancel(&mut self) -> Result<ViewState> {
        self.dispatch(Action::Cancel)
    }

    /// Journal entries still waiting to complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be read.
    pub fn pending(&self) -> Result<Vec<JournalEntry>> {
        self.store.journal().pending()
    }

    /// Retry every journaled remote operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteNotConfigured`] when mirroring is off, or an
    /// error if the journal cannot be read or written.
    pub fn sync_pending(&mut self) -> Result<SyncReport> {
        let Some(mirror) = &self.mirror else {
            return Err(Error::RemoteNotConfigured(
                "enable [remote] to sync".to_string(),
            ));
        };
        let journal = self.store.journal();

        let mut report = SyncReport::default();
        for entry in journal.pending()? {
            let intent = entry.intent;
            let result = match &intent {
                Intent::Rename { .. } => continue,
                Intent::Push { file } => match self.store.read_bytes(file)? {
                    Some(bytes) => mirror.push(file, &bytes).map(|_| ()),
                    None => {
                        debug!("Dropping push of {}: no local file", file);
                        journal.complete(&intent)?;
                        report.dropped.push(intent);
                        continue;
                    }
                },
                Intent::Remove { file } => {
                    if let Some(reason) = self.kept_locally(file) {
                        report.failed.push((intent, reason));
                        continue;
                    }
                    mirror.remove(file).map(|_| ())
                }
            };

            match result {
                Ok(()) => {
                    journal.complete(&intent)?;
                    report.synced.push(intent);
                }
                Err(e) => {
                    warn!("Sync of {} failed: {}", intent, e);
                    report.failed.push((intent, e.to_string()));
                }
            }
        }

        info!(
            "Sync finished: {} synced, {} failed, {} dropped",
            report.synced.len(),
            report.failed.len(),
            report.dropped.len()
        );
        Ok(report)
    }

    /// Record a remote intent before the local change it mirrors.
    fn journal_remote(&self, intent: &Intent) -> Result<()> {
        if self.mirror.is_none() {
            return Ok(());
        }
        let journal = self.store.journal();
        journal.supersede_remote(intent.file())?;
        journal.record(intent.clone())
    }

    /// A remote copy is only removed once the local file is gone.
    fn kept_locally(&self, file: &str) -> Option<String> {
        if !self.store.dir().join(file).exists() {
            return None;
        }
        warn!("Not removing {} remotely: the local file still exists", file);
        Some(format!("{file} still exists locally"))
    }

    /// Perform a journaled remote intent, clearing it on success.
    fn run_remote(&self, intent: &Intent) -> Result<RemoteStatus> {
        let Some(mirror) = &self.mirror else {
            return Ok(RemoteStatus::Disabled);
        };

        let result = match intent {
            Intent::Push { file } => {
                let bytes = self
                    .store
                    .read_bytes(file)?
                    .ok_or_else(|| Error::internal(format!("{file} vanished after saving")))?;
                mirror.push(file, &bytes).map(|_| ())
            }
            Intent::Remove { file } => {
                if let Some(reason) = self.kept_locally(file) {
                    return Ok(RemoteStatus::Failed(reason));
                }
                mirror.remove(file).map(|_| ())
            }
            Intent::Rename { .. } => return Ok(RemoteStatus::Disabled),
        };

        match result {
            Ok(()) => {
                self.store.journal().complete(intent)?;
                Ok(RemoteStatus::Synced)
            }
            Err(e) => {
                warn!("Could not {} remotely, kept for sync: {}", intent, e);
                Ok(RemoteStatus::Failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::InMemoryContents;
    use crate::recipe::Category;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn draft(name: &str, category: &str, duration: u32) -> RecipeDraft {
        RecipeDraft {
            name: name.to_string(),
            category: category.to_string(),
            duration,
            ingredients: vec!["Olive Oil".to_string()],
            instructions: vec!["Stir".to_string()],
        }
    }

    fn local_cookbook() -> (tempfile::TempDir, Cookbook) {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let store = RecipeStore::open(dir.path()).unwrap();
        (dir, Cookbook::new(store, None).unwrap())
    }

    fn mirrored_cookbook() -> (tempfile::TempDir, InMemoryContents, Cookbook) {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let store = RecipeStore::open(dir.path()).unwrap();
        let remote = InMemoryContents::new();
        let mirror = RemoteMirror::new(Box::new(remote.clone()), "recipes");
        (dir, remote, Cookbook::new(store, Some(mirror)).unwrap())
    }

    #[test]
    fn test_create_writes_and_views() {
        let (_dir, mut cookbook) = local_cookbook();

        let report = cookbook.create(draft("Soup", "vegan", 20)).unwrap();

        assert_eq!(report.remote, RemoteStatus::Disabled);
        assert!(report.path.ends_with("soup.json"));
        assert_eq!(report.recipe.category, Category::Vegan);
        assert_eq!(cookbook.recipes(), &[report.recipe.clone()]);
        assert_eq!(cookbook.view(), ViewState::Viewing(report.recipe.id));
        assert_eq!(cookbook.current(), Some(&report.recipe));
    }

    #[test]
    fn test_create_rejects_invalid_without_writing() {
        let (dir, mut cookbook) = local_cookbook();

        let err = cookbook.create(draft("", "Vegan", 20)).unwrap_err();
        assert!(err.is_validation());
        let err = cookbook.create(draft("Soup", "", 20)).unwrap_err();
        assert!(err.is_validation());

        assert!(cookbook.recipes().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(cookbook.view(), ViewState::Adding);
    }

    #[test]
    fn test_update_renames_file() {
        let (dir, mut cookbook) = local_cookbook();
        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap().recipe;

        let report = cookbook.update(soup.id, draft("Stew", "Meat", 90)).unwrap();

        assert_eq!(report.renamed_from.as_deref(), Some("soup.json"));
        assert!(!dir.path().join("soup.json").exists());
        assert!(dir.path().join("stew.json").exists());
        assert_eq!(cookbook.recipes().len(), 1);
        assert_eq!(cookbook.recipes()[0].name, "Stew");
        assert_eq!(cookbook.recipes()[0].id, soup.id);
        assert_eq!(cookbook.view(), ViewState::Viewing(soup.id));
    }

    #[test]
    fn test_update_keeps_unknown_fields() {
        let (dir, mut cookbook) = local_cookbook();
        std::fs::write(
            dir.path().join("asian_food.json"),
            r#"{"name": "Asian Food", "category": "vegetarian", "description": "Eat fast.", "duration": 15}"#,
        )
        .unwrap();
        cookbook.load().unwrap();
        let id = cookbook.find_by_name("Asian Food").unwrap().id;

        cookbook
            .update(id, draft("Asian Food", "Vegetarian", 25))
            .unwrap();

        let recipe = cookbook.find(id).unwrap();
        assert_eq!(recipe.duration, Some(25));
        assert_eq!(recipe.extra.get("description").unwrap(), "Eat fast.");
    }

    #[test]
    fn test_update_missing_recipe() {
        let (_dir, mut cookbook) = local_cookbook();
        let err = cookbook
            .update(RecipeId::new(), draft("Soup", "Vegan", 20))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_only_after_confirm() {
        let (_dir, mut cookbook) = local_cookbook();
        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap().recipe;

        cookbook.request_delete(soup.id).unwrap();
        assert_eq!(cookbook.view(), ViewState::ConfirmingDelete(soup.id));
        assert_eq!(cookbook.load().unwrap().len(), 1);

        let report = cookbook.confirm_delete().unwrap();
        assert!(report.removed_locally);
        assert!(cookbook.recipes().is_empty());
        assert_eq!(cookbook.view(), ViewState::Browsing);
    }

    #[test]
    fn test_cancel_delete_keeps_recipe() {
        let (_dir, mut cookbook) = local_cookbook();
        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap().recipe;

        cookbook.request_delete(soup.id).unwrap();
        assert_eq!(cookbook.cancel().unwrap(), ViewState::Viewing(soup.id));

        assert_eq!(cookbook.load().unwrap(), &[soup]);
        assert!(cookbook.confirm_delete().is_err());
    }

    #[test]
    fn test_random_and_initial_view() {
        let (_dir, mut cookbook) = local_cookbook();
        cookbook.create(draft("Soup", "Vegan", 20)).unwrap();
        cookbook.create(draft("Cod", "Fish", 10)).unwrap();
        cookbook.cancel().unwrap();
        assert_eq!(cookbook.view(), ViewState::Browsing);

        let mut rng = StdRng::seed_from_u64(3);
        let query = RecipeQuery::new().with_categories([Category::Fish]);
        let picked = cookbook.initial_view(&query, &mut rng).unwrap().unwrap();
        assert_eq!(picked.name, "Cod");

        let none = RecipeQuery::new().with_categories([Category::Meat]);
        assert!(cookbook.random(&none, &mut rng).unwrap().is_none());
        assert!(matches!(cookbook.view(), ViewState::Viewing(_)));
    }

    #[test]
    fn test_mirror_create_update_delete() {
        let (_dir, remote, mut cookbook) = mirrored_cookbook();

        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap();
        assert_eq!(soup.remote, RemoteStatus::Synced);
        assert_eq!(remote.paths(), vec!["recipes/soup.json".to_string()]);

        let stew = cookbook
            .update(soup.recipe.id, draft("Stew", "Vegan", 20))
            .unwrap();
        assert_eq!(stew.remote, RemoteStatus::Synced);
        assert_eq!(remote.paths(), vec!["recipes/stew.json".to_string()]);

        cookbook.request_delete(soup.recipe.id).unwrap();
        let deleted = cookbook.confirm_delete().unwrap();
        assert_eq!(deleted.remote, RemoteStatus::Synced);
        assert!(remote.paths().is_empty());
        assert!(cookbook.pending().unwrap().is_empty());
    }

    #[test]
    fn test_mirror_failure_keeps_local_write() {
        let (dir, remote, mut cookbook) = mirrored_cookbook();
        remote.set_offline(true);

        let report = cookbook.create(draft("Soup", "Vegan", 20)).unwrap();

        assert!(report.remote.is_failed());
        assert!(dir.path().join("soup.json").exists());
        assert_eq!(cookbook.recipes().len(), 1);
        let pending = cookbook.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].intent,
            Intent::Push {
                file: "soup.json".to_string()
            }
        );
    }

    #[test]
    fn test_mirror_failure_keeps_local_delete() {
        let (dir, remote, mut cookbook) = mirrored_cookbook();
        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap().recipe;
        remote.set_offline(true);

        cookbook.request_delete(soup.id).unwrap();
        let report = cookbook.confirm_delete().unwrap();

        assert!(report.remote.is_failed());
        assert!(report.removed_locally);
        assert!(!dir.path().join("soup.json").exists());
    }

    #[test]
    fn test_sync_pending_replays_failures() {
        let (_dir, remote, mut cookbook) = mirrored_cookbook();
        remote.set_offline(true);
        cookbook.create(draft("Soup", "Vegan", 20)).unwrap();
        cookbook.create(draft("Cod", "Fish", 10)).unwrap();

        remote.set_offline(false);
        let report = cookbook.sync_pending().unwrap();

        assert_eq!(report.synced.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(remote.paths().len(), 2);
        assert!(cookbook.pending().unwrap().is_empty());
    }

    #[test]
    fn test_sync_drops_push_of_deleted_file() {
        let (_dir, remote, mut cookbook) = mirrored_cookbook();
        remote.set_offline(true);
        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap().recipe;
        cookbook.request_delete(soup.id).unwrap();
        cookbook.confirm_delete().unwrap();

        remote.set_offline(false);
        let report = cookbook.sync_pending().unwrap();

        // The delete superseded the push; removing a file the remote never
        // saw is a no-op.
        assert_eq!(
            report.synced,
            vec![Intent::Remove {
                file: "soup.json".to_string()
            }]
        );
        assert!(remote.paths().is_empty());
    }

    #[test]
    fn test_rename_with_failed_remote_delete_is_retried() {
        let (dir, remote, mut cookbook) = mirrored_cookbook();
        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap().recipe;
        remote.fail_deletes(true);

        let stew = cookbook
            .update(soup.id, draft("Stew", "Vegan", 20))
            .unwrap();

        assert!(stew.remote.is_failed());
        assert!(!dir.path().join("soup.json").exists());
        assert_eq!(
            remote.paths(),
            vec![
                "recipes/soup.json".to_string(),
                "recipes/stew.json".to_string()
            ]
        );
        let pending: Vec<Intent> = cookbook
            .pending()
            .unwrap()
            .into_iter()
            .map(|entry| entry.intent)
            .collect();
        assert_eq!(
            pending,
            vec![Intent::Remove {
                file: "soup.json".to_string()
            }]
        );

        remote.fail_deletes(false);
        let report = cookbook.sync_pending().unwrap();
        assert_eq!(report.synced.len(), 1);
        assert_eq!(remote.paths(), vec!["recipes/stew.json".to_string()]);
    }

    #[test]
    fn test_remote_remove_waits_for_local_file() {
        let (dir, remote, mut cookbook) = mirrored_cookbook();
        cookbook.create(draft("Soup", "Vegan", 20)).unwrap();
        let remove = Intent::Remove {
            file: "soup.json".to_string(),
        };
        cookbook.store.journal().record(remove.clone()).unwrap();

        assert!(cookbook.run_remote(&remove).unwrap().is_failed());
        let report = cookbook.sync_pending().unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].1.contains("still exists locally"));
        assert_eq!(remote.paths(), vec!["recipes/soup.json".to_string()]);
        assert_eq!(cookbook.pending().unwrap().len(), 1);

        std::fs::remove_file(dir.path().join("soup.json")).unwrap();
        let report = cookbook.sync_pending().unwrap();
        assert_eq!(report.synced, vec![remove]);
        assert!(remote.paths().is_empty());
    }

    #[test]
    fn test_remote_sees_pushed_content_after_sync() {
        let (_dir, remote, mut cookbook) = mirrored_cookbook();
        remote.set_offline(true);
        cookbook.create(draft("Soup", "Vegan", 20)).unwrap();
        assert!(remote.paths().is_empty());

        remote.set_offline(false);
        let report = cookbook.sync_pending().unwrap();

        assert_eq!(report.synced.len(), 1);
        let body = remote.content("recipes/soup.json").unwrap();
        let pushed: Recipe = serde_json::from_slice(&body).unwrap();
        assert_eq!(pushed.name, "Soup");
    }

    #[test]
    fn test_edit_of_copied_recipe_touches_only_the_copy() {
        let (dir, mut cookbook) = local_cookbook();
        let soup = cookbook.create(draft("Soup", "Vegan", 20)).unwrap().recipe;
        let copy = std::fs::read_to_string(dir.path().join("soup.json"))
            .unwrap()
            .replace("\"Soup\"", "\"Soup 2\"");
        std::fs::write(dir.path().join("soup_2.json"), copy).unwrap();
        cookbook.load().unwrap();

        let copy_id = cookbook.find_by_name("Soup 2").unwrap().id;
        assert_ne!(copy_id, soup.id);
        let mut edit = cookbook.start_edit(copy_id).unwrap();
        assert_eq!(edit.name, "Soup 2");
        edit.duration = 99;
        cookbook.update(copy_id, edit).unwrap();

        assert_eq!(cookbook.find(soup.id).unwrap().duration, Some(20));
        assert_eq!(cookbook.find(copy_id).unwrap().duration, Some(99));
        assert_eq!(cookbook.recipes().len(), 2);
    }

    #[test]
    fn test_sync_without_mirror() {
        let (_dir, mut cookbook) = local_cookbook();
        assert!(!cookbook.is_mirrored());
        assert!(cookbook.sync_pending().unwrap_err().is_remote());
    }

    #[test]
    fn test_remote_status_merge() {
        use RemoteStatus::{Disabled, Failed, Synced};
        assert_eq!(Synced.merge(Synced), Synced);
        assert_eq!(Disabled.merge(Disabled), Disabled);
        assert_eq!(Synced.merge(Failed("x".into())), Failed("x".into()));
        assert_eq!(
            Failed("a".into()).merge(Failed("b".into())),
            Failed("a; b".into())
        );
    }

    #[test]
    fn test_skipped_files_are_reported() {
        let (dir, mut cookbook) = local_cookbook();
        std::fs::write(dir.path().join("broken.json"), "nope").unwrap();
        cookbook.load().unwrap();
        assert_eq!(cookbook.skipped().len(), 1);
        assert!(cookbook.recipes().is_empty());
    }
}
