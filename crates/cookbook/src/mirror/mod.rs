//! Best-effort mirroring of recipe files to a remote repository.
//!
//! The mirror speaks a small "get / put / delete content" contract
//! ([`ContentApi`]) keyed by the same derived file name the local store uses.
//! Updates must echo the revision marker returned by a preceding read, so
//! every push and remove starts with a lookup.
//!
//! The local file is always written or deleted first. A mirror failure never
//! undoes the local change; callers report it and journal the operation for
//! a later `sync`.

mod github;
#[cfg(any(test, feature = "test-util"))]
mod memory;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::error::{Error, Result};

pub use github::GitHubContents;
#[cfg(any(test, feature = "test-util"))]
pub use memory::InMemoryContents;

/// Remote file store addressed by path.
///
/// Implementors provide the transport; [`RemoteMirror`] provides the
/// read-then-write protocol on top.
pub trait ContentApi: std::fmt::Debug {
    /// Name of this backend (for logging).
    fn name(&self) -> &'static str;

    /// Current revision marker of the file at `path`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote cannot be reached or answers with an
    /// unexpected status.
    fn revision(&self, path: &str) -> Result<Option<String>>;

    /// Create or replace the file at `path`.
    ///
    /// `revision` must be the marker of the existing file when replacing.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote rejects the write.
    fn put(
        &self,
        path: &str,
        content_base64: &str,
        message: &str,
        revision: Option<&str>,
    ) -> Result<()>;

    /// Delete the file at `path` whose current marker is `revision`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote rejects the delete.
    fn delete(&self, path: &str, message: &str, revision: &str) -> Result<()>;
}

/// What a push did remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The file did not exist remotely and was created.
    Created,
    /// The file existed and was replaced.
    Updated,
}

/// What a remove did remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The remote file was deleted.
    Removed,
    /// There was no remote file to delete.
    AlreadyAbsent,
}

/// Mirrors recipe files into a directory of a remote repository.
#[derive(Debug)]
pub struct RemoteMirror {
    api: Box<dyn ContentApi>,
    path_prefix: String,
}

impl RemoteMirror {
    /// Create a mirror over any content backend.
    #[must_use]
    pub fn new(api: Box<dyn ContentApi>, path_prefix: impl Into<String>) -> Self {
        Self {
            api,
            path_prefix: path_prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Create a GitHub-backed mirror from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote section is incomplete or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let api = GitHubContents::new(config)?;
        Ok(Self::new(Box::new(api), config.path_prefix.clone()))
    }

    /// Remote path for a recipe file name.
    #[must_use]
    pub fn remote_path(&self, file_name: &str) -> String {
        if self.path_prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.path_prefix, file_name)
        }
    }

    /// Upload `content` as `file_name`, creating or replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision lookup or the write fails.
    pub fn push(&self, file_name: &str, content: &[u8]) -> Result<PushOutcome> {
        let path = self.remote_path(file_name);
        let revision = self.api.revision(&path)?;
        let encoded = BASE64.encode(content);

        let (message, outcome) = match revision {
            Some(_) => (format!("Update recipe {file_name}"), PushOutcome::Updated),
            None => (format!("Add recipe {file_name}"), PushOutcome::Created),
        };

        debug!(
            "Pushing {} to {} ({} bytes)",
            path,
            self.api.name(),
            content.len()
        );
        self.api
            .put(&path, &encoded, &message, revision.as_deref())?;
        info!("Mirrored {} ({:?})", path, outcome);
        Ok(outcome)
    }

    /// Delete `file_name` remotely.
    ///
    /// A file that is already absent is a warning, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision lookup or the delete fails.
    pub fn remove(&self, file_name: &str) -> Result<RemoveOutcome> {
        let path = self.remote_path(file_name);
        let Some(revision) = self.api.revision(&path)? else {
            warn!("{} not found on {}; nothing to delete", path, self.api.name());
            return Ok(RemoveOutcome::AlreadyAbsent);
        };

        self.api
            .delete(&path, &format!("Delete recipe {file_name}"), &revision)?;
        info!("Removed {} from {}", path, self.api.name());
        Ok(RemoveOutcome::Removed)
    }
}

/// Build the mirror described by `config`, or `None` when mirroring is off.
///
/// # Errors
///
/// Returns [`Error::RemoteNotConfigured`] if mirroring is enabled but the
/// token or repository is missing.
pub fn from_settings(config: &RemoteConfig) -> Result<Option<RemoteMirror>> {
    if !config.enabled {
        return Ok(None);
    }
    if config.token.as_deref().map_or(true, str::is_empty) {
        return Err(Error::RemoteNotConfigured("remote.token is not set".to_string()));
    }
    RemoteMirror::from_config(config).map(Some)
}
