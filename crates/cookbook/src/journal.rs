//! Intent log for multi-step recipe changes.
//!
//! Renames (write new file, delete old file) and remote mirroring are not
//! atomic. Each step that can be interrupted is recorded here before it
//! starts and cleared once it finishes, so a later run can see exactly what
//! was left half done and finish it.
//!
//! The journal lives in the recipe directory as a JSON-lines file whose name
//! does not end in `.json`, so it is never mistaken for a recipe.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::recipe::RecipeId;

/// File name of the journal inside the recipe directory.
pub const JOURNAL_FILE_NAME: &str = ".cookbook-journal";

/// A step that has been started but not yet confirmed finished.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Intent {
    /// A recipe was being moved from one derived file to another.
    Rename {
        /// The recipe being moved. Nil in entries written without one.
        #[serde(default)]
        id: RecipeId,
        /// Old file name.
        from: String,
        /// New file name.
        to: String,
    },
    /// A local file still needs to be pushed to the remote.
    Push {
        /// File name of the recipe.
        file: String,
    },
    /// A file still needs to be deleted on the remote.
    Remove {
        /// File name of the recipe.
        file: String,
    },
}

impl Intent {
    /// The file name this intent is keyed by (the target for renames).
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Rename { to, .. } => to,
            Self::Push { file } | Self::Remove { file } => file,
        }
    }

    /// Whether this intent concerns the remote mirror.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Push { .. } | Self::Remove { .. })
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rename { from, to, .. } => write!(f, "rename {from} -> {to}"),
            Self::Push { file } => write!(f, "push {file}"),
            Self::Remove { file } => write!(f, "remove {file}"),
        }
    }
}

/// One line of the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When the intent was recorded.
    pub recorded_at: DateTime<Utc>,
    /// The recorded intent.
    #[serde(flatten)]
    pub intent: Intent,
}

/// Append-and-rewrite intent log stored beside the recipes.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Journal for the given recipe directory.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(JOURNAL_FILE_NAME),
        }
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all pending entries, oldest first.
    ///
    /// A missing journal is empty. Lines that do not parse are logged and
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal exists but cannot be read.
    pub fn pending(&self) -> Result<Vec<JournalEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    "Ignoring unreadable journal line {} in {}: {}",
                    lineno + 1,
                    self.path.display(),
                    e
                ),
            }
        }
        Ok(entries)
    }

    /// Record an intent, unless an identical one is already pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written.
    pub fn record(&self, intent: Intent) -> Result<()> {
        if self.pending()?.iter().any(|entry| entry.intent == intent) {
            debug!("Intent already journaled: {}", intent);
            return Ok(());
        }

        let entry = JournalEntry {
            recorded_at: Utc::now(),
            intent,
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| Error::FileWrite {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(line.as_bytes())
            .map_err(|source| Error::FileWrite {
                path: self.path.clone(),
                source,
            })?;
        debug!("Journaled intent: {}", entry.intent);
        Ok(())
    }

    /// Clear a finished intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be rewritten.
    pub fn complete(&self, intent: &Intent) -> Result<()> {
        let entries = self.pending()?;
        let before = entries.len();
        let remaining: Vec<JournalEntry> = entries
            .into_iter()
            .filter(|entry| &entry.intent != intent)
            .collect();
        if remaining.len() == before {
            return Ok(());
        }
        self.rewrite(&remaining)?;
        debug!("Completed intent: {}", intent);
        Ok(())
    }

    /// Drop every pending remote intent for `file`.
    ///
    /// Used when a newer local change supersedes an older unsynced one.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be rewritten.
    pub fn supersede_remote(&self, file: &str) -> Result<()> {
        let entries = self.pending()?;
        let before = entries.len();
        let remaining: Vec<JournalEntry> = entries
            .into_iter()
            .filter(|entry| !(entry.intent.is_remote() && entry.intent.file() == file))
            .collect();
        if remaining.len() != before {
            self.rewrite(&remaining)?;
        }
        Ok(())
    }

    fn rewrite(&self, entries: &[JournalEntry]) -> Result<()> {
        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        let mut text = String::new();
        for entry in entries {
            text.push_str(&serde_json::to_string(entry)?);
            text.push('\n');
        }
        fs::write(&self.path, text).map_err(|source| Error::FileWrite {
            path: self.path.clone(),
            source,
        })
    }
}
