//! Recovery of interrupted renames.
//!
//! A rename writes the new file before deleting the old one. If the process
//! stops in between, both files exist and the journal still holds the
//! `Rename` intent. Recovery runs when the store is opened and finishes or
//! abandons each such intent.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::format;
use crate::error::Result;
use crate::journal::{Intent, Journal};

/// Outcome of replaying one rename intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovered {
    /// The new file holds the moved recipe; the old one was removed.
    Finished {
        /// Old file name that was removed.
        from: String,
        /// New file name that was kept.
        to: String,
    },
    /// The new file is missing or holds another recipe; the old file is
    /// still authoritative and nothing was removed.
    Abandoned {
        /// Old file name that was kept.
        from: String,
    },
}

/// Replay every pending rename intent for `dir`.
///
/// The old file is only removed when the new file decodes to the recipe the
/// intent was recorded for. A new file that belongs to another recipe (two
/// names deriving to the same file) means the move never happened.
///
/// Remote intents are left for the mirror to retry.
///
/// # Errors
///
/// Returns an error if the journal cannot be read or rewritten.
pub fn recover_renames(dir: &Path, journal: &Journal) -> Result<Vec<Recovered>> {
    let mut recovered = Vec::new();

    for entry in journal.pending()? {
        let Intent::Rename { id, from, to } = &entry.intent else {
            continue;
        };

        let old_path = dir.join(from);
        let new_path = dir.join(to);

        let moved = !id.is_nil()
            && fs::read(&new_path)
                .ok()
                .and_then(|bytes| format::decode(&bytes, to).ok())
                .is_some_and(|recipe| recipe.id == *id);

        if moved {
            if old_path.exists() {
                if let Err(e) = fs::remove_file(&old_path) {
                    warn!(
                        "Could not remove {} while finishing rename: {}",
                        old_path.display(),
                        e
                    );
                    continue;
                }
            }
            info!("Finished interrupted rename {} -> {}", from, to);
            recovered.push(Recovered::Finished {
                from: from.clone(),
                to: to.clone(),
            });
        } else {
            warn!(
                "Abandoning interrupted rename {} -> {}: {} does not hold the moved recipe",
                from, to, to
            );
            recovered.push(Recovered::Abandoned { from: from.clone() });
        }

        journal.complete(&entry.intent)?;
    }

    Ok(recovered)
}
