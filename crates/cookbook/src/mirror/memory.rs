//! In-process content backend.
//!
//! Behaves like the GitHub contents API (revision markers, conflict on a
//! stale or missing marker) without any network. Clones share state, so a
//! caller can keep a handle to inspect what the mirror wrote. Can be switched
//! offline to simulate an unreachable remote.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::ContentApi;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, (String, String)>,
    next_revision: u64,
    offline: bool,
    failing_deletes: bool,
}

/// Shared in-memory remote file store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContents {
    state: Arc<Mutex<State>>,
}

impl InMemoryContents {
    /// Create an empty, online store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the remote were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Make every subsequent delete fail with a server error while reads
    /// and writes keep working.
    pub fn fail_deletes(&self, failing: bool) {
        self.lock().failing_deletes = failing;
    }

    /// Decoded content at `path`, if present.
    #[must_use]
    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.raw(path).and_then(|raw| BASE64.decode(raw).ok())
    }

    /// Base64 content at `path` exactly as it was put.
    #[must_use]
    pub fn raw(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|(raw, _)| raw.clone())
    }

    /// All stored paths.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave State inconsistent.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn online(state: &State, operation: &'static str, path: &str) -> Result<()> {
        if state.offline {
            return Err(Error::remote(operation, path, 503, "remote unavailable"));
        }
        Ok(())
    }
}

impl ContentApi for InMemoryContents {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn revision(&self, path: &str) -> Result<Option<String>> {
        let state = self.lock();
        Self::online(&state, "GET", path)?;
        Ok(state.files.get(path).map(|(_, rev)| rev.clone()))
    }

    fn put(
        &self,
        path: &str,
        content_base64: &str,
        _message: &str,
        revision: Option<&str>,
    ) -> Result<()> {
        let mut state = self.lock();
        Self::online(&state, "PUT", path)?;

        let current = state.files.get(path).map(|(_, rev)| rev.as_str());
        match (current, revision) {
            (Some(current), Some(given)) if current != given => {
                return Err(Error::remote("PUT", path, 409, "revision does not match"));
            }
            (Some(_), None) => {
                return Err(Error::remote("PUT", path, 422, "revision required"));
            }
            _ => {}
        }

        state.next_revision += 1;
        let rev = format!("rev-{}", state.next_revision);
        state
            .files
            .insert(path.to_string(), (content_base64.to_string(), rev));
        Ok(())
    }

    fn delete(&self, path: &str, _message: &str, revision: &str) -> Result<()> {
        let mut state = self.lock();
        Self::online(&state, "DELETE", path)?;
        if state.failing_deletes {
            return Err(Error::remote("DELETE", path, 500, "delete rejected"));
        }

        match state.files.get(path) {
            None => Err(Error::remote("DELETE", path, 404, "not found")),
            Some((_, current)) if current != revision => {
                Err(Error::remote("DELETE", path, 409, "revision does not match"))
            }
            Some(_) => {
                state.files.remove(path);
                Ok(())
            }
        }
    }
}
