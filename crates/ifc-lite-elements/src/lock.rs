// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One classification session per document

use crate::error::{Result, SessionError};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Registry of documents with an open session - thread-safe
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct SessionLocks {
    open: Arc<Mutex<FxHashSet<String>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a document for a session
    ///
    /// Fails with [`SessionError::Busy`] while another guard for the same
    /// document is alive.
    pub fn acquire(&self, document: &str) -> Result<SessionGuard> {
        let mut open = self.open.lock();
        if !open.insert(document.to_string()) {
            return Err(SessionError::Busy(document.to_string()));
        }
        log::debug!("Session lock taken for '{}'", document);
        Ok(SessionGuard {
            locks: Arc::clone(&self.open),
            document: document.to_string(),
        })
    }

    pub fn is_locked(&self, document: &str) -> bool {
        self.open.lock().contains(document)
    }
}

/// Held by an open session; releases the document lock on drop
pub struct SessionGuard {
    locks: Arc<Mutex<FxHashSet<String>>>,
    document: String,
}

impl SessionGuard {
    pub fn document(&self) -> &str {
        &self.document
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("document", &self.document)
            .finish()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.locks.lock().remove(&self.document);
        log::debug!("Session lock released for '{}'", self.document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_session_busy() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("House").unwrap();
        assert_eq!(guard.document(), "House");
        assert!(locks.is_locked("House"));

        let err = locks.acquire("House").unwrap_err();
        assert_eq!(err, SessionError::Busy("House".to_string()));

        // Other documents are independent
        let other = locks.acquire("Garage").unwrap();
        drop(other);
        drop(guard);
        assert!(!locks.is_locked("House"));
        assert!(locks.acquire("House").is_ok());
    }

    #[test]
    fn test_clones_share_registry() {
        let locks = SessionLocks::new();
        let shared = locks.clone();
        let _guard = locks.acquire("House").unwrap();
        assert!(shared.acquire("House").is_err());
    }

    #[test]
    fn test_guard_outlives_registry_handle() {
        let guard = {
            let locks = SessionLocks::new();
            locks.acquire("House").unwrap()
        };
        drop(guard);
    }
}
