// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for classification sessions

use crate::SessionState;
use ifc_lite_model::StoreError;
use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by a classification session
///
/// Stale references, unknown roles, ambiguous selections and exhausted
/// hierarchy passes are not errors; they are handled where they occur.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Another session is open on the same document
    #[error("A classification session is already open for document '{0}'")]
    Busy(String),

    /// The session was accepted or cancelled
    #[error("Session is closed")]
    Closed,

    /// Intent not accepted in the current state
    #[error("Cannot {intent} while {state:?}")]
    InvalidTransition {
        state: SessionState,
        intent: &'static str,
    },

    /// Host rejected a write; the transaction was rolled back
    #[error("Host error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
