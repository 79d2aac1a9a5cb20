// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for host document operations

use crate::{ElementId, MaterialId};
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors a host document can report when it is asked to change state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Element does not exist (deleted by the host)
    #[error("Element {0} not found")]
    ElementNotFound(ElementId),

    /// Material does not exist
    #[error("Material {0} not found")]
    MaterialNotFound(MaterialId),

    /// The element has no such attribute (e.g. no material slot)
    #[error("Element {element} has no attribute {attribute}")]
    UnsupportedAttribute { element: ElementId, attribute: String },

    /// Role outside the document's role catalog
    #[error("Invalid IFC role '{0}'")]
    InvalidRole(String),

    /// Commit or abort without an open transaction
    #[error("No transaction is open")]
    NoTransaction,

    /// Begin while another transaction is open
    #[error("Transaction '{0}' is already open")]
    TransactionOpen(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Create an unsupported-attribute error
    pub fn unsupported(element: ElementId, attribute: impl Into<String>) -> Self {
        StoreError::UnsupportedAttribute {
            element,
            attribute: attribute.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        StoreError::Other(msg.into())
    }
}
