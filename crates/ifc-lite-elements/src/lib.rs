// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Elements - Classification and hierarchy views for IFC export
//!
//! Builds grouped views of a document's classifiable elements, lets a user
//! edit their IFC role, material, label and quantity export flags in a
//! pending copy, and writes the difference back in one host transaction.
//!
//! # Overview
//!
//! - [`collect`] - Read roles and materials into a [`Snapshot`]
//! - [`build_view`] - Flat, by-type, by-material or by-structure tree
//! - [`compute_quantities`] - Quantities table with export flags
//! - [`apply_global_edit`] / [`apply_cell_edit`] - Edit the pending snapshot
//! - [`reconcile`] / [`commit`] - Minimal write set, applied atomically
//! - [`Session`] - State machine tying the above together
//! - [`move_to_trash`] - Trash command
//!
//! # Example
//!
//! ```ignore
//! use ifc_lite_document::load_json;
//! use ifc_lite_elements::{ElementsConfig, GroupMode, Intent, Session, SessionLocks};
//!
//! let mut doc = load_json(json)?;
//! let locks = SessionLocks::new();
//! let guard = locks.acquire(doc.name())?;
//! let config = ElementsConfig::new().with_mode(GroupMode::ByType);
//! let mut session = Session::open(&doc, doc.roles().clone(), config, guard)?;
//!
//! session.dispatch(&mut doc, Intent::Select(vec![wall]))?;
//! session.dispatch(&mut doc, Intent::GlobalMaterial(concrete))?;
//! session.dispatch(&mut doc, Intent::Accept)?;
//! ```

pub mod config;
pub mod edit;
pub mod error;
pub mod hierarchy;
pub mod lock;
pub mod quantities;
pub mod reconcile;
pub mod session;
pub mod snapshot;
pub mod trash;
pub mod view;

#[cfg(test)]
mod test_support;

pub use config::{
    ElementsConfig, DEFAULT_MAX_HIERARCHY_DEPTH, DEFAULT_SINGLE_EDIT_LIMIT, MAX_HIERARCHY_DEPTH,
};
pub use edit::{
    apply_cell_edit, apply_global_edit, summarize, CellEdit, EditOutcome, GlobalEdit,
    IgnoreReason, SelectionSummary,
};
pub use error::{Result, SessionError};
pub use hierarchy::{Placement, StructureBuilder, StructureOrder};
pub use lock::{SessionGuard, SessionLocks};
pub use quantities::{compute_quantities, QuantityCell, QuantityRow, QuantityTable};
pub use reconcile::{commit, reconcile, CommitReport, WriteSet};
pub use session::{Intent, Response, Session, SessionState};
pub use snapshot::{collect, ElementState, Snapshot};
pub use trash::{move_to_trash, TrashReport, TRASH_TRANSACTION};
pub use view::{
    build_view, GroupMode, RowKind, ViewBuilder, ViewNode, ViewTree, UNSET_ROLE_LABEL,
};
