// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Model - Trait definitions and shared types for IFC element classification
//!
//! This crate provides the abstractions a host document exposes to the
//! classification tools: typed element records, materials, quantities,
//! containment and the write/transaction interfaces. Hosts implement the
//! traits; consumers work against them without knowing the backend.
//!
//! # Architecture
//!
//! The crate is organized around several key traits:
//!
//! - [`ObjectStore`] - Element lookup, containment, visibility and attribute writes
//! - [`MaterialRegistry`] - Materials available in the document
//! - [`TransactionService`] - Atomic grouping of writes and model recompute
//! - [`GroupStore`] - Document groups (used by the trash command)
//! - [`HostDocument`] - Everything a classification session needs, in one bound
//!
//! # Example
//!
//! ```ignore
//! use ifc_lite_model::{ObjectStore, ElementId};
//!
//! fn describe(store: &dyn ObjectStore) {
//!     for id in store.list_elements() {
//!         if let Some(element) = store.element(id) {
//!             println!("{} {}: {:?}", id, element.label, element.role);
//!         }
//!     }
//! }
//! ```

pub mod containment;
pub mod element;
pub mod error;
pub mod quantities;
pub mod traits;
pub mod types;

// Re-export all public types
pub use containment::*;
pub use element::*;
pub use error::*;
pub use quantities::*;
pub use traits::*;
pub use types::*;
