// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Document - In-memory BIM document
//!
//! This crate provides a host document that lives entirely in memory. It
//! implements the traits defined in `ifc-lite-model`, so the classification
//! tools can run without a CAD application behind them.
//!
//! # Features
//!
//! - **Typed element records** with optional role, material, quantity and
//!   export-flag capabilities
//! - **Snapshot transactions** - abort restores every write
//! - **JSON document files** for fixtures and tooling
//!
//! # Example
//!
//! ```ignore
//! use ifc_lite_document::load_json;
//! use ifc_lite_model::ObjectStore;
//!
//! let doc = load_json(json)?;
//! println!("{} elements", doc.list_elements().len());
//! ```

mod document;
mod error;
mod loader;

pub use document::{Group, MemoryDocument, SITE_CATEGORY};
pub use error::LoadError;
pub use loader::{load_json, DocumentFile, ElementEntry};
