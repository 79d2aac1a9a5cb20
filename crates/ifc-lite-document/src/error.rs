// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for loading document files

use ifc_lite_model::{ElementId, MaterialId};
use thiserror::Error;

/// Errors that can occur while loading a document file
#[derive(Error, Debug)]
pub enum LoadError {
    /// Malformed JSON or wrong shape
    #[error("Invalid document file: {0}")]
    Json(#[from] serde_json::Error),

    /// Two elements share an id
    #[error("Element {0} is defined twice")]
    DuplicateElement(ElementId),

    /// Containment references a missing element
    #[error("Element {element} references unknown element {referenced}")]
    UnknownElement {
        element: ElementId,
        referenced: ElementId,
    },

    /// Element references a missing material
    #[error("Element {element} references unknown material {material}")]
    UnknownMaterial {
        element: ElementId,
        material: MaterialId,
    },
}
