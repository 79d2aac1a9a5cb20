// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host document traits
//!
//! The host owns every element and material. These traits are the narrow
//! read/write surface the classification tools are allowed to use.

use crate::{
    AttributeChange, Containment, ElementId, ElementRecord, GroupId, Material, MaterialId, Result,
};
use std::sync::Arc;

/// Element lookup, containment and attribute writes
///
/// # Example
///
/// ```ignore
/// use ifc_lite_model::{ObjectStore, AttributeChange, ElementId};
///
/// fn set_wall(store: &mut dyn ObjectStore, id: ElementId) -> ifc_lite_model::Result<()> {
///     if store.element(id).is_some() {
///         store.set_attr(id, &AttributeChange::Role("Wall".into()))?;
///     }
///     Ok(())
/// }
/// ```
pub trait ObjectStore {
    /// All element ids in host order
    fn list_elements(&self) -> Vec<ElementId>;

    /// Get element by ID
    ///
    /// Returns `None` if the host has deleted the element.
    fn element(&self, id: ElementId) -> Option<Arc<ElementRecord>>;

    /// Parent/child adjacency of an element (empty for unknown ids)
    fn containment(&self, id: ElementId) -> Containment;

    /// Whether the element is currently shown
    fn is_visible(&self, id: ElementId) -> bool;

    /// Whether the element belongs to a category excluded from quantities (e.g. sites)
    fn is_excluded_type(&self, id: ElementId) -> bool;

    /// Apply one attribute change
    fn set_attr(&mut self, id: ElementId, change: &AttributeChange) -> Result<()>;

    /// Check if an element exists
    fn exists(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }
}

/// Materials available in the host document
pub trait MaterialRegistry {
    /// All materials in host order
    fn list_materials(&self) -> Vec<Material>;

    /// Look up one material
    fn material(&self, id: MaterialId) -> Option<Material> {
        self.list_materials().into_iter().find(|m| m.id == id)
    }

    /// Display label of a material, if it still resolves
    fn material_label(&self, id: MaterialId) -> Option<String> {
        self.material(id).map(|m| m.label)
    }
}

/// Atomic grouping of writes
///
/// Writes between `begin_transaction` and `commit_transaction` form one undo
/// step. `abort_transaction` discards all of them.
pub trait TransactionService {
    fn begin_transaction(&mut self, label: &str) -> Result<()>;

    fn commit_transaction(&mut self) -> Result<()>;

    fn abort_transaction(&mut self) -> Result<()>;

    /// Signal the host to recompute its model
    fn recompute(&mut self);
}

/// Document groups
pub trait GroupStore {
    /// Group with this exact name, if one exists and is a group
    fn find_group(&self, name: &str) -> Option<GroupId>;

    /// Create a group; the host may adjust the name if it is taken
    fn create_group(&mut self, name: &str) -> Result<GroupId>;

    /// Move an element into a group
    fn add_to_group(&mut self, group: GroupId, element: ElementId) -> Result<()>;

    fn set_visible(&mut self, element: ElementId, visible: bool) -> Result<()>;
}

/// Everything a classification session needs from its host
pub trait HostDocument: ObjectStore + MaterialRegistry + TransactionService {}

// Blanket implementation for all complete hosts
impl<T: ObjectStore + MaterialRegistry + TransactionService> HostDocument for T {}
