// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MemoryDocument - in-memory host document implementation

use ifc_lite_model::{
    AttributeChange, Containment, ElementId, ElementRecord, GroupId, GroupStore, Material,
    MaterialId, MaterialRegistry, MaterialSlot, ObjectStore, Result, RoleCatalog, StoreError,
    TransactionService,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Category always excluded from the quantities table
pub const SITE_CATEGORY: &str = "Site";

/// A named document group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<ElementId>,
}

/// State restored when a transaction is aborted
#[derive(Clone)]
struct Backup {
    records: FxHashMap<ElementId, Arc<ElementRecord>>,
    hidden: FxHashSet<ElementId>,
    groups: Vec<Group>,
    next_group_id: u32,
}

/// Open transaction with the state it started from
struct OpenTransaction {
    label: String,
    backup: Box<Backup>,
}

/// In-memory BIM document implementing the host traits
///
/// Elements, materials, containment, visibility and groups all live in
/// memory. Transactions snapshot the mutable state on begin so an abort
/// restores it exactly.
pub struct MemoryDocument {
    /// Document name (used as the session lock key)
    name: String,
    /// Element ids in insertion order
    order: Vec<ElementId>,
    records: FxHashMap<ElementId, Arc<ElementRecord>>,
    containment: FxHashMap<ElementId, Containment>,
    hidden: FxHashSet<ElementId>,
    read_only: FxHashSet<ElementId>,
    materials: Vec<Material>,
    roles: RoleCatalog,
    excluded_categories: FxHashSet<String>,
    groups: Vec<Group>,
    next_group_id: u32,
    transaction: Option<OpenTransaction>,
    /// Labels of committed transactions, oldest first
    history: Vec<String>,
    recompute_count: usize,
}

impl MemoryDocument {
    /// Create an empty document using the standard role catalog
    pub fn new(name: impl Into<String>) -> Self {
        let mut excluded_categories = FxHashSet::default();
        excluded_categories.insert(SITE_CATEGORY.to_string());
        Self {
            name: name.into(),
            order: Vec::new(),
            records: FxHashMap::default(),
            containment: FxHashMap::default(),
            hidden: FxHashSet::default(),
            read_only: FxHashSet::default(),
            materials: Vec::new(),
            roles: RoleCatalog::standard(),
            excluded_categories,
            groups: Vec::new(),
            next_group_id: 1,
            transaction: None,
            history: Vec::new(),
            recompute_count: 0,
        }
    }

    /// Replace the role catalog
    pub fn with_roles(mut self, roles: RoleCatalog) -> Self {
        self.roles = roles;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role catalog this document validates role writes against
    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    /// Exclude another category from quantities ("Site" is always excluded)
    pub fn exclude_category(&mut self, category: impl Into<String>) {
        self.excluded_categories.insert(category.into());
    }

    /// Register a material and return its id
    pub fn add_material(&mut self, label: impl Into<String>) -> MaterialId {
        let next = self.materials.iter().map(|m| m.id.0).max().unwrap_or(0) + 1;
        let id = MaterialId(next);
        self.materials.push(Material::new(id, label));
        id
    }

    /// Register a material with a fixed id
    pub fn insert_material(&mut self, material: Material) {
        self.materials.retain(|m| m.id != material.id);
        self.materials.push(material);
    }

    /// Delete a material; elements keep their (now dangling) references
    pub fn remove_material(&mut self, id: MaterialId) {
        self.materials.retain(|m| m.id != id);
    }

    /// Next free element id
    pub fn next_element_id(&self) -> ElementId {
        ElementId(self.order.iter().map(|id| id.0).max().unwrap_or(0) + 1)
    }

    /// Insert (or replace) an element record
    pub fn add(&mut self, record: ElementRecord) -> ElementId {
        let id = record.id;
        if !self.records.contains_key(&id) {
            self.order.push(id);
        }
        self.records.insert(id, Arc::new(record));
        self.containment.entry(id).or_default();
        id
    }

    /// Delete an element the way the host would (containment edges go too)
    pub fn remove(&mut self, id: ElementId) {
        self.order.retain(|e| *e != id);
        self.records.remove(&id);
        self.hidden.remove(&id);
        if let Some(edges) = self.containment.remove(&id) {
            for parent in edges.parents {
                if let Some(c) = self.containment.get_mut(&parent) {
                    c.children.retain(|e| *e != id);
                }
            }
            for child in edges.children {
                if let Some(c) = self.containment.get_mut(&child) {
                    c.parents.retain(|e| *e != id);
                }
            }
        }
        for group in &mut self.groups {
            group.members.retain(|e| *e != id);
        }
    }

    /// Record that `parent` contains `child`
    pub fn contain(&mut self, parent: ElementId, child: ElementId) {
        let edges = self.containment.entry(parent).or_default();
        if !edges.children.contains(&child) {
            edges.children.push(child);
        }
        let edges = self.containment.entry(child).or_default();
        if !edges.parents.contains(&parent) {
            edges.parents.push(parent);
        }
    }

    /// Show or hide an element without going through a transaction
    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        if hidden {
            self.hidden.insert(id);
        } else {
            self.hidden.remove(&id);
        }
    }

    /// Make every write to an element fail (host-side lock)
    pub fn set_read_only(&mut self, id: ElementId, read_only: bool) {
        if read_only {
            self.read_only.insert(id);
        } else {
            self.read_only.remove(&id);
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Labels of committed transactions, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// How many times the host was asked to recompute
    pub fn recompute_count(&self) -> usize {
        self.recompute_count
    }

    /// Whether a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    fn name_taken(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
            || self.records.values().any(|r| r.label == name)
    }

    fn writable(&self, id: ElementId) -> Result<Arc<ElementRecord>> {
        let record = self
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::ElementNotFound(id))?;
        if self.read_only.contains(&id) {
            return Err(StoreError::other(format!("Element {} is read-only", id)));
        }
        Ok(record)
    }

    fn backup(&self) -> Backup {
        Backup {
            records: self.records.clone(),
            hidden: self.hidden.clone(),
            groups: self.groups.clone(),
            next_group_id: self.next_group_id,
        }
    }
}

impl ObjectStore for MemoryDocument {
    fn list_elements(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    fn element(&self, id: ElementId) -> Option<Arc<ElementRecord>> {
        self.records.get(&id).cloned()
    }

    fn containment(&self, id: ElementId) -> Containment {
        self.containment.get(&id).cloned().unwrap_or_default()
    }

    fn is_visible(&self, id: ElementId) -> bool {
        self.records.contains_key(&id) && !self.hidden.contains(&id)
    }

    fn is_excluded_type(&self, id: ElementId) -> bool {
        self.records
            .get(&id)
            .map(|r| self.excluded_categories.contains(&r.category))
            .unwrap_or(false)
    }

    fn set_attr(&mut self, id: ElementId, change: &AttributeChange) -> Result<()> {
        let current = self.writable(id)?;
        let mut record = (*current).clone();

        match change {
            AttributeChange::Label(label) => {
                record.label = label.clone();
            }
            AttributeChange::Role(role) => {
                if record.role.is_none() {
                    return Err(StoreError::unsupported(id, change.attribute_name()));
                }
                if !self.roles.accepts(role) {
                    return Err(StoreError::InvalidRole(role.clone()));
                }
                record.role = Some(role.clone());
            }
            AttributeChange::Material(material) => {
                if !record.material.is_supported() {
                    return Err(StoreError::unsupported(id, change.attribute_name()));
                }
                record.material = match material {
                    Some(mat) => {
                        if self.material(*mat).is_none() {
                            return Err(StoreError::MaterialNotFound(*mat));
                        }
                        MaterialSlot::Assigned(*mat)
                    }
                    None => MaterialSlot::Unassigned,
                };
            }
            AttributeChange::Dimension { kind, value } => {
                let quantities = record
                    .quantities
                    .as_mut()
                    .filter(|q| kind.is_editable() && q.get(*kind).is_some())
                    .ok_or_else(|| StoreError::unsupported(id, change.attribute_name()))?;
                quantities.set(*kind, Some(*value));
            }
            AttributeChange::ExportFlag { kind, export } => {
                let flags = record
                    .export_flags
                    .as_mut()
                    .ok_or_else(|| StoreError::unsupported(id, change.attribute_name()))?;
                flags.set(*kind, *export);
            }
        }

        log::trace!("{} {} updated", id, change.attribute_name());
        self.records.insert(id, Arc::new(record));
        Ok(())
    }
}

impl MaterialRegistry for MemoryDocument {
    fn list_materials(&self) -> Vec<Material> {
        self.materials.clone()
    }

    fn material(&self, id: MaterialId) -> Option<Material> {
        self.materials.iter().find(|m| m.id == id).cloned()
    }
}

impl TransactionService for MemoryDocument {
    fn begin_transaction(&mut self, label: &str) -> Result<()> {
        if let Some(open) = &self.transaction {
            return Err(StoreError::TransactionOpen(open.label.clone()));
        }
        self.transaction = Some(OpenTransaction {
            label: label.to_string(),
            backup: Box::new(self.backup()),
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        let open = self.transaction.take().ok_or(StoreError::NoTransaction)?;
        self.history.push(open.label);
        Ok(())
    }

    fn abort_transaction(&mut self) -> Result<()> {
        let open = self.transaction.take().ok_or(StoreError::NoTransaction)?;
        let backup = *open.backup;
        self.records = backup.records;
        self.hidden = backup.hidden;
        self.groups = backup.groups;
        self.next_group_id = backup.next_group_id;
        log::debug!("Transaction '{}' rolled back", open.label);
        Ok(())
    }

    fn recompute(&mut self) {
        self.recompute_count += 1;
    }
}

impl GroupStore for MemoryDocument {
    fn find_group(&self, name: &str) -> Option<GroupId> {
        self.groups.iter().find(|g| g.name == name).map(|g| g.id)
    }

    fn create_group(&mut self, name: &str) -> Result<GroupId> {
        let mut unique = name.to_string();
        let mut suffix = 1;
        while self.name_taken(&unique) {
            unique = format!("{}{:03}", name, suffix);
            suffix += 1;
        }
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        self.groups.push(Group {
            id,
            name: unique,
            members: Vec::new(),
        });
        Ok(id)
    }

    fn add_to_group(&mut self, group: GroupId, element: ElementId) -> Result<()> {
        self.writable(element)?;
        if !self.groups.iter().any(|g| g.id == group) {
            return Err(StoreError::other(format!("Group {} not found", group)));
        }
        // An object lives in at most one group
        for g in &mut self.groups {
            g.members.retain(|e| *e != element);
        }
        if let Some(g) = self.groups.iter_mut().find(|g| g.id == group) {
            g.members.push(element);
        }
        Ok(())
    }

    fn set_visible(&mut self, element: ElementId, visible: bool) -> Result<()> {
        self.writable(element)?;
        self.set_hidden(element, !visible);
        Ok(())
    }
}
