// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouped element views
//!
//! Builds the display tree for a snapshot in one of four grouping modes.
//! Every row carries the pending role and material plus flags telling
//! whether they differ from the live element.

use crate::config::{DEFAULT_MAX_HIERARCHY_DEPTH, MAX_HIERARCHY_DEPTH};
use crate::hierarchy::StructureBuilder;
use crate::snapshot::{ElementState, Snapshot};
use ifc_lite_model::{
    ElementId, ElementRecord, MaterialId, MaterialRegistry, ObjectStore, RoleCatalog,
    UNDEFINED_LABEL,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Heading of the by-type group holding elements without a role
pub const UNSET_ROLE_LABEL: &str = "No role";

/// How the tree is organized
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupMode {
    /// One flat, alphabetic level
    #[default]
    None,
    /// Grouped by IFC role
    ByType,
    /// Grouped by material
    ByMaterial,
    /// Mirrors the containment graph
    ByStructure,
}

impl GroupMode {
    pub const ALL: [GroupMode; 4] = [
        GroupMode::None,
        GroupMode::ByType,
        GroupMode::ByMaterial,
        GroupMode::ByStructure,
    ];

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            GroupMode::None => "Alphabetical",
            GroupMode::ByType => "By IFC type",
            GroupMode::ByMaterial => "By material",
            GroupMode::ByStructure => "By model structure",
        }
    }
}

/// Kind of row in the view tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    /// Heading row of a role or material group
    Group,
    /// Row standing for one element
    Element,
}

/// Row in the view tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    pub kind: RowKind,
    /// Element label, or "Key (count)" for group rows
    pub label: String,
    /// Pending role (the group's role for ByType headings)
    pub role: String,
    /// Display label of the pending material
    pub material_label: String,
    /// Pending material (the group's material for ByMaterial headings)
    pub material: Option<MaterialId>,
    /// Element id; `None` for group rows
    pub element: Option<ElementId>,
    /// Pending role differs from the live role
    pub role_modified: bool,
    /// Pending material differs from the live material
    pub material_modified: bool,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    /// Create a group heading
    pub fn group(label: impl Into<String>) -> Self {
        Self {
            kind: RowKind::Group,
            label: label.into(),
            role: String::new(),
            material_label: String::new(),
            material: None,
            element: None,
            role_modified: false,
            material_modified: false,
            children: Vec::new(),
        }
    }

    /// Add a child row
    pub fn add_child(&mut self, child: ViewNode) {
        self.children.push(child);
    }

    /// Whether either pending value differs from the live element
    pub fn is_modified(&self) -> bool {
        self.role_modified || self.material_modified
    }

    /// Get element row count, this row included
    pub fn element_count(&self) -> usize {
        self.iter().filter(|n| n.kind == RowKind::Element).count()
    }

    /// Find the row of an element in this subtree
    pub fn find(&self, id: ElementId) -> Option<&ViewNode> {
        self.iter().find(|n| n.element == Some(id))
    }

    /// Iterate all rows (depth-first)
    pub fn iter(&self) -> ViewNodeIter<'_> {
        ViewNodeIter { stack: vec![self] }
    }
}

/// Iterator over view rows (depth-first)
pub struct ViewNodeIter<'a> {
    stack: Vec<&'a ViewNode>,
}

impl<'a> Iterator for ViewNodeIter<'a> {
    type Item = &'a ViewNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Add children in reverse order so first child is processed first
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Display tree for one grouping mode
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewTree {
    pub mode: GroupMode,
    pub roots: Vec<ViewNode>,
    /// Elements the structure mode could not reach within its pass bound
    pub unreached: Vec<ElementId>,
}

impl ViewTree {
    /// Iterate all rows (depth-first, roots in order)
    pub fn iter(&self) -> impl Iterator<Item = &ViewNode> {
        self.roots.iter().flat_map(|r| r.iter())
    }

    /// Element ids in display order
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.iter().filter_map(|n| n.element).collect()
    }

    pub fn find(&self, id: ElementId) -> Option<&ViewNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    pub fn element_count(&self) -> usize {
        self.roots.iter().map(|r| r.element_count()).sum()
    }
}

fn compare_labels(a: &ViewNode, b: &ViewNode) -> Ordering {
    a.label
        .to_lowercase()
        .cmp(&b.label.to_lowercase())
        .then_with(|| a.label.cmp(&b.label))
}

/// Sort every level alphabetically by label (stable)
fn sort_rows(rows: &mut [ViewNode]) {
    let mut stack: Vec<&mut [ViewNode]> = vec![rows];
    while let Some(level) = stack.pop() {
        level.sort_by(compare_labels);
        for row in level {
            stack.push(row.children.as_mut_slice());
        }
    }
}

/// Builds view trees against a host
pub struct ViewBuilder<'a, H: ?Sized> {
    host: &'a H,
    roles: &'a RoleCatalog,
    max_depth: usize,
}

impl<'a, H: ObjectStore + MaterialRegistry + ?Sized> ViewBuilder<'a, H> {
    pub fn new(host: &'a H, roles: &'a RoleCatalog) -> Self {
        Self {
            host,
            roles,
            max_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
        }
    }

    /// Set the structure pass bound, clamped to `1..=MAX_HIERARCHY_DEPTH`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.clamp(1, MAX_HIERARCHY_DEPTH);
        self
    }

    /// Build the tree for `pending` in `mode`
    ///
    /// Elements the host no longer knows are left out.
    pub fn build(&self, pending: &Snapshot, mode: GroupMode) -> ViewTree {
        let live: Vec<(&ElementState, Arc<ElementRecord>)> = pending
            .iter()
            .filter_map(|state| match self.host.element(state.id) {
                Some(record) => Some((state, record)),
                None => {
                    log::debug!("Skipping {}: no longer in the document", state.id);
                    None
                }
            })
            .collect();

        let mut tree = ViewTree {
            mode,
            ..ViewTree::default()
        };

        match mode {
            GroupMode::None => {
                tree.roots = live
                    .iter()
                    .map(|(state, record)| self.element_row(state, record))
                    .collect();
            }
            GroupMode::ByType => {
                tree.roots = self.group_by(&live, |state| self.roles.normalize(&state.role).to_string(), |key, count| {
                    let mut group = ViewNode::group(format!("{} ({})", role_heading(key), count));
                    group.role = key.clone();
                    group
                });
            }
            GroupMode::ByMaterial => {
                tree.roots = self.group_by(&live, |state| self.resolved_material(state.material), |key, count| {
                    let heading = key
                        .and_then(|id| self.host.material_label(id))
                        .unwrap_or_else(|| UNDEFINED_LABEL.to_string());
                    let mut group = ViewNode::group(format!("{} ({})", heading, count));
                    group.material = *key;
                    group
                });
            }
            GroupMode::ByStructure => {
                let (roots, unreached) = self.structure(&live);
                tree.roots = roots;
                tree.unreached = unreached;
            }
        }

        sort_rows(&mut tree.roots);
        tree
    }

    fn resolved_material(&self, material: Option<MaterialId>) -> Option<MaterialId> {
        material.filter(|id| self.host.material(*id).is_some())
    }

    fn element_row(&self, state: &ElementState, live: &ElementRecord) -> ViewNode {
        let material_label = match state.material {
            Some(id) => self
                .host
                .material_label(id)
                .unwrap_or_else(|| UNDEFINED_LABEL.to_string()),
            None => String::new(),
        };
        ViewNode {
            kind: RowKind::Element,
            label: state.label.clone(),
            role: self.roles.normalize(&state.role).to_string(),
            material_label,
            material: state.material,
            element: Some(state.id),
            role_modified: state.role != live.role_str(),
            material_modified: state.material != live.material.id(),
            children: Vec::new(),
        }
    }

    /// Two-level grouping, groups in first-seen order before sorting
    fn group_by<K, KF, GF>(
        &self,
        live: &[(&ElementState, Arc<ElementRecord>)],
        key_of: KF,
        heading: GF,
    ) -> Vec<ViewNode>
    where
        K: Eq + std::hash::Hash + Clone,
        KF: Fn(&ElementState) -> K,
        GF: Fn(&K, usize) -> ViewNode,
    {
        let mut keys: Vec<K> = Vec::new();
        let mut members: FxHashMap<K, Vec<ViewNode>> = FxHashMap::default();
        for (state, record) in live {
            let key = key_of(state);
            let rows = members.entry(key.clone()).or_insert_with(|| {
                keys.push(key.clone());
                Vec::new()
            });
            rows.push(self.element_row(state, record));
        }

        keys.into_iter()
            .map(|key| {
                let rows = members.remove(&key).unwrap_or_default();
                let mut group = heading(&key, rows.len());
                group.children = rows;
                group
            })
            .collect()
    }

    fn structure(
        &self,
        live: &[(&ElementState, Arc<ElementRecord>)],
    ) -> (Vec<ViewNode>, Vec<ElementId>) {
        let ids: Vec<ElementId> = live.iter().map(|(state, _)| state.id).collect();
        let builder = StructureBuilder::new(&ids, self.host);
        let order = builder.order(self.max_depth);
        let placements = builder.place(&order);

        let mut rows: FxHashMap<ElementId, ViewNode> = live
            .iter()
            .map(|(state, record)| (state.id, self.element_row(state, record)))
            .collect();

        // Arena of placed rows, children linked by index
        let mut slot: FxHashMap<ElementId, usize> = FxHashMap::default();
        let mut nodes: Vec<ViewNode> = Vec::with_capacity(placements.len());
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(placements.len());

        for placement in &placements {
            let Some(row) = rows.remove(&placement.element) else {
                continue;
            };
            slot.insert(placement.element, nodes.len());
            nodes.push(row);
            parents.push(placement.parent.and_then(|p| slot.get(&p).copied()));
        }

        (assemble(nodes, &parents), order.unreached)
    }
}

/// Turn arena rows into owned subtrees
///
/// Parents always sit at a lower index than their children, so walking the
/// arena backwards finishes every subtree before it is moved into its parent.
fn assemble(nodes: Vec<ViewNode>, parents: &[Option<usize>]) -> Vec<ViewNode> {
    let mut slots: Vec<Option<ViewNode>> = nodes.into_iter().map(Some).collect();
    let mut roots = Vec::new();
    for index in (0..slots.len()).rev() {
        let Some(mut node) = slots[index].take() else {
            continue;
        };
        // Children were pushed last-first
        node.children.reverse();
        match parents[index] {
            Some(parent) => {
                if let Some(parent_node) = slots[parent].as_mut() {
                    parent_node.add_child(node);
                }
            }
            None => roots.push(node),
        }
    }
    roots.reverse();
    roots
}

fn role_heading(role: &str) -> &str {
    if role.is_empty() {
        UNSET_ROLE_LABEL
    } else {
        role
    }
}

/// Build a view with the default structure pass bound
pub fn build_view<H: ObjectStore + MaterialRegistry + ?Sized>(
    pending: &Snapshot,
    mode: GroupMode,
    host: &H,
    roles: &RoleCatalog,
) -> ViewTree {
    ViewBuilder::new(host, roles).build(pending, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::collect;
    use crate::test_support::{abc_document, element};
    use ifc_lite_document::MemoryDocument;

    fn labels(rows: &[ViewNode]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn test_flat_mode_sorted() {
        let mut doc = MemoryDocument::new("Test");
        element(&mut doc, 1, "wall b", "Wall", None);
        element(&mut doc, 2, "Wall a", "Wall", None);
        element(&mut doc, 3, "Door", "Door", None);
        let roles = RoleCatalog::standard();

        let tree = build_view(&collect(&doc, false), GroupMode::None, &doc, &roles);
        assert_eq!(labels(&tree.roots), vec!["Door", "Wall a", "wall b"]);
        assert!(tree.roots.iter().all(|r| r.children.is_empty()));
    }

    #[test]
    fn test_by_type_groups() {
        let (doc, _, _) = abc_document();
        let roles = RoleCatalog::standard();
        let tree = build_view(&collect(&doc, false), GroupMode::ByType, &doc, &roles);

        assert_eq!(labels(&tree.roots), vec!["Door (1)", "Wall (2)"]);
        assert_eq!(labels(&tree.roots[0].children), vec!["C"]);
        assert_eq!(labels(&tree.roots[1].children), vec!["A", "B"]);
        assert_eq!(tree.roots[1].kind, RowKind::Group);
        assert_eq!(tree.roots[1].role, "Wall");
        assert!(tree.iter().all(|n| !n.is_modified()));
    }

    #[test]
    fn test_by_type_flags_modified_role() {
        let (doc, _, _) = abc_document();
        let roles = RoleCatalog::standard();
        let mut pending = collect(&doc, false);
        pending.get_mut(ElementId(1)).unwrap().role = "Door".to_string();

        let tree = build_view(&pending, GroupMode::ByType, &doc, &roles);
        assert_eq!(labels(&tree.roots), vec!["Door (2)", "Wall (1)"]);
        let a = tree.find(ElementId(1)).unwrap();
        assert!(a.role_modified);
        assert!(!a.material_modified);
    }

    #[test]
    fn test_unknown_role_grouped_as_unset() {
        let mut doc = MemoryDocument::new("Test");
        element(&mut doc, 1, "X", "Spaceship", None);
        element(&mut doc, 2, "Y", "", None);
        let roles = RoleCatalog::standard();

        let tree = build_view(&collect(&doc, false), GroupMode::ByType, &doc, &roles);
        assert_eq!(labels(&tree.roots), vec!["No role (2)"]);
        let x = tree.find(ElementId(1)).unwrap();
        assert_eq!(x.role, "");
        assert!(!x.role_modified);
    }

    #[test]
    fn test_by_material_groups_with_undefined_bucket() {
        let (doc, m1, _) = abc_document();
        let roles = RoleCatalog::standard();
        let tree = build_view(&collect(&doc, false), GroupMode::ByMaterial, &doc, &roles);

        assert_eq!(labels(&tree.roots), vec!["Concrete (2)", "Undefined (1)"]);
        assert_eq!(tree.roots[0].material, Some(m1));
        assert_eq!(tree.roots[0].children[0].material_label, "Concrete");
        assert_eq!(tree.roots[1].children[0].material_label, "");
    }

    #[test]
    fn test_stale_material_degrades_to_undefined() {
        let (mut doc, m1, _) = abc_document();
        doc.remove_material(m1);
        let roles = RoleCatalog::standard();
        let tree = build_view(&collect(&doc, false), GroupMode::ByMaterial, &doc, &roles);

        assert_eq!(labels(&tree.roots), vec!["Undefined (3)"]);
        assert_eq!(tree.find(ElementId(1)).unwrap().material_label, "Undefined");
    }

    #[test]
    fn test_material_flag_independent_of_role() {
        let (doc, _, m2) = abc_document();
        let roles = RoleCatalog::standard();
        let mut pending = collect(&doc, false);
        pending.get_mut(ElementId(3)).unwrap().material = Some(m2);

        for mode in GroupMode::ALL {
            let tree = build_view(&pending, mode, &doc, &roles);
            let c = tree.find(ElementId(3)).unwrap();
            assert!(c.material_modified, "{:?}", mode);
            assert!(!c.role_modified, "{:?}", mode);
        }
    }

    #[test]
    fn test_every_element_once_in_every_mode() {
        let (mut doc, _, _) = abc_document();
        doc.contain(ElementId(1), ElementId(2));
        doc.contain(ElementId(2), ElementId(3));
        doc.contain(ElementId(3), ElementId(1));
        let roles = RoleCatalog::standard();
        let pending = collect(&doc, false);

        for mode in GroupMode::ALL {
            let tree = build_view(&pending, mode, &doc, &roles);
            let mut ids = tree.element_ids();
            ids.sort();
            assert_eq!(ids, vec![ElementId(1), ElementId(2), ElementId(3)], "{:?}", mode);
        }
    }

    #[test]
    fn test_by_structure_nests_chain() {
        let mut doc = MemoryDocument::new("Test");
        element(&mut doc, 3, "C", "Door", None);
        element(&mut doc, 2, "B", "Wall", None);
        element(&mut doc, 1, "A", "Wall", None);
        doc.contain(ElementId(1), ElementId(2));
        doc.contain(ElementId(2), ElementId(3));
        let roles = RoleCatalog::standard();

        let tree = build_view(&collect(&doc, false), GroupMode::ByStructure, &doc, &roles);
        assert_eq!(labels(&tree.roots), vec!["A"]);
        assert_eq!(labels(&tree.roots[0].children), vec!["B"]);
        assert_eq!(labels(&tree.roots[0].children[0].children), vec!["C"]);
        assert!(tree.unreached.is_empty());
    }

    #[test]
    fn test_by_structure_depth_bound() {
        let mut doc = MemoryDocument::new("Test");
        for id in 1..=4 {
            element(&mut doc, id, &format!("E{}", id), "Wall", None);
        }
        for id in 1..4 {
            doc.contain(ElementId(id), ElementId(id + 1));
        }
        let roles = RoleCatalog::standard();

        let tree = ViewBuilder::new(&doc, &roles)
            .with_max_depth(1)
            .build(&collect(&doc, false), GroupMode::ByStructure);
        assert_eq!(tree.unreached, vec![ElementId(3), ElementId(4)]);
        assert_eq!(tree.element_count(), 4);
        assert_eq!(labels(&tree.roots), vec!["E1", "E3", "E4"]);
        assert_eq!(labels(&tree.roots[0].children), vec!["E2"]);
    }

    #[test]
    fn test_by_structure_long_chain() {
        let mut doc = MemoryDocument::new("Test");
        let n = 20_000;
        for id in 1..=n {
            element(&mut doc, id, &format!("E{:05}", id), "Wall", None);
        }
        for id in 1..n {
            doc.contain(ElementId(id), ElementId(id + 1));
        }
        let roles = RoleCatalog::standard();
        let pending = collect(&doc, false);

        let tree = build_view(&pending, GroupMode::ByStructure, &doc, &roles);
        assert_eq!(tree.element_count(), n as usize);
        assert_eq!(tree.unreached.len(), n as usize - 11);
        assert_eq!(tree.roots.len(), n as usize - 10);
        assert!(tree.find(ElementId(n)).is_some());

        // An oversized pass bound is clamped
        let tree = ViewBuilder::new(&doc, &roles)
            .with_max_depth(usize::MAX)
            .build(&pending, GroupMode::ByStructure);
        assert_eq!(tree.element_count(), n as usize);
        assert_eq!(tree.unreached.len(), n as usize - 1001);
    }

    #[test]
    fn test_unset_role_heading_distinct_from_undefined_role() {
        let mut doc = MemoryDocument::new("Test");
        element(&mut doc, 1, "X", "Undefined", None);
        element(&mut doc, 2, "Y", "", None);
        let roles = RoleCatalog::standard();

        let tree = build_view(&collect(&doc, false), GroupMode::ByType, &doc, &roles);
        assert_eq!(labels(&tree.roots), vec!["No role (1)", "Undefined (1)"]);
        assert_eq!(tree.roots[0].role, "");
        assert_eq!(tree.roots[1].role, "Undefined");
    }

    #[test]
    fn test_deleted_element_left_out() {
        let (mut doc, _, _) = abc_document();
        let pending = collect(&doc, false);
        doc.remove(ElementId(2));
        let roles = RoleCatalog::standard();

        let tree = build_view(&pending, GroupMode::ByType, &doc, &roles);
        assert_eq!(labels(&tree.roots), vec!["Door (1)", "Wall (1)"]);
        assert!(tree.find(ElementId(2)).is_none());
    }
}
