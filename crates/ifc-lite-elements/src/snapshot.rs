// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshots of element classification state
//!
//! A snapshot maps each classifiable element to its label, role and material.
//! The session keeps one as its pending state: it starts equal to the live
//! values and only reaches the host through reconciliation.

use ifc_lite_model::{ElementId, MaterialId, ObjectStore};
use rustc_hash::FxHashMap;

/// Classification state of one element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementState {
    pub id: ElementId,
    pub label: String,
    /// IFC role, empty when unset
    pub role: String,
    pub material: Option<MaterialId>,
}

/// Ordered element states, indexed by id
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<ElementState>,
    index: FxHashMap<ElementId, usize>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a state, replacing any previous state for the same element
    pub fn insert(&mut self, state: ElementState) {
        match self.index.get(&state.id) {
            Some(&i) => self.entries[i] = state,
            None => {
                self.index.insert(state.id, self.entries.len());
                self.entries.push(state);
            }
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementState> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementState> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index.contains_key(&id)
    }

    /// States in collection order
    pub fn iter(&self) -> impl Iterator<Item = &ElementState> {
        self.entries.iter()
    }

    /// Element ids in collection order
    pub fn ids(&self) -> Vec<ElementId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the snapshot restricted to states matching `keep`
    pub fn filtered(&self, keep: impl Fn(&ElementState) -> bool) -> Snapshot {
        let mut out = Snapshot::new();
        for state in self.entries.iter().filter(|s| keep(s)) {
            out.insert(state.clone());
        }
        out
    }
}

impl FromIterator<ElementState> for Snapshot {
    fn from_iter<I: IntoIterator<Item = ElementState>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for state in iter {
            snapshot.insert(state);
        }
        snapshot
    }
}

/// Read the current role and material of every classifiable element
///
/// Elements without an IFC role capability are skipped. With `visible_only`,
/// hidden elements are skipped too. Nothing is written.
pub fn collect<S: ObjectStore + ?Sized>(store: &S, visible_only: bool) -> Snapshot {
    store
        .list_elements()
        .into_iter()
        .filter(|id| !visible_only || store.is_visible(*id))
        .filter_map(|id| store.element(id))
        .filter(|record| record.is_classifiable())
        .map(|record| ElementState {
            id: record.id,
            label: record.label.clone(),
            role: record.role_str().to_string(),
            material: record.material.id(),
        })
        .collect()
}
