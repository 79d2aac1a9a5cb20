// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pending edits from selections
//!
//! Two editors change the pending snapshot: the global combo boxes, which
//! apply one role or material to the whole selection, and the per-cell editor,
//! which is limited to small selections. Neither touches the host.

use crate::snapshot::Snapshot;
use ifc_lite_model::{ElementId, MaterialId, MaterialRegistry, RoleCatalog};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Common values of a selection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Selected elements still in the snapshot
    pub count: usize,
    /// Role shared by every selected element (`""` when all are unset)
    pub common_role: Option<String>,
    /// Material shared by every selected element
    pub common_material: Option<MaterialId>,
    /// The per-cell editor accepts this selection
    pub single_edit_enabled: bool,
}

/// Edit applied to the whole selection from the global combo boxes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalEdit {
    Role(String),
    Material(MaterialId),
}

/// Edit from the per-cell editor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellEdit {
    /// Rename the first selected element
    Label(String),
    /// `None` clears the role
    Role(Option<String>),
    /// `None` leaves the material unchanged
    Material(Option<MaterialId>),
}

/// Why an edit changed nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    EmptySelection,
    /// Selected elements disagree on the edited axis
    AmbiguousSelection,
    /// Role outside the catalog
    InvalidRole,
    /// Material that does not resolve
    UnknownMaterial,
    /// Selection above the per-cell editor limit
    SelectionTooLarge,
}

/// Result of an edit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOutcome {
    /// Edit accepted; `changed` pending entries now differ from before
    Applied { changed: usize },
    Ignored(IgnoreReason),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied { .. })
    }

    pub fn changed(&self) -> usize {
        match self {
            EditOutcome::Applied { changed } => *changed,
            EditOutcome::Ignored(_) => 0,
        }
    }
}

/// Selected ids present in the snapshot, deduplicated, in selection order
fn live_selection(pending: &Snapshot, selection: &[ElementId]) -> Vec<ElementId> {
    let mut seen = FxHashSet::default();
    selection
        .iter()
        .copied()
        .filter(|id| pending.contains(*id) && seen.insert(*id))
        .collect()
}

/// Value shared by every item, `None` when they differ or there are none
fn common<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut values = values.into_iter();
    let first = values.next()?;
    for value in values {
        if value != first {
            return None;
        }
    }
    Some(first)
}

/// Summarize a selection for pre-selecting the editors
pub fn summarize(pending: &Snapshot, selection: &[ElementId], single_edit_limit: usize) -> SelectionSummary {
    let ids = live_selection(pending, selection);
    let states: Vec<_> = ids.iter().filter_map(|id| pending.get(*id)).collect();
    SelectionSummary {
        count: states.len(),
        common_role: common(states.iter().map(|s| s.role.clone())),
        common_material: common(states.iter().map(|s| s.material)).flatten(),
        single_edit_enabled: !states.is_empty() && states.len() <= single_edit_limit,
    }
}

/// Apply a role or material to every selected element
///
/// A role must be a non-empty catalog entry and is only applied when the
/// selection is homogeneous in role. A material must resolve and is applied
/// regardless of the selected roles. There is no selection size limit.
pub fn apply_global_edit<R: MaterialRegistry + ?Sized>(
    pending: &mut Snapshot,
    selection: &[ElementId],
    edit: &GlobalEdit,
    roles: &RoleCatalog,
    materials: &R,
) -> EditOutcome {
    let ids = live_selection(pending, selection);
    if ids.is_empty() {
        return EditOutcome::Ignored(IgnoreReason::EmptySelection);
    }

    match edit {
        GlobalEdit::Role(role) => {
            if role.is_empty() || !roles.contains(role) {
                return EditOutcome::Ignored(IgnoreReason::InvalidRole);
            }
            let homogeneous = common(
                ids.iter()
                    .filter_map(|id| pending.get(*id))
                    .map(|s| s.role.as_str()),
            )
            .is_some();
            if !homogeneous {
                log::debug!("Role edit ignored: selection has mixed roles");
                return EditOutcome::Ignored(IgnoreReason::AmbiguousSelection);
            }
            EditOutcome::Applied {
                changed: set_role(pending, &ids, role),
            }
        }
        GlobalEdit::Material(material) => {
            if materials.material(*material).is_none() {
                return EditOutcome::Ignored(IgnoreReason::UnknownMaterial);
            }
            EditOutcome::Applied {
                changed: set_material(pending, &ids, *material),
            }
        }
    }
}

/// Apply a per-cell edit to a small selection
///
/// Selections larger than `limit` are refused. A label edit only renames the
/// first selected element.
pub fn apply_cell_edit<R: MaterialRegistry + ?Sized>(
    pending: &mut Snapshot,
    selection: &[ElementId],
    edit: &CellEdit,
    roles: &RoleCatalog,
    materials: &R,
    limit: usize,
) -> EditOutcome {
    let ids = live_selection(pending, selection);
    if ids.is_empty() {
        return EditOutcome::Ignored(IgnoreReason::EmptySelection);
    }
    if ids.len() > limit {
        return EditOutcome::Ignored(IgnoreReason::SelectionTooLarge);
    }

    let changed = match edit {
        CellEdit::Label(label) => match pending.get_mut(ids[0]) {
            Some(state) if state.label != *label => {
                state.label = label.clone();
                1
            }
            _ => 0,
        },
        CellEdit::Role(None) => set_role(pending, &ids, ""),
        CellEdit::Role(Some(role)) => {
            if !roles.accepts(role) {
                return EditOutcome::Ignored(IgnoreReason::InvalidRole);
            }
            set_role(pending, &ids, role)
        }
        CellEdit::Material(None) => 0,
        CellEdit::Material(Some(material)) => {
            if materials.material(*material).is_none() {
                return EditOutcome::Ignored(IgnoreReason::UnknownMaterial);
            }
            set_material(pending, &ids, *material)
        }
    };
    EditOutcome::Applied { changed }
}

fn set_role(pending: &mut Snapshot, ids: &[ElementId], role: &str) -> usize {
    let mut changed = 0;
    for id in ids {
        if let Some(state) = pending.get_mut(*id) {
            if state.role != role {
                state.role = role.to_string();
                changed += 1;
            }
        }
    }
    changed
}

fn set_material(pending: &mut Snapshot, ids: &[ElementId], material: MaterialId) -> usize {
    let mut changed = 0;
    for id in ids {
        if let Some(state) = pending.get_mut(*id) {
            if state.material != Some(material) {
                state.material = Some(material);
                changed += 1;
            }
        }
    }
    changed
}
