// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quantities table
//!
//! One row per shape-bearing element with a value and an export flag for each
//! quantity kind. The table is built once when a session opens and then only
//! changes through edits.

use crate::snapshot::Snapshot;
use ifc_lite_model::{ElementId, ObjectStore, QuantityKind};
use rustc_hash::FxHashMap;

/// Value and export flag of one quantity
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QuantityCell {
    /// `None` when the element does not expose this quantity
    pub value: Option<f64>,
    /// Pending export state
    pub export: bool,
    /// Whether the export flag can be toggled
    pub checkable: bool,
}

impl QuantityCell {
    /// Zero values are shown with a warning, never rejected
    pub fn is_suspicious(&self) -> bool {
        self.value == Some(0.0)
    }

    /// Display text with unit, empty when no value
    pub fn formatted(&self, kind: QuantityKind) -> String {
        match self.value {
            Some(value) => format!("{:.2} {}", value, kind.default_unit()),
            None => String::new(),
        }
    }
}

/// Quantities of one element
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityRow {
    pub element: ElementId,
    pub label: String,
    pub role: String,
    pub cells: [QuantityCell; QuantityKind::COUNT],
}

impl QuantityRow {
    pub fn cell(&self, kind: QuantityKind) -> &QuantityCell {
        &self.cells[kind.index()]
    }

    /// Kinds with a zero value
    pub fn suspicious(&self) -> Vec<QuantityKind> {
        QuantityKind::ALL
            .iter()
            .copied()
            .filter(|k| self.cell(*k).is_suspicious())
            .collect()
    }
}

/// Pending quantities for every qualifying element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuantityTable {
    rows: Vec<QuantityRow>,
    index: FxHashMap<ElementId, usize>,
}

impl QuantityTable {
    pub fn row(&self, id: ElementId) -> Option<&QuantityRow> {
        self.index.get(&id).map(|&i| &self.rows[i])
    }

    /// Rows in display order
    pub fn rows(&self) -> &[QuantityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn push(&mut self, row: QuantityRow) {
        self.index.insert(row.element, self.rows.len());
        self.rows.push(row);
    }

    fn cell_mut(&mut self, id: ElementId, kind: QuantityKind) -> Option<&mut QuantityCell> {
        let i = *self.index.get(&id)?;
        Some(&mut self.rows[i].cells[kind.index()])
    }

    /// Set a pending dimension
    ///
    /// Only Length, Width and Height are editable, and only where the element
    /// exposes the value. NaN and infinite values are refused. Returns
    /// whether anything changed.
    pub fn set_value(&mut self, id: ElementId, kind: QuantityKind, value: f64) -> bool {
        if !kind.is_editable() {
            return false;
        }
        if !value.is_finite() {
            log::debug!("Ignoring non-finite {} for {}: {}", kind.name(), id, value);
            return false;
        }
        match self.cell_mut(id, kind) {
            Some(cell) if cell.value.is_some() && cell.value != Some(value) => {
                cell.value = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Set a pending export flag. Returns whether anything changed.
    pub fn set_export(&mut self, id: ElementId, kind: QuantityKind, export: bool) -> bool {
        match self.cell_mut(id, kind) {
            Some(cell) if cell.checkable && cell.export != export => {
                cell.export = export;
                true
            }
            _ => false,
        }
    }

    /// Apply one export state to a column across several rows
    ///
    /// Returns the number of cells changed.
    pub fn set_export_bulk(&mut self, ids: &[ElementId], kind: QuantityKind, export: bool) -> usize {
        ids.iter()
            .filter(|id| self.set_export(**id, kind, export))
            .count()
    }

    /// Every (element, kind) with a zero value
    pub fn suspicious(&self) -> Vec<(ElementId, QuantityKind)> {
        self.rows
            .iter()
            .flat_map(|row| row.suspicious().into_iter().map(move |k| (row.element, k)))
            .collect()
    }
}

/// Build the quantities table for the elements of a snapshot
///
/// Elements without quantities and elements of an excluded category are left
/// out. Rows are grouped by role, roles in first-seen order.
pub fn compute_quantities<S: ObjectStore + ?Sized>(snapshot: &Snapshot, store: &S) -> QuantityTable {
    let mut roles: Vec<&str> = Vec::new();
    let mut grouped: FxHashMap<&str, Vec<QuantityRow>> = FxHashMap::default();

    for state in snapshot.iter() {
        let Some(record) = store.element(state.id) else {
            log::debug!("Skipping {}: no longer in the document", state.id);
            continue;
        };
        if store.is_excluded_type(state.id) {
            continue;
        }
        let Some(values) = record.quantities.as_ref() else {
            continue;
        };

        let flags = record.export_flags.as_ref();
        let mut cells = [QuantityCell::default(); QuantityKind::COUNT];
        for (kind, value) in values.iter() {
            cells[kind.index()] = QuantityCell {
                value,
                export: flags.map(|f| f.is_exported(kind)).unwrap_or(false),
                checkable: value.is_some() && flags.is_some(),
            };
        }

        let role = state.role.as_str();
        grouped
            .entry(role)
            .or_insert_with(|| {
                roles.push(role);
                Vec::new()
            })
            .push(QuantityRow {
                element: state.id,
                label: state.label.clone(),
                role: role.to_string(),
                cells,
            });
    }

    let mut table = QuantityTable::default();
    for role in roles {
        for row in grouped.remove(role).unwrap_or_default() {
            table.push(row);
        }
    }
    table
}
