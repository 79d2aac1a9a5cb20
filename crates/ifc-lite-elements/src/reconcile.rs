// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of pending state with the host
//!
//! `reconcile` diffs the pending snapshot and quantities table against the
//! live elements and returns the minimal set of attribute writes. `commit`
//! applies a write set inside one host transaction.

use crate::quantities::QuantityTable;
use crate::snapshot::Snapshot;
use ifc_lite_model::{
    AttributeChange, AttributeWrite, ElementId, MaterialRegistry, ObjectStore, QuantityKind,
    Result, RoleCatalog, TransactionService,
};
use rustc_hash::FxHashSet;

/// Ordered attribute writes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteSet {
    writes: Vec<AttributeWrite>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: ElementId, change: AttributeChange) {
        self.writes.push(AttributeWrite::new(element, change));
    }

    pub fn writes(&self) -> &[AttributeWrite] {
        &self.writes
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeWrite> {
        self.writes.iter()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes targeting one element
    pub fn for_element(&self, id: ElementId) -> impl Iterator<Item = &AttributeChange> {
        self.writes
            .iter()
            .filter(move |w| w.element == id)
            .map(|w| &w.change)
    }

    /// Number of distinct elements written
    pub fn element_count(&self) -> usize {
        self.writes
            .iter()
            .map(|w| w.element)
            .collect::<FxHashSet<_>>()
            .len()
    }
}

impl<'a> IntoIterator for &'a WriteSet {
    type Item = &'a AttributeWrite;
    type IntoIter = std::slice::Iter<'a, AttributeWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.iter()
    }
}

/// Diff pending state against the host
///
/// Elements the host no longer knows are skipped. A role is only written when
/// it is empty or in the catalog, a material only when it still resolves.
/// Applying the result and reconciling again yields an empty set.
pub fn reconcile<H: ObjectStore + MaterialRegistry + ?Sized>(
    pending: &Snapshot,
    quantities: &QuantityTable,
    host: &H,
    roles: &RoleCatalog,
) -> WriteSet {
    let mut writes = WriteSet::new();

    for state in pending.iter() {
        let Some(live) = host.element(state.id) else {
            log::debug!("Skipping {}: no longer in the document", state.id);
            continue;
        };

        if state.label != live.label {
            writes.push(state.id, AttributeChange::Label(state.label.clone()));
        }

        if let Some(live_role) = live.role.as_deref() {
            if state.role != live_role {
                if roles.accepts(&state.role) {
                    writes.push(state.id, AttributeChange::Role(state.role.clone()));
                } else {
                    log::debug!("Not writing unknown role '{}' to {}", state.role, state.id);
                }
            }
        }

        if live.material.is_supported() && state.material != live.material.id() {
            match state.material {
                Some(id) if host.material(id).is_none() => {
                    log::debug!("Not writing unresolved material {} to {}", id, state.id);
                }
                material => writes.push(state.id, AttributeChange::Material(material)),
            }
        }
    }

    for row in quantities.rows() {
        let Some(live) = host.element(row.element) else {
            log::debug!("Skipping quantities of {}: no longer in the document", row.element);
            continue;
        };

        for kind in QuantityKind::ALL {
            let cell = row.cell(kind);
            let Some(value) = cell.value else {
                continue;
            };

            if kind.is_editable() {
                let live_value = live.quantities.as_ref().and_then(|q| q.get(kind));
                if value.is_finite() && matches!(live_value, Some(v) if v != value) {
                    writes.push(row.element, AttributeChange::Dimension { kind, value });
                }
            }

            if let Some(flags) = live.export_flags.as_ref() {
                if cell.export != flags.is_exported(kind) {
                    writes.push(
                        row.element,
                        AttributeChange::ExportFlag {
                            kind,
                            export: cell.export,
                        },
                    );
                }
            }
        }
    }

    writes
}

/// Outcome of a commit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Writes applied
    pub writes: usize,
    /// Distinct elements written
    pub elements: usize,
    /// Whether a transaction was opened
    pub transaction: bool,
}

/// Apply a write set as one host transaction
///
/// An empty set opens no transaction. On the first failed write the
/// transaction is aborted and the error returned; on success the host
/// recomputes once.
pub fn commit<H: ObjectStore + TransactionService + ?Sized>(
    writes: &WriteSet,
    host: &mut H,
    label: &str,
) -> Result<CommitReport> {
    if writes.is_empty() {
        return Ok(CommitReport::default());
    }

    host.begin_transaction(label)?;

    let mut applied = 0;
    let mut elements = FxHashSet::default();
    for write in writes {
        if !host.exists(write.element) {
            log::debug!("Skipping write to {}: no longer in the document", write.element);
            continue;
        }
        if let Err(err) = host.set_attr(write.element, &write.change) {
            log::warn!(
                "Writing {} of {} failed, rolling back '{}': {}",
                write.change.attribute_name(),
                write.element,
                label,
                err
            );
            if let Err(abort_err) = host.abort_transaction() {
                log::warn!("Rollback of '{}' failed: {}", label, abort_err);
            }
            return Err(err);
        }
        applied += 1;
        elements.insert(write.element);
    }

    host.commit_transaction()?;
    host.recompute();

    log::info!(
        "Committed '{}': {} write(s) to {} element(s)",
        label,
        applied,
        elements.len()
    );
    Ok(CommitReport {
        writes: applied,
        elements: elements.len(),
        transaction: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{apply_global_edit, GlobalEdit};
    use crate::quantities::compute_quantities;
    use crate::snapshot::collect;
    use crate::test_support::{abc_document, element, shaped};
    use approx::assert_relative_eq;
    use ifc_lite_document::MemoryDocument;
    use ifc_lite_model::{ExportFlags, MaterialSlot, StoreError};

    const A: ElementId = ElementId(1);
    const B: ElementId = ElementId(2);
    const C: ElementId = ElementId(3);

    fn reconcile_doc(pending: &Snapshot, doc: &MemoryDocument) -> WriteSet {
        reconcile(pending, &QuantityTable::default(), doc, doc.roles())
    }

    #[test]
    fn test_no_edits_no_writes() {
        let (doc, _, _) = abc_document();
        let pending = collect(&doc, false);
        assert!(reconcile_doc(&pending, &doc).is_empty());
    }

    #[test]
    fn test_minimal_writes_and_idempotence() {
        let (mut doc, _, m2) = abc_document();
        let roles = RoleCatalog::standard();
        let mut pending = collect(&doc, false);
        apply_global_edit(&mut pending, &[A, C], &GlobalEdit::Material(m2), &roles, &doc);
        pending.get_mut(B).unwrap().role = "Column".to_string();

        let writes = reconcile_doc(&pending, &doc);
        assert_eq!(writes.len(), 3);
        assert_eq!(writes.element_count(), 3);
        assert_eq!(
            writes.for_element(B).collect::<Vec<_>>(),
            vec![&AttributeChange::Role("Column".into())]
        );

        let report = commit(&writes, &mut doc, "Change IFC elements").unwrap();
        assert_eq!(report.writes, 3);
        assert!(report.transaction);
        assert!(reconcile_doc(&pending, &doc).is_empty());
    }

    #[test]
    fn test_clearing_material_and_role() {
        let (mut doc, _, _) = abc_document();
        let mut pending = collect(&doc, false);
        pending.get_mut(A).unwrap().material = None;
        pending.get_mut(A).unwrap().role = String::new();

        let writes = reconcile_doc(&pending, &doc);
        assert_eq!(writes.len(), 2);
        commit(&writes, &mut doc, "Clear").unwrap();

        let a = doc.element(A).unwrap();
        assert_eq!(a.material, MaterialSlot::Unassigned);
        assert_eq!(a.role_str(), "");
    }

    #[test]
    fn test_unknown_live_role_left_alone() {
        let mut doc = MemoryDocument::new("Legacy");
        element(&mut doc, 1, "Old", "Spaceship", None);
        let pending = collect(&doc, false);
        assert!(reconcile_doc(&pending, &doc).is_empty());
    }

    #[test]
    fn test_out_of_catalog_role_not_written() {
        let (doc, _, _) = abc_document();
        let mut pending = collect(&doc, false);
        pending.get_mut(A).unwrap().role = "Spaceship".to_string();

        assert!(reconcile_doc(&pending, &doc).is_empty());
        assert_eq!(doc.element(A).unwrap().role_str(), "Wall");
    }

    #[test]
    fn test_deleted_element_skipped() {
        let (mut doc, _, m2) = abc_document();
        let mut pending = collect(&doc, false);
        pending.get_mut(A).unwrap().material = Some(m2);
        pending.get_mut(B).unwrap().material = Some(m2);
        doc.remove(B);

        let writes = reconcile_doc(&pending, &doc);
        assert_eq!(writes.len(), 1);
        assert_eq!(writes.writes()[0].element, A);
    }

    #[test]
    fn test_stale_material_not_written() {
        let (mut doc, _, m2) = abc_document();
        let mut pending = collect(&doc, false);
        pending.get_mut(C).unwrap().material = Some(m2);
        doc.remove_material(m2);
        assert!(reconcile_doc(&pending, &doc).is_empty());
    }

    #[test]
    fn test_non_finite_live_dimension_stable() {
        let mut doc = MemoryDocument::new("Walls");
        doc.add(shaped(1, "W1", "Wall", f64::NAN));
        let pending = collect(&doc, false);
        let mut table = compute_quantities(&pending, &doc);

        assert!(reconcile(&pending, &table, &doc, doc.roles()).is_empty());
        assert!(!table.set_value(A, QuantityKind::Length, f64::NAN));
        assert!(reconcile(&pending, &table, &doc, doc.roles()).is_empty());
    }

    #[test]
    fn test_quantity_writes() {
        let mut doc = MemoryDocument::new("Walls");
        doc.add(
            shaped(1, "W1", "Wall", 4.0)
                .with_export_flags(ExportFlags::new().with(QuantityKind::Width, true)),
        );
        let pending = collect(&doc, false);
        let mut table = compute_quantities(&pending, &doc);
        assert!(reconcile(&pending, &table, &doc, doc.roles()).is_empty());

        table.set_value(A, QuantityKind::Length, 5.0);
        table.set_export(A, QuantityKind::Length, true);
        table.set_export(A, QuantityKind::Width, false);
        // Absent flag that stays false is not written
        table.set_export(A, QuantityKind::Volume, false);

        let writes = reconcile(&pending, &table, &doc, doc.roles());
        assert_eq!(writes.len(), 3);

        commit(&writes, &mut doc, "Quantities").unwrap();
        let live = doc.element(A).unwrap();
        assert_relative_eq!(live.quantities.as_ref().unwrap().get(QuantityKind::Length).unwrap(), 5.0);
        let flags = live.export_flags.as_ref().unwrap();
        assert!(flags.is_exported(QuantityKind::Length));
        assert!(!flags.is_exported(QuantityKind::Width));
        assert!(!flags.contains(QuantityKind::Volume));
        assert!(reconcile(&pending, &table, &doc, doc.roles()).is_empty());
    }

    #[test]
    fn test_empty_commit_opens_no_transaction() {
        let (mut doc, _, _) = abc_document();
        let report = commit(&WriteSet::new(), &mut doc, "Nothing").unwrap();
        assert!(!report.transaction);
        assert!(doc.history().is_empty());
        assert_eq!(doc.recompute_count(), 0);
    }

    #[test]
    fn test_commit_recomputes_once() {
        let (mut doc, _, m2) = abc_document();
        let mut writes = WriteSet::new();
        writes.push(A, AttributeChange::Material(Some(m2)));
        writes.push(B, AttributeChange::Material(Some(m2)));

        commit(&writes, &mut doc, "Change IFC elements").unwrap();
        assert_eq!(doc.history(), ["Change IFC elements".to_string()]);
        assert_eq!(doc.recompute_count(), 1);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let (mut doc, m1, m2) = abc_document();
        doc.set_read_only(B, true);
        let mut writes = WriteSet::new();
        writes.push(A, AttributeChange::Material(Some(m2)));
        writes.push(B, AttributeChange::Material(Some(m2)));

        let err = commit(&writes, &mut doc, "Change IFC elements").unwrap_err();
        assert!(matches!(err, StoreError::Other(_)));
        assert_eq!(doc.element(A).unwrap().material.id(), Some(m1));
        assert!(!doc.in_transaction());
        assert!(doc.history().is_empty());
        assert_eq!(doc.recompute_count(), 0);
    }

    #[test]
    fn test_commit_skips_elements_deleted_after_reconcile() {
        let (mut doc, _, m2) = abc_document();
        let mut writes = WriteSet::new();
        writes.push(A, AttributeChange::Material(Some(m2)));
        writes.push(B, AttributeChange::Material(Some(m2)));
        doc.remove(B);

        let report = commit(&writes, &mut doc, "Change IFC elements").unwrap();
        assert_eq!(report.writes, 1);
        assert_eq!(report.elements, 1);
    }
}
