// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures for unit tests

use ifc_lite_document::MemoryDocument;
use ifc_lite_model::{
    ElementId, ElementRecord, ExportFlags, MaterialId, QuantityKind, QuantityValues,
};

/// Add a classifiable element with a material slot
pub(crate) fn element(
    doc: &mut MemoryDocument,
    id: u32,
    label: &str,
    role: &str,
    material: Option<MaterialId>,
) -> ElementId {
    doc.add(
        ElementRecord::new(ElementId(id), label, "Component")
            .with_role(role)
            .with_material(material),
    )
}

/// A(Wall, M1), B(Wall, M1), C(Door, none); materials M1 "Concrete" and M2 "Brick"
pub(crate) fn abc_document() -> (MemoryDocument, MaterialId, MaterialId) {
    let mut doc = MemoryDocument::new("ABC");
    let m1 = doc.add_material("Concrete");
    let m2 = doc.add_material("Brick");
    element(&mut doc, 1, "A", "Wall", Some(m1));
    element(&mut doc, 2, "B", "Wall", Some(m1));
    element(&mut doc, 3, "C", "Door", None);
    (doc, m1, m2)
}

/// A wall with a shape and an IFC attribute map
pub(crate) fn shaped(id: u32, label: &str, category: &str, length: f64) -> ElementRecord {
    ElementRecord::new(ElementId(id), label, category)
        .with_role("Wall")
        .with_material(None)
        .with_quantities(
            QuantityValues::new()
                .with(QuantityKind::Length, length)
                .with(QuantityKind::Width, 0.2)
                .with(QuantityKind::Height, 3.0)
                .with(QuantityKind::Area, length * 3.0)
                .with(QuantityKind::Volume, length * 0.6),
        )
        .with_export_flags(ExportFlags::new())
}
