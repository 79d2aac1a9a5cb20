// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON document files
//!
//! A document file lists materials, elements and containment:
//!
//! ```json
//! {
//!   "name": "House",
//!   "materials": [{ "id": 1, "label": "Concrete" }],
//!   "elements": [
//!     { "id": 1, "label": "Wall", "category": "Wall", "role": "Wall",
//!       "material": 1, "quantities": { "Length": 4.0 },
//!       "export": { "Length": true }, "children": [2] }
//!   ]
//! }
//! ```

use crate::{LoadError, MemoryDocument};
use ifc_lite_model::{
    ElementId, ElementRecord, ExportFlags, Material, MaterialId, MaterialRegistry, ObjectStore,
    QuantityKind, QuantityValues, RoleCatalog,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level document file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentFile {
    pub name: String,
    /// Role catalog; the standard catalog when absent
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    /// Extra categories excluded from quantities
    #[serde(default)]
    pub excluded_categories: Vec<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
}

/// One element in a document file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementEntry {
    pub id: u32,
    pub label: String,
    #[serde(default)]
    pub category: String,
    /// IFC role; elements without one are not classifiable
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the element has a material slot (implied by `material`)
    #[serde(default)]
    pub has_material: bool,
    #[serde(default)]
    pub material: Option<u32>,
    #[serde(default)]
    pub quantities: Option<BTreeMap<QuantityKind, f64>>,
    #[serde(default)]
    pub export: Option<BTreeMap<QuantityKind, bool>>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub children: Vec<u32>,
}

fn default_visible() -> bool {
    true
}

impl ElementEntry {
    fn to_record(&self) -> ElementRecord {
        let mut record = ElementRecord::new(ElementId(self.id), &self.label, &self.category);
        record.role = self.role.clone();
        if self.has_material || self.material.is_some() {
            record = record.with_material(self.material.map(MaterialId));
        }
        if let Some(quantities) = &self.quantities {
            let values = quantities
                .iter()
                .fold(QuantityValues::new(), |acc, (kind, value)| {
                    acc.with(*kind, *value)
                });
            record = record.with_quantities(values);
        }
        if let Some(export) = &self.export {
            let flags = export
                .iter()
                .fold(ExportFlags::new(), |acc, (kind, flag)| acc.with(*kind, *flag));
            record = record.with_export_flags(flags);
        }
        record
    }
}

impl DocumentFile {
    /// Parse a document file from JSON
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a document, validating ids and references
    pub fn into_document(self) -> Result<MemoryDocument, LoadError> {
        let roles = match &self.roles {
            Some(roles) => RoleCatalog::new(roles.iter().cloned()),
            None => RoleCatalog::standard(),
        };
        let mut doc = MemoryDocument::new(&self.name).with_roles(roles);

        for category in &self.excluded_categories {
            doc.exclude_category(category.clone());
        }
        for material in &self.materials {
            doc.insert_material(material.clone());
        }

        for entry in &self.elements {
            let id = ElementId(entry.id);
            if doc.exists(id) {
                return Err(LoadError::DuplicateElement(id));
            }
            if let Some(material) = entry.material {
                if doc.material(MaterialId(material)).is_none() {
                    return Err(LoadError::UnknownMaterial {
                        element: id,
                        material: MaterialId(material),
                    });
                }
            }
            doc.add(entry.to_record());
            doc.set_hidden(id, !entry.visible);
        }

        for entry in &self.elements {
            let parent = ElementId(entry.id);
            for child in &entry.children {
                let child = ElementId(*child);
                if !doc.exists(child) {
                    return Err(LoadError::UnknownElement {
                        element: parent,
                        referenced: child,
                    });
                }
                doc.contain(parent, child);
            }
        }

        log::debug!(
            "Loaded document '{}' with {} elements and {} materials",
            self.name,
            self.elements.len(),
            self.materials.len()
        );
        Ok(doc)
    }
}

/// Load a document from JSON
pub fn load_json(json: &str) -> Result<MemoryDocument, LoadError> {
    DocumentFile::from_json(json)?.into_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_model::MaterialSlot;

    const TEST_DOC: &str = r#"{
        "name": "House",
        "materials": [{ "id": 1, "label": "Concrete" }],
        "elements": [
            { "id": 1, "label": "Building", "category": "Building", "role": "", "children": [2] },
            { "id": 2, "label": "Wall", "category": "Wall", "role": "Wall", "material": 1,
              "quantities": { "Length": 4.0, "Volume": 0.0 },
              "export": { "Length": true } },
            { "id": 3, "label": "Ground", "category": "Site", "visible": false },
            { "id": 4, "label": "Slab", "category": "Slab", "role": "Slab", "has_material": true }
        ]
    }"#;

    #[test]
    fn test_load_document() {
        let doc = load_json(TEST_DOC).unwrap();
        assert_eq!(doc.name(), "House");
        assert_eq!(doc.list_elements().len(), 4);

        let wall = doc.element(ElementId(2)).unwrap();
        assert_eq!(wall.material, MaterialSlot::Assigned(MaterialId(1)));
        let q = wall.quantities.as_ref().unwrap();
        assert_eq!(q.get(QuantityKind::Volume), Some(0.0));
        assert!(wall.export_flags.as_ref().unwrap().is_exported(QuantityKind::Length));

        assert_eq!(doc.containment(ElementId(2)).parents, vec![ElementId(1)]);
        assert!(!doc.is_visible(ElementId(3)));
        assert!(!doc.element(ElementId(3)).unwrap().is_classifiable());
        assert_eq!(
            doc.element(ElementId(4)).unwrap().material,
            MaterialSlot::Unassigned
        );
    }

    #[test]
    fn test_unknown_child_rejected() {
        let json = r#"{ "name": "X", "elements": [{ "id": 1, "label": "A", "children": [9] }] }"#;
        assert!(matches!(
            load_json(json),
            Err(LoadError::UnknownElement { .. })
        ));
    }

    #[test]
    fn test_duplicate_element_rejected() {
        let json = r#"{ "name": "X", "elements": [
            { "id": 1, "label": "A" }, { "id": 1, "label": "B" }
        ] }"#;
        assert!(matches!(
            load_json(json),
            Err(LoadError::DuplicateElement(ElementId(1)))
        ));
    }

    #[test]
    fn test_unknown_material_rejected() {
        let json = r#"{ "name": "X", "elements": [{ "id": 1, "label": "A", "material": 7 }] }"#;
        assert!(matches!(
            load_json(json),
            Err(LoadError::UnknownMaterial { .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(load_json("{"), Err(LoadError::Json(_))));
    }
}
