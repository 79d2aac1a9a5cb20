// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element records and attribute changes
//!
//! Host objects expose optional capabilities (an IFC role, a material slot,
//! quantities, an IFC attribute map). Each capability is an explicit optional
//! field here, checked with a presence predicate.

use crate::{ElementId, ExportFlags, MaterialId, QuantityKind, QuantityValues};
use serde::{Deserialize, Serialize};

/// Material capability of an element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialSlot {
    /// The element cannot carry a material
    #[default]
    Unsupported,
    /// The element can carry a material but has none
    Unassigned,
    /// The element references a material
    Assigned(MaterialId),
}

impl MaterialSlot {
    /// Whether the element has a material slot at all
    pub fn is_supported(&self) -> bool {
        !matches!(self, MaterialSlot::Unsupported)
    }

    /// Referenced material, if any
    pub fn id(&self) -> Option<MaterialId> {
        match self {
            MaterialSlot::Assigned(id) => Some(*id),
            _ => None,
        }
    }
}

/// Host element as seen by the classification tools
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: ElementId,
    /// Display label
    pub label: String,
    /// Host object category (e.g. "Wall", "Site")
    pub category: String,
    /// IFC role; `None` when the element cannot be classified at all
    pub role: Option<String>,
    pub material: MaterialSlot,
    /// Quantities; `None` for elements without a shape
    pub quantities: Option<QuantityValues>,
    /// IFC attribute map; `None` when the element cannot store export flags
    pub export_flags: Option<ExportFlags>,
}

impl ElementRecord {
    /// Create a classifiable element with an unset role and no other capabilities
    pub fn new(id: ElementId, label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            category: category.into(),
            role: Some(String::new()),
            material: MaterialSlot::Unsupported,
            quantities: None,
            export_flags: None,
        }
    }

    /// Set the IFC role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Remove the IFC role capability
    pub fn without_role(mut self) -> Self {
        self.role = None;
        self
    }

    /// Give the element a material slot, optionally filled
    pub fn with_material(mut self, material: Option<MaterialId>) -> Self {
        self.material = match material {
            Some(id) => MaterialSlot::Assigned(id),
            None => MaterialSlot::Unassigned,
        };
        self
    }

    /// Give the element a shape with the given quantities
    pub fn with_quantities(mut self, quantities: QuantityValues) -> Self {
        self.quantities = Some(quantities);
        self
    }

    /// Give the element an IFC attribute map
    pub fn with_export_flags(mut self, flags: ExportFlags) -> Self {
        self.export_flags = Some(flags);
        self
    }

    /// Whether the element takes part in IFC classification
    pub fn is_classifiable(&self) -> bool {
        self.role.is_some()
    }

    /// Whether the element exposes quantities
    pub fn has_quantities(&self) -> bool {
        self.quantities.is_some()
    }

    /// Current role, empty when unset or not classifiable
    pub fn role_str(&self) -> &str {
        self.role.as_deref().unwrap_or("")
    }
}

/// A single attribute change with its new value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeChange {
    Label(String),
    Role(String),
    Material(Option<MaterialId>),
    Dimension { kind: QuantityKind, value: f64 },
    ExportFlag { kind: QuantityKind, export: bool },
}

impl AttributeChange {
    /// Host attribute name the change targets
    pub fn attribute_name(&self) -> String {
        match self {
            AttributeChange::Label(_) => "Label".to_string(),
            AttributeChange::Role(_) => "IfcRole".to_string(),
            AttributeChange::Material(_) => "Material".to_string(),
            AttributeChange::Dimension { kind, .. } => kind.name().to_string(),
            AttributeChange::ExportFlag { kind, .. } => kind.export_key(),
        }
    }
}

/// One write of the form (element, attribute, new value)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeWrite {
    pub element: ElementId,
    pub change: AttributeChange,
}

impl AttributeWrite {
    pub fn new(element: ElementId, change: AttributeChange) -> Self {
        Self { element, change }
    }
}
