// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quantity kinds, quantity values and IFC export flags

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The seven quantities an element can export to IFC
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuantityKind {
    Length,
    Width,
    Height,
    Area,
    HorizontalArea,
    VerticalArea,
    Volume,
}

impl QuantityKind {
    /// Number of quantity kinds
    pub const COUNT: usize = 7;

    /// All kinds in table column order
    pub const ALL: [QuantityKind; Self::COUNT] = [
        QuantityKind::Length,
        QuantityKind::Width,
        QuantityKind::Height,
        QuantityKind::Area,
        QuantityKind::HorizontalArea,
        QuantityKind::VerticalArea,
        QuantityKind::Volume,
    ];

    /// Column index of this kind
    pub fn index(&self) -> usize {
        match self {
            QuantityKind::Length => 0,
            QuantityKind::Width => 1,
            QuantityKind::Height => 2,
            QuantityKind::Area => 3,
            QuantityKind::HorizontalArea => 4,
            QuantityKind::VerticalArea => 5,
            QuantityKind::Volume => 6,
        }
    }

    /// Attribute name on the host object
    pub fn name(&self) -> &'static str {
        match self {
            QuantityKind::Length => "Length",
            QuantityKind::Width => "Width",
            QuantityKind::Height => "Height",
            QuantityKind::Area => "Area",
            QuantityKind::HorizontalArea => "HorizontalArea",
            QuantityKind::VerticalArea => "VerticalArea",
            QuantityKind::Volume => "Volume",
        }
    }

    /// Column header for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            QuantityKind::HorizontalArea => "Horiz Area",
            QuantityKind::VerticalArea => "Vert Area",
            other => other.name(),
        }
    }

    /// Key of the export flag in the element's IFC attribute map
    pub fn export_key(&self) -> String {
        format!("Export{}", self.name())
    }

    /// Dimensions are user-editable; areas and volume are derived from the shape
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            QuantityKind::Length | QuantityKind::Width | QuantityKind::Height
        )
    }

    /// Get default unit for this quantity kind
    pub fn default_unit(&self) -> &'static str {
        match self {
            QuantityKind::Length | QuantityKind::Width | QuantityKind::Height => "m",
            QuantityKind::Area | QuantityKind::HorizontalArea | QuantityKind::VerticalArea => "m²",
            QuantityKind::Volume => "m³",
        }
    }
}

/// Quantity values exposed by a shape-bearing element
///
/// A `None` entry means the element does not expose that quantity (or the
/// host hides it), which is different from a value of zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityValues {
    values: [Option<f64>; QuantityKind::COUNT],
}

impl QuantityValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, kind: QuantityKind, value: f64) -> Self {
        self.set(kind, Some(value));
        self
    }

    pub fn get(&self, kind: QuantityKind) -> Option<f64> {
        self.values[kind.index()]
    }

    pub fn set(&mut self, kind: QuantityKind, value: Option<f64>) {
        self.values[kind.index()] = value;
    }

    /// Iterate (kind, value) in column order
    pub fn iter(&self) -> impl Iterator<Item = (QuantityKind, Option<f64>)> + '_ {
        QuantityKind::ALL.iter().map(move |k| (*k, self.get(*k)))
    }
}

/// Per-quantity export flags from the element's IFC attribute map
///
/// An absent flag reads as `false`. The distinction between absent and
/// `false` is kept so writes can stay minimal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFlags {
    flags: BTreeMap<QuantityKind, bool>,
}

impl ExportFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective export state (absent means not exported)
    pub fn is_exported(&self, kind: QuantityKind) -> bool {
        self.flags.get(&kind).copied().unwrap_or(false)
    }

    /// Whether the flag is stored at all
    pub fn contains(&self, kind: QuantityKind) -> bool {
        self.flags.contains_key(&kind)
    }

    pub fn set(&mut self, kind: QuantityKind, export: bool) {
        self.flags.insert(kind, export);
    }

    /// Builder-style setter
    pub fn with(mut self, kind: QuantityKind, export: bool) -> Self {
        self.set(kind, export);
        self
    }

    /// Stored flags as host attribute entries ("ExportLength" -> "True")
    pub fn to_attribute_map(&self) -> BTreeMap<String, String> {
        self.flags
            .iter()
            .map(|(kind, export)| {
                let value = if *export { "True" } else { "False" };
                (kind.export_key(), value.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_matches_index() {
        for (i, kind) in QuantityKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_editable_kinds() {
        let editable: Vec<_> = QuantityKind::ALL
            .iter()
            .filter(|k| k.is_editable())
            .collect();
        assert_eq!(editable.len(), 3);
        assert!(!QuantityKind::Volume.is_editable());
    }

    #[test]
    fn test_absent_flag_is_not_exported() {
        let flags = ExportFlags::new().with(QuantityKind::Area, true);
        assert!(flags.is_exported(QuantityKind::Area));
        assert!(!flags.is_exported(QuantityKind::Volume));
        assert!(!flags.contains(QuantityKind::Volume));
        assert_eq!(
            flags.to_attribute_map().get("ExportArea"),
            Some(&"True".to_string())
        );
    }

    #[test]
    fn test_zero_is_a_value() {
        let q = QuantityValues::new().with(QuantityKind::Height, 0.0);
        assert_eq!(q.get(QuantityKind::Height), Some(0.0));
        assert_eq!(q.get(QuantityKind::Length), None);
    }
}
