// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for element classification
//!
//! Identifiers, materials and the catalog of IFC export roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe element identifier
///
/// Wraps the host's opaque object handle (e.g. object 42 becomes ElementId(42))
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ElementId {
    fn from(id: u32) -> Self {
        ElementId(id)
    }
}

impl From<ElementId> for u32 {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

/// Type-safe material identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
pub struct MaterialId(pub u32);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

impl From<u32> for MaterialId {
    fn from(id: u32) -> Self {
        MaterialId(id)
    }
}

/// Type-safe document group identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// A material known to the host document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub label: String,
}

impl Material {
    pub fn new(id: MaterialId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Label shown for an unset or unresolvable material
pub const UNDEFINED_LABEL: &str = "Undefined";

/// Roles shipped with the Arch workbench, in menu order
const STANDARD_ROLES: &[&str] = &[
    "Undefined",
    "Beam",
    "Chimney",
    "Column",
    "Covering",
    "Curtain Wall",
    "Door",
    "Foundation",
    "Furniture",
    "Hydro Equipment",
    "Electric Equipment",
    "Member",
    "Plate",
    "Railing",
    "Ramp",
    "Ramp Flight",
    "Rebar",
    "Pile",
    "Roof",
    "Shading Device",
    "Slab",
    "Stair",
    "Stair Flight",
    "Tendon",
    "Wall",
    "Wall Layer",
    "Window",
];

/// Ordered catalog of valid IFC export roles
///
/// Supplied by the host when a session opens. The empty string is not part
/// of the catalog; it always means "unset".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalog {
    roles: Vec<String>,
}

impl RoleCatalog {
    /// Create a catalog from an ordered list; empty and duplicate entries are dropped
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self { roles: Vec::new() };
        for role in roles {
            let role = role.into();
            if !role.is_empty() && !catalog.roles.contains(&role) {
                catalog.roles.push(role);
            }
        }
        catalog
    }

    /// Catalog with the standard Arch roles
    pub fn standard() -> Self {
        Self::new(STANDARD_ROLES.iter().copied())
    }

    /// Whether `role` is a member of the catalog
    pub fn contains(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether `role` may be written to an element (catalog member or unset)
    pub fn accepts(&self, role: &str) -> bool {
        role.is_empty() || self.contains(role)
    }

    /// Map a role to its catalog form, treating unknown values as unset
    pub fn normalize<'a>(&self, role: &'a str) -> &'a str {
        if self.contains(role) {
            role
        } else {
            ""
        }
    }

    /// Position of a role in the catalog
    pub fn index_of(&self, role: &str) -> Option<usize> {
        self.roles.iter().position(|r| r == role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
