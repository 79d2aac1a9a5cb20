// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Containment relation between elements

use crate::ElementId;
use serde::{Deserialize, Serialize};

/// Parent/child adjacency of one element in the containment graph
///
/// Order matters: both lists are kept in the host's order, and hierarchy
/// building attaches an element under the first placed parent it finds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Containment {
    /// Objects that contain this one ("in" list)
    pub parents: Vec<ElementId>,
    /// Objects contained by this one ("out" list)
    pub children: Vec<ElementId>,
}

impl Containment {
    pub fn new(parents: Vec<ElementId>, children: Vec<ElementId>) -> Self {
        Self { parents, children }
    }

    /// Whether any parent satisfies `present`
    pub fn has_parent_in(&self, present: impl Fn(ElementId) -> bool) -> bool {
        self.parents.iter().any(|p| present(*p))
    }

    /// First parent, in host order, that satisfies `placed`
    pub fn first_parent_in(&self, placed: impl Fn(ElementId) -> bool) -> Option<ElementId> {
        self.parents.iter().copied().find(|p| placed(*p))
    }
}
