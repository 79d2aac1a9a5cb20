// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Containment hierarchy ordering
//!
//! Elements are placed level by level: first the roots (no parent among the
//! input), then every element whose parent was placed in the previous pass.
//! The number of passes is bounded, so cyclic or degenerate containment data
//! cannot loop forever; whatever is left is appended as pseudo-roots.

use ifc_lite_model::{Containment, ElementId, ObjectStore};
use rustc_hash::{FxHashMap, FxHashSet};

/// Result of ordering elements by containment
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructureOrder {
    /// Every input element exactly once, parents before their reachable children
    pub order: Vec<ElementId>,
    /// Elements not reached within the pass bound (appended at the end of `order`)
    pub unreached: Vec<ElementId>,
    /// Passes performed after placing the roots
    pub passes: usize,
}

/// Where an element lands in the structure tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub element: ElementId,
    /// First already-placed parent, `None` for a top-level row
    pub parent: Option<ElementId>,
}

/// Containment restricted to one input set
pub struct StructureBuilder {
    ids: Vec<ElementId>,
    present: FxHashSet<ElementId>,
    edges: FxHashMap<ElementId, Containment>,
}

impl StructureBuilder {
    /// Read containment for `ids` from the store
    pub fn new<S: ObjectStore + ?Sized>(ids: &[ElementId], store: &S) -> Self {
        let mut seen = FxHashSet::default();
        let ids: Vec<ElementId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        let edges = ids.iter().map(|id| (*id, store.containment(*id))).collect();
        Self {
            present: seen,
            ids,
            edges,
        }
    }

    fn edges(&self, id: ElementId) -> Option<&Containment> {
        self.edges.get(&id)
    }

    /// Order elements by containment depth, performing at most `max_passes` passes
    pub fn order(&self, max_passes: usize) -> StructureOrder {
        let mut placed: Vec<ElementId> = Vec::with_capacity(self.ids.len());
        let mut dependents: Vec<ElementId> = Vec::new();

        for id in &self.ids {
            let has_parent = self
                .edges(*id)
                .map(|e| e.has_parent_in(|p| self.present.contains(&p)))
                .unwrap_or(false);
            if has_parent {
                dependents.push(*id);
            } else {
                placed.push(*id);
            }
        }

        let mut waiting: FxHashSet<ElementId> = dependents.iter().copied().collect();
        let mut passes = 0;
        let mut frontier_start = 0;

        while !waiting.is_empty() && passes < max_passes {
            passes += 1;
            let frontier_end = placed.len();
            let mut reached = Vec::new();
            for parent in &placed[frontier_start..frontier_end] {
                if let Some(edges) = self.edges(*parent) {
                    for child in &edges.children {
                        if waiting.remove(child) {
                            reached.push(*child);
                        }
                    }
                }
            }
            if reached.is_empty() {
                // Nothing left is reachable from a placed element
                break;
            }
            frontier_start = frontier_end;
            placed.extend(reached);
        }

        let unreached: Vec<ElementId> = dependents
            .into_iter()
            .filter(|id| waiting.contains(id))
            .collect();
        if !unreached.is_empty() {
            log::warn!(
                "{} element(s) not reached after {} hierarchy pass(es), appending as roots: {:?}",
                unreached.len(),
                passes,
                unreached
            );
        }
        placed.extend(unreached.iter().copied());

        StructureOrder {
            order: placed,
            unreached,
            passes,
        }
    }

    /// Attach each ordered element under its first already-placed parent
    ///
    /// Parents are tried in host order. An element is attached exactly once.
    /// Unreached elements become top-level rows, so no branch is deeper than
    /// the pass bound plus one.
    pub fn place(&self, order: &StructureOrder) -> Vec<Placement> {
        let forced: FxHashSet<ElementId> = order.unreached.iter().copied().collect();
        let mut done: FxHashSet<ElementId> = FxHashSet::default();
        let mut placements = Vec::with_capacity(order.order.len());
        for id in &order.order {
            if !done.insert(*id) {
                continue;
            }
            let parent = if forced.contains(id) {
                None
            } else {
                self.edges(*id)
                    .and_then(|e| e.first_parent_in(|p| p != *id && done.contains(&p)))
            };
            placements.push(Placement {
                element: *id,
                parent,
            });
        }
        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_document::MemoryDocument;
    use ifc_lite_model::ElementRecord;

    fn chain(doc: &mut MemoryDocument, ids: &[u32]) {
        for id in ids {
            doc.add(ElementRecord::new(ElementId(*id), format!("E{}", id), "Part"));
        }
        for pair in ids.windows(2) {
            doc.contain(ElementId(pair[0]), ElementId(pair[1]));
        }
    }

    fn parent_of(placements: &[Placement], id: u32) -> Option<ElementId> {
        placements
            .iter()
            .find(|p| p.element == ElementId(id))
            .and_then(|p| p.parent)
    }

    #[test]
    fn test_chain_ordered_regardless_of_input_order() {
        let mut doc = MemoryDocument::new("Test");
        chain(&mut doc, &[1, 2, 3]);
        let input = [ElementId(3), ElementId(2), ElementId(1)];

        let builder = StructureBuilder::new(&input, &doc);
        let result = builder.order(10);
        assert_eq!(result.order, vec![ElementId(1), ElementId(2), ElementId(3)]);
        assert!(result.unreached.is_empty());

        let placements = builder.place(&result);
        assert_eq!(parent_of(&placements, 1), None);
        assert_eq!(parent_of(&placements, 2), Some(ElementId(1)));
        assert_eq!(parent_of(&placements, 3), Some(ElementId(2)));
    }

    #[test]
    fn test_cycle_terminates_and_places_all() {
        let mut doc = MemoryDocument::new("Test");
        chain(&mut doc, &[1, 2, 3]);
        doc.contain(ElementId(3), ElementId(1));
        let input = [ElementId(1), ElementId(2), ElementId(3)];

        let builder = StructureBuilder::new(&input, &doc);
        let result = builder.order(10);
        assert_eq!(result.unreached, input.to_vec());
        assert_eq!(result.order.len(), 3);

        let placements = builder.place(&result);
        assert_eq!(placements.len(), 3);
        assert!(placements.iter().all(|p| p.parent.is_none()));
    }

    #[test]
    fn test_depth_bound_appends_remaining() {
        let mut doc = MemoryDocument::new("Test");
        let ids: Vec<u32> = (1..=13).collect();
        chain(&mut doc, &ids);
        let input: Vec<ElementId> = ids.iter().map(|i| ElementId(*i)).collect();

        let builder = StructureBuilder::new(&input, &doc);
        let result = builder.order(10);
        assert_eq!(result.passes, 10);
        assert_eq!(result.unreached, vec![ElementId(12), ElementId(13)]);
        assert_eq!(result.order.len(), 13);

        let placements = builder.place(&result);
        assert_eq!(parent_of(&placements, 11), Some(ElementId(10)));
        assert_eq!(parent_of(&placements, 12), None);
        assert_eq!(parent_of(&placements, 13), None);
    }

    #[test]
    fn test_long_chain_depth_is_bounded() {
        let mut doc = MemoryDocument::new("Test");
        let ids: Vec<u32> = (1..=5000).collect();
        chain(&mut doc, &ids);
        let input: Vec<ElementId> = ids.iter().map(|i| ElementId(*i)).collect();

        let builder = StructureBuilder::new(&input, &doc);
        let result = builder.order(10);
        assert_eq!(result.order.len(), 5000);
        assert_eq!(result.unreached.len(), 5000 - 11);

        let placements = builder.place(&result);
        let parents: FxHashMap<ElementId, Option<ElementId>> =
            placements.iter().map(|p| (p.element, p.parent)).collect();
        let deepest = placements
            .iter()
            .map(|p| {
                let mut depth = 0;
                let mut cursor = p.parent;
                while let Some(parent) = cursor {
                    depth += 1;
                    cursor = parents[&parent];
                }
                depth
            })
            .max();
        assert_eq!(deepest, Some(10));
    }

    #[test]
    fn test_parent_outside_input_makes_root() {
        let mut doc = MemoryDocument::new("Test");
        chain(&mut doc, &[1, 2]);
        let input = [ElementId(2)];

        let builder = StructureBuilder::new(&input, &doc);
        let result = builder.order(10);
        assert_eq!(result.order, vec![ElementId(2)]);
        assert_eq!(builder.place(&result)[0].parent, None);
    }

    #[test]
    fn test_first_parent_in_host_order_wins() {
        let mut doc = MemoryDocument::new("Test");
        for id in [1, 2, 3] {
            doc.add(ElementRecord::new(ElementId(id), format!("E{}", id), "Part"));
        }
        doc.contain(ElementId(2), ElementId(3));
        doc.contain(ElementId(1), ElementId(3));
        let input = [ElementId(1), ElementId(2), ElementId(3)];

        let builder = StructureBuilder::new(&input, &doc);
        let result = builder.order(10);
        let placements = builder.place(&result);
        assert_eq!(parent_of(&placements, 3), Some(ElementId(2)));
    }

    #[test]
    fn test_duplicate_input_placed_once() {
        let mut doc = MemoryDocument::new("Test");
        chain(&mut doc, &[1, 2]);
        let input = [ElementId(1), ElementId(2), ElementId(1)];

        let builder = StructureBuilder::new(&input, &doc);
        let result = builder.order(10);
        assert_eq!(result.order, vec![ElementId(1), ElementId(2)]);
    }
}
