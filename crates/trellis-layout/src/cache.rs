//! Per-node computed geometry and its validity contract.
//!
//! The cache holds one slot per arena node, written only by the placement
//! driver (or, for delegate children, by an external sub-layout engine via
//! [`LayoutCache::place_relative`]). Slots are stamped with the tree
//! generation of the pass that wrote them; reading a slot that was not
//! placed by a completed pass for the current generation is a fatal
//! stale-read error, never silently served.

use trellis_core::{LayoutError, NodeId, Tree};

use crate::geometry::Bounds;

/// Coordinate space of a cached rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordSpace {
    /// Absolute coordinates, written by the placement driver
    #[default]
    Absolute,
    /// Relative to the node's layout parent, written by an external
    /// sub-layout engine (table, grid, flowchart); consumers must apply the
    /// parent offset themselves
    ParentRelative,
}

/// Computed geometry for one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedLayout {
    pub bounds: Bounds,
    pub space: CoordSpace,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    layout: ComputedLayout,
    placed: bool,
}

/// Geometry cache for one component tree, mutated in place on every pass.
#[derive(Debug, Default)]
pub struct LayoutCache {
    slots: Vec<Slot>,
    generation: u64,
    complete: bool,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all slots for a fresh pass over `tree`. Every slot becomes
    /// unplaced and stays invalid until the pass completes.
    pub(crate) fn begin_pass(&mut self, tree: &Tree) {
        self.slots.clear();
        self.slots.resize(tree.len(), Slot::default());
        self.generation = tree.generation();
        self.complete = false;
    }

    pub(crate) fn finish_pass(&mut self) {
        self.complete = true;
    }

    /// Write a node's absolute rect. Negative extents are clamped to zero.
    pub(crate) fn place(&mut self, id: NodeId, bounds: Bounds) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            debug_assert!(!slot.placed, "node placed twice in one pass");
            slot.layout = ComputedLayout {
                bounds: clamp_extents(bounds),
                space: CoordSpace::Absolute,
            };
            slot.placed = true;
        }
    }

    /// Write a parent-relative rect for a node governed by an external
    /// sub-layout engine. The rect is tagged [`CoordSpace::ParentRelative`]
    /// so downstream consumers do not reinterpret it as absolute.
    ///
    /// Fails if the cache was not built for the tree's current generation:
    /// the sub-layout engine is writing against stale geometry and the whole
    /// pass must be rerun first.
    pub fn place_relative(
        &mut self,
        tree: &Tree,
        id: NodeId,
        bounds: Bounds,
    ) -> Result<(), LayoutError> {
        if id.index() >= tree.len() {
            return Err(LayoutError::UnknownNode { node: id });
        }
        if self.generation != tree.generation() || id.index() >= self.slots.len() {
            return Err(LayoutError::StaleLayout { node: id });
        }
        let slot = &mut self.slots[id.index()];
        slot.layout = ComputedLayout {
            bounds: clamp_extents(bounds),
            space: CoordSpace::ParentRelative,
        };
        slot.placed = true;
        Ok(())
    }

    /// Read a node's computed geometry.
    ///
    /// Errors with [`LayoutError::StaleLayout`] unless a completed pass for
    /// the tree's current generation placed this exact node.
    pub fn get(&self, tree: &Tree, id: NodeId) -> Result<&ComputedLayout, LayoutError> {
        if id.index() >= tree.len() {
            return Err(LayoutError::UnknownNode { node: id });
        }
        let slot = self
            .slots
            .get(id.index())
            .filter(|slot| slot.placed && self.complete && self.generation == tree.generation())
            .ok_or(LayoutError::StaleLayout { node: id })?;
        Ok(&slot.layout)
    }

    /// Whether a node has valid geometry for the tree's current generation.
    pub fn is_valid(&self, tree: &Tree, id: NodeId) -> bool {
        self.get(tree, id).is_ok()
    }

    /// Paint order for a container's children: visible children with placed
    /// geometry, sorted by ascending z-index with ties keeping declaration
    /// order. `lifted` names one child to paint last regardless of z-index
    /// (the drag-interaction override); it affects paint timing only, never
    /// geometry.
    pub fn paint_order(
        &self,
        tree: &Tree,
        container: NodeId,
        lifted: Option<NodeId>,
    ) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = tree
            .children(container)
            .iter()
            .copied()
            .filter(|&child| {
                tree[child].style.visible
                    && self
                        .slots
                        .get(child.index())
                        .is_some_and(|slot| slot.placed)
            })
            .collect();
        order.sort_by_key(|&child| tree[child].style.z_index);
        if let Some(lifted) = lifted {
            if let Some(index) = order.iter().position(|&child| child == lifted) {
                let node = order.remove(index);
                order.push(node);
            }
        }
        order
    }

    /// Find the topmost node containing the given absolute point, starting
    /// at `root`. Children are tested in reverse paint order so higher
    /// z-indices win. Subtrees with parent-relative geometry (delegate
    /// children) are skipped; their owning engine resolves hits internally.
    pub fn hit_test(&self, tree: &Tree, root: NodeId, x: f64, y: f64) -> Option<NodeId> {
        if !self.complete || self.generation != tree.generation() {
            return None;
        }
        let slot = self.slots.get(root.index())?;
        if !slot.placed || slot.layout.space != CoordSpace::Absolute {
            return None;
        }
        if !tree[root].style.visible || !slot.layout.bounds.contains(x, y) {
            return None;
        }

        for child in self.paint_order(tree, root, None).into_iter().rev() {
            if let Some(hit) = self.hit_test(tree, child, x, y) {
                return Some(hit);
            }
        }

        Some(root)
    }
}

fn clamp_extents(bounds: Bounds) -> Bounds {
    Bounds {
        x: bounds.x,
        y: bounds.y,
        width: bounds.width.max(0.0),
        height: bounds.height.max(0.0),
    }
}
