//! The placement driver: one full top-down pass over the component tree.
//!
//! Per node and per pass, a cache slot moves from unplaced, through
//! measurement of the node's children, to placed; placing writes the node's
//! absolute rect and recursion hands each child its own rect. The pass is
//! single-threaded, synchronous, and purely recursive; it must run to
//! completion before any cached geometry is valid, and the caller must
//! serialize tree mutation against passes.
//!
//! Special cases handled here rather than in distribution:
//! - containers whose children are all absolutely positioned skip
//!   distribution entirely,
//! - `Center` containers ignore justify/align and center their child on both
//!   axes,
//! - `Delegate` containers are sized but never recursed into (an external
//!   sub-layout engine owns their children),
//! - invisible subtrees are skipped and their slots left unplaced.

use smallvec::SmallVec;
use trellis_core::{Component, LayoutError, LeafKind, NodeId, NodeKind, Position, Tree};

use crate::cache::LayoutCache;
use crate::flex::{distribute, FlexItem};
use crate::geometry::{Axis, Bounds, Size};
use crate::measure::{main_axis, measure_node, Available, ContentMeasure};

/// Options for layout computation.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Default width for the root viewport
    pub viewport_width: f64,
    /// Default height for the root viewport
    pub viewport_height: f64,
    /// Emit per-node trace logging through the `log` facade
    pub trace: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            trace: false,
        }
    }
}

/// The layout engine: holds the content-measurement capability and the pass
/// configuration, and runs placement passes over component trees.
pub struct LayoutEngine<'m> {
    measurer: &'m dyn ContentMeasure,
    options: LayoutOptions,
}

impl<'m> LayoutEngine<'m> {
    /// Create an engine with default options.
    pub fn new(measurer: &'m dyn ContentMeasure) -> Self {
        Self {
            measurer,
            options: LayoutOptions::default(),
        }
    }

    /// Set the pass options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Run a full pass with the configured viewport at the origin.
    pub fn compute(&self, tree: &Tree, cache: &mut LayoutCache) -> Result<(), LayoutError> {
        let viewport = Bounds::new(
            0.0,
            0.0,
            self.options.viewport_width,
            self.options.viewport_height,
        );
        self.compute_in(tree, cache, viewport)
    }

    /// Run a full pass rooted at the tree root with an explicit available
    /// rect. On error the cache is left incomplete and every read of it
    /// reports staleness; the caller may retry the whole pass.
    pub fn compute_in(
        &self,
        tree: &Tree,
        cache: &mut LayoutCache,
        viewport: Bounds,
    ) -> Result<(), LayoutError> {
        cache.begin_pass(tree);

        let root = tree.root();
        let root_node = &tree[root];
        let available = Available::definite(viewport.width, viewport.height);
        let measured = measure_node(tree, root, available, self.measurer);

        // An auto-sized root is clamped to the viewport; explicit dimensions
        // are taken as given even when they overflow it.
        let width = if root_node.style.width.is_auto() {
            measured.width.min(viewport.width.max(0.0))
        } else {
            measured.width
        };
        let height = if root_node.style.height.is_auto() {
            measured.height.min(viewport.height.max(0.0))
        } else {
            measured.height
        };

        self.place_node(
            tree,
            cache,
            root,
            Bounds::new(viewport.x, viewport.y, width, height),
        )?;

        cache.finish_pass();
        Ok(())
    }

    /// Place one node at its final rect and recurse into its children.
    fn place_node(
        &self,
        tree: &Tree,
        cache: &mut LayoutCache,
        id: NodeId,
        rect: Bounds,
    ) -> Result<(), LayoutError> {
        let node = &tree[id];
        let rect = Bounds::new(rect.x, rect.y, rect.width.max(0.0), rect.height.max(0.0));
        cache.place(id, rect);

        if self.options.trace {
            log::trace!(
                "placed {:?} ({:?}) at {:.1},{:.1} {:.1}x{:.1}",
                id,
                node.kind,
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );
        }

        match node.kind {
            // Leaves terminate recursion with the parent-assigned rect.
            NodeKind::Leaf(_) => return Ok(()),
            // Delegate children belong to an external sub-layout engine that
            // writes parent-relative coordinates; recursing here would
            // corrupt them.
            NodeKind::Delegate(_) => return Ok(()),
            _ => {}
        }

        let padding = node.style.padding;
        let content = Bounds::new(
            rect.x + padding.left,
            rect.y + padding.top,
            (rect.width - padding.horizontal()).max(0.0),
            (rect.height - padding.vertical()).max(0.0),
        );

        let mut in_flow: SmallVec<[NodeId; 8]> = SmallVec::new();
        let mut absolute: SmallVec<[NodeId; 4]> = SmallVec::new();
        for &child in tree.children(id) {
            let child_style = &tree[child].style;
            if !child_style.visible {
                continue;
            }
            match child_style.position {
                Position::Static => in_flow.push(child),
                Position::Absolute { .. } => absolute.push(child),
            }
        }

        if node.kind == NodeKind::Center {
            self.place_centered(tree, cache, &in_flow, content)?;
        } else if !in_flow.is_empty() {
            self.place_flowed(tree, cache, node, &in_flow, content)?;
        }
        // A container with only absolute children never runs distribution.

        for &child in &absolute {
            self.place_absolute(tree, cache, child, content)?;
        }

        Ok(())
    }

    /// Center each child on both axes within the content rect, falling back
    /// to the content origin when the child overflows an axis. A center
    /// container is expected to hold a single child; extras are centered
    /// independently.
    fn place_centered(
        &self,
        tree: &Tree,
        cache: &mut LayoutCache,
        children: &[NodeId],
        content: Bounds,
    ) -> Result<(), LayoutError> {
        for &child in children {
            let size = measure_node(
                tree,
                child,
                Available::definite(content.width, content.height),
                self.measurer,
            );
            let x = content.x + ((content.width - size.width) / 2.0).max(0.0);
            let y = content.y + ((content.height - size.height) / 2.0).max(0.0);
            self.place_node(tree, cache, child, Bounds::new(x, y, size.width, size.height))?;
        }
        Ok(())
    }

    /// Measure, distribute, and place the in-flow children of a flex
    /// container.
    fn place_flowed(
        &self,
        tree: &Tree,
        cache: &mut LayoutCache,
        node: &Component,
        children: &[NodeId],
        content: Bounds,
    ) -> Result<(), LayoutError> {
        let axis = main_axis(node);
        let style = &node.style;
        let available = Available::definite(content.width, content.height);
        let content_size = Size::new(content.width, content.height);

        let mut items: SmallVec<[FlexItem; 8]> = SmallVec::new();
        items
            .try_reserve(children.len())
            .map_err(|_| LayoutError::ScratchAlloc {
                children: children.len(),
            })?;

        for &child_id in children {
            let child = &tree[child_id];
            let measured = measure_node(tree, child_id, available, self.measurer);
            let margin = child.style.margin;

            let (main_margin_start, main_margin_sum, cross_margin_start, cross_margin_sum) =
                match axis {
                    Axis::Horizontal => (
                        margin.left,
                        margin.horizontal(),
                        margin.top,
                        margin.vertical(),
                    ),
                    Axis::Vertical => (
                        margin.top,
                        margin.vertical(),
                        margin.left,
                        margin.horizontal(),
                    ),
                };

            let (min_main, max_main, cross_dim) = match axis {
                Axis::Horizontal => (
                    child.style.min_width,
                    child.style.max_width,
                    child.style.height,
                ),
                Axis::Vertical => (
                    child.style.min_height,
                    child.style.max_height,
                    child.style.width,
                ),
            };
            let main_available = Some(axis.main(content_size));

            items.push(FlexItem {
                main: axis.main(measured),
                cross: axis.cross(measured),
                main_margin_start,
                main_margin_sum,
                cross_margin_start,
                cross_margin_sum,
                grow: child.style.grow.max(0.0),
                shrink: child.style.shrink.max(0.0),
                min_main: min_main.resolve(main_available).unwrap_or(0.0),
                max_main: max_main.resolve(main_available).unwrap_or(f64::INFINITY),
                explicit_cross: !cross_dim.is_auto(),
                stretchable: !matches!(child.kind, NodeKind::Leaf(LeafKind::Text)),
            });
        }

        let placements = distribute(
            axis.main(content_size),
            axis.cross(content_size),
            style.gap,
            style.justify,
            style.align,
            &items,
        )?;

        for (&child_id, placement) in children.iter().zip(&placements) {
            let (dx, dy) = axis.point(placement.main_offset, placement.cross_offset);
            let size = axis.pack(placement.main_size, placement.cross_size);
            self.place_node(
                tree,
                cache,
                child_id,
                Bounds::new(content.x + dx, content.y + dy, size.width, size.height),
            )?;
        }

        Ok(())
    }

    /// Place an absolutely positioned child at its declared offset from the
    /// container's content origin, sized from its own style or measurement.
    fn place_absolute(
        &self,
        tree: &Tree,
        cache: &mut LayoutCache,
        child_id: NodeId,
        content: Bounds,
    ) -> Result<(), LayoutError> {
        let child = &tree[child_id];
        let Position::Absolute { x, y } = child.style.position else {
            return Ok(());
        };
        let size = measure_node(
            tree,
            child_id,
            Available::definite(content.width, content.height),
            self.measurer,
        );
        self.place_node(
            tree,
            cache,
            child_id,
            Bounds::new(content.x + x, content.y + y, size.width, size.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::HeuristicMeasure;
    use trellis_core::{Component, Dimension, Spacing, Style};

    fn fixed(width: f64, height: f64) -> Style {
        Style::default()
            .with_width(Dimension::Pixels(width))
            .with_height(Dimension::Pixels(height))
    }

    fn layout(tree: &Tree, viewport_width: f64, viewport_height: f64) -> LayoutCache {
        let mut cache = LayoutCache::new();
        let engine = LayoutEngine::new(&HeuristicMeasure).with_options(LayoutOptions {
            viewport_width,
            viewport_height,
            trace: false,
        });
        engine.compute(tree, &mut cache).unwrap();
        cache
    }

    #[test]
    fn test_leaf_gets_parent_assigned_rect() {
        let mut tree = Tree::new(Component::column().with_style(fixed(200.0, 100.0)));
        let child = tree.push_child(tree.root(), Component::boxed().with_style(fixed(50.0, 20.0)));
        let cache = layout(&tree, 800.0, 600.0);
        let bounds = cache.get(&tree, child).unwrap().bounds;
        assert!((bounds.width - 50.0).abs() < 0.001);
        assert!((bounds.height - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_column_stacks_children() {
        let mut tree = Tree::new(Component::column().with_style(fixed(100.0, 300.0)));
        let first = tree.push_child(tree.root(), Component::boxed().with_style(fixed(50.0, 40.0)));
        let second = tree.push_child(tree.root(), Component::boxed().with_style(fixed(50.0, 40.0)));
        let cache = layout(&tree, 800.0, 600.0);
        assert!((cache.get(&tree, first).unwrap().bounds.y - 0.0).abs() < 0.001);
        assert!((cache.get(&tree, second).unwrap().bounds.y - 40.0).abs() < 0.001);
    }

    #[test]
    fn test_padding_offsets_content() {
        let mut tree = Tree::new(
            Component::column()
                .with_style(fixed(100.0, 100.0).with_padding(Spacing::uniform(10.0))),
        );
        let child = tree.push_child(tree.root(), Component::boxed().with_style(fixed(20.0, 20.0)));
        let cache = layout(&tree, 800.0, 600.0);
        let bounds = cache.get(&tree, child).unwrap().bounds;
        assert!((bounds.x - 10.0).abs() < 0.001);
        assert!((bounds.y - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_center_positions_single_child() {
        let mut tree = Tree::new(Component::center().with_style(fixed(200.0, 200.0)));
        let child = tree.push_child(tree.root(), Component::boxed().with_style(fixed(50.0, 50.0)));
        let cache = layout(&tree, 800.0, 600.0);
        let bounds = cache.get(&tree, child).unwrap().bounds;
        assert!((bounds.x - 75.0).abs() < 0.001);
        assert!((bounds.y - 75.0).abs() < 0.001);
    }

    #[test]
    fn test_center_overflow_falls_back_to_origin() {
        let mut tree = Tree::new(Component::center().with_style(fixed(100.0, 100.0)));
        let child = tree.push_child(tree.root(), Component::boxed().with_style(fixed(150.0, 150.0)));
        let cache = layout(&tree, 800.0, 600.0);
        let bounds = cache.get(&tree, child).unwrap().bounds;
        assert!((bounds.x - 0.0).abs() < 0.001);
        assert!((bounds.y - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_invisible_child_is_skipped_and_stale() {
        let mut tree = Tree::new(Component::column().with_style(fixed(100.0, 100.0)));
        let hidden = tree.push_child(
            tree.root(),
            Component::boxed().with_style(fixed(10.0, 10.0).with_visible(false)),
        );
        let cache = layout(&tree, 800.0, 600.0);
        assert!(matches!(
            cache.get(&tree, hidden),
            Err(LayoutError::StaleLayout { .. })
        ));
    }

    #[test]
    fn test_delegate_children_not_recursed() {
        let mut tree = Tree::new(Component::column().with_style(fixed(300.0, 300.0)));
        let table = tree.push_child(
            tree.root(),
            Component::new(NodeKind::Delegate(trellis_core::DelegateKind::Table))
                .with_style(fixed(200.0, 100.0)),
        );
        let cell = tree.push_child(table, Component::text("cell"));
        let cache = layout(&tree, 800.0, 600.0);

        // The delegate container itself is sized by the driver...
        assert!(cache.get(&tree, table).is_ok());
        // ...but its children wait for the external engine.
        assert!(cache.get(&tree, cell).is_err());
    }

    #[test]
    fn test_over_constrained_content_clamps_to_zero() {
        // Padding exceeds the box; the content rect must clamp, not go
        // negative.
        let mut tree = Tree::new(
            Component::column().with_style(fixed(10.0, 10.0).with_padding(Spacing::uniform(20.0))),
        );
        let child = tree.push_child(tree.root(), Component::boxed());
        let cache = layout(&tree, 800.0, 600.0);
        let bounds = cache.get(&tree, child).unwrap().bounds;
        assert!(bounds.width >= 0.0);
        assert!(bounds.height >= 0.0);
    }
}
