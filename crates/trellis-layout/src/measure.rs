//! The measurement pass: bottom-up intrinsic sizing.
//!
//! [`measure_node`] computes a node's intrinsic size given the available
//! space, without writing any geometry. Explicit dimensions short-circuit;
//! `Auto` leaves delegate to the injected [`ContentMeasure`] capability;
//! `Auto` containers combine their in-flow children recursively.

use indexmap::IndexMap;

use trellis_core::{Alignment, Component, LeafKind, NodeId, NodeKind, Tree};

use crate::geometry::{Axis, Size};
use crate::text::measure_text;

/// Space offered to a node during measurement. `None` on an axis means the
/// axis is unresolved (an ancestor is itself auto-sized there); percentages
/// against an unresolved axis degenerate to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Available {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Available {
    /// Both axes resolved.
    pub fn definite(width: f64, height: f64) -> Self {
        Self {
            width: Some(width.max(0.0)),
            height: Some(height.max(0.0)),
        }
    }

    /// Neither axis resolved.
    pub fn none() -> Self {
        Self::default()
    }

    fn axis(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Shrink both axes by the given padding sums, keeping unresolved axes
    /// unresolved.
    fn inset(&self, horizontal: f64, vertical: f64) -> Self {
        Self {
            width: self.width.map(|w| (w - horizontal).max(0.0)),
            height: self.height.map(|h| (h - vertical).max(0.0)),
        }
    }
}

/// Content-measurement capability for leaf nodes.
///
/// Implementations are pure and stateless: given a leaf component and an
/// optional wrapping width, return its intrinsic size. The engine holds a
/// reference to one of these and never second-guesses the result.
pub trait ContentMeasure {
    fn measure(&self, component: &Component, max_width: Option<f64>) -> Size;
}

/// Default measurer backed by character-count text estimation and fixed
/// control sizes. Suitable for tests and headless layout; renderers with
/// real font metrics should supply their own [`ContentMeasure`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasure;

/// Chrome added around a button label, per side.
const BUTTON_PADDING_H: f64 = 16.0;
const BUTTON_PADDING_V: f64 = 8.0;

/// Default control size for inputs.
const INPUT_WIDTH: f64 = 200.0;
const INPUT_HEIGHT: f64 = 24.0;

impl ContentMeasure for HeuristicMeasure {
    fn measure(&self, component: &Component, max_width: Option<f64>) -> Size {
        let NodeKind::Leaf(kind) = component.kind else {
            return Size::ZERO;
        };
        let style = &component.style;
        let text = component.text.as_deref().unwrap_or("");

        match kind {
            LeafKind::Text => {
                let metrics = measure_text(text, style.font_size, max_width);
                Size::new(metrics.width, metrics.height)
            }
            LeafKind::Button | LeafKind::Checkbox => {
                let metrics = measure_text(text, style.font_size, None);
                Size::new(
                    metrics.width + BUTTON_PADDING_H * 2.0 + style.padding.horizontal(),
                    metrics.height + BUTTON_PADDING_V * 2.0 + style.padding.vertical(),
                )
            }
            LeafKind::Input => Size::new(
                INPUT_WIDTH + style.padding.horizontal(),
                INPUT_HEIGHT + style.padding.vertical(),
            ),
            LeafKind::Image | LeafKind::Custom(_) => Size::ZERO,
        }
    }
}

/// Measurer that dispatches [`LeafKind::Custom`] leaves to registered
/// capabilities and everything else to a fallback, so new leaf kinds can be
/// added without touching the layout passes.
#[derive(Default)]
pub struct MeasureRegistry {
    custom: IndexMap<u16, Box<dyn ContentMeasure>>,
    fallback: HeuristicMeasure,
}

impl MeasureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a measurer for a custom leaf kind, replacing any previous
    /// registration for the same id.
    pub fn register(&mut self, kind_id: u16, measurer: Box<dyn ContentMeasure>) {
        self.custom.insert(kind_id, measurer);
    }
}

impl ContentMeasure for MeasureRegistry {
    fn measure(&self, component: &Component, max_width: Option<f64>) -> Size {
        if let NodeKind::Leaf(LeafKind::Custom(id)) = component.kind {
            if let Some(measurer) = self.custom.get(&id) {
                return measurer.measure(component, max_width);
            }
        }
        self.fallback.measure(component, max_width)
    }
}

/// The main axis of a container node.
pub(crate) fn main_axis(component: &Component) -> Axis {
    match component.kind {
        NodeKind::Row => Axis::Horizontal,
        NodeKind::Column => Axis::Vertical,
        _ => match component.style.direction {
            trellis_core::Direction::Horizontal => Axis::Horizontal,
            trellis_core::Direction::Vertical => Axis::Vertical,
        },
    }
}

/// Compute a node's intrinsic size. Pure: no geometry is written.
pub(crate) fn measure_node(
    tree: &Tree,
    id: NodeId,
    available: Available,
    measurer: &dyn ContentMeasure,
) -> Size {
    let node = &tree[id];
    let style = &node.style;

    let explicit_width = style.width.resolve(available.width);
    let explicit_height = style.height.resolve(available.height);

    let (width, height) = match (explicit_width, explicit_height) {
        (Some(width), Some(height)) => (width, height),
        _ => {
            // Children measure against the container's resolved extent where
            // one exists, not the raw space offered to the container.
            let offered = Available {
                width: explicit_width.or(available.width),
                height: explicit_height.or(available.height),
            };
            let intrinsic = intrinsic_size(tree, id, offered, measurer);
            (
                explicit_width.unwrap_or(intrinsic.width),
                explicit_height.unwrap_or(intrinsic.height),
            )
        }
    };

    let width = clamp_axis(
        width,
        style.min_width.resolve(available.width),
        style.max_width.resolve(available.width),
    );
    let height = clamp_axis(
        height,
        style.min_height.resolve(available.height),
        style.max_height.resolve(available.height),
    );

    Size::new(width.max(0.0), height.max(0.0))
}

fn clamp_axis(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let value = match max {
        Some(max) => value.min(max),
        None => value,
    };
    match min {
        Some(min) => value.max(min),
        None => value,
    }
}

fn intrinsic_size(
    tree: &Tree,
    id: NodeId,
    available: Available,
    measurer: &dyn ContentMeasure,
) -> Size {
    let node = &tree[id];

    match node.kind {
        NodeKind::Leaf(_) => measurer.measure(node, available.width),
        NodeKind::Center => center_intrinsic(tree, id, available, measurer),
        NodeKind::Box | NodeKind::Row | NodeKind::Column | NodeKind::Delegate(_) => {
            container_intrinsic(tree, id, available, measurer)
        }
    }
}

/// A center container fills the space it is offered, so it always has room
/// to center its child; only under an unresolved axis does it shrink to the
/// child plus padding.
fn center_intrinsic(
    tree: &Tree,
    id: NodeId,
    available: Available,
    measurer: &dyn ContentMeasure,
) -> Size {
    let node = &tree[id];
    let padding = node.style.padding;
    let content_available = available.inset(padding.horizontal(), padding.vertical());

    let child_size = tree
        .children(id)
        .iter()
        .copied()
        .find(|&child| {
            let child = &tree[child];
            child.style.visible && child.style.position.is_static()
        })
        .map(|child| measure_node(tree, child, content_available, measurer))
        .unwrap_or(Size::ZERO);

    Size::new(
        available
            .width
            .unwrap_or(child_size.width + padding.horizontal()),
        available
            .height
            .unwrap_or(child_size.height + padding.vertical()),
    )
}

/// Row/column combine: main = sum of child main sizes plus gaps, cross = max
/// of child cross sizes, both plus padding and the children's margins.
///
/// Exception: a container whose cross-axis alignment is not `Start` measures
/// to the full available cross size, because it will need that space to
/// center or stretch its children.
fn container_intrinsic(
    tree: &Tree,
    id: NodeId,
    available: Available,
    measurer: &dyn ContentMeasure,
) -> Size {
    let node = &tree[id];
    let style = &node.style;
    let axis = main_axis(node);
    let padding = style.padding;
    let gap = style.gap.max(0.0);
    let content_available = available.inset(padding.horizontal(), padding.vertical());

    let mut main_sum = 0.0;
    let mut cross_max: f64 = 0.0;
    let mut in_flow_count = 0usize;

    for &child_id in tree.children(id) {
        let child = &tree[child_id];
        if !child.style.visible || !child.style.position.is_static() {
            continue;
        }

        let child_size = measure_node(tree, child_id, content_available, measurer);
        let margin = child.style.margin;
        let (main_margin, cross_margin) = match axis {
            Axis::Horizontal => (margin.horizontal(), margin.vertical()),
            Axis::Vertical => (margin.vertical(), margin.horizontal()),
        };

        main_sum += axis.main(child_size) + main_margin;
        cross_max = cross_max.max(axis.cross(child_size) + cross_margin);
        in_flow_count += 1;
    }

    if in_flow_count > 1 {
        main_sum += gap * (in_flow_count - 1) as f64;
    }

    let (padding_main, padding_cross) = match axis {
        Axis::Horizontal => (padding.horizontal(), padding.vertical()),
        Axis::Vertical => (padding.vertical(), padding.horizontal()),
    };

    let main = main_sum + padding_main;
    let mut cross = cross_max + padding_cross;

    // A container that centers or stretches its children needs the full
    // cross extent to distribute; max-of-children would leave it no
    // alignment space at all.
    if style.align != Alignment::Start {
        if let Some(available_cross) = content_available.axis(cross_axis(axis)) {
            cross = available_cross + padding_cross;
        }
    }

    axis.pack(main, cross)
}

fn cross_axis(axis: Axis) -> Axis {
    match axis {
        Axis::Horizontal => Axis::Vertical,
        Axis::Vertical => Axis::Horizontal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{Component, Dimension, Spacing, Style};

    fn style() -> Style {
        Style::default()
    }

    #[test]
    fn test_explicit_pixels_win() {
        let tree = Tree::new(
            Component::text("some text").with_style(
                style()
                    .with_width(Dimension::Pixels(120.0))
                    .with_height(Dimension::Pixels(40.0)),
            ),
        );
        let size = measure_node(
            &tree,
            tree.root(),
            Available::definite(800.0, 600.0),
            &HeuristicMeasure,
        );
        assert!((size.width - 120.0).abs() < 0.001);
        assert!((size.height - 40.0).abs() < 0.001);
    }

    #[test]
    fn test_percent_against_unresolved_is_zero() {
        let tree = Tree::new(
            Component::boxed().with_style(style().with_width(Dimension::Percent(50.0))),
        );
        let size = measure_node(&tree, tree.root(), Available::none(), &HeuristicMeasure);
        assert!(size.width.abs() < 0.001);
    }

    #[test]
    fn test_row_combines_sum_and_max() {
        let mut tree = Tree::new(Component::row().with_style(style().with_gap(10.0)));
        let root = tree.root();
        for height in [30.0, 50.0] {
            tree.push_child(
                root,
                Component::boxed().with_style(
                    style()
                        .with_width(Dimension::Pixels(40.0))
                        .with_height(Dimension::Pixels(height)),
                ),
            );
        }
        let size = measure_node(&tree, root, Available::definite(800.0, 600.0), &HeuristicMeasure);
        // 40 + 10 + 40 wide, max(30, 50) tall.
        assert!((size.width - 90.0).abs() < 0.001);
        assert!((size.height - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_padding_and_margins_included() {
        let mut tree = Tree::new(
            Component::column().with_style(style().with_padding(Spacing::uniform(5.0))),
        );
        let root = tree.root();
        tree.push_child(
            root,
            Component::boxed().with_style(
                style()
                    .with_width(Dimension::Pixels(20.0))
                    .with_height(Dimension::Pixels(20.0))
                    .with_margin(Spacing::uniform(3.0)),
            ),
        );
        let size = measure_node(&tree, root, Available::definite(800.0, 600.0), &HeuristicMeasure);
        assert!((size.width - 36.0).abs() < 0.001); // 20 + margins 6 + padding 10
        assert!((size.height - 36.0).abs() < 0.001);
    }

    #[test]
    fn test_non_start_alignment_takes_full_cross() {
        let mut tree = Tree::new(
            Component::row().with_style(style().with_align(Alignment::Center)),
        );
        let root = tree.root();
        tree.push_child(
            root,
            Component::boxed().with_style(
                style()
                    .with_width(Dimension::Pixels(10.0))
                    .with_height(Dimension::Pixels(10.0)),
            ),
        );
        let size = measure_node(&tree, root, Available::definite(800.0, 600.0), &HeuristicMeasure);
        // Cross axis (height) expands to the full available space so the
        // container has room to center its child.
        assert!((size.height - 600.0).abs() < 0.001);
    }

    #[test]
    fn test_min_max_clamp() {
        let tree = Tree::new(
            Component::boxed().with_style(
                style()
                    .with_width(Dimension::Pixels(500.0))
                    .with_max_width(Dimension::Pixels(300.0))
                    .with_height(Dimension::Pixels(10.0))
                    .with_min_height(Dimension::Pixels(50.0)),
            ),
        );
        let size = measure_node(&tree, tree.root(), Available::definite(800.0, 600.0), &HeuristicMeasure);
        assert!((size.width - 300.0).abs() < 0.001);
        assert!((size.height - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_registry_dispatches_custom_kind() {
        struct Fixed;
        impl ContentMeasure for Fixed {
            fn measure(&self, _component: &Component, _max_width: Option<f64>) -> Size {
                Size::new(77.0, 11.0)
            }
        }

        let mut registry = MeasureRegistry::new();
        registry.register(7, Box::new(Fixed));

        let tree = Tree::new(Component::new(NodeKind::Leaf(LeafKind::Custom(7))));
        let size = measure_node(&tree, tree.root(), Available::none(), &registry);
        assert!((size.width - 77.0).abs() < 0.001);

        // Unregistered custom kinds fall back to zero.
        let other = Tree::new(Component::new(NodeKind::Leaf(LeafKind::Custom(9))));
        let size = measure_node(&other, other.root(), Available::none(), &registry);
        assert!(size.width.abs() < 0.001);
    }
}
