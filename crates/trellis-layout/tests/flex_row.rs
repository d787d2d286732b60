//! Main-axis distribution scenarios for row containers.

use trellis_core::{Alignment, Component, Dimension, Style, Tree};
use trellis_layout::{HeuristicMeasure, LayoutCache, LayoutEngine};

fn fixed(width: f64, height: f64) -> Style {
    Style::default()
        .with_width(Dimension::Pixels(width))
        .with_height(Dimension::Pixels(height))
}

fn layout(tree: &Tree) -> LayoutCache {
    let mut cache = LayoutCache::new();
    LayoutEngine::new(&HeuristicMeasure)
        .compute(tree, &mut cache)
        .unwrap();
    cache
}

fn child_xs(tree: &Tree, cache: &LayoutCache) -> Vec<f64> {
    tree.children(tree.root())
        .iter()
        .map(|&child| cache.get(tree, child).unwrap().bounds.x)
        .collect()
}

#[test]
fn row_packs_children_with_gap() {
    let mut tree = Tree::new(Component::row().with_style(fixed(300.0, 100.0).with_gap(10.0)));
    for _ in 0..3 {
        tree.push_child(tree.root(), Component::boxed().with_style(fixed(50.0, 50.0)));
    }
    let cache = layout(&tree);
    assert_eq!(child_xs(&tree, &cache), vec![0.0, 60.0, 120.0]);
}

#[test]
fn row_space_between_distributes_leftover() {
    let mut tree = Tree::new(
        Component::row().with_style(fixed(300.0, 100.0).with_justify(Alignment::SpaceBetween)),
    );
    for _ in 0..3 {
        tree.push_child(tree.root(), Component::boxed().with_style(fixed(50.0, 50.0)));
    }
    let cache = layout(&tree);
    // extra = 300 - 150 = 150, effective gap = 75.
    assert_eq!(child_xs(&tree, &cache), vec![0.0, 125.0, 250.0]);
}

#[test]
fn row_grow_splits_remaining_proportionally() {
    let mut tree = Tree::new(Component::row().with_style(fixed(300.0, 100.0)));
    tree.push_child(
        tree.root(),
        Component::boxed().with_style(fixed(50.0, 50.0).with_grow(1.0)),
    );
    tree.push_child(
        tree.root(),
        Component::boxed().with_style(fixed(50.0, 50.0).with_grow(3.0)),
    );
    let cache = layout(&tree);

    let widths: Vec<f64> = tree
        .children(tree.root())
        .iter()
        .map(|&child| cache.get(&tree, child).unwrap().bounds.width)
        .collect();
    // remaining = 200, split 1:3 on top of the measured 50s.
    assert_eq!(widths, vec![100.0, 200.0]);
}

#[test]
fn row_justify_center_and_end() {
    for (justify, expected_first_x) in [(Alignment::Center, 100.0), (Alignment::End, 200.0)] {
        let mut tree =
            Tree::new(Component::row().with_style(fixed(300.0, 100.0).with_justify(justify)));
        tree.push_child(tree.root(), Component::boxed().with_style(fixed(100.0, 50.0)));
        let cache = layout(&tree);
        let x = cache
            .get(&tree, tree.children(tree.root())[0])
            .unwrap()
            .bounds
            .x;
        assert!(
            (x - expected_first_x).abs() < 0.001,
            "justify {justify:?}: expected x {expected_first_x}, got {x}"
        );
    }
}

#[test]
fn row_overflow_keeps_children_at_content_start() {
    for justify in [
        Alignment::Start,
        Alignment::Center,
        Alignment::End,
        Alignment::SpaceBetween,
        Alignment::SpaceAround,
        Alignment::SpaceEvenly,
    ] {
        let mut tree =
            Tree::new(Component::row().with_style(fixed(100.0, 50.0).with_justify(justify)));
        tree.push_child(tree.root(), Component::boxed().with_style(fixed(120.0, 40.0)));
        tree.push_child(tree.root(), Component::boxed().with_style(fixed(120.0, 40.0)));
        let cache = layout(&tree);
        let first_x = cache
            .get(&tree, tree.children(tree.root())[0])
            .unwrap()
            .bounds
            .x;
        assert!(
            first_x.abs() < 0.001,
            "justify {justify:?} moved an overflowing child to {first_x}"
        );
    }
}
