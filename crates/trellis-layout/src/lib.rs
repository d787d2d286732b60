//! Layout computation for Trellis component trees.
//!
//! This crate converts a tree of styled nodes into absolute geometry
//! (position + size) for every node.
//!
//! # Architecture
//!
//! 1. **Measurement pass**: bottom-up intrinsic sizing per node, driven by
//!    explicit dimensions and the injected content-measurement capability
//! 2. **Distribution pass**: flex grow/shrink over leftover main-axis space,
//!    justify and cross-axis alignment policies, gap handling
//! 3. **Placement driver**: top-down orchestration that writes the per-node
//!    geometry cache, handling absolute positioning, centering containers,
//!    and delegate sub-layouts
//!
//! # Example
//!
//! ```
//! use trellis_core::{Component, Dimension, Style};
//! use trellis_layout::{HeuristicMeasure, LayoutCache, LayoutEngine};
//!
//! let mut tree = trellis_core::Tree::new(Component::row().with_style(
//!     Style::default()
//!         .with_width(Dimension::Pixels(300.0))
//!         .with_height(Dimension::Pixels(100.0)),
//! ));
//! tree.push_child(tree.root(), Component::text("hello"));
//!
//! let engine = LayoutEngine::new(&HeuristicMeasure);
//! let mut cache = LayoutCache::new();
//! engine.compute(&tree, &mut cache)?;
//!
//! let bounds = cache.get(&tree, tree.root())?.bounds;
//! assert_eq!(bounds.width, 300.0);
//! # Ok::<(), trellis_core::LayoutError>(())
//! ```

mod cache;
mod compute;
mod flex;
mod geometry;
mod measure;
mod text;

pub use cache::{ComputedLayout, CoordSpace, LayoutCache};
pub use compute::{LayoutEngine, LayoutOptions};
pub use geometry::{Axis, Bounds, Size};
pub use measure::{Available, ContentMeasure, HeuristicMeasure, MeasureRegistry};
pub use text::{measure_text, TextMetrics};
