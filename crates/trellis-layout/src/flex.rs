//! The distribution and alignment pass.
//!
//! Given a container's resolved content size and its measured in-flow
//! children, computes each child's final main/cross size and offset:
//! grow/shrink distribution of leftover space, justify policy on the main
//! axis, alignment policy on the cross axis, and a single forward
//! positioning walk.
//!
//! All offsets are relative to the container's content origin and are never
//! negative: overflow packs children at the content start instead of pushing
//! them before it.

use smallvec::SmallVec;
use trellis_core::{Alignment, LayoutError};

/// Measured inputs for one in-flow child.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlexItem {
    /// Measured main-axis size, margins excluded
    pub main: f64,
    /// Measured cross-axis size, margins excluded
    pub cross: f64,
    pub main_margin_start: f64,
    pub main_margin_sum: f64,
    pub cross_margin_start: f64,
    pub cross_margin_sum: f64,
    pub grow: f64,
    pub shrink: f64,
    /// Shrink floor (0 when unset)
    pub min_main: f64,
    /// Grow cap (infinity when unset)
    pub max_main: f64,
    /// The child declared a non-auto cross dimension; stretch must not
    /// override it
    pub explicit_cross: bool,
    /// Text leaves keep their measured cross size under stretch to avoid
    /// distorted wrapping
    pub stretchable: bool,
}

impl Default for FlexItem {
    fn default() -> Self {
        Self {
            main: 0.0,
            cross: 0.0,
            main_margin_start: 0.0,
            main_margin_sum: 0.0,
            cross_margin_start: 0.0,
            cross_margin_sum: 0.0,
            grow: 0.0,
            shrink: 0.0,
            min_main: 0.0,
            max_main: f64::INFINITY,
            explicit_cross: false,
            stretchable: true,
        }
    }
}

/// Final geometry for one child, relative to the content origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FlexPlacement {
    pub main_offset: f64,
    pub cross_offset: f64,
    pub main_size: f64,
    pub cross_size: f64,
}

type Placements = SmallVec<[FlexPlacement; 8]>;

/// Distribute and align `items` within a content box of the given main and
/// cross extent.
pub(crate) fn distribute(
    content_main: f64,
    content_cross: f64,
    gap: f64,
    justify: Alignment,
    align: Alignment,
    items: &[FlexItem],
) -> Result<Placements, LayoutError> {
    let count = items.len();
    let mut placements = Placements::new();
    if count == 0 {
        return Ok(placements);
    }

    let gap = gap.max(0.0);

    let mut sizes: SmallVec<[f64; 8]> = SmallVec::new();
    sizes
        .try_reserve(count)
        .map_err(|_| LayoutError::ScratchAlloc { children: count })?;
    placements
        .try_reserve(count)
        .map_err(|_| LayoutError::ScratchAlloc { children: count })?;
    for item in items {
        sizes.push(item.main.max(0.0));
    }

    let total_main = flowed_total(&sizes, items, gap);
    let remaining = content_main - total_main;

    let grow_sum: f64 = items.iter().map(|item| item.grow.max(0.0)).sum();
    let shrink_sum: f64 = items.iter().map(|item| item.shrink.max(0.0)).sum();

    if remaining > 0.0 && grow_sum > 0.0 {
        // Each growable child gains its proportional share, clamped to its
        // max constraint. Allowance lost to a clamp is not redistributed to
        // the other growable children.
        for (size, item) in sizes.iter_mut().zip(items) {
            if item.grow > 0.0 {
                *size = (*size + remaining * item.grow / grow_sum).min(item.max_main.max(0.0));
            }
        }
    } else if remaining < 0.0 && shrink_sum > 0.0 {
        let deficit = -remaining;
        for (size, item) in sizes.iter_mut().zip(items) {
            if item.shrink > 0.0 {
                *size = (*size - deficit * item.shrink / shrink_sum).max(item.min_main.max(0.0));
            }
        }
    }
    // Otherwise sizes stay as measured, even if they overflow or underfill.

    let extra = content_main - flowed_total(&sizes, items, gap);
    let (start, effective_gap) = justify_offsets(justify, extra, gap, count);

    let mut position = start;
    for (&size, item) in sizes.iter().zip(items) {
        let (cross_size, cross_offset) = align_cross(align, content_cross, item);
        placements.push(FlexPlacement {
            main_offset: position + item.main_margin_start,
            cross_offset,
            main_size: size.max(0.0),
            cross_size: cross_size.max(0.0),
        });
        position += size + item.main_margin_sum + effective_gap;
    }

    Ok(placements)
}

fn flowed_total(sizes: &[f64], items: &[FlexItem], gap: f64) -> f64 {
    let content: f64 = sizes
        .iter()
        .zip(items)
        .map(|(size, item)| size + item.main_margin_sum)
        .sum();
    content + gap * (sizes.len().saturating_sub(1)) as f64
}

/// Starting offset and effective gap for a justify policy, given the
/// leftover space after distribution. Offsets clamp at the content origin.
fn justify_offsets(justify: Alignment, extra: f64, gap: f64, count: usize) -> (f64, f64) {
    match justify {
        Alignment::Center => ((extra / 2.0).max(0.0), gap),
        Alignment::End => (extra.max(0.0), gap),
        Alignment::SpaceBetween => {
            if count > 1 && extra > 0.0 {
                (0.0, extra / (count - 1) as f64)
            } else {
                (0.0, 0.0)
            }
        }
        Alignment::SpaceAround => {
            if extra > 0.0 {
                let spacing = extra / count as f64;
                (spacing / 2.0, spacing)
            } else {
                (0.0, 0.0)
            }
        }
        Alignment::SpaceEvenly => {
            if extra > 0.0 {
                let spacing = extra / (count + 1) as f64;
                (spacing, spacing)
            } else {
                (0.0, 0.0)
            }
        }
        // Start; Stretch is cross-axis-only and degrades to Start here.
        _ => (0.0, gap),
    }
}

/// Cross size and offset for one child. Center and End fall back to Start
/// when the child overflows the content cross extent.
fn align_cross(align: Alignment, content_cross: f64, item: &FlexItem) -> (f64, f64) {
    let mut cross_size = item.cross;

    if align == Alignment::Stretch && item.stretchable && !item.explicit_cross {
        cross_size = (content_cross - item.cross_margin_sum).max(0.0);
    }

    let slack = content_cross - cross_size;
    let offset = match align {
        Alignment::Center if slack >= 0.0 => slack / 2.0,
        Alignment::End if slack >= 0.0 => slack,
        // Start, Stretch, overflow fallbacks, and main-axis-only policies.
        _ => 0.0,
    };

    (cross_size, offset + item.cross_margin_start)
}
