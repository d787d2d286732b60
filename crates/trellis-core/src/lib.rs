//! Core types for the Trellis layout engine.
//!
//! This crate provides the foundational types used across the other trellis
//! crates:
//! - Style and layout attributes (dimensions, spacing, alignment, flex)
//! - The arena-backed component tree
//! - Error types

pub mod errors;
pub mod style;
pub mod tree;

pub use errors::*;
pub use style::*;
pub use tree::*;
