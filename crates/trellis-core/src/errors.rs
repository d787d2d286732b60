//! Error types for the Trellis engine.

use crate::tree::NodeId;
use thiserror::Error;

/// Errors from layout computation and geometry cache access.
///
/// Geometry-level anomalies (overflow, zero content size, percent against an
/// unresolved ancestor) are absorbed by clamping and never reach this enum;
/// only contract violations and resource failures do.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The caller read a geometry slot that no completed pass has placed in
    /// the current tree generation. This is a programmer-contract violation,
    /// never silently served from stale data.
    #[error("stale layout read for node {node:?}: not placed in the current tree generation")]
    StaleLayout { node: NodeId },

    /// Pass-local scratch buffers could not be allocated while distributing a
    /// container's children. The pass is aborted; already-written slots stay
    /// invalid and the whole pass may be retried.
    #[error("scratch allocation failed while distributing {children} children")]
    ScratchAlloc { children: usize },

    /// A node id that does not belong to the tree handed to the engine.
    #[error("node {node:?} does not belong to this tree")]
    UnknownNode { node: NodeId },
}
