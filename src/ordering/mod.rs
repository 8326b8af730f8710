//! Sibling ordering for the drawing-type tree.
//!
//! Every record in an ordered sibling group (line types under a drawing type,
//! line type components under a line type, components in a catalog version)
//! carries a zero-based `index`. Between mutations the indices of a group are
//! exactly `0..n` with no gaps or repeats.
//!
//! This module is pure: it parses drop events coming from the tree view and
//! turns them into a [`MovePlan`], a list of range shifts and relocations that
//! the reorder service executes inside one transaction.

mod edit_state;
mod plan;
mod position;

pub use edit_state::EditState;
pub use plan::{
    allow_drop, plan_move, Disposition, DropTarget, Dragged, GapSide, IndexShift, MovePlan,
    Relocate, Slot, Step,
};
pub use position::{DepthClass, TreePosition};

use thiserror::Error;

/// Reasons a drop event cannot be resolved into an index assignment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Malformed tree position '{0}'")]
    MalformedPosition(String),

    #[error("Tree depth {0} is not supported")]
    UnsupportedDepth(usize),

    #[error("A {drag} cannot be dropped {disposition:?} a {drop}")]
    IncompatibleDrop {
        drag: DepthClass,
        drop: DepthClass,
        disposition: Disposition,
    },

    #[error("Node is a {actual} but its position describes a {expected}")]
    KindMismatch {
        expected: DepthClass,
        actual: DepthClass,
    },

    #[error("Index {index} is outside a group of {count}")]
    IndexOutOfRange { index: i32, count: i32 },

    #[error("Position {token} is stale, the node is now at index {stored}")]
    StalePosition { token: String, stored: i32 },
}

/// True when `indices` is a permutation of `0..indices.len()`
pub fn is_contiguous(indices: &[i32]) -> bool {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(expected, index)| i32::try_from(expected).map_or(false, |e| e == *index))
}
