use serde::{Deserialize, Serialize};

use super::{DepthClass, MoveError};

/// Where a dragged node was released relative to the drop node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Disposition {
    /// Onto the node itself: become its first child
    Onto,
    /// Into the gap just before the node
    Before,
    /// Into the gap just after the node
    After,
}

impl Disposition {
    pub fn is_gap(self) -> bool {
        !matches!(self, Disposition::Onto)
    }
}

/// Whether a node of class `drag` may be released on a node of class `drop`.
///
/// Nodes of the same class may only be dropped into a gap among each other.
/// A component may additionally be dropped onto any line type, which then
/// contains it.
pub fn allow_drop(drag: DepthClass, drop: DepthClass, disposition: Disposition) -> bool {
    match (drag, drop) {
        (DepthClass::LineType, DepthClass::LineType) => disposition.is_gap(),
        (DepthClass::Component, DepthClass::Component) => disposition.is_gap(),
        (DepthClass::Component, DepthClass::LineType) => disposition == Disposition::Onto,
        (DepthClass::LineType, DepthClass::Component) => false,
    }
}

/// A record's place in its sibling group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub parent_id: i32,
    pub index: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dragged {
    pub id: i32,
    pub slot: Slot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapSide {
    Before,
    After,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// Released onto a container node; lands at index 0 inside it
    Container { parent_id: i32 },
    /// Released into the gap beside `sibling`, whose group has `sibling_count` members
    Gap {
        sibling: Slot,
        side: GapSide,
        sibling_count: i32,
    },
}

/// Shift the index of every sibling under `parent_id` whose index lies in
/// `start..=end` (open-ended when `end` is `None`) by `delta`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexShift {
    pub parent_id: i32,
    pub start: i32,
    pub end: Option<i32>,
    pub delta: i32,
    pub exclude: Option<i32>,
}

impl IndexShift {
    pub fn covers(&self, index: i32) -> bool {
        index >= self.start && self.end.map_or(true, |end| index <= end)
    }
}

/// Place record `id` at `index` under `parent_id`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relocate {
    pub id: i32,
    pub parent_id: i32,
    pub index: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Shift(IndexShift),
    Relocate(Relocate),
}

/// Ordered renumbering instructions for one move. Steps are emitted so that
/// executing them in order only ever produces a transient duplicate index,
/// never a gap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MovePlan {
    NoOp,
    Steps(Vec<Step>),
}

impl MovePlan {
    pub fn is_noop(&self) -> bool {
        matches!(self, MovePlan::NoOp)
    }

    pub fn steps(&self) -> &[Step] {
        match self {
            MovePlan::NoOp => &[],
            MovePlan::Steps(steps) => steps,
        }
    }

    /// Parent scopes whose child lists change, in first-touched order
    pub fn affected_parents(&self) -> Vec<i32> {
        let mut parents = Vec::new();
        for step in self.steps() {
            let parent = match step {
                Step::Shift(shift) => shift.parent_id,
                Step::Relocate(relocate) => relocate.parent_id,
            };
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        parents
    }
}

/// Resolve a drop into the index it lands at and the renumbering needed to get
/// there.
pub fn plan_move(dragged: Dragged, target: DropTarget) -> Result<MovePlan, MoveError> {
    let from = dragged.slot;
    if from.index < 0 {
        return Err(MoveError::IndexOutOfRange {
            index: from.index,
            count: 0,
        });
    }

    match target {
        DropTarget::Container { parent_id } if parent_id == from.parent_id => {
            Ok(reorder(dragged.id, from, 0))
        }
        DropTarget::Container { parent_id } => Ok(reparent(dragged.id, from, parent_id, 0)),
        DropTarget::Gap {
            sibling,
            side,
            sibling_count,
        } => {
            if sibling.index < 0 || sibling.index >= sibling_count {
                return Err(MoveError::IndexOutOfRange {
                    index: sibling.index,
                    count: sibling_count,
                });
            }

            let b = sibling.index;
            if sibling.parent_id == from.parent_id {
                let a = from.index;
                if a >= sibling_count {
                    return Err(MoveError::IndexOutOfRange {
                        index: a,
                        count: sibling_count,
                    });
                }
                if a == b {
                    return Ok(MovePlan::NoOp);
                }
                let to = match side {
                    GapSide::After if b == sibling_count - 1 => sibling_count - 1,
                    GapSide::After if b > a => b,
                    GapSide::After => b + 1,
                    GapSide::Before if b > a => b - 1,
                    GapSide::Before => b,
                };
                Ok(reorder(dragged.id, from, to))
            } else {
                let to = match side {
                    GapSide::After => b + 1,
                    GapSide::Before => b,
                };
                Ok(reparent(dragged.id, from, sibling.parent_id, to))
            }
        }
    }
}

fn reorder(id: i32, from: Slot, to: i32) -> MovePlan {
    let a = from.index;
    if a == to {
        return MovePlan::NoOp;
    }

    // Close the vacated slot first so the only transient state is a duplicate at `a`.
    let shift = if to > a {
        IndexShift {
            parent_id: from.parent_id,
            start: a + 1,
            end: Some(to),
            delta: -1,
            exclude: None,
        }
    } else {
        IndexShift {
            parent_id: from.parent_id,
            start: to,
            end: Some(a - 1),
            delta: 1,
            exclude: None,
        }
    };

    MovePlan::Steps(vec![
        Step::Shift(shift),
        Step::Relocate(Relocate {
            id,
            parent_id: from.parent_id,
            index: to,
        }),
    ])
}

fn reparent(id: i32, from: Slot, to_parent: i32, to: i32) -> MovePlan {
    MovePlan::Steps(vec![
        Step::Shift(IndexShift {
            parent_id: from.parent_id,
            start: from.index + 1,
            end: None,
            delta: -1,
            exclude: None,
        }),
        Step::Relocate(Relocate {
            id,
            parent_id: to_parent,
            index: to,
        }),
        Step::Shift(IndexShift {
            parent_id: to_parent,
            start: to,
            end: None,
            delta: 1,
            exclude: Some(id),
        }),
    ])
}
