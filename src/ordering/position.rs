use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MoveError;

/// Nesting class of a tree node. Line types sit directly under the tree root,
/// line type components one level below them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepthClass {
    LineType,
    Component,
}

impl DepthClass {
    pub fn from_depth(depth: usize) -> Result<Self, MoveError> {
        match depth {
            1 => Ok(DepthClass::LineType),
            2 => Ok(DepthClass::Component),
            other => Err(MoveError::UnsupportedDepth(other)),
        }
    }
}

impl fmt::Display for DepthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthClass::LineType => write!(f, "line type"),
            DepthClass::Component => write!(f, "component"),
        }
    }
}

/// Depth-encoded position token as sent by the tree view, e.g. `"0-2-1"`:
/// the root segment followed by one zero-based index per level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreePosition {
    segments: Vec<usize>,
}

impl TreePosition {
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn depth_class(&self) -> Result<DepthClass, MoveError> {
        DepthClass::from_depth(self.depth())
    }

    /// Index among siblings
    pub fn index(&self) -> usize {
        self.segments[self.segments.len() - 1]
    }

    /// Index of the parent among its own siblings, when the node has one
    pub fn parent_index(&self) -> Option<usize> {
        if self.depth() >= 2 {
            self.segments.get(self.segments.len() - 2).copied()
        } else {
            None
        }
    }
}

impl FromStr for TreePosition {
    type Err = MoveError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let segments = token
            .trim()
            .split('-')
            .map(|segment| segment.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| MoveError::MalformedPosition(token.to_string()))?;

        if segments.len() < 2 {
            return Err(MoveError::MalformedPosition(token.to_string()));
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for TreePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .segments
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join("-"))
    }
}
