// id.rs — Arena identifiers for loops
//
// Loops live in a single arena owned by the loop graph and refer to each
// other by index. Ids are allocated in creation order, so comparing two ids
// compares when the loops were formed.

use std::fmt;

use serde::Serialize;

/// Index of a loop in its `LoopGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LoopId(pub u32);

impl LoopId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}
