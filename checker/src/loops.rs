// loops.rs — Loop graph: every loop formed during a simulated knit
//
// Loops are stored in an arena in creation order. Each loop records where it
// was formed, the loops it was knitted through, where it was released to and
// its chronological neighbours. Cycles (prev/next, src/dst) are expressed as
// `LoopId` indices into the arena.
//
// Preconditions: loops are created and consumed by the machine only.
// Postconditions: a loop's destination is set at most once.
// Failure modes: none.
// Side effects: none.

use std::fmt;
use std::ops::Index;

use serde::Serialize;

use crate::id::LoopId;

/// Where a loop was released to: the loop knitted through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Destination {
    pub course: usize,
    pub wale: usize,
    pub loop_id: LoopId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loop {
    pub id: LoopId,
    pub src_course: usize,
    pub src_wale: usize,
    /// Loops this loop was knitted through, in needle order.
    pub src_loops: Vec<LoopId>,
    pub dst: Option<Destination>,
    pub prev_loop: Option<LoopId>,
    pub next_loop: Option<LoopId>,
    pub needs_links_process: bool,
}

impl Loop {
    pub fn dst_course(&self) -> Option<usize> {
        self.dst.map(|d| d.course)
    }

    pub fn dst_wale(&self) -> Option<usize> {
        self.dst.map(|d| d.wale)
    }

    pub fn dst_loop(&self) -> Option<LoopId> {
        self.dst.map(|d| d.loop_id)
    }

    /// A loop formed on an empty needle after the first course.
    pub fn is_pickup_stitch(&self) -> bool {
        self.src_course != 0 && self.src_loops.is_empty()
    }

    /// True if `other` directly precedes or follows this loop.
    pub fn is_chained_to(&self, other: LoopId) -> bool {
        self.prev_loop == Some(other) || self.next_loop == Some(other)
    }
}

impl fmt::Display for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({},{})", self.id, self.src_course, self.src_wale)?;
        match self.dst {
            Some(d) => write!(f, " -> {} ({},{})", d.loop_id, d.course, d.wale)?,
            None => write!(f, " -> held")?,
        }
        if !self.src_loops.is_empty() {
            let srcs: Vec<String> = self.src_loops.iter().map(|s| s.to_string()).collect();
            write!(f, " <- {}", srcs.join(" "))?;
        }
        Ok(())
    }
}

// ── Graph ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LoopGraph {
    loops: Vec<Loop>,
}

impl LoopGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn get(&self, id: LoopId) -> Option<&Loop> {
        self.loops.get(id.index())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Loop> {
        self.loops.iter()
    }

    pub fn as_slice(&self) -> &[Loop] {
        &self.loops
    }

    /// Loops still on a needle when knitting ended.
    pub fn held(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter().filter(|l| l.dst.is_none())
    }

    /// Append a new loop formed at (course, wale) and chain it after the
    /// previously created loop.
    pub(crate) fn create(&mut self, course: usize, wale: usize, needs_links_process: bool) -> LoopId {
        let id = LoopId(self.loops.len() as u32);
        let prev_loop = self.loops.last().map(|l| l.id);
        if let Some(prev) = self.loops.last_mut() {
            prev.next_loop = Some(id);
        }
        self.loops.push(Loop {
            id,
            src_course: course,
            src_wale: wale,
            src_loops: Vec::new(),
            dst: None,
            prev_loop,
            next_loop: None,
            needs_links_process,
        });
        id
    }

    /// Knit `id` through `sources`, releasing each of them to `id`.
    pub(crate) fn knit_through(&mut self, id: LoopId, sources: Vec<LoopId>) {
        let (course, wale) = {
            let l = &self.loops[id.index()];
            (l.src_course, l.src_wale)
        };
        for &src in &sources {
            let released = &mut self.loops[src.index()];
            debug_assert!(released.dst.is_none(), "{src} released twice");
            released.dst = Some(Destination {
                course,
                wale,
                loop_id: id,
            });
        }
        self.loops[id.index()].src_loops = sources;
    }

    /// A pickup stitch whose neighbouring pickup stitch of the same course was
    /// released into a neighbouring loop, with no other loop joining its
    /// destination.
    pub fn is_continuous_pickup_stitch(&self, id: LoopId) -> bool {
        let Some(this) = self.get(id) else {
            return false;
        };
        if !this.is_pickup_stitch() {
            return false;
        }
        let Some(dst) = this.dst_loop() else {
            return false;
        };
        if self[dst].src_loops.len() > 1 {
            return false;
        }
        [this.prev_loop, this.next_loop]
            .into_iter()
            .flatten()
            .any(|n| self.released_beside(&self[n], this.src_course, dst))
    }

    fn released_beside(&self, neighbour: &Loop, course: usize, dst: LoopId) -> bool {
        neighbour.src_course == course
            && neighbour.is_pickup_stitch()
            && neighbour
                .dst_loop()
                .is_some_and(|nd| self[nd].is_chained_to(dst))
    }

    /// All continuous pickup stitches, in creation order.
    pub fn continuous_pickup_stitches(&self) -> impl Iterator<Item = &Loop> {
        self.loops
            .iter()
            .filter(|l| self.is_continuous_pickup_stitch(l.id))
    }
}

impl Index<LoopId> for LoopGraph {
    type Output = Loop;

    fn index(&self, id: LoopId) -> &Loop {
        &self.loops[id.index()]
    }
}

impl<'a> IntoIterator for &'a LoopGraph {
    type Item = &'a Loop;
    type IntoIter = std::slice::Iter<'a, Loop>;

    fn into_iter(self) -> Self::IntoIter {
        self.loops.iter()
    }
}
