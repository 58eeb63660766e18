// stage.rs — Stage descriptors: metadata and dependency resolution
//
// Declares the stages a check runs through, the artifacts they produce and
// which stages they depend on. The pipeline runner uses this to run only
// the stages needed for a requested output.

use std::collections::HashSet;
use std::fmt;

// ── Stage and artifact identifiers ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    ResolveCables,
    Decode,
    Simulate,
    ScanPickups,
}

/// Artifacts held by the check state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactId {
    Resolved, // Vec<u8>
    Courses,  // Vec<Vec<Instruction>>
    Loops,    // LoopGraph
    Problems, // ProblemCollector
}

// ── Stage descriptor ───────────────────────────────────────────────────────

pub struct StageDescriptor {
    /// Human-readable name for diagnostics/verbose output.
    pub name: &'static str,
    /// Stages whose outputs this stage consumes.
    pub inputs: &'static [StageId],
    pub outputs: &'static [ArtifactId],
    /// Pre/post conditions (documentation only).
    pub invariants: &'static str,
}

pub fn descriptor(id: StageId) -> StageDescriptor {
    match id {
        StageId::ResolveCables => StageDescriptor {
            name: "resolve_cables",
            inputs: &[],
            outputs: &[ArtifactId::Resolved, ArtifactId::Problems],
            invariants: "no cable codes left, or syntax problems recorded",
        },
        StageId::Decode => StageDescriptor {
            name: "decode",
            inputs: &[StageId::ResolveCables],
            outputs: &[ArtifactId::Courses],
            invariants: "every code has an instruction with a knittable bed",
        },
        StageId::Simulate => StageDescriptor {
            name: "simulate",
            inputs: &[StageId::Decode],
            outputs: &[ArtifactId::Loops, ArtifactId::Problems],
            invariants: "every course knitted, needle problems recorded",
        },
        StageId::ScanPickups => StageDescriptor {
            name: "scan_pickups",
            inputs: &[StageId::Simulate],
            outputs: &[ArtifactId::Problems],
            invariants: "continuous pickup stitches recorded",
        },
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(descriptor(*self).name)
    }
}

// ── Dependency resolution ──────────────────────────────────────────────────

/// All stages in declaration order.
pub const ALL_STAGES: [StageId; 4] = [
    StageId::ResolveCables,
    StageId::Decode,
    StageId::Simulate,
    StageId::ScanPickups,
];

/// Compute the minimal ordered set of stages needed to produce `terminal`.
/// Returns stages in execution order.
pub fn required_stages(terminal: StageId) -> Vec<StageId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    visit(terminal, &mut visited, &mut order);
    order
}

fn visit(id: StageId, visited: &mut HashSet<StageId>, order: &mut Vec<StageId>) {
    if !visited.insert(id) {
        return;
    }
    for &dep in descriptor(id).inputs {
        visit(dep, visited, order);
    }
    order.push(id);
}

// ── Tests ──────────────────────────────────────────────────────────────────
