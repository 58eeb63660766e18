// pipeline.rs — Check state and stage orchestration
//
// Holds every stage artifact of one check and runs the minimal set of
// stages for a given terminal StageId.
//
// Preconditions: the pattern in `CheckState` has whole courses.
// Postconditions: artifacts for all required stages are populated, or the
//   run stopped at the stage that could not continue.
// Failure modes: syntax problems halt the run; undecodable codes are fatal.
// Side effects: calls on_stage_complete after each stage for immediate display.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::cable::resolve_cables;
use crate::collector::ProblemCollector;
use crate::config::CheckOptions;
use crate::diag::{Problem, Severity};
use crate::error::CheckError;
use crate::instruction::{Instruction, InstructionTable};
use crate::loops::LoopGraph;
use crate::machine::{decode, scan_continuous_pickups, VirtualKnittingMachine};
use crate::pattern::Pattern;
use crate::stage::{required_stages, StageId};

// ── Provenance ─────────────────────────────────────────────────────────────

/// Identifies the input of a check, for reports and cache keys.
///
/// `pattern_hash`: SHA-256 over the width (u64, little endian) followed by
/// the codes, course 0 first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub pattern_hash: [u8; 32],
    pub width: usize,
    pub height: usize,
    pub checker_version: &'static str,
}

/// Serialized form of `Provenance`, with the hash as hex.
#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceRecord {
    pub pattern_hash: String,
    pub width: usize,
    pub height: usize,
    pub checker_version: &'static str,
}

impl Provenance {
    /// Hex string of the pattern hash (64 characters).
    pub fn pattern_hash_hex(&self) -> String {
        bytes_to_hex(&self.pattern_hash)
    }

    pub fn record(&self) -> ProvenanceRecord {
        ProvenanceRecord {
            pattern_hash: self.pattern_hash_hex(),
            width: self.width,
            height: self.height,
            checker_version: self.checker_version,
        }
    }
}

fn bytes_to_hex(bytes: &[u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
    }
    s
}

pub fn compute_provenance(pattern: &Pattern) -> Provenance {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update((pattern.width() as u64).to_le_bytes());
    hasher.update(pattern.codes());
    let mut pattern_hash = [0u8; 32];
    pattern_hash.copy_from_slice(&hasher.finalize());

    Provenance {
        pattern_hash,
        width: pattern.width(),
        height: pattern.height(),
        checker_version: env!("CARGO_PKG_VERSION"),
    }
}

// ── Check state ────────────────────────────────────────────────────────────

/// Holds all artifacts of one check and the problems found so far.
pub struct CheckState {
    pub pattern: Pattern,
    pub resolved: Option<Vec<u8>>,
    pub courses: Option<Vec<Vec<Instruction>>>,
    pub loops: Option<LoopGraph>,
    pub problems: ProblemCollector,
    pub provenance: Provenance,
}

impl CheckState {
    pub fn new(pattern: Pattern) -> Self {
        let provenance = compute_provenance(&pattern);
        Self {
            pattern,
            resolved: None,
            courses: None,
            loops: None,
            problems: ProblemCollector::new(),
            provenance,
        }
    }

    /// True once every stage has run and nothing was found.
    pub fn is_ok(&self) -> bool {
        self.loops.is_some() && self.problems.is_empty()
    }

    /// The outcome of a check: the loop graph if no problem was found.
    pub fn into_result(self) -> Result<LoopGraph, CheckError> {
        match (self.loops, self.problems.is_empty()) {
            (Some(loops), true) => Ok(loops),
            (loops, false) => Err(CheckError::Problems {
                problems: self.problems.into_problems(),
                loops: loops.unwrap_or_default(),
            }),
            (None, true) => Err(CheckError::Incomplete {
                stage: StageId::Simulate.to_string(),
            }),
        }
    }
}

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The stage found syntax problems; later stages cannot run. The
    /// problems are in `CheckState.problems`.
    #[error("{stage} found syntax problems")]
    Halted { stage: StageId },

    /// A stage ran before the stage producing its input.
    #[error("{stage} has no input to work on")]
    MissingInput { stage: StageId },

    #[error(transparent)]
    Fatal(#[from] CheckError),
}

/// Per-stage post-processing: callback, logging, syntax error check.
fn finish_stage(
    state: &CheckState,
    stage: StageId,
    first_new: usize,
    elapsed: Duration,
    verbose: bool,
    on_stage_complete: &mut impl FnMut(StageId, &[Problem]),
) -> Result<(), PipelineError> {
    let found = &state.problems.problems()[first_new..];
    on_stage_complete(stage, found);
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    debug!(%stage, elapsed_ms, problems = found.len(), "stage complete");
    if verbose {
        eprintln!("kpc: {} complete, {:.1}ms", stage, elapsed_ms);
    }
    if found.iter().any(|p| p.severity() == Severity::SyntaxError) {
        return Err(PipelineError::Halted { stage });
    }
    Ok(())
}

// ── Pipeline runner ────────────────────────────────────────────────────────

/// Run the minimal set of stages to produce `terminal`.
///
/// Per-stage sequence: execute → on_stage_complete(callback) → verbose →
/// syntax error check.
pub fn run_pipeline(
    state: &mut CheckState,
    terminal: StageId,
    options: &CheckOptions,
    verbose: bool,
    mut on_stage_complete: impl FnMut(StageId, &[Problem]),
) -> Result<(), PipelineError> {
    let width = state.pattern.width();

    for stage in required_stages(terminal) {
        let t = Instant::now();
        let first_new = state.problems.len();
        match stage {
            StageId::ResolveCables => {
                match resolve_cables(
                    state.pattern.codes(),
                    width,
                    options.thresholds.max_cable_width,
                ) {
                    Ok(resolved) => state.resolved = Some(resolved),
                    Err(problems) => state.problems.extend(problems),
                }
            }
            StageId::Decode => {
                let resolved = state
                    .resolved
                    .as_deref()
                    .ok_or(PipelineError::MissingInput { stage })?;
                state.courses = Some(decode(resolved, width, InstructionTable::standard())?);
            }
            StageId::Simulate => {
                let courses = state
                    .courses
                    .as_deref()
                    .ok_or(PipelineError::MissingInput { stage })?;
                let mut machine = VirtualKnittingMachine::new(width, options.thresholds);
                machine.knit(courses);
                let output = machine.finish();
                state.problems.extend(output.problems.into_problems());
                state.loops = Some(output.loops);
            }
            StageId::ScanPickups => {
                let loops = state
                    .loops
                    .as_ref()
                    .ok_or(PipelineError::MissingInput { stage })?;
                scan_continuous_pickups(loops, &mut state.problems);
            }
        }
        finish_stage(
            state,
            stage,
            first_new,
            t.elapsed(),
            verbose,
            &mut on_stage_complete,
        )?;
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────
