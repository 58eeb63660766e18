// check.rs — Checker entry points
//
// `check` knits a pattern as given. `check_as_pattern` treats it as a motif:
// tiled and surrounded by plain knitting before it is knitted.
//
// Preconditions: `codes.len()` is a multiple of `width` (and equals
// `width * height` for the motif variant).
// Postconditions: Ok only if no problem of any severity was found.
// Failure modes: `CheckError::Problems` carries the problems and the partial
//   loop graph; other variants are fatal.
// Side effects: emits `tracing` spans and events.

use tracing::{debug, instrument};

use crate::config::CheckOptions;
use crate::error::CheckError;
use crate::loops::LoopGraph;
use crate::pattern::Pattern;
use crate::pipeline::{run_pipeline, CheckState, PipelineError};
use crate::stage::StageId;

/// Check a pattern with the default thresholds.
pub fn check(width: usize, codes: &[u8]) -> Result<LoopGraph, CheckError> {
    check_with(&CheckOptions::default(), width, codes)
}

pub fn check_with(
    options: &CheckOptions,
    width: usize,
    codes: &[u8],
) -> Result<LoopGraph, CheckError> {
    check_pattern_with(options, Pattern::new(width, codes.to_vec())?)
}

/// Check a motif as it knits when repeated: tiled 2×2 and padded by 2
/// courses and 7 needles of plain knitting on every side.
pub fn check_as_pattern(width: usize, height: usize, codes: &[u8]) -> Result<LoopGraph, CheckError> {
    check_as_pattern_with(&CheckOptions::default(), width, height, codes)
}

pub fn check_as_pattern_with(
    options: &CheckOptions,
    width: usize,
    height: usize,
    codes: &[u8],
) -> Result<LoopGraph, CheckError> {
    if width.checked_mul(height) != Some(codes.len()) {
        return Err(CheckError::Dimensions {
            width,
            len: codes.len(),
        });
    }
    let motif = Pattern::new(width, codes.to_vec())?;
    check_pattern_with(options, motif.tile(&options.tile))
}

/// Run every stage over `pattern`.
#[instrument(skip_all, fields(width = pattern.width(), height = pattern.height()))]
pub fn check_pattern_with(
    options: &CheckOptions,
    pattern: Pattern,
) -> Result<LoopGraph, CheckError> {
    let mut state = CheckState::new(pattern);
    match run_pipeline(&mut state, StageId::ScanPickups, options, false, |_, _| {}) {
        Ok(()) | Err(PipelineError::Halted { .. }) => {}
        Err(PipelineError::Fatal(e)) => return Err(e),
        Err(PipelineError::MissingInput { stage }) => {
            return Err(CheckError::Incomplete {
                stage: stage.to_string(),
            })
        }
    }
    debug!(problems = state.problems.len(), "check complete");
    state.into_result()
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::ProblemKind;

    #[test]
    fn single_jersey_is_clean() {
        let loops = check(3, &[1; 6]).unwrap();
        assert_eq!(loops.len(), 6);
    }

    #[test]
    fn ragged_input_is_rejected() {
        assert!(matches!(
            check(4, &[1; 6]),
            Err(CheckError::Dimensions { width: 4, len: 6 })
        ));
        assert!(matches!(
            check_as_pattern(3, 3, &[1; 6]),
            Err(CheckError::Dimensions { .. })
        ));
    }

    #[test]
    fn warnings_fail_the_check() {
        let err = check(3, &[1, 1, 1, 1, 11, 1, 1, 11, 1]).unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(err.problems().len(), 1);
        assert_eq!(err.problems()[0].kind, ProblemKind::NumberOfLoopsInNeedleWarning);
        assert_eq!(err.loops().map(LoopGraph::len), Some(9));
    }

    #[test]
    fn edge_move_passes_as_pattern() {
        let codes = [1, 1, 6, 1];
        let err = check(2, &codes).unwrap_err();
        assert_eq!(err.problems()[0].kind, ProblemKind::TransferOutOfBedError);
        assert!(check_as_pattern(2, 2, &codes).is_ok());
    }

    #[test]
    fn custom_thresholds() {
        let mut options = CheckOptions::default();
        options.thresholds.loops_in_needle_warning = 4;
        options.thresholds.loops_in_needle_error = 5;
        assert!(check_with(&options, 3, &[1, 1, 1, 1, 11, 1, 1, 11, 1]).is_ok());
    }
}
