// diag.rs — Problem model shared by the cable resolver and the machine
//
// Every problem carries a kind, a (course, needle) location and a stable
// code. Kinds are grouped in families so that a warning and the error of the
// same family can be merged by the collector.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::fmt;

use serde::Serialize;

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable problem code (e.g., `K0001`, `W0100`, `E0500`).
///
/// `K` codes are syntax errors, `W` warnings and `E` errors. The number
/// identifies the family and is shared by the warning and error variants.
/// Once assigned, a code must never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub mod codes {
    use super::DiagCode;

    pub const INCOMPLETE_CABLE: DiagCode = DiagCode("K0001");
    pub const OVERSIZED_CABLE: DiagCode = DiagCode("K0002");
    pub const LOOPS_IN_NEEDLE_WARNING: DiagCode = DiagCode("W0100");
    pub const LOOPS_IN_NEEDLE_ERROR: DiagCode = DiagCode("E0100");
    pub const RACKING_WARNING: DiagCode = DiagCode("W0200");
    pub const RACKING_ERROR: DiagCode = DiagCode("E0200");
    pub const LOOP_HOLD_WARNING: DiagCode = DiagCode("W0300");
    pub const LOOP_HOLD_ERROR: DiagCode = DiagCode("E0300");
    pub const CONTINUOUS_PICKUP_STITCH: DiagCode = DiagCode("W0400");
    pub const TRANSFER_OUT_OF_BED: DiagCode = DiagCode("E0500");
    pub const OVERLAPPED_TRANSFER_WARNING: DiagCode = DiagCode("W0600");
    pub const OVERLAPPED_TRANSFER_ERROR: DiagCode = DiagCode("E0600");
    pub const TRANSFER_OF_PICKUP_STITCH: DiagCode = DiagCode("W0700");
}

// ── Severity level ───────────────────────────────────────────────────────

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
    SyntaxError,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::SyntaxError => "syntax error",
        })
    }
}

// ── Problem kinds ────────────────────────────────────────────────────────

/// Problems of one family describe the same fault at different severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Family {
    IncompleteCable,
    OversizedCable,
    NumberOfLoopsInNeedle,
    Racking,
    LoopHold,
    ContinuousPickupStitch,
    TransferOutOfBed,
    TransferWithOverlappedLoops,
    TransferOfPickupStitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProblemKind {
    IncompleteCable,
    OversizedCable,
    NumberOfLoopsInNeedleWarning,
    NumberOfLoopsInNeedleError,
    RackingWarning,
    RackingError,
    LoopHoldWarning,
    LoopHoldError,
    ContinuousPickupStitchWarning,
    TransferOutOfBedError,
    TransferWithOverlappedLoopsWarning,
    TransferWithOverlappedLoopsError,
    TransferOfPickupStitchWarning,
}

impl ProblemKind {
    pub fn family(self) -> Family {
        use ProblemKind::*;
        match self {
            IncompleteCable => Family::IncompleteCable,
            OversizedCable => Family::OversizedCable,
            NumberOfLoopsInNeedleWarning | NumberOfLoopsInNeedleError => {
                Family::NumberOfLoopsInNeedle
            }
            RackingWarning | RackingError => Family::Racking,
            LoopHoldWarning | LoopHoldError => Family::LoopHold,
            ContinuousPickupStitchWarning => Family::ContinuousPickupStitch,
            TransferOutOfBedError => Family::TransferOutOfBed,
            TransferWithOverlappedLoopsWarning | TransferWithOverlappedLoopsError => {
                Family::TransferWithOverlappedLoops
            }
            TransferOfPickupStitchWarning => Family::TransferOfPickupStitch,
        }
    }

    pub fn severity(self) -> Severity {
        use ProblemKind::*;
        match self {
            IncompleteCable | OversizedCable => Severity::SyntaxError,
            NumberOfLoopsInNeedleError
            | RackingError
            | LoopHoldError
            | TransferOutOfBedError
            | TransferWithOverlappedLoopsError => Severity::Error,
            NumberOfLoopsInNeedleWarning
            | RackingWarning
            | LoopHoldWarning
            | ContinuousPickupStitchWarning
            | TransferWithOverlappedLoopsWarning
            | TransferOfPickupStitchWarning => Severity::Warning,
        }
    }

    pub fn code(self) -> DiagCode {
        use ProblemKind::*;
        match self {
            IncompleteCable => codes::INCOMPLETE_CABLE,
            OversizedCable => codes::OVERSIZED_CABLE,
            NumberOfLoopsInNeedleWarning => codes::LOOPS_IN_NEEDLE_WARNING,
            NumberOfLoopsInNeedleError => codes::LOOPS_IN_NEEDLE_ERROR,
            RackingWarning => codes::RACKING_WARNING,
            RackingError => codes::RACKING_ERROR,
            LoopHoldWarning => codes::LOOP_HOLD_WARNING,
            LoopHoldError => codes::LOOP_HOLD_ERROR,
            ContinuousPickupStitchWarning => codes::CONTINUOUS_PICKUP_STITCH,
            TransferOutOfBedError => codes::TRANSFER_OUT_OF_BED,
            TransferWithOverlappedLoopsWarning => codes::OVERLAPPED_TRANSFER_WARNING,
            TransferWithOverlappedLoopsError => codes::OVERLAPPED_TRANSFER_ERROR,
            TransferOfPickupStitchWarning => codes::TRANSFER_OF_PICKUP_STITCH,
        }
    }

    pub fn message(self) -> &'static str {
        match self.family() {
            Family::IncompleteCable => "cable has no matching second half",
            Family::OversizedCable => "cable is too wide",
            Family::NumberOfLoopsInNeedle => "too many loops held in needle",
            Family::Racking => "racking spread too large within one course",
            Family::LoopHold => "loop held on needle for too many courses",
            Family::ContinuousPickupStitch => "adjacent pickup stitches released together",
            Family::TransferOutOfBed => "transfer leaves the needle bed",
            Family::TransferWithOverlappedLoops => "transfer of overlapped loops",
            Family::TransferOfPickupStitch => "transfer of a pickup stitch",
        }
    }

    pub fn hint(self) -> Option<&'static str> {
        match self.family() {
            Family::IncompleteCable => {
                Some("pair 4 with 5, 5 with 10, 14 with 15 or 15 with 100")
            }
            Family::OversizedCable => Some("each cable half may cross at most 3 needles"),
            Family::TransferOutOfBed => Some("keep moves at least one needle away from the edge"),
            Family::ContinuousPickupStitch => {
                Some("knit the new stitches before releasing them together")
            }
            _ => None,
        }
    }
}

// ── Problem ──────────────────────────────────────────────────────────────

/// A problem found at a (course, needle) location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub course: usize,
    pub needle: usize,
}

impl Problem {
    pub fn new(kind: ProblemKind, course: usize, needle: usize) -> Self {
        Self {
            kind,
            course,
            needle,
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn family(&self) -> Family {
        self.kind.family()
    }

    pub fn code(&self) -> DiagCode {
        self.kind.code()
    }

    pub fn same_location(&self, other: &Problem) -> bool {
        self.course == other.course && self.needle == other.needle
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} (course {}, needle {})",
            self.severity(),
            self.code(),
            self.kind.message(),
            self.course,
            self.needle
        )?;
        if let Some(hint) = self.kind.hint() {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [ProblemKind; 13] = [
        ProblemKind::IncompleteCable,
        ProblemKind::OversizedCable,
        ProblemKind::NumberOfLoopsInNeedleWarning,
        ProblemKind::NumberOfLoopsInNeedleError,
        ProblemKind::RackingWarning,
        ProblemKind::RackingError,
        ProblemKind::LoopHoldWarning,
        ProblemKind::LoopHoldError,
        ProblemKind::ContinuousPickupStitchWarning,
        ProblemKind::TransferOutOfBedError,
        ProblemKind::TransferWithOverlappedLoopsWarning,
        ProblemKind::TransferWithOverlappedLoopsError,
        ProblemKind::TransferOfPickupStitchWarning,
    ];

    #[test]
    fn display_without_hint() {
        let p = Problem::new(ProblemKind::NumberOfLoopsInNeedleWarning, 2, 1);
        assert_eq!(
            format!("{p}"),
            "warning[W0100]: too many loops held in needle (course 2, needle 1)"
        );
    }

    #[test]
    fn display_with_hint() {
        let p = Problem::new(ProblemKind::OversizedCable, 0, 1);
        assert_eq!(
            format!("{p}"),
            "syntax error[K0002]: cable is too wide (course 0, needle 1)\n  hint: each cable half may cross at most 3 needles"
        );
    }

    #[test]
    fn severity_order() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::SyntaxError);
    }

    #[test]
    fn code_prefix_matches_severity() {
        for kind in ALL_KINDS {
            let prefix = match kind.severity() {
                Severity::SyntaxError => 'K',
                Severity::Error => 'E',
                Severity::Warning => 'W',
            };
            assert!(
                kind.code().0.starts_with(prefix),
                "{kind:?} has code {}",
                kind.code()
            );
        }
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in ALL_KINDS {
            assert!(seen.insert(kind.code()), "duplicate code for {kind:?}");
        }
    }

    #[test]
    fn warning_and_error_share_family_number() {
        let pairs = [
            (
                ProblemKind::NumberOfLoopsInNeedleWarning,
                ProblemKind::NumberOfLoopsInNeedleError,
            ),
            (ProblemKind::RackingWarning, ProblemKind::RackingError),
            (ProblemKind::LoopHoldWarning, ProblemKind::LoopHoldError),
            (
                ProblemKind::TransferWithOverlappedLoopsWarning,
                ProblemKind::TransferWithOverlappedLoopsError,
            ),
        ];
        for (warning, error) in pairs {
            assert_eq!(warning.family(), error.family());
            assert_eq!(warning.code().0[1..], error.code().0[1..]);
        }
    }
}
