// error.rs — Errors returned by the checker entry points
//
// `Problems` is the ordinary failure of a check: the pattern was understood
// but cannot be knitted as written. The other variants stop a check before
// any problem could be determined.

use crate::diag::Problem;
use crate::loops::LoopGraph;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("{len} codes do not form whole courses of width {width}")]
    Dimensions { width: usize, len: usize },

    #[error("instruction {code} is not implemented (course {course}, needle {needle})")]
    UnimplementedInstruction {
        code: u8,
        course: usize,
        needle: usize,
    },

    #[error("instruction {code} has no single bed to operate on (course {course}, needle {needle})")]
    UnsupportedBed {
        code: u8,
        course: usize,
        needle: usize,
    },

    /// The check stopped before the named stage could run.
    #[error("check stopped before {stage}")]
    Incomplete { stage: String },

    /// The loops formed before and during the failing courses are kept so a
    /// caller can show where things went wrong.
    #[error("pattern has {} problem(s)", .problems.len())]
    Problems {
        problems: Vec<Problem>,
        loops: LoopGraph,
    },
}

impl CheckError {
    /// Problems found, empty for errors that stopped the check.
    pub fn problems(&self) -> &[Problem] {
        match self {
            CheckError::Problems { problems, .. } => problems,
            _ => &[],
        }
    }

    pub fn loops(&self) -> Option<&LoopGraph> {
        match self {
            CheckError::Problems { loops, .. } => Some(loops),
            _ => None,
        }
    }

    /// True if the check could not run to completion.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CheckError::Problems { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::ProblemKind;

    #[test]
    fn display() {
        let e = CheckError::UnimplementedInstruction {
            code: 3,
            course: 1,
            needle: 2,
        };
        assert_eq!(
            e.to_string(),
            "instruction 3 is not implemented (course 1, needle 2)"
        );
        assert!(e.is_fatal());
        assert!(e.problems().is_empty());

        let e = CheckError::Problems {
            problems: vec![Problem::new(ProblemKind::RackingWarning, 0, 0)],
            loops: LoopGraph::new(),
        };
        assert_eq!(e.to_string(), "pattern has 1 problem(s)");
        assert!(!e.is_fatal());
        assert_eq!(e.problems().len(), 1);
        assert!(e.loops().is_some());
    }
}
