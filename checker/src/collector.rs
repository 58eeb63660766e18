// collector.rs — Problem collector with per-location deduplication
//
// Preconditions: none.
// Postconditions: at most one problem per (location, kind); a warning and the
//   error of the same family never coexist at one location.
// Failure modes: none.
// Side effects: none.

use crate::diag::{Problem, Severity};

/// Accumulates problems in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemCollector {
    problems: Vec<Problem>,
}

impl ProblemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem, merging it with what is already known at its location.
    ///
    /// A repeat of the same kind is ignored. An error replaces the warning of
    /// its family in place; a warning is dropped if its error is present.
    /// Anything else is appended.
    pub fn record(&mut self, problem: Problem) {
        for existing in self.problems.iter_mut() {
            if !existing.same_location(&problem) {
                continue;
            }
            if existing.kind == problem.kind {
                return;
            }
            if existing.family() == problem.family() {
                match (existing.severity(), problem.severity()) {
                    (Severity::Warning, Severity::Error) => {
                        *existing = problem;
                        return;
                    }
                    (Severity::Error, Severity::Warning) => return,
                    _ => {}
                }
            }
        }
        self.problems.push(problem);
    }

    pub fn extend(&mut self, problems: impl IntoIterator<Item = Problem>) {
        for p in problems {
            self.record(p);
        }
    }

    /// True if any problem is an error or a syntax error.
    pub fn has_blocking_problems(&self) -> bool {
        self.problems
            .iter()
            .any(|p| p.severity() >= Severity::Error)
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.problems.iter().map(Problem::severity).max()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}
