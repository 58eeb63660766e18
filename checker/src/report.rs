// report.rs — Machine-readable check report
//
// Serializes the outcome of a check for downstream tools: which pattern was
// checked, whether it passed, every problem and every loop formed.
//
// Preconditions: the check state has run to completion or halted.
// Postconditions: `to_json` output is stable for identical inputs.
// Failure modes: serialization errors from serde_json.
// Side effects: none.

use serde::Serialize;

use crate::diag::{DiagCode, Problem, ProblemKind, Severity};
use crate::loops::Loop;
use crate::pipeline::{CheckState, ProvenanceRecord};

#[derive(Debug, Clone, Serialize)]
pub struct ProblemRecord {
    pub code: DiagCode,
    pub kind: ProblemKind,
    pub severity: Severity,
    pub course: usize,
    pub needle: usize,
    pub message: &'static str,
}

impl From<&Problem> for ProblemRecord {
    fn from(p: &Problem) -> Self {
        Self {
            code: p.code(),
            kind: p.kind,
            severity: p.severity(),
            course: p.course,
            needle: p.needle,
            message: p.kind.message(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub provenance: ProvenanceRecord,
    pub ok: bool,
    pub problems: Vec<ProblemRecord>,
    /// Loops formed before the check stopped; empty if it never simulated.
    pub loops: &'a [Loop],
}

impl<'a> Report<'a> {
    pub fn new(state: &'a CheckState) -> Self {
        Self {
            provenance: state.provenance.record(),
            ok: state.is_ok(),
            problems: state.problems.problems().iter().map(ProblemRecord::from).collect(),
            loops: state.loops.as_ref().map_or(&[], |l| l.as_slice()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckOptions;
    use crate::pattern::Pattern;
    use crate::pipeline::run_pipeline;
    use crate::stage::StageId;

    fn run(courses: &[&[u8]]) -> CheckState {
        let mut state = CheckState::new(Pattern::from_courses(courses).unwrap());
        let _ = run_pipeline(
            &mut state,
            StageId::ScanPickups,
            &CheckOptions::default(),
            false,
            |_, _| {},
        );
        state
    }

    #[test]
    fn clean_report() {
        let state = run(&[&[1, 1], &[1, 1]]);
        let json: serde_json::Value =
            serde_json::from_str(&Report::new(&state).to_json().unwrap()).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["problems"].as_array().unwrap().len(), 0);
        assert_eq!(json["loops"].as_array().unwrap().len(), 4);
        assert_eq!(json["loops"][0]["dst"]["course"], 1);
        assert_eq!(json["provenance"]["width"], 2);
        assert_eq!(json["provenance"]["height"], 2);
        assert_eq!(
            json["provenance"]["pattern_hash"].as_str().unwrap().len(),
            64
        );
    }

    #[test]
    fn problem_records() {
        let state = run(&[&[1, 4, 1]]);
        let json: serde_json::Value =
            serde_json::from_str(&Report::new(&state).to_json().unwrap()).unwrap();
        assert_eq!(json["ok"], false);
        let p = &json["problems"][0];
        assert_eq!(p["code"], "K0001");
        assert_eq!(p["kind"], "IncompleteCable");
        assert_eq!(p["severity"], "syntax_error");
        assert_eq!(p["course"], 0);
        assert_eq!(p["message"], "cable has no matching second half");
        assert!(json["loops"].as_array().unwrap().is_empty());
    }
}
