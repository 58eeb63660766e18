// phase.rs — Course phases: what the machine does, in which order, per course
//
// Every course is knitted as the same fixed sequence of phases. The order is
// load-bearing: each phase works on the needle state left by the previous
// one. Descriptors record which phases follow the carriage and which are
// followed by a loop-count check.

// ── Phase identifiers ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoursePhase {
    LoopHold,
    TransferBeforeOperation,
    Operation,
    TransferBeforeRacking,
    Racking,
    TransferAfterRacking,
}

// ── Phase descriptor ───────────────────────────────────────────────────────

/// Static metadata about a course phase.
pub struct PhaseDescriptor {
    /// Human-readable name for trace output.
    pub name: &'static str,
    /// Needles are visited in carriage direction.
    pub carriage_ordered: bool,
    /// Needle occupancy is checked once the phase is over. The racking phase
    /// checks after every racking step instead.
    pub checks_loop_count: bool,
    /// What holds once the phase is over (documentation only).
    pub invariants: &'static str,
}

pub fn descriptor(phase: CoursePhase) -> PhaseDescriptor {
    match phase {
        CoursePhase::LoopHold => PhaseDescriptor {
            name: "loop_hold",
            carriage_ordered: false,
            checks_loop_count: false,
            invariants: "loops held too long are reported",
        },
        CoursePhase::TransferBeforeOperation => PhaseDescriptor {
            name: "transfer_before_operation",
            carriage_ordered: true,
            checks_loop_count: true,
            invariants: "links transfers applied against the previous course",
        },
        CoursePhase::Operation => PhaseDescriptor {
            name: "operation",
            carriage_ordered: true,
            checks_loop_count: true,
            invariants: "new loops created, knitted loops released",
        },
        CoursePhase::TransferBeforeRacking => PhaseDescriptor {
            name: "transfer_before_racking",
            carriage_ordered: true,
            checks_loop_count: true,
            invariants: "loops parked on the opposite bed",
        },
        CoursePhase::Racking => PhaseDescriptor {
            name: "racking",
            carriage_ordered: true,
            checks_loop_count: false,
            invariants: "racked transfers applied, racking back to zero",
        },
        CoursePhase::TransferAfterRacking => PhaseDescriptor {
            name: "transfer_after_racking",
            carriage_ordered: true,
            checks_loop_count: true,
            invariants: "moved loops returned to their knitting bed",
        },
    }
}

/// All phases of one course, in execution order.
pub const COURSE_PHASES: [CoursePhase; 6] = [
    CoursePhase::LoopHold,
    CoursePhase::TransferBeforeOperation,
    CoursePhase::Operation,
    CoursePhase::TransferBeforeRacking,
    CoursePhase::Racking,
    CoursePhase::TransferAfterRacking,
];

/// Rackings in the order the machine performs them: small before large,
/// left before right.
pub const RACKING_ORDER: [i8; 14] = [-1, 1, -2, 2, -3, 3, -4, 4, -5, 5, -6, 6, -7, 7];

/// Needles in the order the carriage passes them: even courses left to
/// right, odd courses right to left.
pub fn carriage_order(course: usize, width: usize) -> impl Iterator<Item = usize> {
    let going_right = course % 2 == 0;
    (0..width).map(move |i| if going_right { i } else { width - 1 - i })
}

// ── Tests ──────────────────────────────────────────────────────────────────
