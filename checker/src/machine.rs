// machine.rs — Virtual V-bed knitting machine
//
// Knits decoded courses on two virtual needle beds, one course at a time,
// following the phases in `phase`. Every loop formed is recorded in a loop
// graph; everything the physical machine would reject or struggle with is
// recorded as a problem.
//
// Preconditions: courses were produced by `decode` for the machine's width.
// Postconditions: after `knit`, every course has run all of its phases.
// Failure modes: none; faults are recorded as problems.
// Side effects: emits `tracing` events at trace level per course.

use std::mem;

use tracing::trace;

use crate::collector::ProblemCollector;
use crate::config::Thresholds;
use crate::diag::{Problem, ProblemKind};
use crate::error::CheckError;
use crate::id::LoopId;
use crate::instruction::{Instruction, InstructionTable, LinkedTransfer, Operation, Side, Transfer};
use crate::loops::LoopGraph;
use crate::phase::{carriage_order, descriptor, CoursePhase, COURSE_PHASES, RACKING_ORDER};

// ── Decoding ───────────────────────────────────────────────────────────────

/// Look up every code of a resolved pattern, course by course.
///
/// Fails on the first code (in course order) without an instruction, or
/// whose stitch operation has no single bed to work on.
pub fn decode(
    codes: &[u8],
    width: usize,
    table: &InstructionTable,
) -> Result<Vec<Vec<Instruction>>, CheckError> {
    if width == 0 {
        return Err(CheckError::Dimensions {
            width,
            len: codes.len(),
        });
    }
    codes
        .chunks(width)
        .enumerate()
        .map(|(course, row)| {
            row.iter()
                .enumerate()
                .map(|(needle, &code)| {
                    let ins = table.get(code).ok_or(CheckError::UnimplementedInstruction {
                        code,
                        course,
                        needle,
                    })?;
                    if ins.operation.is_some() && ins.side().is_none() {
                        return Err(CheckError::UnsupportedBed {
                            code,
                            course,
                            needle,
                        });
                    }
                    Ok(*ins)
                })
                .collect()
        })
        .collect()
}

/// The instructions actually executed for one course.
///
/// Back moves are parked on the front bed before racking unless a front
/// move shares the course, in which case both rack together and the back
/// loops return to the back bed after racking.
pub fn plan_course(course: &[Instruction]) -> Vec<Instruction> {
    if course.iter().any(Instruction::is_front_move) {
        course.to_vec()
    } else {
        course
            .iter()
            .map(Instruction::with_parked_back_move)
            .collect()
    }
}

// ── Machine ────────────────────────────────────────────────────────────────

/// Result of knitting: every loop formed and every problem found.
#[derive(Debug, Clone, Default)]
pub struct MachineOutput {
    pub loops: LoopGraph,
    pub problems: ProblemCollector,
}

pub struct VirtualKnittingMachine {
    thresholds: Thresholds,
    width: usize,
    /// Loops on each needle, indexed by `Side::index`.
    beds: [Vec<Vec<LoopId>>; 2],
    loops: LoopGraph,
    problems: ProblemCollector,
    course: usize,
    racking: i8,
}

impl VirtualKnittingMachine {
    pub fn new(width: usize, thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            width,
            beds: [vec![Vec::new(); width], vec![Vec::new(); width]],
            loops: LoopGraph::new(),
            problems: ProblemCollector::new(),
            course: 0,
            racking: 0,
        }
    }

    /// Loops currently held by a needle.
    pub fn needle(&self, side: Side, needle: usize) -> &[LoopId] {
        &self.beds[side.index()][needle]
    }

    pub fn loops(&self) -> &LoopGraph {
        &self.loops
    }

    pub fn problems(&self) -> &ProblemCollector {
        &self.problems
    }

    /// Knit every course in order.
    pub fn knit(&mut self, courses: &[Vec<Instruction>]) {
        for course in 0..courses.len() {
            self.knit_course(courses, course);
        }
    }

    /// Knit one course. `courses` is the whole pattern: the links process
    /// looks at the neighbouring courses.
    pub fn knit_course(&mut self, courses: &[Vec<Instruction>], course: usize) {
        self.course = course;
        let raw = &courses[course];
        debug_assert_eq!(raw.len(), self.width);
        let plan = plan_course(raw);
        let carriage: Vec<usize> = carriage_order(course, self.width).collect();
        let in_place: Vec<usize> = (0..self.width).collect();

        for phase in COURSE_PHASES {
            let desc = descriptor(phase);
            let order = if desc.carriage_ordered { &carriage } else { &in_place };
            match phase {
                CoursePhase::LoopHold => self.check_loop_hold(),
                CoursePhase::TransferBeforeOperation => {
                    for &wale in order {
                        self.transfer_before_operation(courses, wale);
                    }
                }
                CoursePhase::Operation => {
                    for &wale in order {
                        self.operate(&plan[wale], wale);
                    }
                }
                CoursePhase::TransferBeforeRacking => {
                    for &wale in order {
                        if let Some(t) = plan[wale].transfer_before_racking {
                            self.transfer(t, wale, 0);
                        }
                    }
                }
                CoursePhase::Racking => self.rack(&plan, order),
                CoursePhase::TransferAfterRacking => {
                    for &wale in order {
                        self.transfer_after_racking(courses, &plan[wale], wale);
                    }
                }
            }
            if desc.checks_loop_count {
                self.check_loop_counts();
            }
            trace!(course, phase = desc.name, loops = self.loops.len(), "phase complete");
        }
    }

    /// Record continuous pickup stitches over everything knitted so far.
    pub fn scan_pickups(&mut self) {
        scan_continuous_pickups(&self.loops, &mut self.problems);
    }

    pub fn finish(self) -> MachineOutput {
        MachineOutput {
            loops: self.loops,
            problems: self.problems,
        }
    }

    // ── Phases ───────────────────────────────────────────────────────────

    fn transfer_before_operation(&mut self, courses: &[Vec<Instruction>], wale: usize) {
        let current = &courses[self.course][wale];
        match current.transfer_before_operation {
            Some(LinkedTransfer::Direct(t)) => self.transfer(t, wale, 0),
            Some(LinkedTransfer::Links) => {
                if let Some(t) = self.links_from_previous(courses, current, wale) {
                    self.transfer(t, wale, 0);
                }
            }
            None => {}
        }
    }

    /// The links transfer into this course: the previous course at the same
    /// needle must take part in the links process on the opposite bed.
    fn links_from_previous(
        &self,
        courses: &[Vec<Instruction>],
        current: &Instruction,
        wale: usize,
    ) -> Option<Transfer> {
        let previous = courses.get(self.course.checked_sub(1)?)?.get(wale)?;
        if previous.needs_links_process() && current.opposes(previous) {
            current.side().map(Transfer::onto)
        } else {
            None
        }
    }

    fn operate(&mut self, ins: &Instruction, wale: usize) {
        let (Some(op), Some(side)) = (ins.operation, ins.side()) else {
            return;
        };
        let links = ins.needs_links_process();
        match op {
            Operation::Knit => self.knit_loop(side, wale, links),
            Operation::Tuck => self.tuck_loop(side, wale, links),
            Operation::Split => {
                self.transfer(Transfer::off(side), wale, 0);
                self.knit_loop(side, wale, links);
            }
        }
    }

    fn knit_loop(&mut self, side: Side, wale: usize, links: bool) {
        let id = self.loops.create(self.course, wale, links);
        let released = mem::replace(&mut self.beds[side.index()][wale], vec![id]);
        self.loops.knit_through(id, released);
    }

    fn tuck_loop(&mut self, side: Side, wale: usize, links: bool) {
        let id = self.loops.create(self.course, wale, links);
        self.beds[side.index()][wale].push(id);
    }

    fn rack(&mut self, plan: &[Instruction], order: &[usize]) {
        let (mut min, mut max) = (0i8, 0i8);
        for racking in RACKING_ORDER {
            self.racking = racking;
            for &wale in order {
                let ins = &plan[wale];
                if ins.racking != racking {
                    continue;
                }
                if let Some(t) = ins.transfer_while_racking {
                    self.transfer(t, wale, 0);
                }
                min = min.min(racking);
                max = max.max(racking);
                let spread = max.abs_diff(min);
                if spread >= self.thresholds.racking_warning {
                    self.report(ProblemKind::RackingWarning, wale);
                }
                if spread >= self.thresholds.racking_error {
                    self.report(ProblemKind::RackingError, wale);
                }
            }
            self.check_loop_counts();
        }
        self.racking = 0;
    }

    /// Loops that were racked are picked up at their racked position. When
    /// the next course continues them on the opposite bed with the links
    /// process, they are handed over to that bed instead.
    fn transfer_after_racking(&mut self, courses: &[Vec<Instruction>], ins: &Instruction, wale: usize) {
        let raw = &courses[self.course][wale];
        let offset = ins.racking;
        let transfer = self
            .links_into_next(courses, raw, wale, offset)
            .or(ins.transfer_after_racking);
        if let Some(t) = transfer {
            self.transfer(t, wale, offset);
        }
    }

    fn links_into_next(
        &self,
        courses: &[Vec<Instruction>],
        current: &Instruction,
        wale: usize,
        offset: i8,
    ) -> Option<Transfer> {
        let next_course = courses.get(self.course + 1)?;
        let next = next_course.get(self.shift(wale, offset)?)?;
        if current.needs_links_process() && next.needs_links_process() && current.opposes(next) {
            current.side().map(Transfer::off)
        } else {
            None
        }
    }

    // ── Transfer primitive ───────────────────────────────────────────────

    /// Move every loop from needle `wale + offset` to the other bed, at the
    /// current racking. Problems are reported at `wale`.
    fn transfer(&mut self, transfer: Transfer, wale: usize, offset: i8) {
        let Some(src) = self.shift(wale, offset) else {
            self.report(ProblemKind::TransferOutOfBedError, wale);
            return;
        };
        let from = transfer.source().index();
        let to = transfer.target().index();

        let count = self.beds[from][src].len();
        if count >= self.thresholds.overlapped_transfer_warning {
            self.report(ProblemKind::TransferWithOverlappedLoopsWarning, wale);
        }
        if count >= self.thresholds.overlapped_transfer_error {
            self.report(ProblemKind::TransferWithOverlappedLoopsError, wale);
        }
        let moved = &self.beds[from][src];
        if !moved.is_empty() && moved.iter().all(|&id| self.loops[id].is_pickup_stitch()) {
            self.report(ProblemKind::TransferOfPickupStitchWarning, wale);
        }

        let Some(dst) = self.shift(src, self.racking) else {
            self.report(ProblemKind::TransferOutOfBedError, wale);
            return;
        };
        let moved = mem::take(&mut self.beds[from][src]);
        self.beds[to][dst].extend(moved);
    }

    // ── Checks ───────────────────────────────────────────────────────────

    fn check_loop_counts(&mut self) {
        let t = self.thresholds;
        for bed in 0..self.beds.len() {
            for needle in 0..self.width {
                let count = self.beds[bed][needle].len();
                if count >= t.loops_in_needle_error {
                    self.report(ProblemKind::NumberOfLoopsInNeedleError, needle);
                }
                if count >= t.loops_in_needle_warning {
                    self.report(ProblemKind::NumberOfLoopsInNeedleWarning, needle);
                }
            }
        }
    }

    fn check_loop_hold(&mut self) {
        let t = self.thresholds;
        for bed in 0..self.beds.len() {
            for needle in 0..self.width {
                let oldest = self.beds[bed][needle]
                    .iter()
                    .map(|&id| self.loops[id].src_course)
                    .min();
                let Some(src_course) = oldest else {
                    continue;
                };
                let held = self.course - src_course;
                if held >= t.loop_hold_warning {
                    self.report(ProblemKind::LoopHoldWarning, needle);
                }
                if held >= t.loop_hold_error {
                    self.report(ProblemKind::LoopHoldError, needle);
                }
            }
        }
    }

    fn report(&mut self, kind: ProblemKind, needle: usize) {
        self.problems.record(Problem::new(kind, self.course, needle));
    }

    /// `wale + offset` if it lies on the bed.
    fn shift(&self, wale: usize, offset: i8) -> Option<usize> {
        let n = wale.checked_add_signed(offset as isize)?;
        (n < self.width).then_some(n)
    }
}

/// Record a warning for every continuous pickup stitch, at the place the
/// stitch was formed.
pub fn scan_continuous_pickups(loops: &LoopGraph, problems: &mut ProblemCollector) {
    for l in loops.continuous_pickup_stitches() {
        problems.record(Problem::new(
            ProblemKind::ContinuousPickupStitchWarning,
            l.src_course,
            l.src_wale,
        ));
    }
}
