// instruction.rs — Instruction table: what the machine does for each code
//
// Maps every knitpaint code (0–255) to the static description of the
// machine action it encodes. Codes without an entry are invalid.
//
// Preconditions: none (the standard table is built once on first use).
// Postconditions: every defined entry satisfies `Instruction::is_consistent`.
// Failure modes: none (lookup of an undefined code returns None).
// Side effects: none.

use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

// ── Beds, transfers and operations ─────────────────────────────────────────

/// Bed targeted by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bed {
    Front,
    Back,
    FrontAndBack,
}

/// One physical needle bed. Loops are only ever held on one of these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Front => 0,
            Side::Back => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

impl Bed {
    /// The single physical bed this target refers to, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Bed::Front => Some(Side::Front),
            Bed::Back => Some(Side::Back),
            Bed::FrontAndBack => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    Knit,
    Tuck,
    Split,
}

/// Direction of a loop transfer between the two beds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Transfer {
    FrontToBack,
    BackToFront,
}

impl Transfer {
    /// The transfer that empties `side`.
    pub fn off(side: Side) -> Transfer {
        match side {
            Side::Front => Transfer::FrontToBack,
            Side::Back => Transfer::BackToFront,
        }
    }

    /// The transfer that fills `side`.
    pub fn onto(side: Side) -> Transfer {
        Transfer::off(side.opposite())
    }

    pub fn source(self) -> Side {
        match self {
            Transfer::FrontToBack => Side::Front,
            Transfer::BackToFront => Side::Back,
        }
    }

    pub fn target(self) -> Side {
        self.source().opposite()
    }
}

/// A transfer performed before the stitch operation. `Links` is resolved
/// per course against the neighbouring course (see `machine`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkedTransfer {
    Direct(Transfer),
    Links,
}

// ── Instruction ────────────────────────────────────────────────────────────

/// Static description of one knitpaint code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Instruction {
    pub bed: Option<Bed>,
    /// `None` is a miss.
    pub operation: Option<Operation>,
    pub transfer_before_operation: Option<LinkedTransfer>,
    pub transfer_before_racking: Option<Transfer>,
    /// Needle offset in [-7, 7] used by the racking phase.
    pub racking: i8,
    pub transfer_while_racking: Option<Transfer>,
    pub transfer_after_racking: Option<Transfer>,
}

impl Instruction {
    /// A miss with no bed: the needle is left alone.
    pub const MISS: Instruction = Instruction {
        bed: None,
        operation: None,
        transfer_before_operation: None,
        transfer_before_racking: None,
        racking: 0,
        transfer_while_racking: None,
        transfer_after_racking: None,
    };

    pub fn new(bed: Bed, operation: Option<Operation>) -> Self {
        Self {
            bed: Some(bed),
            operation,
            ..Self::MISS
        }
    }

    /// Mark the instruction as taking part in the links process.
    pub fn links(mut self) -> Self {
        self.transfer_before_operation = Some(LinkedTransfer::Links);
        self
    }

    pub fn before_racking(mut self, transfer: Transfer) -> Self {
        self.transfer_before_racking = Some(transfer);
        self
    }

    pub fn racked(mut self, racking: i8, transfer: Transfer) -> Self {
        self.racking = racking;
        self.transfer_while_racking = Some(transfer);
        self
    }

    pub fn after_racking(mut self, transfer: Transfer) -> Self {
        self.transfer_after_racking = Some(transfer);
        self
    }

    pub fn needs_links_process(&self) -> bool {
        self.transfer_before_operation == Some(LinkedTransfer::Links)
    }

    /// The physical bed targeted, if the instruction targets exactly one.
    pub fn side(&self) -> Option<Side> {
        self.bed.and_then(Bed::side)
    }

    /// True if `self` and `other` target the front and back bed (in either order).
    pub fn opposes(&self, other: &Instruction) -> bool {
        matches!(
            (self.side(), other.side()),
            (Some(Side::Front), Some(Side::Back)) | (Some(Side::Back), Some(Side::Front))
        )
    }

    /// A back-bed instruction that moves its loop sideways.
    pub fn is_back_move(&self) -> bool {
        self.side() == Some(Side::Back) && self.racking != 0
    }

    pub fn is_front_move(&self) -> bool {
        self.side() == Some(Side::Front) && self.racking != 0
    }

    /// Back-move sequence used when no front move shares the course: the
    /// loop is parked on the front bed before racking and racked back onto
    /// the back bed, so nothing is left to do after racking.
    pub fn with_parked_back_move(&self) -> Instruction {
        if !self.is_back_move() {
            return *self;
        }
        Instruction {
            transfer_before_racking: Some(Transfer::BackToFront),
            transfer_while_racking: Some(Transfer::FrontToBack),
            transfer_after_racking: None,
            ..*self
        }
    }

    /// Racking lies in [-7, 7] and a while-racking transfer exists exactly
    /// when the instruction racks.
    pub fn is_consistent(&self) -> bool {
        (-7..=7).contains(&self.racking)
            && (self.racking == 0) == self.transfer_while_racking.is_none()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bed = match self.bed {
            Some(Bed::Front) => "front",
            Some(Bed::Back) => "back",
            Some(Bed::FrontAndBack) => "front+back",
            None => "none",
        };
        let op = match self.operation {
            Some(Operation::Knit) => "knit",
            Some(Operation::Tuck) => "tuck",
            Some(Operation::Split) => "split",
            None => "miss",
        };
        write!(f, "{} {}", bed, op)?;
        if self.racking != 0 {
            write!(f, " rack {:+}", self.racking)?;
        }
        if self.needs_links_process() {
            write!(f, " (links)")?;
        }
        Ok(())
    }
}

// ── Table ──────────────────────────────────────────────────────────────────

/// Lookup from code to instruction.
#[derive(Debug, Clone)]
pub struct InstructionTable {
    entries: [Option<Instruction>; 256],
}

impl Default for InstructionTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl InstructionTable {
    pub fn empty() -> Self {
        Self {
            entries: [None; 256],
        }
    }

    /// The table of every code the checker knows how to knit.
    pub fn standard() -> &'static InstructionTable {
        &STANDARD
    }

    pub fn define(&mut self, code: u8, instruction: Instruction) {
        debug_assert!(
            instruction.is_consistent(),
            "inconsistent instruction for code {code}"
        );
        self.entries[code as usize] = Some(instruction);
    }

    pub fn get(&self, code: u8) -> Option<&Instruction> {
        self.entries[code as usize].as_ref()
    }

    pub fn contains(&self, code: u8) -> bool {
        self.entries[code as usize].is_some()
    }

    /// Defined codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(|&c| self.contains(c))
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static STANDARD: LazyLock<InstructionTable> = LazyLock::new(build_standard_table);

fn front_move(racking: i8) -> Instruction {
    Instruction::new(Bed::Front, Some(Operation::Knit))
        .links()
        .before_racking(Transfer::FrontToBack)
        .racked(racking, Transfer::BackToFront)
}

fn front_move_only(racking: i8) -> Instruction {
    Instruction {
        operation: None,
        ..front_move(racking)
    }
}

fn back_move(racking: i8) -> Instruction {
    Instruction::new(Bed::Back, Some(Operation::Knit))
        .links()
        .racked(racking, Transfer::BackToFront)
        .after_racking(Transfer::FrontToBack)
}

fn back_move_only(racking: i8) -> Instruction {
    Instruction {
        operation: None,
        ..back_move(racking)
    }
}

fn front_knit_racked(racking: i8) -> Instruction {
    Instruction::new(Bed::Front, Some(Operation::Knit))
        .racked(racking, Transfer::FrontToBack)
        .after_racking(Transfer::BackToFront)
}

fn build_standard_table() -> InstructionTable {
    use Operation::{Knit, Tuck};
    use Transfer::{BackToFront, FrontToBack};

    let mut t = InstructionTable::empty();

    t.define(0, Instruction::MISS);
    t.define(16, Instruction::MISS);

    // Plain stitches.
    t.define(1, Instruction::new(Bed::Front, Some(Knit)).links());
    t.define(2, Instruction::new(Bed::Back, Some(Knit)).links());
    t.define(11, Instruction::new(Bed::Front, Some(Tuck)).links());
    t.define(12, Instruction::new(Bed::Back, Some(Tuck)).links());
    t.define(51, Instruction::new(Bed::Front, Some(Knit)));
    t.define(52, Instruction::new(Bed::Back, Some(Knit)));
    t.define(116, Instruction::new(Bed::Back, None).links());
    t.define(117, Instruction::new(Bed::Front, None).links());

    // Knit followed by a transfer.
    t.define(
        20,
        Instruction::new(Bed::Front, Some(Knit)).before_racking(FrontToBack),
    );
    t.define(
        29,
        Instruction::new(Bed::Front, Some(Knit)).before_racking(BackToFront),
    );
    t.define(
        40,
        Instruction::new(Bed::Front, Some(Knit))
            .before_racking(FrontToBack)
            .after_racking(BackToFront),
    );
    t.define(
        50,
        Instruction::new(Bed::Back, Some(Knit))
            .before_racking(BackToFront)
            .after_racking(FrontToBack),
    );
    for (code, racking) in [(21, 1), (22, 2), (23, 3), (24, -1), (25, -2), (26, -3)] {
        t.define(code, front_knit_racked(racking));
    }

    // Move stitches. 61/71/81/91 share the definition of 6/7/8/9.
    for (codes, racking) in [([6, 61], -1), ([7, 71], 1)] {
        for code in codes {
            t.define(code, front_move(racking));
        }
    }
    for (codes, racking) in [([8, 81], -1), ([9, 91], 1)] {
        for code in codes {
            t.define(code, back_move(racking));
        }
    }
    for (code, racking) in [(62, -2), (63, -3), (64, -4), (72, 2), (73, 3), (74, 4)] {
        t.define(code, front_move(racking));
    }
    for (code, racking) in [(82, -2), (83, -3), (84, -4), (92, 2), (93, 3), (94, 4)] {
        t.define(code, back_move(racking));
    }
    for (code, racking) in [(65, -1), (66, -2), (67, -4), (75, 1), (76, 2), (77, 4)] {
        t.define(code, front_move_only(racking));
    }
    for (code, racking) in [(85, -1), (86, -2), (87, -4)] {
        t.define(code, back_move_only(racking));
    }
    for (code, racking) in [(95, 1), (96, 2), (97, 4)] {
        t.define(code, back_move(racking));
    }

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_size() {
        assert_eq!(InstructionTable::standard().len(), 52);
    }

    #[test]
    fn every_standard_entry_is_consistent() {
        let table = InstructionTable::standard();
        for code in table.codes() {
            let ins = table.get(code).unwrap();
            assert!(ins.is_consistent(), "code {code} is inconsistent: {ins:?}");
        }
    }

    #[test]
    fn undefined_codes() {
        let table = InstructionTable::standard();
        for code in [3u8, 4, 5, 10, 14, 15, 100, 255] {
            assert!(table.get(code).is_none(), "code {code} should be undefined");
        }
    }

    #[test]
    fn aliases_share_definition() {
        let table = InstructionTable::standard();
        for (a, b) in [(6, 61), (7, 71), (8, 81), (9, 91)] {
            assert_eq!(table.get(a), table.get(b));
        }
    }

    #[test]
    fn links_flags() {
        let table = InstructionTable::standard();
        for code in [1u8, 2, 6, 9, 11, 12, 65, 97, 116, 117] {
            assert!(table.get(code).unwrap().needs_links_process(), "{code}");
        }
        for code in [0u8, 16, 20, 21, 29, 40, 50, 51, 52] {
            assert!(!table.get(code).unwrap().needs_links_process(), "{code}");
        }
    }

    #[test]
    fn move_stitch_shape() {
        let table = InstructionTable::standard();
        let left = table.get(6).unwrap();
        assert_eq!(left.bed, Some(Bed::Front));
        assert_eq!(left.transfer_before_racking, Some(Transfer::FrontToBack));
        assert_eq!(left.racking, -1);
        assert_eq!(left.transfer_while_racking, Some(Transfer::BackToFront));
        assert_eq!(left.transfer_after_racking, None);

        let back = table.get(93).unwrap();
        assert_eq!(back.bed, Some(Bed::Back));
        assert_eq!(back.transfer_before_racking, None);
        assert_eq!(back.racking, 3);
        assert_eq!(back.transfer_while_racking, Some(Transfer::BackToFront));
        assert_eq!(back.transfer_after_racking, Some(Transfer::FrontToBack));
    }

    #[test]
    fn transfer_only_moves_are_misses() {
        let table = InstructionTable::standard();
        for code in [65u8, 66, 67, 75, 76, 77, 85, 86, 87] {
            let ins = table.get(code).unwrap();
            assert_eq!(ins.operation, None, "{code}");
            assert_ne!(ins.racking, 0, "{code}");
        }
    }

    #[test]
    fn parked_back_move() {
        let table = InstructionTable::standard();
        let parked = table.get(8).unwrap().with_parked_back_move();
        assert_eq!(parked.transfer_before_racking, Some(Transfer::BackToFront));
        assert_eq!(parked.racking, -1);
        assert_eq!(parked.transfer_while_racking, Some(Transfer::FrontToBack));
        assert_eq!(parked.transfer_after_racking, None);
        assert!(parked.is_consistent());

        // Front moves and plain stitches are untouched.
        let front = *table.get(7).unwrap();
        assert_eq!(front.with_parked_back_move(), front);
        let plain = *table.get(52).unwrap();
        assert_eq!(plain.with_parked_back_move(), plain);
    }

    #[test]
    fn opposes() {
        let table = InstructionTable::standard();
        let front = table.get(1).unwrap();
        let back = table.get(2).unwrap();
        let miss = table.get(0).unwrap();
        assert!(front.opposes(back));
        assert!(back.opposes(front));
        assert!(!front.opposes(front));
        assert!(!front.opposes(miss));
    }

    #[test]
    fn transfer_sides() {
        assert_eq!(Transfer::off(Side::Front), Transfer::FrontToBack);
        assert_eq!(Transfer::onto(Side::Front), Transfer::BackToFront);
        assert_eq!(Transfer::FrontToBack.source(), Side::Front);
        assert_eq!(Transfer::FrontToBack.target(), Side::Back);
    }

    #[test]
    fn display() {
        let table = InstructionTable::standard();
        assert_eq!(table.get(1).unwrap().to_string(), "front knit (links)");
        assert_eq!(table.get(73).unwrap().to_string(), "front knit rack +3 (links)");
        assert_eq!(table.get(0).unwrap().to_string(), "none miss");
    }
}
