// cable.rs — Cable resolution: rewrite cable codes as move stitches
//
// A cable crosses two adjacent groups of stitches. Each group is written with
// one cable code; the resolver finds the two halves of every cable in a
// course and replaces them with the move stitches the machine knits:
// the first half with `70 + travel`, the second with `60 + travel`, plus 20
// for the lower members of a family (10 and 100).
//
// Two cable families exist, {4, 5, 10} and {14, 15, 100}. They are matched
// independently, so a cable of one family may sit inside a cable of the
// other.
//
// Preconditions: `codes.len()` is a multiple of `width`.
// Postconditions: on success no cable code is left in the output.
// Failure modes: unmatched or oversized cables (syntax errors).
// Side effects: none.

use crate::diag::{Problem, ProblemKind};

// ── Families ───────────────────────────────────────────────────────────────

struct CableFamily {
    pairs: [(u8, u8); 4],
    lower: u8,
}

impl CableFamily {
    fn contains(&self, code: u8) -> bool {
        self.pairs.iter().any(|&(a, b)| a == code || b == code)
    }

    fn pairs_with(&self, first: u8, second: u8) -> bool {
        self.pairs.contains(&(first, second))
    }

    fn offset(&self, code: u8) -> usize {
        if code == self.lower {
            20
        } else {
            0
        }
    }
}

static FAMILIES: [CableFamily; 2] = [
    CableFamily {
        pairs: [(4, 5), (5, 4), (5, 10), (10, 5)],
        lower: 10,
    },
    CableFamily {
        pairs: [(14, 15), (15, 14), (15, 100), (100, 15)],
        lower: 100,
    },
];

/// True if `code` is written only as half of a cable.
pub fn is_cable_code(code: u8) -> bool {
    FAMILIES.iter().any(|f| f.contains(code))
}

// ── Scanner ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Scan {
    Idle,
    /// Inside the first half.
    First { code: u8, start: usize },
    /// First half ended at `end`; waiting for a second half.
    Gap { code: u8, start: usize, end: usize },
    /// Inside the second half.
    Second {
        code: u8,
        start: usize,
        end: usize,
        second: u8,
        second_start: usize,
    },
}

/// A matched cable, in needle offsets within its course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cable {
    first: u8,
    start: usize,
    end: usize,
    second: u8,
    second_start: usize,
    second_end: usize,
}

impl Cable {
    /// (first width, second width, first travel, second travel)
    fn measure(&self) -> (usize, usize, usize, usize) {
        let span = self.second_end - self.start;
        let first_width = self.end - self.start;
        let second_width = self.second_end - self.second_start;
        (
            first_width,
            second_width,
            span - first_width,
            span - second_width,
        )
    }
}

/// Scans one course for the cables of one family.
struct FamilyScanner<'f> {
    family: &'f CableFamily,
    state: Scan,
    cables: Vec<Cable>,
    incomplete: Vec<usize>,
}

impl<'f> FamilyScanner<'f> {
    fn new(family: &'f CableFamily) -> Self {
        Self {
            family,
            state: Scan::Idle,
            cables: Vec::new(),
            incomplete: Vec::new(),
        }
    }

    /// Feed the code at `needle`; `None` marks the end of the course.
    fn step(&mut self, needle: usize, code: Option<u8>) {
        let code = code.filter(|&c| self.family.contains(c));

        // A started cable: continue, end or pair up the first half.
        match self.state {
            Scan::First { code: first, .. } if code == Some(first) => {}
            Scan::First { code: first, start } | Scan::Gap { code: first, start, .. } => {
                let end = match self.state {
                    Scan::Gap { end, .. } => end,
                    _ => needle,
                };
                self.state = match code {
                    Some(c) if self.family.pairs_with(first, c) => Scan::Second {
                        code: first,
                        start,
                        end,
                        second: c,
                        second_start: needle,
                    },
                    Some(c) => {
                        self.incomplete.push(start);
                        Scan::First {
                            code: c,
                            start: needle,
                        }
                    }
                    None => Scan::Gap {
                        code: first,
                        start,
                        end,
                    },
                };
            }
            _ => {}
        }

        // A second half that stops here closes the cable.
        if let Scan::Second {
            code: first,
            start,
            end,
            second,
            second_start,
        } = self.state
        {
            if code != Some(second) {
                self.cables.push(Cable {
                    first,
                    start,
                    end,
                    second,
                    second_start,
                    second_end: needle,
                });
                self.state = Scan::Idle;
            }
        }

        if let (Scan::Idle, Some(c)) = (self.state, code) {
            self.state = Scan::First {
                code: c,
                start: needle,
            };
        }
    }

    /// End the course; a cable still waiting for its second half is incomplete.
    fn finish(mut self, width: usize) -> (Vec<Cable>, Vec<usize>) {
        self.step(width, None);
        if let Scan::First { start, .. } | Scan::Gap { start, .. } = self.state {
            self.incomplete.push(start);
        }
        (self.cables, self.incomplete)
    }
}

// ── Resolution ─────────────────────────────────────────────────────────────

/// Replace every cable in `codes` with move stitches.
///
/// Each cable half may be at most `max_cable_width` needles wide and may
/// travel at most `max_cable_width` needles. Returns all syntax problems,
/// sorted by (course, needle), if any cable cannot be resolved.
pub fn resolve_cables(
    codes: &[u8],
    width: usize,
    max_cable_width: usize,
) -> Result<Vec<u8>, Vec<Problem>> {
    let mut resolved = codes.to_vec();
    let mut problems = Vec::new();

    if width == 0 {
        return Ok(resolved);
    }

    for (course, row) in codes.chunks(width).enumerate() {
        let mut scanners: Vec<FamilyScanner<'_>> =
            FAMILIES.iter().map(FamilyScanner::new).collect();
        for (needle, &code) in row.iter().enumerate() {
            for scanner in &mut scanners {
                scanner.step(needle, Some(code));
            }
        }

        for scanner in scanners {
            let family = scanner.family;
            let (cables, incomplete) = scanner.finish(row.len());
            problems.extend(
                incomplete
                    .into_iter()
                    .map(|needle| Problem::new(ProblemKind::IncompleteCable, course, needle)),
            );
            for cable in cables {
                match replacement(family, &cable, max_cable_width) {
                    Some((first, second)) => {
                        let base = course * width;
                        resolved[base + cable.start..base + cable.end].fill(first);
                        resolved[base + cable.second_start..base + cable.second_end].fill(second);
                    }
                    None => problems.push(Problem::new(
                        ProblemKind::OversizedCable,
                        course,
                        cable.start,
                    )),
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(resolved)
    } else {
        problems.sort_by_key(|p| (p.course, p.needle));
        Err(problems)
    }
}

/// Move-stitch codes for the two halves, or `None` if the cable is oversized.
fn replacement(family: &CableFamily, cable: &Cable, max_cable_width: usize) -> Option<(u8, u8)> {
    let (first_width, second_width, first_travel, second_travel) = cable.measure();
    if [first_width, second_width, first_travel, second_travel]
        .iter()
        .any(|&n| n > max_cable_width)
    {
        return None;
    }
    let first = 70 + first_travel + family.offset(cable.first);
    let second = 60 + second_travel + family.offset(cable.second);
    Some((u8::try_from(first).ok()?, u8::try_from(second).ok()?))
}
