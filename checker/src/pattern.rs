// pattern.rs — Knitpaint patterns: a grid of instruction codes
//
// Courses are stored bottom-up: course 0 is knitted first. The text form
// lists courses top-down as they appear on a knitpaint canvas, so the last
// line of a `.kp` file is course 0.
//
// Preconditions: none.
// Postconditions: every `Pattern` holds whole courses of `width` codes.
// Failure modes: `parse` reports lex errors and ragged lines with their line number.
// Side effects: none.

use std::fmt;

use crate::config::TileOptions;
use crate::error::CheckError;
use crate::lexer::{lex, Token};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    width: usize,
    codes: Vec<u8>,
}

/// A problem reading a `.kp` file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl Pattern {
    pub fn new(width: usize, codes: Vec<u8>) -> Result<Self, CheckError> {
        if width == 0 || codes.len() % width != 0 {
            return Err(CheckError::Dimensions {
                width,
                len: codes.len(),
            });
        }
        Ok(Self { width, codes })
    }

    /// Build a pattern from courses listed course 0 first.
    pub fn from_courses<R: AsRef<[u8]>>(courses: &[R]) -> Result<Self, CheckError> {
        let width = courses.first().map_or(0, |c| c.as_ref().len());
        let codes: Vec<u8> = courses
            .iter()
            .flat_map(|c| c.as_ref().iter().copied())
            .collect();
        if courses.iter().any(|c| c.as_ref().len() != width) {
            return Err(CheckError::Dimensions {
                width,
                len: codes.len(),
            });
        }
        Self::new(width, codes)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of courses.
    pub fn height(&self) -> usize {
        self.codes.len() / self.width
    }

    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    pub fn course(&self, course: usize) -> &[u8] {
        &self.codes[course * self.width..(course + 1) * self.width]
    }

    pub fn courses(&self) -> std::slice::Chunks<'_, u8> {
        self.codes.chunks(self.width)
    }

    pub fn get(&self, course: usize, needle: usize) -> Option<u8> {
        if needle >= self.width {
            return None;
        }
        self.codes.get(course * self.width + needle).copied()
    }

    // ── Repetition ───────────────────────────────────────────────────────

    /// Repeat the pattern `courses` times upward and `wales` times sideways.
    pub fn tiled(&self, courses: usize, wales: usize) -> Pattern {
        let width = self.width * wales.max(1);
        let mut codes = Vec::with_capacity(width * self.height() * courses);
        for _ in 0..courses {
            for row in self.courses() {
                for _ in 0..wales.max(1) {
                    codes.extend_from_slice(row);
                }
            }
        }
        Pattern { width, codes }
    }

    /// Surround the pattern with `courses` courses above and below and
    /// `wales` needles left and right, all filled with `fill`.
    pub fn padded(&self, courses: usize, wales: usize, fill: u8) -> Pattern {
        let width = self.width + 2 * wales;
        let height = self.height() + 2 * courses;
        let mut codes = Vec::with_capacity(width * height);
        codes.resize(width * courses, fill);
        for row in self.courses() {
            codes.resize(codes.len() + wales, fill);
            codes.extend_from_slice(row);
            codes.resize(codes.len() + wales, fill);
        }
        codes.resize(width * height, fill);
        Pattern { width, codes }
    }

    /// The pattern as it is checked when used as a repeating motif: tiled,
    /// then padded with plain knitting on every side.
    pub fn tile(&self, options: &TileOptions) -> Pattern {
        self.tiled(options.repeat_courses, options.repeat_wales)
            .padded(options.pad_courses, options.pad_wales, options.fill)
    }

    // ── Text form ────────────────────────────────────────────────────────

    /// Parse the `.kp` text form. All errors are reported, not just the first.
    pub fn parse(source: &str) -> Result<Pattern, Vec<ParseError>> {
        let lexed = lex(source);
        let mut errors: Vec<ParseError> = lexed
            .errors
            .into_iter()
            .map(|e| ParseError {
                line: e.line,
                message: e.message,
            })
            .collect();

        // (line, codes) top-down as written.
        let mut rows: Vec<(usize, Vec<u8>)> = Vec::new();
        let mut current: Option<(usize, Vec<u8>)> = None;
        for (token, line) in lexed.tokens {
            match token {
                Token::Code(code) => current
                    .get_or_insert_with(|| (line, Vec::new()))
                    .1
                    .push(code),
                Token::Comma => {}
                Token::Newline => rows.extend(current.take()),
            }
        }
        rows.extend(current);

        let Some((_, first)) = rows.first() else {
            errors.push(ParseError {
                line: 1,
                message: "pattern has no courses".into(),
            });
            return Err(errors);
        };
        let width = first.len();
        for (line, row) in &rows {
            if row.len() != width {
                errors.push(ParseError {
                    line: *line,
                    message: format!("course has {} codes, expected {}", row.len(), width),
                });
            }
        }
        if !errors.is_empty() {
            errors.sort_by_key(|e| e.line);
            return Err(errors);
        }

        let codes = rows.into_iter().rev().flat_map(|(_, row)| row).collect();
        Ok(Pattern { width, codes })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.courses().rev() {
            let line: Vec<String> = row.iter().map(|c| format!("{:>3}", c)).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_is_course_zero() {
        let p = Pattern::parse("2 2 2\n1 1 1\n").unwrap();
        assert_eq!(p.width(), 3);
        assert_eq!(p.height(), 2);
        assert_eq!(p.course(0), &[1, 1, 1]);
        assert_eq!(p.course(1), &[2, 2, 2]);
    }

    #[test]
    fn parse_commas_and_comments() {
        let p = Pattern::parse("# motif\n1, 4, 4, 5, 5, 1 # cable\n1,1,1,1,1,1").unwrap();
        assert_eq!(p.width(), 6);
        assert_eq!(p.course(0), &[1; 6]);
        assert_eq!(p.get(1, 1), Some(4));
        assert_eq!(p.get(1, 6), None);
        assert_eq!(p.get(2, 0), None);
    }

    #[test]
    fn parse_reports_every_error() {
        let errors = Pattern::parse("1 1 1\n1 999\n1 1\n").unwrap_err();
        assert_eq!(
            errors,
            vec![
                ParseError {
                    line: 2,
                    message: "code 999 is out of range (0-255)".into()
                },
                ParseError {
                    line: 2,
                    message: "course has 1 codes, expected 3".into()
                },
                ParseError {
                    line: 3,
                    message: "course has 2 codes, expected 3".into()
                },
            ]
        );
    }

    #[test]
    fn parse_empty() {
        let errors = Pattern::parse("# nothing here\n\n").unwrap_err();
        assert_eq!(errors[0].to_string(), "line 1: pattern has no courses");
    }

    #[test]
    fn new_checks_dimensions() {
        assert!(Pattern::new(3, vec![1; 6]).is_ok());
        assert!(matches!(
            Pattern::new(4, vec![1; 6]),
            Err(CheckError::Dimensions { width: 4, len: 6 })
        ));
        assert!(Pattern::new(0, vec![]).is_err());
        assert!(Pattern::from_courses(&[vec![1, 1], vec![1]]).is_err());
    }

    #[test]
    fn tiled_repeats_both_ways() {
        let p = Pattern::from_courses(&[[1, 2], [3, 4]]).unwrap();
        let t = p.tiled(2, 3);
        assert_eq!(t.width(), 6);
        assert_eq!(t.height(), 4);
        assert_eq!(t.course(0), &[1, 2, 1, 2, 1, 2]);
        assert_eq!(t.course(1), &[3, 4, 3, 4, 3, 4]);
        assert_eq!(t.course(2), &[1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn padded_surrounds_with_fill() {
        let p = Pattern::from_courses(&[[6]]).unwrap();
        let t = p.padded(1, 2, 1);
        assert_eq!(t.width(), 5);
        assert_eq!(t.height(), 3);
        assert_eq!(t.course(0), &[1; 5]);
        assert_eq!(t.course(1), &[1, 1, 6, 1, 1]);
        assert_eq!(t.course(2), &[1; 5]);
    }

    #[test]
    fn tile_with_default_options() {
        let p = Pattern::from_courses(&[[1, 6, 1]]).unwrap();
        let t = p.tile(&TileOptions::default());
        assert_eq!(t.width(), 3 * 2 + 14);
        assert_eq!(t.height(), 2 + 4);
        assert_eq!(t.get(2, 8), Some(6));
        assert_eq!(t.get(3, 11), Some(6));
        assert_eq!(t.get(4, 8), Some(1));
    }

    #[test]
    fn display_round_trips() {
        let p = Pattern::from_courses(&[[1, 1, 1], [16, 2, 106]]).unwrap();
        let text = p.to_string();
        assert_eq!(text, " 16   2 106\n  1   1   1\n");
        assert_eq!(Pattern::parse(&text).unwrap(), p);
    }
}
