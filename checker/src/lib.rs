// kpc — KnitPaint Checker
//
// Library root. A pattern is resolved (cables), decoded into machine
// instructions and knitted on a virtual V-bed machine; the loops formed
// and the problems found are the result.

pub mod cable;
pub mod check;
pub mod collector;
pub mod config;
pub mod diag;
pub mod error;
pub mod id;
pub mod instruction;
pub mod lexer;
pub mod loops;
pub mod machine;
pub mod pattern;
pub mod phase;
pub mod pipeline;
pub mod report;
pub mod stage;

pub use check::{check, check_as_pattern, check_as_pattern_with, check_pattern_with, check_with};
pub use config::CheckOptions;
pub use diag::{Problem, ProblemKind, Severity};
pub use error::CheckError;
pub use loops::{Loop, LoopGraph};
pub use pattern::Pattern;
