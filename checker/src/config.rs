// config.rs — Check options: problem thresholds and pattern tiling
//
// All fields have defaults matching the physical machine the checker models;
// a JSON file may override any subset of them.
//
// Preconditions: none.
// Postconditions: `CheckOptions::from_json` only returns validated options.
// Failure modes: unreadable file, malformed JSON, inconsistent thresholds.
// Side effects: `CheckOptions::load` reads one file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Limits beyond which the machine reports a problem. Every pair is
/// (warning, error); reaching a value triggers the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Widest cable half, and furthest cable travel, in needles.
    pub max_cable_width: usize,
    pub loops_in_needle_warning: usize,
    pub loops_in_needle_error: usize,
    /// Spread between the smallest and largest racking of one course.
    pub racking_warning: u8,
    pub racking_error: u8,
    /// Courses a loop may stay on its needle.
    pub loop_hold_warning: usize,
    pub loop_hold_error: usize,
    /// Loops moved by a single transfer.
    pub overlapped_transfer_warning: usize,
    pub overlapped_transfer_error: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_cable_width: 3,
            loops_in_needle_warning: 3,
            loops_in_needle_error: 4,
            racking_warning: 5,
            racking_error: 6,
            loop_hold_warning: 8,
            loop_hold_error: 8,
            overlapped_transfer_warning: 2,
            overlapped_transfer_error: 3,
        }
    }
}

/// How a motif is repeated and surrounded before it is checked as a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileOptions {
    pub repeat_courses: usize,
    pub repeat_wales: usize,
    /// Border courses added above and below.
    pub pad_courses: usize,
    /// Border needles added left and right.
    pub pad_wales: usize,
    /// Code knitted in the border.
    pub fill: u8,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            repeat_courses: 2,
            repeat_wales: 2,
            pad_courses: 2,
            pad_wales: 7,
            fill: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckOptions {
    pub thresholds: Thresholds,
    pub tile: TileOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl CheckOptions {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let options: CheckOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let pairs = [
            (
                "loops_in_needle",
                t.loops_in_needle_warning,
                t.loops_in_needle_error,
            ),
            (
                "racking",
                t.racking_warning as usize,
                t.racking_error as usize,
            ),
            ("loop_hold", t.loop_hold_warning, t.loop_hold_error),
            (
                "overlapped_transfer",
                t.overlapped_transfer_warning,
                t.overlapped_transfer_error,
            ),
        ];
        for (name, warning, error) in pairs {
            if warning > error {
                return Err(ConfigError::Invalid(format!(
                    "{name}_warning ({warning}) exceeds {name}_error ({error})"
                )));
            }
        }
        if self.tile.repeat_courses == 0 || self.tile.repeat_wales == 0 {
            return Err(ConfigError::Invalid(
                "tile repeats must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
