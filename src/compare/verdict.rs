//! Classification of a finished comparison

use crate::config::Threshold;
use crate::constants::ranks;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCode {
    /// No verdict was reached
    Unknown,
    Identical,
    /// Some pixels differ, below the threshold
    Similar,
    Different,
}

impl ResultCode {
    /// Gating rank; `None` for [`ResultCode::Unknown`]
    pub fn rank(&self) -> Option<u8> {
        match self {
            ResultCode::Unknown => None,
            ResultCode::Different => Some(ranks::DIFFERENT),
            ResultCode::Similar => Some(ranks::SIMILAR),
            ResultCode::Identical => Some(ranks::IDENTICAL),
        }
    }

    /// Identical and similar runs pass
    pub fn has_passed(&self) -> bool {
        matches!(self, ResultCode::Identical | ResultCode::Similar)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultCode::Unknown => "unknown",
            ResultCode::Identical => "identical",
            ResultCode::Similar => "similar",
            ResultCode::Different => "different",
        };
        f.write_str(name)
    }
}

/// Verdict for `differences` real differences out of `dimension` pixels
pub fn classify(differences: u64, dimension: u64, threshold: &Threshold) -> ResultCode {
    if differences == 0 {
        ResultCode::Identical
    } else if threshold.is_above_threshold(differences, dimension) {
        ResultCode::Different
    } else {
        ResultCode::Similar
    }
}
