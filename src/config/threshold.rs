//! Threshold that separates "similar" from "different"

use crate::constants::defaults;
use crate::{CompareError, Result};
use serde::{Deserialize, Serialize};

/// How a threshold value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    /// Absolute count of differing pixels
    #[default]
    Pixel,
    /// Fraction (0.0-1.0) of all compared pixels
    Percent,
}

/// Threshold descriptor, e.g. `{"type": "percent", "value": 0.01}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOptions {
    #[serde(rename = "type", default)]
    pub kind: ThresholdKind,
    pub value: f64,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        Self {
            kind: ThresholdKind::Pixel,
            value: defaults::THRESHOLD_PIXELS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    kind: ThresholdKind,
    value: f64,
}

impl Default for Threshold {
    fn default() -> Self {
        Self {
            kind: ThresholdKind::Pixel,
            value: defaults::THRESHOLD_PIXELS,
        }
    }
}

impl Threshold {
    /// # Errors
    ///
    /// `value` must be finite and non-negative; a percent value must not
    /// exceed 1.0.
    pub fn new(kind: ThresholdKind, value: f64) -> Result<Self> {
        let valid = value.is_finite()
            && value >= 0.0
            && (kind == ThresholdKind::Pixel || value <= 1.0);
        if !valid {
            return Err(CompareError::parameter("threshold.value", value));
        }
        Ok(Self { kind, value })
    }

    pub fn pixels(count: u32) -> Self {
        Self {
            kind: ThresholdKind::Pixel,
            value: f64::from(count),
        }
    }

    pub fn percent(fraction: f64) -> Result<Self> {
        Self::new(ThresholdKind::Percent, fraction)
    }

    pub fn from_options(options: &ThresholdOptions) -> Result<Self> {
        Self::new(options.kind, options.value)
    }

    pub fn kind(&self) -> ThresholdKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether `differences` out of `dimension` pixels reach the threshold.
    ///
    /// The comparison is inclusive: a pixel threshold of 50 is reached by
    /// exactly 50 differences.
    pub fn is_above_threshold(&self, differences: u64, dimension: u64) -> bool {
        match self.kind {
            ThresholdKind::Pixel => self.value <= differences as f64,
            ThresholdKind::Percent => {
                dimension > 0 && self.value <= differences as f64 / dimension as f64
            }
        }
    }

    pub fn to_options(&self) -> ThresholdOptions {
        ThresholdOptions {
            kind: self.kind,
            value: self.value,
        }
    }
}
