use serde::{Deserialize, Serialize};

use crate::records::DEFAULT_MAX_MARKS;

/// Thresholds shared by every place a result is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingConfig {
    /// Minimum marks every subject needs for a PASS.
    pub pass_mark: u32,
    /// Lowest whole percentage that still earns a `D`.
    pub d_grade_floor: u8,
    /// Decimal places kept in the summary percentage.
    pub precision: u8,
    pub default_max_marks: u32,
}

impl GradingConfig {
    pub const MAX_PRECISION: u8 = 4;
    pub const PRINTABLE_PRECISION: u8 = 2;

    /// Same thresholds, two decimals, as used on the result document.
    pub fn printable(&self) -> Self {
        Self {
            precision: Self::PRINTABLE_PRECISION,
            ..self.clone()
        }
    }

    pub fn with_pass_mark(mut self, pass_mark: u32) -> Self {
        self.pass_mark = pass_mark;
        self
    }

    /// Clamped to [`Self::MAX_PRECISION`].
    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision.min(Self::MAX_PRECISION);
        self
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            pass_mark: 33,
            d_grade_floor: 40,
            precision: 0,
            default_max_marks: DEFAULT_MAX_MARKS,
        }
    }
}
