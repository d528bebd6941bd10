use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Pass,
    Fail,
    /// No usable marks yet. Distinct from a failure.
    Pending,
}

impl ResultStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ResultStatus::Pass => "PASS",
            ResultStatus::Fail => "FAIL",
            ResultStatus::Pending => "PENDING",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceRemark {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceRemark {
    pub fn for_percentage(whole_percentage: u32) -> Self {
        match whole_percentage {
            90.. => Self::Excellent,
            75..=89 => Self::Good,
            60..=74 => Self::Average,
            _ => Self::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceRemark::Excellent => "Excellent",
            PerformanceRemark::Good => "Good",
            PerformanceRemark::Average => "Average",
            PerformanceRemark::Poor => "Poor",
        }
    }
}

/// Bands are checked from the top; the first match wins.
pub(crate) fn grade_for(whole_percentage: u32, d_grade_floor: u8) -> Grade {
    match whole_percentage {
        p if p >= 90 => Grade::APlus,
        p if p >= 80 => Grade::A,
        p if p >= 70 => Grade::B,
        p if p >= 60 => Grade::C,
        p if p >= u32::from(d_grade_floor) => Grade::D,
        _ => Grade::F,
    }
}
