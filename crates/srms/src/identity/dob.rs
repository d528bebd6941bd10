//! Date-of-birth canonicalization.
//!
//! Accepted encodings, in the order they are tried:
//!
//! 1. `YYYY-MM-DD`, optionally followed by a `T`/space separated time that is discarded
//! 2. `D/M/YYYY` or `DD/MM/YYYY`
//! 3. `D-M-YYYY` or `DD-MM-YYYY`
//! 4. `DDMMYYYY` (eight bare digits, as typed into the lookup bot)
//!
//! The canonical comparison form is `YYYY-MM-DD`; the wire/display form is `DD/MM/YYYY`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_YEAR: u32 = 1900;
pub const MAX_YEAR: u32 = 2100;

const MAX_TYPED_DIGITS: usize = 8;

/// Whether impossible calendar days (31 February) are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarPolicy {
    /// Only range checks: day 1..=31 for every month.
    #[default]
    Lenient,
    /// Day must exist in the given month and year.
    Strict,
}

impl CalendarPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" | "loose" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// A validated (year, month, day) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalDate {
    year: u32,
    month: u32,
    day: u32,
}

impl CanonicalDate {
    pub const fn year(&self) -> u32 {
        self.year
    }

    pub const fn month(&self) -> u32 {
        self.month
    }

    pub const fn day(&self) -> u32 {
        self.day
    }

    /// `YYYY-MM-DD`, used for equality checks.
    pub fn canonical(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `DD/MM/YYYY`, used on the wire and in result documents.
    pub fn display(&self) -> String {
        format!("{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }

    /// `None` when the lenient policy admitted a day the month does not have.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month, self.day)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Why a piece of text could not be read as a date of birth.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRejection {
    #[error("date of birth is blank")]
    Blank,
    #[error("'{0}' is not a recognised date format")]
    UnrecognizedFormat(String),
    #[error("{year:04}-{month:02}-{day:02} is outside the accepted date range")]
    OutOfRange { year: u32, month: u32, day: u32 },
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    NotACalendarDate { year: u32, month: u32, day: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateNormalizer {
    policy: CalendarPolicy,
}

impl DateNormalizer {
    pub const fn new(policy: CalendarPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> CalendarPolicy {
        self.policy
    }

    pub fn normalize(&self, input: &str) -> Result<CanonicalDate, DateRejection> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(DateRejection::Blank);
        }

        let (year, month, day) = parse_iso(raw)
            .or_else(|| parse_day_first(raw, '/'))
            .or_else(|| parse_day_first(raw, '-'))
            .or_else(|| parse_compact(raw))
            .ok_or_else(|| DateRejection::UnrecognizedFormat(raw.to_string()))?;

        self.validate(year, month, day)
    }

    /// False whenever either side fails to normalize, so a malformed DOB never matches.
    pub fn equals_canonical(&self, a: &str, b: &str) -> bool {
        match (self.normalize(a), self.normalize(b)) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }

    fn validate(&self, year: u32, month: u32, day: u32) -> Result<CanonicalDate, DateRejection> {
        let in_range = (MIN_YEAR..=MAX_YEAR).contains(&year)
            && (1..=12).contains(&month)
            && (1..=31).contains(&day);
        if !in_range {
            return Err(DateRejection::OutOfRange { year, month, day });
        }

        let date = CanonicalDate { year, month, day };
        if self.policy == CalendarPolicy::Strict && date.to_naive_date().is_none() {
            return Err(DateRejection::NotACalendarDate { year, month, day });
        }

        Ok(date)
    }
}

pub fn normalize(input: &str) -> Result<CanonicalDate, DateRejection> {
    DateNormalizer::default().normalize(input)
}

pub fn equals_canonical(a: &str, b: &str) -> bool {
    DateNormalizer::default().equals_canonical(a, b)
}

/// Keystroke helper: `27` → `27`, `2702` → `27-02`, `27022004` → `27-02-2004`.
///
/// Non-digits are dropped and anything past eight digits is ignored. No validation.
pub fn format_for_incremental_input(partial: &str) -> String {
    let digits: String = partial
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_TYPED_DIGITS)
        .collect();

    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}-{}", &digits[..2], &digits[2..]),
        _ => format!("{}-{}-{}", &digits[..2], &digits[2..4], &digits[4..]),
    }
}

fn numeric(segment: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if segment.len() < min_len
        || segment.len() > max_len
        || !segment.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    segment.parse().ok()
}

fn parse_iso(raw: &str) -> Option<(u32, u32, u32)> {
    let date_part = raw.split(['T', ' ']).next()?;
    let mut parts = date_part.split('-');
    let year = numeric(parts.next()?, 4, 4)?;
    let month = numeric(parts.next()?, 1, 2)?;
    let day = numeric(parts.next()?, 1, 2)?;
    if parts.next().is_some() {
        return None;
    }
    Some((year, month, day))
}

fn parse_day_first(raw: &str, separator: char) -> Option<(u32, u32, u32)> {
    let mut parts = raw.split(separator);
    let day = numeric(parts.next()?, 1, 2)?;
    let month = numeric(parts.next()?, 1, 2)?;
    let year = numeric(parts.next()?, 4, 4)?;
    if parts.next().is_some() {
        return None;
    }
    Some((year, month, day))
}

fn parse_compact(raw: &str) -> Option<(u32, u32, u32)> {
    if raw.len() != MAX_TYPED_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day = numeric(&raw[..2], 2, 2)?;
    let month = numeric(&raw[2..4], 2, 2)?;
    let year = numeric(&raw[4..], 4, 4)?;
    Some((year, month, day))
}
