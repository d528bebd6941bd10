//! Roll numbers have the shape `{class}A{seq}` with `seq` zero-padded to two digits.
//!
//! Allocation only suggests the next free number from a roster snapshot. The backend
//! still rejects duplicates at write time.

use crate::records::{class_number, StudentRecord};

pub const SECTION_LETTER: char = 'A';
pub const FALLBACK_CLASS_NUMBER: u32 = 1;

/// Next roll number for `class_name` given the roster.
///
/// A class name without a number is treated as class 1.
pub fn next_roll_number(class_name: &str, roster: &[StudentRecord]) -> String {
    let class_name = class_name.trim();
    let number = class_number(class_name).unwrap_or(FALLBACK_CLASS_NUMBER);

    let highest = roster
        .iter()
        .filter(|student| student.class_name.trim() == class_name)
        .filter_map(|student| roll_sequence(&student.roll_no, number))
        .max()
        .unwrap_or(0);

    format_roll_number(number, highest.saturating_add(1))
}

pub fn format_roll_number(class_number: u32, sequence: u32) -> String {
    format!("{class_number}{SECTION_LETTER}{sequence:02}")
}

/// Sequence part of `roll_no` if it belongs to `class_number`'s pattern.
pub fn roll_sequence(roll_no: &str, class_number: u32) -> Option<u32> {
    let roll_no = roll_no.trim();
    let rest = roll_no.strip_prefix(class_number.to_string().as_str())?;
    let mut chars = rest.chars();
    let section = chars.next()?;
    if !section.eq_ignore_ascii_case(&SECTION_LETTER) {
        return None;
    }

    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
