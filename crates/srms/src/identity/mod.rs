//! Identity helpers shared by lookup and student creation.

pub mod dob;
pub mod roll_number;

pub use dob::{
    equals_canonical, format_for_incremental_input, normalize, CalendarPolicy, CanonicalDate,
    DateNormalizer, DateRejection,
};
pub use roll_number::{format_roll_number, next_roll_number, roll_sequence};
