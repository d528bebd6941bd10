//! Result computation and identity normalization for the student result management
//! system: date-of-birth canonicalization, roll-number allocation, grading, password
//! feedback and the public result lookup flow.

pub mod config;
pub mod error;
pub mod grading;
pub mod identity;
pub mod lookup;
pub mod password;
pub mod records;
pub mod session;
pub mod telemetry;
