//! Public result lookup: identity verification, collaborator access and presentation.

mod arrange;
pub mod card;
pub mod flow;
pub mod resilient;
pub mod router;
pub mod service;
pub mod sources;

#[cfg(test)]
mod tests;

pub use arrange::arrange_for_class;
pub use card::{share_payload, ResultCard};
pub use flow::{LookupRejection, LookupState, ResultLookupFlow};
pub use resilient::CachedSource;
pub use router::{result_router, LookupRequest, RollNumberRequest};
pub use service::{ResultService, ResultServiceError};
pub use sources::{MarksSource, RosterSource, SourceError, SubjectSource};
