//! Domain rules for the talent catalog.
//!
//! Entities live in the `entity` crate; this crate owns the invariants that span
//! columns (stage bookkeeping, two-sided sharing, watcher encoding) and the services
//! that persist them.

pub mod candidate;
pub mod cv_token;
pub mod error;
pub mod opportunity;
pub mod published_doc;
pub mod seed;
pub mod sharing;
pub mod source;
pub mod stage;

pub use error::{TalentError, TalentResult};
pub use opportunity::{CandidateOpportunityProgress, OpportunityProgress};
pub use source::{CandidateSource, SavedList, SavedSearch, User, UserDirectory};
pub use stage::OpportunityStage;
