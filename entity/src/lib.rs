//! sea-orm entities backing the talent catalog schema.

pub mod candidate;
pub mod candidate_attachment;
pub mod candidate_note;
pub mod candidate_opportunity;
pub mod candidate_property;
pub mod export_column;
pub mod salesforce_job_opp;
pub mod saved_list;
pub mod saved_list_user;
pub mod saved_search;
pub mod saved_search_user;
pub mod status;
pub mod users;

pub use status::Status;
