//! Storage access for msform-api
//!
//! The repository is the only code that talks to the database.

pub mod submissions;

pub use submissions::{SqliteSubmissionRepository, SubmissionRepository};
