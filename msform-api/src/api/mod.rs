//! HTTP API handlers for msform-api

pub mod extract;
pub mod forms;
pub mod health;

pub use extract::SubmissionPayload;
pub use forms::form_routes;
pub use health::health_routes;
