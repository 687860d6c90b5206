//! # msform Common Library
//!
//! Shared code for the msform services including:
//! - Submission record types
//! - Bootstrap configuration loading
//! - Database initialization
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
