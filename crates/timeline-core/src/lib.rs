//! Shared types for the activity timeline crates.
//!
//! Holds the activity categories, record and bucket models, the error
//! taxonomy, timestamp helpers, CLI settings and number formatting used by
//! the data and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, TimelineError};
