//! Data ingestion layer for the activity timeline.
//!
//! Responsible for validating and loading user data exports, extracting the
//! tracked activity collections, aggregating them into an hourly timeline,
//! shaping the donation payload and running the top-level pipeline.

pub mod aggregator;
pub mod analysis;
pub mod donation;
pub mod extractor;
pub mod reader;

pub use timeline_core as core;
