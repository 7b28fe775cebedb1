//! End-to-end processing of one export file.
//!
//! Validates, loads, extracts and aggregates, returning an
//! [`AnalysisResult`] ready for rendering or donation.

use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use timeline_core::error::{Result, TimelineError};
use timeline_core::models::ActivityTimeline;
use timeline_core::time_utils::{DEFAULT_WINDOW_DAYS, RECORD_TIMESTAMP_FORMAT};
use tracing::{info, warn};

use crate::aggregator::TimelineBuilder;
use crate::extractor::{ExtractedArchive, ExtractionSummary};
use crate::reader::{load_document, validate_input_file};

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for [`analyze_archive`].
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Reference "now" the window ends at.
    pub now: NaiveDateTime,
    /// Width of the look-back window.
    pub window_days: u32,
    /// Run even when the file fails the export-shape check.
    pub skip_validation: bool,
}

impl AnalysisOptions {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            window_days: DEFAULT_WINDOW_DAYS,
            skip_validation: false,
        }
    }
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Reference time the window ends at, `%Y-%m-%d %H:%M:%S`.
    pub reference_time: String,
    /// Width of the look-back window.
    pub window_days: u32,
    /// Records extracted across all categories.
    pub records_extracted: usize,
    /// Records that fell inside the window and were counted.
    pub records_in_window: u64,
    /// Number of hour buckets created.
    pub buckets_created: usize,
    /// Wall-clock seconds spent reading and parsing the export.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent building the timeline.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_archive`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Extracted collections and username.
    pub archive: ExtractedArchive,
    /// Per-category record counts.
    pub summary: ExtractionSummary,
    /// Hourly timeline.
    pub timeline: ActivityTimeline,
    /// Metadata about this run.
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline on the export at `path`.
///
/// 1. Check the export shape unless `skip_validation` is set.
/// 2. Load and parse the document; failures degrade to an empty document.
/// 3. Extract the seven collections and the username.
/// 4. Build the hourly timeline.
///
/// Only a failed shape check or a bad record timestamp return an error.
pub fn analyze_archive(path: &Path, options: &AnalysisOptions) -> Result<AnalysisResult> {
    // ── Step 1: Validate ──────────────────────────────────────────────────────
    if !validate_input_file(path) {
        if !options.skip_validation {
            return Err(TimelineError::ValidationFailed(path.to_path_buf()));
        }
        warn!(
            "{} does not look like a data export, continuing anyway",
            path.display()
        );
    }

    // ── Step 2: Load ──────────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let document = load_document(path);
    let archive = ExtractedArchive::from_document(document.as_ref());
    drop(document);
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 3: Summarise ─────────────────────────────────────────────────────
    let summary = archive.summarize();
    for line in summary.to_string().lines() {
        info!("{}", line);
    }

    // ── Step 4: Timeline ──────────────────────────────────────────────────────
    let transform_start = std::time::Instant::now();
    let timeline = TimelineBuilder::new(options.now)
        .with_window_days(options.window_days)
        .build(&archive)?;
    let transform_time = transform_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        reference_time: options.now.format(RECORD_TIMESTAMP_FORMAT).to_string(),
        window_days: options.window_days,
        records_extracted: archive.total_records(),
        records_in_window: timeline.totals().n_events,
        buckets_created: timeline.len(),
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    Ok(AnalysisResult {
        archive,
        summary,
        timeline,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
