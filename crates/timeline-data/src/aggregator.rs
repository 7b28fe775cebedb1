//! Hourly activity aggregation.
//!
//! Folds every extracted category into one [`ActivityTimeline`] keyed by
//! clock hour, keeping only records inside the look-back window.

use chrono::NaiveDateTime;
use timeline_core::error::Result;
use timeline_core::models::{ActivityRecord, ActivityTimeline};
use timeline_core::time_utils::{self, DEFAULT_WINDOW_DAYS};
use tracing::debug;

use crate::extractor::{CategorySource, ExtractedArchive, CATEGORY_SOURCES};

// ── TimelineBuilder ───────────────────────────────────────────────────────────

/// Builds an hourly timeline relative to a fixed reference time.
#[derive(Debug, Clone, Copy)]
pub struct TimelineBuilder {
    now: NaiveDateTime,
    window_days: u32,
}

impl TimelineBuilder {
    /// Builder with the default 365-day window ending at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    /// Earliest timestamp that still counts. Inclusive.
    ///
    /// Clamped to the earliest representable time when the window reaches
    /// past it.
    pub fn cutoff(&self) -> NaiveDateTime {
        time_utils::window_cutoff(self.now, self.window_days).unwrap_or(NaiveDateTime::MIN)
    }

    /// Whether `ts` falls inside the window.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.cutoff()
    }

    /// Fold all seven categories of `archive` and derive `n_events`.
    ///
    /// The first record whose timestamp is missing or malformed aborts the
    /// whole build.
    pub fn build(&self, archive: &ExtractedArchive) -> Result<ActivityTimeline> {
        let mut timeline = ActivityTimeline::new();
        for source in &CATEGORY_SOURCES {
            self.fold_records(&mut timeline, archive.records(source.category), source)?;
        }
        timeline.finalize();
        Ok(timeline)
    }

    /// Count each in-window record of one category into `timeline`.
    ///
    /// Returns how many records were counted. `n_events` is left untouched;
    /// call [`ActivityTimeline::finalize`] once every category is folded.
    pub fn fold_records(
        &self,
        timeline: &mut ActivityTimeline,
        records: &[ActivityRecord],
        source: &CategorySource,
    ) -> Result<usize> {
        let mut counted = 0usize;

        for record in records {
            let ts = record.timestamp(source.category, source.timestamp_field)?;
            if !self.contains(ts) {
                continue;
            }
            timeline.record(time_utils::hour_key(ts), source.category);
            counted += 1;
        }

        debug!(
            "Category {}: {} of {} records inside window",
            source.category,
            counted,
            records.len()
        );
        Ok(counted)
    }
}

/// Build the default 365-day timeline ending at `now`.
pub fn build_timeline(archive: &ExtractedArchive, now: NaiveDateTime) -> Result<ActivityTimeline> {
    TimelineBuilder::new(now).build(archive)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use serde_json::json;
    use timeline_core::error::TimelineError;
    use timeline_core::models::Category;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn fmt(ts: NaiveDateTime) -> String {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn dated(date: &str) -> ActivityRecord {
        ActivityRecord::new(json!({ "Date": date }))
    }

    // ── build ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_build_empty_archive_gives_empty_timeline() {
        let timeline = build_timeline(&ExtractedArchive::empty(), now()).unwrap();
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_build_buckets_by_hour() {
        let mut archive = ExtractedArchive::empty();
        archive.browsing = vec![dated("2024-01-01 10:15:00"), dated("2024-01-01 10:55:00")];

        let timeline = build_timeline(&archive, now()).unwrap();

        assert_eq!(timeline.len(), 1);
        let bucket = timeline.get("2024-01-01 10:00:00").unwrap();
        assert_eq!(bucket.browsed, 2);
        assert_eq!(bucket.n_events, 2);
        for category in Category::ALL {
            if category != Category::Browsed {
                assert_eq!(bucket.count(category), 0, "{category}");
            }
        }
    }

    #[test]
    fn test_build_truncates_minutes_and_seconds() {
        let mut archive = ExtractedArchive::empty();
        archive.comments = vec![dated("2024-03-05 14:47:33")];

        let timeline = build_timeline(&archive, now()).unwrap();
        assert_eq!(timeline.get("2024-03-05 14:00:00").unwrap().commented, 1);
    }

    #[test]
    fn test_build_mixes_categories_in_one_bucket() {
        let mut archive = ExtractedArchive::empty();
        archive.browsing = vec![dated("2024-05-01 08:01:00")];
        archive.shares = vec![dated("2024-05-01 08:02:00")];
        archive.comments = vec![dated("2024-05-01 08:03:00")];
        archive.likes = vec![dated("2024-05-01 08:04:00")];
        archive.posts = vec![dated("2024-05-01 08:05:00")];
        archive.chats = vec![dated("2024-05-01 08:06:00"), dated("2024-05-01 09:00:00")];
        archive.product_browsing = vec![ActivityRecord::new(
            json!({"browsing_date": "2024-05-01 08:07:00"}),
        )];

        let timeline = build_timeline(&archive, now()).unwrap();
        assert_eq!(timeline.len(), 2);

        let eight = timeline.get("2024-05-01 08:00:00").unwrap();
        for category in Category::ALL {
            assert_eq!(eight.count(category), 1, "{category}");
        }
        assert_eq!(eight.n_events, 7);
        assert_eq!(timeline.get("2024-05-01 09:00:00").unwrap().dmed, 1);

        for (_, bucket) in timeline.iter() {
            assert_eq!(bucket.n_events, bucket.category_sum());
        }
    }

    // ── window ────────────────────────────────────────────────────────────────

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        let builder = TimelineBuilder::new(now());
        let cutoff = builder.cutoff();
        assert_eq!(fmt(cutoff), "2023-06-02 12:00:00");

        let mut archive = ExtractedArchive::empty();
        archive.likes = vec![dated(&fmt(cutoff))];
        let timeline = builder.build(&archive).unwrap();
        assert_eq!(timeline.get("2023-06-02 12:00:00").unwrap().liked, 1);
    }

    #[test]
    fn test_just_before_cutoff_is_excluded() {
        let builder = TimelineBuilder::new(now());
        let mut timeline = ActivityTimeline::new();
        let older = builder.cutoff() - TimeDelta::seconds(1);

        let counted = builder
            .fold_records(
                &mut timeline,
                &[dated(&fmt(older))],
                CategorySource::of(Category::Liked),
            )
            .unwrap();

        assert_eq!(counted, 0);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_contains_one_microsecond_before_cutoff() {
        let builder = TimelineBuilder::new(now());
        let cutoff = builder.cutoff();
        assert!(builder.contains(cutoff));
        assert!(!builder.contains(cutoff - TimeDelta::microseconds(1)));
        assert!(builder.contains(now()));
    }

    #[test]
    fn test_window_reaching_past_min_date_counts_everything() {
        let builder = TimelineBuilder::new(NaiveDateTime::MIN + TimeDelta::days(1));
        assert_eq!(builder.cutoff(), NaiveDateTime::MIN);
        assert!(builder.contains(NaiveDateTime::MIN));
    }

    #[test]
    fn test_product_older_than_a_year_creates_no_bucket() {
        let year_and_a_day = now() - TimeDelta::days(366);
        let mut archive = ExtractedArchive::empty();
        archive.product_browsing = vec![ActivityRecord::new(
            json!({"browsing_date": fmt(year_and_a_day)}),
        )];

        let timeline = build_timeline(&archive, now()).unwrap();
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_custom_window() {
        let mut archive = ExtractedArchive::empty();
        archive.posts = vec![dated("2024-05-20 10:00:00"), dated("2024-05-30 10:00:00")];

        let timeline = TimelineBuilder::new(now())
            .with_window_days(7)
            .build(&archive)
            .unwrap();

        assert_eq!(timeline.len(), 1);
        assert!(timeline.get("2024-05-30 10:00:00").is_some());
    }

    // ── failures ──────────────────────────────────────────────────────────────

    #[test]
    fn test_malformed_timestamp_aborts_build() {
        let mut archive = ExtractedArchive::empty();
        archive.browsing = vec![dated("2024-01-01 10:15:00"), dated("01/01/2024")];

        let err = build_timeline(&archive, now()).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::TimestampParse {
                category: "browsed",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_timestamp_aborts_build() {
        let mut archive = ExtractedArchive::empty();
        // Product records are dated by "browsing_date", not "Date".
        archive.product_browsing = vec![dated("2024-01-01 10:15:00")];

        let err = build_timeline(&archive, now()).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::MissingTimestamp {
                category: "product_browsed",
                field: "browsing_date"
            }
        ));
    }

    #[test]
    fn test_malformed_timestamp_outside_window_still_fails() {
        let mut archive = ExtractedArchive::empty();
        archive.chats = vec![dated("1999-13-40 99:99:99")];
        assert!(build_timeline(&archive, now()).is_err());
    }

    #[test]
    fn test_loosely_formatted_timestamp_aborts_build() {
        let mut archive = ExtractedArchive::empty();
        archive.likes = vec![dated(" 2024-03-05 14:47:33")];

        let err = build_timeline(&archive, now()).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::TimestampParse {
                category: "liked",
                ..
            }
        ));
    }
}
