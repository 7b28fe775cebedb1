use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, TimelineError};
use crate::time_utils;

// ── Category ──────────────────────────────────────────────────────────────────

/// One of the seven tracked activity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A video shown in the feed.
    Browsed,
    /// A video shared with someone else.
    Shared,
    /// A comment left on a video.
    Commented,
    /// A video added to favourites.
    Liked,
    /// A video uploaded by the account owner.
    Posted,
    /// A direct message, sent or received.
    Dmed,
    /// A product page viewed in the shop.
    ProductBrowsed,
}

impl Category {
    /// All categories in table-column order.
    pub const ALL: [Category; 7] = [
        Category::Browsed,
        Category::Shared,
        Category::Commented,
        Category::Liked,
        Category::Posted,
        Category::Dmed,
        Category::ProductBrowsed,
    ];

    /// Column name used in timeline buckets and serialised payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Browsed => "browsed",
            Category::Shared => "shared",
            Category::Commented => "commented",
            Category::Liked => "liked",
            Category::Posted => "posted",
            Category::Dmed => "dmed",
            Category::ProductBrowsed => "product_browsed",
        }
    }

    /// Short human-readable column header.
    pub fn label(self) -> &'static str {
        match self {
            Category::Browsed => "Browsed",
            Category::Shared => "Shared",
            Category::Commented => "Commented",
            Category::Liked => "Liked",
            Category::Posted => "Posted",
            Category::Dmed => "DMed",
            Category::ProductBrowsed => "Products",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ActivityRecord ────────────────────────────────────────────────────────────

/// One item of a category collection, kept as the raw JSON object.
///
/// Only the timestamp field is ever interpreted; every other field is passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityRecord(pub Value);

impl ActivityRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a top-level field of the record.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Parse the record timestamp stored under `field`.
    ///
    /// A missing field, a non-string value, or a string that does not match
    /// `%Y-%m-%d %H:%M:%S` is an error.
    pub fn timestamp(&self, category: Category, field: &'static str) -> Result<NaiveDateTime> {
        let raw = self
            .field(field)
            .ok_or(TimelineError::MissingTimestamp {
                category: category.as_str(),
                field,
            })?;

        let Some(text) = raw.as_str() else {
            return Err(TimelineError::TimestampParse {
                category: category.as_str(),
                value: raw.to_string(),
            });
        };

        time_utils::parse_record_timestamp(text).ok_or_else(|| TimelineError::TimestampParse {
            category: category.as_str(),
            value: text.to_string(),
        })
    }
}

// ── TimelineBucket ────────────────────────────────────────────────────────────

/// Event counts for one timeline period.
///
/// `n_events` is derived; call [`TimelineBucket::refresh_total`] after the
/// category counters change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    #[serde(default)]
    pub browsed: u64,
    #[serde(default)]
    pub shared: u64,
    #[serde(default)]
    pub commented: u64,
    #[serde(default)]
    pub liked: u64,
    #[serde(default)]
    pub posted: u64,
    #[serde(default)]
    pub dmed: u64,
    #[serde(default)]
    pub product_browsed: u64,
    /// Sum of the seven category counters.
    #[serde(default)]
    pub n_events: u64,
}

impl TimelineBucket {
    fn counter_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Browsed => &mut self.browsed,
            Category::Shared => &mut self.shared,
            Category::Commented => &mut self.commented,
            Category::Liked => &mut self.liked,
            Category::Posted => &mut self.posted,
            Category::Dmed => &mut self.dmed,
            Category::ProductBrowsed => &mut self.product_browsed,
        }
    }

    /// Current counter for `category`.
    pub fn count(&self, category: Category) -> u64 {
        match category {
            Category::Browsed => self.browsed,
            Category::Shared => self.shared,
            Category::Commented => self.commented,
            Category::Liked => self.liked,
            Category::Posted => self.posted,
            Category::Dmed => self.dmed,
            Category::ProductBrowsed => self.product_browsed,
        }
    }

    /// Add one event to `category`.
    pub fn increment(&mut self, category: Category) {
        *self.counter_mut(category) += 1;
    }

    /// Sum of all category counters, independent of `n_events`.
    pub fn category_sum(&self) -> u64 {
        Category::ALL.iter().map(|c| self.count(*c)).sum()
    }

    /// Recompute `n_events` from the category counters.
    pub fn refresh_total(&mut self) {
        self.n_events = self.category_sum();
    }

    /// Add every counter of `other` into `self`, including `n_events`.
    pub fn merge(&mut self, other: &TimelineBucket) {
        for category in Category::ALL {
            *self.counter_mut(category) += other.count(category);
        }
        self.n_events += other.n_events;
    }
}

// ── TimelineRow ───────────────────────────────────────────────────────────────

/// A bucket paired with its period key, as rendered in tables and payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// Period key, e.g. `"2024-03-05 14:00:00"` (hourly) or `"2024-03-05"` (daily).
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(flatten)]
    pub bucket: TimelineBucket,
}

// ── ActivityTimeline ──────────────────────────────────────────────────────────

/// Period key → bucket mapping.
///
/// Buckets are created on first write and never removed. Keys use a
/// zero-padded format, so map order is chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityTimeline {
    buckets: BTreeMap<String, TimelineBucket>,
}

impl ActivityTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one `category` event in the bucket at `key`.
    pub fn record(&mut self, key: impl Into<String>, category: Category) {
        self.buckets.entry(key.into()).or_default().increment(category);
    }

    /// Recompute `n_events` on every bucket.
    pub fn finalize(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.refresh_total();
        }
    }

    pub fn get(&self, key: &str) -> Option<&TimelineBucket> {
        self.buckets.get(key)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterate `(key, bucket)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TimelineBucket)> {
        self.buckets.iter()
    }

    /// Chronologically ordered rows.
    pub fn rows(&self) -> Vec<TimelineRow> {
        self.buckets
            .iter()
            .map(|(date, bucket)| TimelineRow {
                date: date.clone(),
                bucket: *bucket,
            })
            .collect()
    }

    /// Sum of every bucket.
    pub fn totals(&self) -> TimelineBucket {
        let mut totals = TimelineBucket::default();
        for bucket in self.buckets.values() {
            totals.merge(bucket);
        }
        totals
    }

    /// Collapse hour buckets into calendar-day buckets keyed `"%Y-%m-%d"`.
    pub fn rollup_daily(&self) -> ActivityTimeline {
        let mut daily: BTreeMap<String, TimelineBucket> = BTreeMap::new();
        for (key, bucket) in &self.buckets {
            let day = key.get(..10).unwrap_or(key.as_str());
            daily.entry(day.to_string()).or_default().merge(bucket);
        }
        ActivityTimeline { buckets: daily }
    }
}
