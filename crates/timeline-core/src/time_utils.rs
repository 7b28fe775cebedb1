use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};

/// Timestamp format used by every dated record in the export.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default look-back window of the timeline.
pub const DEFAULT_WINDOW_DAYS: u32 = 365;

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse an export timestamp (`2024-03-05 14:47:33`).
///
/// The export carries no timezone, so the result is naive. Returns `None` for
/// any other shape, including ISO 8601 with a `T` separator. chrono tolerates
/// extra whitespace and a signed year, so the parsed value must also format
/// back to exactly `s`.
pub fn parse_record_timestamp(s: &str) -> Option<NaiveDateTime> {
    let ts = NaiveDateTime::parse_from_str(s, RECORD_TIMESTAMP_FORMAT).ok()?;
    (ts.format(RECORD_TIMESTAMP_FORMAT).to_string() == s).then_some(ts)
}

// ── Bucketing ─────────────────────────────────────────────────────────────────

/// Zero minutes, seconds and sub-second part.
pub fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Bucket key of the clock hour containing `ts`.
pub fn hour_key(ts: NaiveDateTime) -> String {
    truncate_to_hour(ts)
        .format(RECORD_TIMESTAMP_FORMAT)
        .to_string()
}

// ── Window ────────────────────────────────────────────────────────────────────

/// Earliest timestamp still inside a `window_days` window ending at `now`.
///
/// `None` when the cutoff falls before the earliest representable date.
pub fn window_cutoff(now: NaiveDateTime, window_days: u32) -> Option<NaiveDateTime> {
    now.checked_sub_signed(TimeDelta::days(i64::from(window_days)))
}

/// Current local wall-clock time without an offset, matching the naive
/// timestamps found in exports.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
