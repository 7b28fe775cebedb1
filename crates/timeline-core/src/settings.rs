use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, TimelineError};
use crate::time_utils;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Hourly activity timeline from a social-media data export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "activity-timeline",
    about = "Hourly activity timeline from a social-media data export",
    version
)]
pub struct Settings {
    /// Export file to analyse (.zip or .json)
    pub input: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json", "summary"])]
    pub format: String,

    /// Timeline granularity
    #[arg(long, default_value = "hourly", value_parser = ["hourly", "daily"])]
    pub granularity: String,

    /// Look-back window in days (1-3650)
    #[arg(long, default_value = "365", value_parser = clap::value_parser!(u32).range(1..=3650))]
    pub window_days: u32,

    /// Fixed reference time "YYYY-MM-DD HH:MM:SS" (defaults to local now)
    #[arg(long, env = "ACTIVITY_TIMELINE_NOW")]
    pub now: Option<String>,

    /// Process the file even when it does not look like a data export
    #[arg(long)]
    pub skip_validation: bool,

    /// Session identifier used in the donation key
    #[arg(long, default_value = "local")]
    pub session_id: String,

    /// Platform label used in the donation key
    #[arg(long, default_value = "TikTok Data Donation Research")]
    pub platform: String,

    /// Write the donation payload to this path
    #[arg(long)]
    pub donation_out: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Reject values clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(now) = self.parsed_now()? {
            if time_utils::window_cutoff(now, self.window_days).is_none() {
                return Err(TimelineError::Config(format!(
                    "--now {} minus {} days is before the earliest supported date",
                    now, self.window_days
                )));
            }
        }
        Ok(())
    }

    /// The injected reference time, or local wall-clock now.
    pub fn reference_time(&self) -> Result<NaiveDateTime> {
        Ok(self.parsed_now()?.unwrap_or_else(time_utils::local_now))
    }

    /// Whether hour buckets should be rolled up to days before rendering.
    pub fn is_daily(&self) -> bool {
        self.granularity == "daily"
    }

    fn parsed_now(&self) -> Result<Option<NaiveDateTime>> {
        match &self.now {
            None => Ok(None),
            Some(raw) => time_utils::parse_record_timestamp(raw)
                .map(Some)
                .ok_or_else(|| {
                    TimelineError::Config(format!(
                        "--now must look like \"YYYY-MM-DD HH:MM:SS\", got \"{}\"",
                        raw
                    ))
                }),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
