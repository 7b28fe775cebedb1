//! Consent/donation payload built from a timeline.
//!
//! Sending the payload anywhere is the host's job; this module only shapes
//! and persists it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use timeline_core::error::Result;
use timeline_core::models::{ActivityTimeline, TimelineRow};

/// The table a participant agrees to share, tagged with its donation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationPayload {
    /// `"{session_id}-{platform}"`.
    pub key: String,
    /// One row per timeline bucket, chronological.
    pub data: Vec<TimelineRow>,
}

impl DonationPayload {
    pub fn new(session_id: &str, platform: &str, timeline: &ActivityTimeline) -> Self {
        Self {
            key: donation_key(session_id, platform),
            data: timeline.rows(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Atomically write the payload to `path`, creating parent directories
    /// if needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;

        // Write to a temp file then rename.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }
}

pub fn donation_key(session_id: &str, platform: &str) -> String {
    format!("{}-{}", session_id, platform)
}
