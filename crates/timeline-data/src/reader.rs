//! Export file loading and validation.
//!
//! Reads a user data export (a bare JSON document or a zip containing one)
//! fully into memory and parses it into a [`serde_json::Value`]. Loading is
//! best-effort: every failure is logged and turned into "no document".

use std::io::{Cursor, Read};
use std::path::Path;

use serde_json::Value;
use timeline_core::error::{Result, TimelineError};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Member a zip export must contain to pass [`validate_input_file`].
pub const REQUIRED_ZIP_MEMBER: &str = "user_data_tiktok.json";

/// Top-level key a bare JSON export must contain to pass [`validate_input_file`].
pub const REQUIRED_JSON_KEY: &str = "video_list";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

// ── Public API ────────────────────────────────────────────────────────────────

/// Check whether `path` looks like a data export worth processing.
///
/// * `.zip`  – must contain a member named [`REQUIRED_ZIP_MEMBER`].
/// * `.json` – top-level object must contain [`REQUIRED_JSON_KEY`].
///
/// Any other extension, and any read or parse failure, yields `false`.
pub fn validate_input_file(path: &Path) -> bool {
    let result = if has_extension(path, "zip") {
        validate_zip(path)
    } else if has_extension(path, "json") {
        validate_json(path)
    } else {
        debug!("Unsupported export extension: {}", path.display());
        Ok(false)
    };

    result.unwrap_or_else(|e| {
        warn!("Validation of {} failed: {}", path.display(), e);
        false
    })
}

/// Load the export at `path` and parse its JSON payload.
///
/// Returns `None` when the file cannot be read or holds no parseable JSON.
pub fn load_document(path: &Path) -> Option<Value> {
    let bytes = match read_file(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("{}", e);
            return None;
        }
    };

    if has_extension(path, "zip") || is_zip(&bytes) {
        load_zip_document(&bytes)
    } else {
        parse_json_document(&bytes)
    }
}

/// Parse an in-memory export, sniffing the zip signature to pick a format.
pub fn load_document_from_bytes(bytes: &[u8]) -> Option<Value> {
    if is_zip(bytes) {
        load_zip_document(bytes)
    } else {
        parse_json_document(bytes)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

/// Read the whole file; the handle is dropped before returning.
fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| TimelineError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json_document(bytes: &[u8]) -> Option<Value> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Export is not valid JSON: {}", e);
            None
        }
    }
}

fn load_zip_document(bytes: &[u8]) -> Option<Value> {
    match first_json_member(bytes) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            warn!("Zip export contains no parseable .json member");
            None
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Scan members in listing order and return the first `.json` member that
/// parses. Unreadable or malformed members are skipped.
fn first_json_member(bytes: &[u8]) -> Result<Option<Value>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut member = match archive.by_index(index) {
            Ok(m) => m,
            Err(e) => {
                debug!("Skipping unreadable zip member #{}: {}", index, e);
                continue;
            }
        };

        let name = member.name().to_string();
        if member.is_dir() || !name.to_ascii_lowercase().ends_with(".json") {
            continue;
        }

        let mut contents = Vec::new();
        if let Err(e) = member.read_to_end(&mut contents) {
            debug!("Skipping zip member {}: {}", name, e);
            continue;
        }

        match serde_json::from_slice(&contents) {
            Ok(value) => {
                debug!("Loaded export payload from zip member {}", name);
                return Ok(Some(value));
            }
            Err(e) => debug!("Skipping zip member {}: {}", name, e),
        }
    }

    Ok(None)
}

fn validate_zip(path: &Path) -> Result<bool> {
    let bytes = read_file(path)?;
    let archive = ZipArchive::new(Cursor::new(bytes))?;
    let found = archive.file_names().any(|n| n == REQUIRED_ZIP_MEMBER);
    Ok(found)
}

fn validate_json(path: &Path) -> Result<bool> {
    let bytes = read_file(path)?;
    let value: Value = serde_json::from_slice(&bytes)?;
    Ok(value
        .as_object()
        .map(|o| o.contains_key(REQUIRED_JSON_KEY))
        .unwrap_or(false))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build an in-memory zip with the given `(name, contents)` members.
    pub(crate) fn build_zip(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    // ── load_document ─────────────────────────────────────────────────────────

    #[test]
    fn test_load_document_plain_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.json", br#"{"Activity": {}}"#);

        let doc = load_document(&path).unwrap();
        assert_eq!(doc, json!({"Activity": {}}));
    }

    #[test]
    fn test_load_document_malformed_json_yields_none() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.json", b"{not json");
        assert!(load_document(&path).is_none());
    }

    #[test]
    fn test_load_document_missing_file_yields_none() {
        assert!(load_document(Path::new("/tmp/does-not-exist-timeline-xyz.json")).is_none());
    }

    #[test]
    fn test_load_document_zip_skips_bad_members() {
        let dir = TempDir::new().unwrap();
        let bytes = build_zip(&[
            ("readme.txt", "hello"),
            ("broken.json", "{oops"),
            ("user_data_tiktok.json", r#"{"Profile": {"n": 1}}"#),
            ("later.json", r#"{"Profile": {"n": 2}}"#),
        ]);
        let path = write_file(dir.path(), "export.zip", &bytes);

        let doc = load_document(&path).unwrap();
        assert_eq!(doc, json!({"Profile": {"n": 1}}));
    }

    #[test]
    fn test_load_document_zip_without_valid_json_yields_none() {
        let dir = TempDir::new().unwrap();
        let bytes = build_zip(&[("notes.txt", "x"), ("bad.json", "[1, 2")]);
        let path = write_file(dir.path(), "export.zip", &bytes);
        assert!(load_document(&path).is_none());
    }

    #[test]
    fn test_load_document_corrupt_zip_yields_none() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.zip", b"PK\x03\x04garbage");
        assert!(load_document(&path).is_none());
    }

    #[test]
    fn test_load_document_from_bytes_sniffs_zip() {
        let bytes = build_zip(&[("data/export.JSON", r#"{"ok": true}"#)]);
        assert_eq!(load_document_from_bytes(&bytes), Some(json!({"ok": true})));
        assert_eq!(
            load_document_from_bytes(br#"{"ok": false}"#),
            Some(json!({"ok": false}))
        );
    }

    // ── validate_input_file ───────────────────────────────────────────────────

    #[test]
    fn test_validate_zip_requires_named_member() {
        let dir = TempDir::new().unwrap();
        let good = write_file(
            dir.path(),
            "good.zip",
            &build_zip(&[(REQUIRED_ZIP_MEMBER, "{}")]),
        );
        let bad = write_file(dir.path(), "bad.zip", &build_zip(&[("other.json", "{}")]));

        assert!(validate_input_file(&good));
        assert!(!validate_input_file(&bad));
    }

    #[test]
    fn test_validate_json_requires_video_list_key() {
        let dir = TempDir::new().unwrap();
        let good = write_file(dir.path(), "good.json", br#"{"video_list": []}"#);
        let bad = write_file(dir.path(), "bad.json", br#"{"Activity": {}}"#);
        let array = write_file(dir.path(), "array.json", br#"["video_list"]"#);
        let broken = write_file(dir.path(), "broken.json", b"{");

        assert!(validate_input_file(&good));
        assert!(!validate_input_file(&bad));
        assert!(!validate_input_file(&array));
        assert!(!validate_input_file(&broken));
    }

    #[test]
    fn test_validate_rejects_other_extensions() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "export.txt", br#"{"video_list": []}"#);
        assert!(!validate_input_file(&path));
    }
}
