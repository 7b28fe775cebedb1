use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI log-level name to a tracing filter directive.
///
/// Unrecognised names are passed through unchanged so that full
/// `EnvFilter` directives (`timeline_data=debug`) also work.
pub fn normalise_log_level(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr so rendered tables and JSON on stdout stay clean.
/// Falls back to `"info"` if the level string is not a valid directive.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(normalise_log_level(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_log_level_maps_python_names() {
        assert_eq!(normalise_log_level("DEBUG"), "debug");
        assert_eq!(normalise_log_level("info"), "info");
        assert_eq!(normalise_log_level("WARNING"), "warn");
        assert_eq!(normalise_log_level("ERROR"), "error");
        assert_eq!(normalise_log_level("CRITICAL"), "error");
    }

    #[test]
    fn test_normalise_log_level_passes_directives_through() {
        assert_eq!(
            normalise_log_level("timeline_data=debug"),
            "timeline_data=debug"
        );
    }
}
