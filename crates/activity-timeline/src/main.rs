mod bootstrap;
mod render;

use anyhow::{Context, Result};
use timeline_core::settings::Settings;
use timeline_data::analysis::{analyze_archive, AnalysisOptions};
use timeline_data::donation::DonationPayload;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;
    settings.validate()?;

    tracing::info!("Activity timeline v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, window: {} days, granularity: {}",
        settings.input.display(),
        settings.window_days,
        settings.granularity
    );

    let options = AnalysisOptions {
        now: settings.reference_time()?,
        window_days: settings.window_days,
        skip_validation: settings.skip_validation,
    };

    let analysis = analyze_archive(&settings.input, &options).with_context(|| {
        format!(
            "could not process {}, try a different file",
            settings.input.display()
        )
    })?;

    tracing::info!(
        "Built {} buckets from {} records ({} inside window) in {:.3}s",
        analysis.metadata.buckets_created,
        analysis.metadata.records_extracted,
        analysis.metadata.records_in_window,
        analysis.metadata.load_time_seconds + analysis.metadata.transform_time_seconds
    );

    let timeline = if settings.is_daily() {
        analysis.timeline.rollup_daily()
    } else {
        analysis.timeline.clone()
    };

    match settings.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&timeline)?),
        "summary" => print!("{}", analysis.summary),
        _ => {
            print!("{}", analysis.summary);
            println!();
            print!("{}", render::render_table(&timeline));
        }
    }

    if let Some(path) = &settings.donation_out {
        let payload = DonationPayload::new(&settings.session_id, &settings.platform, &timeline);
        payload
            .write_to(path)
            .with_context(|| format!("failed to write donation payload to {}", path.display()))?;
        tracing::info!("Donation payload written to {}", path.display());
    }

    Ok(())
}
