//! ConfDesk roster export
//!
//! Main application entry point: loads one roster page, derives the attendee
//! views and writes them to an export file.

use tracing::{info, warn};

use confdesk::{
    config::Settings,
    utils::{helpers::create_pagination_info, logging},
    ExportFormat, ExportOutcome, RefreshOutcome, RosterPipeline,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer alive
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", confdesk::info());

    let format = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<ExportFormat>()?,
        None => ExportFormat::Csv,
    };

    let pipeline = RosterPipeline::from_settings(&settings)?;
    match pipeline.refresh().await? {
        RefreshOutcome::Applied { token, attendees } => {
            info!(token = token, attendees = attendees, "Roster loaded");
        }
        other => warn!(outcome = ?other, "Roster refresh did not apply"),
    }

    if let Some(meta) = pipeline.page_meta() {
        info!(
            "{}",
            create_pagination_info(meta.page, meta.total_pages, meta.total)
        );
    }
    if let Some(stats) = pipeline.stats() {
        info!(total = stats.total, by_status = ?stats.by_status, "Roster summary");
    }

    let today = chrono::Local::now().date_naive();
    match pipeline.export(format, today)? {
        ExportOutcome::Exported(file) => {
            let path = file.write_to(&settings.export.output_dir).await?;
            info!(path = %path.display(), rows = file.rows, "Export written");
        }
        ExportOutcome::NothingToExport => warn!("Nothing to export"),
    }

    Ok(())
}
