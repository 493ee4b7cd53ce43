mod bootstrap;

use anyhow::Result;
use report_core::error::ReportError;
use report_core::settings::Settings;
use report_data::analysis::analyze_directory_with_progress;
use report_data::dataset::FilterSpec;
use report_data::excel::{export_file_name, ExcelReport};
use report_runtime::orchestrator::ReportOrchestrator;
use report_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Vessel Report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view, settings.theme);

    let data_path = match settings.data_dir.clone().or_else(bootstrap::discover_data_path) {
        Some(path) => path,
        None => {
            anyhow::bail!(
                "no data directory given and neither ./data nor ./csv exists; \
                 pass a DATA_DIR argument"
            );
        }
    };
    if !data_path.exists() {
        return Err(ReportError::DataPathNotFound(data_path).into());
    }
    tracing::info!("Data directory: {}", data_path.display());

    let filter = FilterSpec {
        vessels: settings.vessels.clone(),
        date_range: settings.date_range(),
    };
    let output_dir = settings
        .output_dir
        .clone()
        .unwrap_or_else(bootstrap::default_export_dir);

    match settings.view.as_str() {
        "dashboard" => {
            tracing::info!("Starting live dashboard...");

            let orchestrator =
                ReportOrchestrator::new(u64::from(settings.refresh_rate), data_path);
            let (rx, handle) = orchestrator.start();

            let app = App::new(&settings.theme, filter, output_dir);

            // Run the TUI event loop. The loop exits on 'q' / Ctrl+C inside the TUI.
            // We also listen for Ctrl+C at the OS level so that signals received
            // while the terminal is in raw mode are handled cleanly.
            tokio::select! {
                result = app.run_dashboard(rx) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down scan task");
                    handle.abort();
                }
            }
        }

        "table" => {
            tracing::info!("Running one-shot table view...");

            let analysis = analyze_directory_with_progress(&data_path, |index, total, record| {
                tracing::info!("Processing {} ({}/{})", record.file_name, index + 1, total);
            });

            let app = App::new(&settings.theme, filter, output_dir);
            app.run_static(analysis).await?;
        }

        "export" => {
            let analysis = analyze_directory_with_progress(&data_path, |index, total, record| {
                tracing::info!("Processing {} ({}/{})", record.file_name, index + 1, total);
            });
            let filtered = analysis.table.filter(&filter);

            std::fs::create_dir_all(&output_dir)?;
            let bytes = ExcelReport::new().render(&filtered)?;
            let path = output_dir.join(export_file_name(chrono::Local::now().naive_local()));
            std::fs::write(&path, bytes)?;

            tracing::info!(
                rows = filtered.len(),
                failed = analysis.metadata.failed_files,
                "report exported"
            );
            println!("{}", path.display());
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
