use std::fs;
use std::time::Duration;
use stencil_logger::{ConsoleFormat, LogSettings, Logger, RotationPolicy};
use tempfile::tempdir;

#[test]
fn settings_write_json_lines_with_span_timings() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let settings = LogSettings {
        name: "integration-file-logging".to_owned(),
        console: ConsoleFormat::Off,
        directory: Some(log_dir.clone()),
        rotation: RotationPolicy::Never,
        json_files: true,
        span_timings: true,
        ..LogSettings::default()
    };
    let logger = Logger::from_settings(&settings)?;
    assert!(logger.writes_files());

    tracing::info_span!("compose", project = "orders").in_scope(|| {
        tracing::info!(features = 2, "Composition finished");
    });

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    assert!(contents.contains("Composition finished"));
    assert!(contents.contains("time.busy"), "span close event should carry timings");
    for line in contents.lines().filter(|line| !line.trim().is_empty()) {
        serde_json::from_str::<serde_json::Value>(line)?;
    }

    Ok(())
}
