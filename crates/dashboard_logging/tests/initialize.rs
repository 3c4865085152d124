use dashboard_logging::{dashboard_info, initialize, LogDestination, LogSettings};
use log::LevelFilter;

#[test]
fn file_logger_writes_records_and_refuses_second_init() {
    let dir = tempfile::tempdir().unwrap();
    let settings = LogSettings {
        destination: LogDestination::File,
        file_path: dir.path().join("dashboard.log"),
        level: LevelFilter::Info,
    };

    assert!(initialize(&settings));
    dashboard_info!("poller started job_id={}", "abc");
    log::logger().flush();

    let written = std::fs::read_to_string(&settings.file_path).unwrap();
    assert!(written.contains("poller started job_id=abc"));

    // A global logger is already installed.
    assert!(!initialize(&settings));
}

#[test]
fn unwritable_log_file_yields_no_logger() {
    let dir = tempfile::tempdir().unwrap();
    let settings = LogSettings {
        destination: LogDestination::File,
        file_path: dir.path().join("missing").join("dashboard.log"),
        level: LevelFilter::Info,
    };

    assert!(!initialize(&settings));
}
