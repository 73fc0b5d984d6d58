use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

/// Log to `logs/` with size-based rotation, mirroring warnings to stderr
/// and everything to stdout. `base_level` is a flexi_logger spec such as
/// `"info"` or `"granule=debug"`.
///
/// File output stops when the returned handle is dropped, so binaries keep
/// it alive until exit.
#[must_use = "dropping the handle shuts the file logger down"]
pub fn setup_logging(base_level: &str) -> LoggerHandle {
    Logger::try_with_str(base_level)
        .unwrap_or_else(|e| panic!("Invalid log spec '{}': {}", base_level, e))
        .log_to_file(FileSpec::default().directory("logs"))
        .duplicate_to_stderr(Duplicate::Warn)
        .duplicate_to_stdout(Duplicate::All)
        .rotate(
            Criterion::Size(1024 * 1024), //1MB
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e))
}
