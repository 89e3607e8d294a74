use std::path::Path;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use super::error::Result;

pub const LOG_BASENAME: &str = "chartpad";

/// Start file logging into `log_dir`, rotated at 64 KiB with three old files
/// kept. Warnings and errors are mirrored to stderr. `RUST_LOG` overrides
/// `spec`. The returned handle must live until shutdown.
pub fn init(log_dir: &Path, spec: &str) -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_BASENAME)
                .suffix("log")
                .suppress_timestamp(),
        )
        .rotate(Criterion::Size(64 * 1024), Naming::Numbers, Cleanup::KeepLogFiles(3))
        .duplicate_to_stderr(Duplicate::Warn)
        .start()?;
    Ok(handle)
}
