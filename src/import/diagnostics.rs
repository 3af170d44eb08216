use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub const DUMP_FILE_PREFIX: &str = "import_log_file";

/// `import_log_file<yyyyMMddhhmmss>.xml`; the hour is on the 12-hour clock
pub fn dump_file_name(at: DateTime<Utc>) -> String {
    format!("{}{}.xml", DUMP_FILE_PREFIX, at.format("%Y%m%d%I%M%S"))
}

/// Dump location; an empty or missing save dir means the working directory
pub fn dump_path(save_dir: Option<&Path>, at: DateTime<Utc>) -> PathBuf {
    let dir = save_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(dump_file_name(at))
}

/// Write the raw import job XML to disk and return where it went
pub async fn write_import_job_dump(
    save_dir: Option<&Path>,
    data: &str,
    at: DateTime<Utc>,
) -> anyhow::Result<PathBuf> {
    let path = dump_path(save_dir, at);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    tokio::fs::write(&path, data)
        .await
        .with_context(|| format!("Failed to write import job file: {}", path.display()))?;

    log::debug!("Wrote import job data to {}", path.display());
    Ok(path)
}
