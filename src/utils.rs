use chrono::{NaiveDateTime, Timelike};
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "vreme";

/// The default cache root, a `vreme/` directory under the working directory.
pub fn default_cache_dir() -> PathBuf {
    PathBuf::from(CACHE_DIR_NAME)
}

pub async fn ensure_cache_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!(
                        "cache path exists but is not a directory: {}",
                        path.display()
                    ),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

/// Maps a time of day to its half-hour row index, clamped to the last valid
/// slot of a 48-row day.
pub(crate) fn half_hour_slot(datetime: &NaiveDateTime) -> usize {
    let mut slot = datetime.hour() as usize * 2;
    if datetime.minute() >= 30 {
        slot += 1;
    }
    slot.min(47)
}
