use crate::archive::error::ArchiveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArsoError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),
}
