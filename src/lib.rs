mod archive;
mod arso;
mod error;
mod types;
mod utils;

pub use arso::*;
pub use error::ArsoError;

pub use archive::error::ArchiveError;
pub use archive::fetcher::ArchiveFetcher;
pub use archive::repository::ObservationRepository;
pub use archive::retry::RetryPolicy;

pub use types::observation::ObservationKind;
pub use types::query::ArchiveQuery;

pub use utils::{default_cache_dir, ensure_cache_dir_exists};
