pub(crate) mod decoder;
pub mod error;
pub(crate) mod extractor;
pub mod fetcher;
pub mod repository;
pub mod retry;
