//! The main entry point for querying the ARSO weather archive.
//!
//! [`Arso`] wires the retrieval pipeline together: it owns the observation
//! repository (and through it the fetcher and decoder) and exposes the two
//! fixed-dataset accessors for half-hourly and daily observations.

use crate::archive::extractor::{extract_daily_flags, extract_hhour_row};
use crate::archive::repository::ObservationRepository;
use crate::error::ArsoError;
use crate::types::observation::ObservationKind;
use crate::types::query::ArchiveQuery;
use crate::utils::{default_cache_dir, ensure_cache_dir_exists, half_hour_slot};
use bon::bon;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Client for the ARSO weather archive.
///
/// Create an instance with [`Arso::new()`] to cache under the default
/// `vreme/` directory, or [`Arso::with_cache_folder()`] for a custom cache
/// location. Both accessors read through the cache: a cached day is served
/// from disk without touching the network.
///
/// # Examples
///
/// ```no_run
/// # use arso::{Arso, ArsoError};
/// # use chrono::NaiveDate;
/// # async fn run() -> Result<(), ArsoError> {
/// let client = Arso::new().await?;
/// let flags = client
///     .get_data_daily()
///     .date(NaiveDate::from_ymd_opt(2012, 11, 11).unwrap())
///     .features(&["sneg", "toca", "padavinski_dan"])
///     .call()
///     .await?;
/// println!("{flags:?}");
/// # Ok(())
/// # }
/// ```
pub struct Arso {
    repository: ObservationRepository,
}

#[bon]
impl Arso {
    /// Creates a client caching under a specific directory, created if missing.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, ArsoError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| ArsoError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            repository: ObservationRepository::new(&cache_folder),
        })
    }

    /// Creates a client caching under the default `vreme/` directory.
    pub async fn new() -> Result<Self, ArsoError> {
        Self::with_cache_folder(default_cache_dir()).await
    }

    /// Returns the numeric values of the requested half-hourly features at
    /// the half hour containing `datetime` (station 1828).
    ///
    /// The whole day is fetched (or served from cache), gaps are
    /// forward-filled then backward-filled, and the row for the datetime's
    /// half-hour slot is sliced out in request order. Features whose column
    /// holds no data at all that day come back as NaN.
    ///
    /// # Arguments
    ///
    /// * `.datetime(NaiveDateTime)`: **Required.** Any instant of the wanted day.
    /// * `.features(&[&str])`: **Required.** Feature names, e.g. `"t2m"`.
    /// * `.cache_files(bool)`: Optional. Persist the day's table to the cache.
    ///   Defaults to `false`.
    ///
    /// # Errors
    ///
    /// [`ArsoError::Archive`] variants for network, decode, cache and lookup
    /// failures; see [`crate::ArchiveError`].
    #[builder]
    pub async fn get_data_hhour(
        &self,
        datetime: NaiveDateTime,
        features: &[&str],
        cache_files: Option<bool>,
    ) -> Result<Vec<f64>, ArsoError> {
        let cache_files = cache_files.unwrap_or(false);
        let slot = half_hour_slot(&datetime);
        let query = ArchiveQuery::new(ObservationKind::HalfHourly, datetime.date());

        let table = self
            .repository
            .get_observations(&query, true, cache_files)
            .await?;
        extract_hhour_row(&table, query.date, slot, features).map_err(ArsoError::from)
    }

    /// Returns the boolean flags of the requested daily features for `date`
    /// (station 1895).
    ///
    /// A flag is true iff the archive marked that day with the literal "yes"
    /// marker for the feature; any other raw value, including a missing one,
    /// is false.
    ///
    /// # Arguments
    ///
    /// * `.date(NaiveDate)`: **Required.** The wanted day.
    /// * `.features(&[&str])`: **Required.** Feature names, e.g. `"sneg"`.
    /// * `.cache_files(bool)`: Optional. Persist the day's table to the cache.
    ///   Defaults to `false`.
    ///
    /// # Errors
    ///
    /// [`ArsoError::Archive`] variants; a feature absent from the day's table
    /// surfaces as [`crate::ArchiveError::FeatureNotFound`].
    #[builder]
    pub async fn get_data_daily(
        &self,
        date: NaiveDate,
        features: &[&str],
        cache_files: Option<bool>,
    ) -> Result<Vec<bool>, ArsoError> {
        let cache_files = cache_files.unwrap_or(false);
        let query = ArchiveQuery::new(ObservationKind::Daily, date);

        let table = self
            .repository
            .get_observations(&query, false, cache_files)
            .await?;
        extract_daily_flags(&table, features).map_err(ArsoError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn client_with_seeded_cache(
        kind: &str,
        filename: &str,
        content: &str,
    ) -> (tempfile::TempDir, Arso) {
        let dir = tempfile::tempdir().unwrap();
        let kind_dir = dir.path().join(kind);
        std::fs::create_dir_all(&kind_dir).unwrap();
        std::fs::write(kind_dir.join(filename), content).unwrap();
        let client = Arso::with_cache_folder(dir.path().to_path_buf())
            .await
            .unwrap();
        (dir, client)
    }

    #[tokio::test]
    async fn daily_features_come_from_cache_without_network() {
        let (_dir, client) = client_with_seeded_cache(
            "daily",
            "2012-11-11.csv",
            "sneg,false\ntoca,false\npadavinski_dan,true\n",
        )
        .await;

        let flags = client
            .get_data_daily()
            .date(NaiveDate::from_ymd_opt(2012, 11, 11).unwrap())
            .features(&["sneg", "toca", "padavinski_dan"])
            .call()
            .await
            .unwrap();

        assert_eq!(flags, vec![false, false, true]);
    }

    #[tokio::test]
    async fn hhour_features_come_from_cache_without_network() {
        let (_dir, client) = client_with_seeded_cache(
            "halfhourly",
            "2012-11-11.csv",
            concat!(
                "datetime,t2m,veter_hitrost\n",
                "2012-11-11T00:00:00,3.5,2.0\n",
                "2012-11-11T00:30:00,4.0,2.5\n",
            ),
        )
        .await;

        let values = client
            .get_data_hhour()
            .datetime(
                NaiveDate::from_ymd_opt(2012, 11, 11)
                    .unwrap()
                    .and_hms_opt(0, 40, 0)
                    .unwrap(),
            )
            .features(&["veter_hitrost", "t2m"])
            .call()
            .await
            .unwrap();

        assert_eq!(values, vec![2.5, 4.0]);
    }

    #[tokio::test]
    async fn slot_beyond_cached_day_is_an_error() {
        let (_dir, client) = client_with_seeded_cache(
            "halfhourly",
            "2012-11-11.csv",
            "datetime,t2m\n2012-11-11T00:00:00,3.5\n",
        )
        .await;

        let result = client
            .get_data_hhour()
            .datetime(
                NaiveDate::from_ymd_opt(2012, 11, 11)
                    .unwrap()
                    .and_hms_opt(12, 30, 0)
                    .unwrap(),
            )
            .features(&["t2m"])
            .call()
            .await;

        assert!(result.is_err());
    }
}
