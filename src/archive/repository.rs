use crate::archive::decoder::{decode_payload, offset_to_datetime, value_to_f64, ArchivePayload};
use crate::archive::error::ArchiveError;
use crate::archive::fetcher::ArchiveFetcher;
use crate::types::observation::ObservationKind;
use crate::types::query::ArchiveQuery;
use chrono::NaiveDateTime;
use log::{info, warn};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::{fs, task};

/// The literal marker the archive uses for "yes" in daily categorical values.
const DAILY_YES_MARKER: &str = "da";

/// Orchestrates fetch + decode, reshapes the decoded payload into the
/// type-specific table and manages the on-disk CSV cache.
pub struct ObservationRepository {
    cache_dir: PathBuf,
    fetcher: ArchiveFetcher,
}

impl ObservationRepository {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            fetcher: ArchiveFetcher::default(),
        }
    }

    /// Returns the observation table for one (kind, date) pair.
    ///
    /// A cache hit short-circuits the fetch/decode stage entirely, even when
    /// `cache_files` is false; cached content is trusted as written. On a
    /// miss the archive is queried and the reshaped table is written back
    /// when `cache_files` is set.
    pub async fn get_observations(
        &self,
        query: &ArchiveQuery,
        fillna: bool,
        cache_files: bool,
    ) -> Result<DataFrame, ArchiveError> {
        let path = self.cache_path(query);

        if fs::metadata(&path).await.is_ok() {
            info!(
                "Cache hit for {} observations on {} at {:?}",
                query.kind, query.date, path
            );
            return load_cached(query.kind, &path).await;
        }

        warn!(
            "Cache miss for {} observations on {}. Querying archive.",
            query.kind, query.date
        );
        let body = self.fetcher.fetch(query).await?;
        let payload = decode_payload(&body)?;

        let table = match query.kind {
            ObservationKind::HalfHourly => shape_halfhourly(&payload, fillna)?,
            ObservationKind::Daily => shape_daily(&payload)?,
        };

        if cache_files {
            self.store(query.kind, &path, &table).await?;
            info!(
                "Cached {} observations for {} to {:?}",
                query.kind, query.date, path
            );
        }

        Ok(table)
    }

    fn cache_path(&self, query: &ArchiveQuery) -> PathBuf {
        self.cache_dir
            .join(query.kind.path_segment())
            .join(format!("{}.csv", query.date))
    }

    /// Writes a table to the cache, creating intermediate directories.
    async fn store(
        &self,
        kind: ObservationKind,
        path: &Path,
        table: &DataFrame,
    ) -> Result<(), ArchiveError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ArchiveError::CacheDirCreation(parent.to_path_buf(), e))?;
        }

        let path_buf = path.to_path_buf();
        let mut table = table.clone();
        // Daily files carry no header, matching the shape load_cached expects.
        let include_header = matches!(kind, ObservationKind::HalfHourly);

        task::spawn_blocking(move || {
            let file = std::fs::File::create(&path_buf)
                .map_err(|e| ArchiveError::CacheWriteIo(path_buf.clone(), e))?;
            CsvWriter::new(file)
                .include_header(include_header)
                .finish(&mut table)
                .map_err(|e| ArchiveError::CacheWritePolars(path_buf, e))?;
            Ok::<(), ArchiveError>(())
        })
        .await??;
        Ok(())
    }
}

/// Loads a cached table in the kind-specific shape.
async fn load_cached(kind: ObservationKind, path: &Path) -> Result<DataFrame, ArchiveError> {
    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || match kind {
        ObservationKind::HalfHourly => read_halfhourly_csv(&path_buf),
        ObservationKind::Daily => read_daily_csv(&path_buf),
    })
    .await?
}

fn read_halfhourly_csv(path: &Path) -> Result<DataFrame, ArchiveError> {
    let mut table = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ArchiveError::CacheReadPolars(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| ArchiveError::CacheReadPolars(path.to_path_buf(), e))?;

    // Integral columns come back as i64, bring everything to f64.
    let names: Vec<String> = table
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    for name in names {
        if name == "datetime" {
            continue;
        }
        let cast = table
            .column(&name)
            .map_err(|e| ArchiveError::ColumnNotFound(name.clone(), e))?
            .cast(&DataType::Float64)?;
        table.with_column(cast.take_materialized_series())?;
    }
    Ok(table)
}

fn read_daily_csv(path: &Path) -> Result<DataFrame, ArchiveError> {
    let mut table = CsvReadOptions::default()
        .with_has_header(false)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ArchiveError::CacheReadPolars(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| ArchiveError::CacheReadPolars(path.to_path_buf(), e))?;

    if table.width() != 2 {
        return Err(ArchiveError::CacheSchemaMismatch {
            path: path.to_path_buf(),
            expected: 2,
            found: table.width(),
        });
    }
    table.set_column_names(["param", "value"])?;

    let cast = table
        .column("value")
        .map_err(|e| ArchiveError::ColumnNotFound("value".to_string(), e))?
        .cast(&DataType::Boolean)?;
    table.with_column(cast.take_materialized_series())?;
    Ok(table)
}

/// Builds the time-indexed half-hourly table from the first point's data.
///
/// Rows are sorted by timestamp, columns are renamed to feature names via the
/// parameter catalog and, when `fillna` is set, gaps are forward-filled then
/// backward-filled along the time axis.
pub(crate) fn shape_halfhourly(
    payload: &ArchivePayload,
    fillna: bool,
) -> Result<DataFrame, ArchiveError> {
    let (point, data) = payload.first_point()?;
    let rows = data.as_object().ok_or_else(|| ArchiveError::PayloadShape {
        message: format!("point '{point}' is not a map of time offsets"),
    })?;

    let mut stamped: Vec<(NaiveDateTime, &Map<String, Value>)> = Vec::with_capacity(rows.len());
    for (offset, entry) in rows {
        let entry = entry.as_object().ok_or_else(|| ArchiveError::PayloadShape {
            message: format!("offset '{offset}' of point '{point}' is not a map of variables"),
        })?;
        stamped.push((offset_to_datetime(offset)?, entry));
    }
    stamped.sort_by_key(|(timestamp, _)| *timestamp);

    // Column order: first seen across rows, as the payload presents them.
    let mut codes: Vec<&String> = Vec::new();
    for (_, entry) in &stamped {
        for code in entry.keys() {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }

    let timestamps: Vec<i64> = stamped
        .iter()
        .map(|(timestamp, _)| timestamp.and_utc().timestamp_millis())
        .collect();
    let datetime = Series::new("datetime".into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let mut columns = vec![datetime.into_column()];
    for code in codes {
        let name = payload.param_name(code)?;
        let values: Vec<Option<f64>> = stamped
            .iter()
            .map(|(_, entry)| entry.get(code).and_then(value_to_f64))
            .collect();
        let mut series = Series::new(name.into(), values);
        if fillna {
            series = fill_gaps(&series)?;
        }
        columns.push(series.into_column());
    }

    DataFrame::new(columns).map_err(ArchiveError::from)
}

/// Forward-fill then backward-fill; a column with no values at all stays empty.
pub(crate) fn fill_gaps(series: &Series) -> Result<Series, ArchiveError> {
    Ok(series
        .fill_null(FillNullStrategy::Forward(None))?
        .fill_null(FillNullStrategy::Backward(None))?)
}

/// Builds the daily table: one `(param, value)` row per variable, where the
/// value is true iff the raw marker equals the literal "yes" marker.
pub(crate) fn shape_daily(payload: &ArchivePayload) -> Result<DataFrame, ArchiveError> {
    let (point, data) = payload.first_point()?;
    let entries = data.as_object().ok_or_else(|| ArchiveError::PayloadShape {
        message: format!("point '{point}' is not a map of variables"),
    })?;

    let mut names: Vec<String> = Vec::with_capacity(entries.len());
    let mut flags: Vec<bool> = Vec::with_capacity(entries.len());
    for (code, value) in entries {
        names.push(payload.param_name(code)?.to_string());
        flags.push(matches!(value, Value::String(s) if s == DAILY_YES_MARKER));
    }

    DataFrame::new(vec![
        Column::new("param".into(), names),
        Column::new("value".into(), flags),
    ])
    .map_err(ArchiveError::from)
}
