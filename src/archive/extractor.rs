//! Slices plain vectors out of observation tables for the accessor surface.

use crate::archive::error::ArchiveError;
use chrono::NaiveDate;
use polars::prelude::*;

/// Returns the requested feature values at one half-hour slot of the day.
///
/// A slot beyond the table is an error; a value that is still null after the
/// fill pass (a column with no data at all that day) comes back as NaN.
pub(crate) fn extract_hhour_row(
    table: &DataFrame,
    date: NaiveDate,
    slot: usize,
    features: &[&str],
) -> Result<Vec<f64>, ArchiveError> {
    if slot >= table.height() {
        return Err(ArchiveError::DataNotFound { date, slot });
    }

    let mut values = Vec::with_capacity(features.len());
    for feature in features {
        let column = table
            .column(feature)
            .map_err(|e| ArchiveError::ColumnNotFound(feature.to_string(), e))?;
        let value = column
            .f64()
            .map_err(ArchiveError::DataFrameProcessing)?
            .get(slot)
            .unwrap_or(f64::NAN);
        values.push(value);
    }
    Ok(values)
}

/// Returns the requested feature flags from a daily table, in request order.
pub(crate) fn extract_daily_flags(
    table: &DataFrame,
    features: &[&str],
) -> Result<Vec<bool>, ArchiveError> {
    let params = table
        .column("param")
        .map_err(|e| ArchiveError::ColumnNotFound("param".to_string(), e))?
        .str()
        .map_err(ArchiveError::DataFrameProcessing)?
        .clone();
    let values = table
        .column("value")
        .map_err(|e| ArchiveError::ColumnNotFound("value".to_string(), e))?
        .bool()
        .map_err(ArchiveError::DataFrameProcessing)?
        .clone();

    let mut flags = Vec::with_capacity(features.len());
    for feature in features {
        let index = params
            .iter()
            .position(|param| param == Some(*feature))
            .ok_or_else(|| ArchiveError::FeatureNotFound(feature.to_string()))?;
        flags.push(values.get(index).unwrap_or(false));
    }
    Ok(flags)
}
