//! A single-day query against the ARSO archive endpoint.

use crate::archive::error::ArchiveError;
use crate::types::observation::ObservationKind;
use chrono::NaiveDate;
use reqwest::Url;

pub(crate) const BASE_URL: &str = "http://meteo.arso.gov.si/webmet/archive/data.xml";

const PARAM_VARS: &str = "vars";
const PARAM_GROUP: &str = "group";
const PARAM_TYPE: &str = "type";
const PARAM_STATION_ID: &str = "id";
const PARAM_DATE: &str = "d1";

/// Identifies one (observation kind, date) request. Immutable, constructed per call.
///
/// The variable codes, group key and station id are fixed per kind, so the
/// query only carries the kind and the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveQuery {
    pub kind: ObservationKind,
    pub date: NaiveDate,
}

impl ArchiveQuery {
    pub fn new(kind: ObservationKind, date: NaiveDate) -> Self {
        Self { kind, date }
    }

    /// Serializes the query into the archive URL with the fixed parameter names.
    pub(crate) fn to_url(&self) -> Result<Url, ArchiveError> {
        let date = self.date.to_string();
        Url::parse_with_params(
            BASE_URL,
            [
                (PARAM_VARS, self.kind.vars()),
                (PARAM_GROUP, self.kind.group()),
                (PARAM_TYPE, self.kind.path_segment()),
                (PARAM_STATION_ID, self.kind.station_id()),
                (PARAM_DATE, date.as_str()),
            ],
        )
        .map_err(|e| ArchiveError::InvalidUrl(e.to_string()))
    }
}
