//! Decodes the ARSO archive response body.
//!
//! The archive wraps a loosely formatted JavaScript object literal inside XML
//! markup: `...AcademaPUJS.set( {points: {...}, params: {...}})]]>...`.
//! The literal uses unquoted keys, single quotes and trailing commas, so it is
//! parsed with json5 rather than strict JSON.

use crate::archive::error::ArchiveError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::warn;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

static PAYLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)AcademaPUJS\.set\(\s*(.*)\)\]\]>").expect("payload marker pattern is valid")
});

/// All time offsets in the payload are minutes since this instant.
static ARCHIVE_EPOCH: LazyLock<NaiveDateTime> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(1800, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("1800-01-01T00:00:00 is a valid instant")
});

/// One catalog entry; the archive sends more fields (unit, min/max, ...) but
/// only the human-readable name is used.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ParamInfo {
    pub name: String,
}

/// The embedded object literal, split into its two top-level keys.
///
/// `points` keeps payload order so "first point wins" is well defined when a
/// response unexpectedly carries more than one station block.
#[derive(Debug, Deserialize)]
pub(crate) struct ArchivePayload {
    pub points: Map<String, Value>,
    pub params: HashMap<String, ParamInfo>,
}

impl ArchivePayload {
    /// Selects the first station point in payload order.
    pub(crate) fn first_point(&self) -> Result<(&str, &Value), ArchiveError> {
        if self.points.len() > 1 {
            warn!(
                "Archive returned {} points, using the first; the query may not match the station id",
                self.points.len()
            );
        }
        self.points
            .iter()
            .next()
            .map(|(key, value)| (key.as_str(), value))
            .ok_or(ArchiveError::NoPoints)
    }

    pub(crate) fn param_name(&self, code: &str) -> Result<&str, ArchiveError> {
        self.params
            .get(code)
            .map(|p| p.name.as_str())
            .ok_or_else(|| ArchiveError::ParamNotInCatalog(code.to_string()))
    }
}

/// Extracts the embedded object literal and parses it leniently.
pub(crate) fn decode_payload(body: &str) -> Result<ArchivePayload, ArchiveError> {
    let captures = PAYLOAD_RE
        .captures(body)
        .ok_or(ArchiveError::MarkerNotFound)?;
    json5::from_str(&captures[1]).map_err(ArchiveError::PayloadParse)
}

/// Converts an offset key (minutes since the epoch, underscore-separated) to
/// an absolute timestamp.
pub(crate) fn offset_to_datetime(key: &str) -> Result<NaiveDateTime, ArchiveError> {
    let minutes: i64 = key
        .replace('_', "")
        .parse()
        .map_err(|_| ArchiveError::BadTimeOffset(key.to_string()))?;
    Ok(*ARCHIVE_EPOCH + Duration::minutes(minutes))
}

/// Interprets a raw payload value as a number; numeric strings are accepted,
/// anything else counts as missing.
pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BODY: &str = concat!(
        r#"<data><![CDATA[AcademaPUJS.set( {points:{_1828:{"#,
        r#"_0:{p12:'3.5', p15:2,}, _30:{p12:null, p15:'2.5'},"#,
        r#"}}, params:{p12:{name:'t2m', unit:'°C'}, p15:{name:'veter_hitrost'}}})]]></data>"#
    );

    #[test]
    fn decodes_lenient_object_literal() {
        let payload = decode_payload(SAMPLE_BODY).unwrap();

        let (point, data) = payload.first_point().unwrap();
        assert_eq!(point, "_1828");
        let rows = data.as_object().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(value_to_f64(&rows["_0"]["p12"]), Some(3.5));
        assert_eq!(value_to_f64(&rows["_30"]["p15"]), Some(2.5));

        assert_eq!(payload.param_name("p12").unwrap(), "t2m");
        assert_eq!(payload.param_name("p15").unwrap(), "veter_hitrost");
    }

    #[test]
    fn first_point_wins_when_multiple_are_present() {
        let body = r#"AcademaPUJS.set( {points:{_1:{p1:'1'}, _2:{p1:'2'}}, params:{p1:{name:'x'}}})]]>"#;
        let payload = decode_payload(body).unwrap();
        let (point, _) = payload.first_point().unwrap();
        assert_eq!(point, "_1");
    }

    #[test]
    fn missing_marker_is_an_error() {
        let err = decode_payload("<data>nothing embedded here</data>").unwrap_err();
        assert!(matches!(err, ArchiveError::MarkerNotFound));
    }

    #[test]
    fn garbage_literal_is_an_error() {
        let err = decode_payload("AcademaPUJS.set( {points: )]]>").unwrap_err();
        assert!(matches!(err, ArchiveError::PayloadParse(_)));
    }

    #[test]
    fn unknown_param_code_is_an_error() {
        let payload = decode_payload(SAMPLE_BODY).unwrap();
        assert!(matches!(
            payload.param_name("p99").unwrap_err(),
            ArchiveError::ParamNotInCatalog(code) if code == "p99"
        ));
    }

    #[test]
    fn offset_zero_is_the_epoch() {
        assert_eq!(
            offset_to_datetime("0").unwrap(),
            NaiveDate::from_ymd_opt(1800, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn offset_of_one_day_in_minutes() {
        assert_eq!(
            offset_to_datetime("1440").unwrap(),
            NaiveDate::from_ymd_opt(1800, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn underscores_are_stripped_before_parsing() {
        assert_eq!(
            offset_to_datetime("1_440").unwrap(),
            offset_to_datetime("1440").unwrap()
        );
    }

    #[test]
    fn invalid_offset_key_is_an_error() {
        assert!(matches!(
            offset_to_datetime("not_a_number").unwrap_err(),
            ArchiveError::BadTimeOffset(_)
        ));
    }

    #[test]
    fn non_numeric_values_count_as_missing() {
        assert_eq!(value_to_f64(&Value::Null), None);
        assert_eq!(value_to_f64(&Value::String("da".into())), None);
        assert_eq!(value_to_f64(&Value::String(" 1.25 ".into())), Some(1.25));
    }
}
