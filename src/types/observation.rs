//! Defines the two fixed observation datasets served by the ARSO archive and
//! the constants (variable codes, group key, station id) each one queries.

use std::fmt;

/// The time granularity of an ARSO archive dataset.
///
/// Each kind maps to one fixed logical dataset: a set of variable codes, a
/// service-side group key and a single monitoring station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationKind {
    /// One row per half hour of a day, numeric values (temperature, wind, ...).
    HalfHourly,
    /// One categorical marker per day (snow day, hail day, ...), exposed as booleans.
    Daily,
}

impl ObservationKind {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            ObservationKind::HalfHourly => "halfhourly",
            ObservationKind::Daily => "daily",
        }
    }

    pub(crate) fn vars(&self) -> &'static str {
        match self {
            ObservationKind::HalfHourly => "12,15,21,26",
            ObservationKind::Daily => "56,62,80,70,47,50,75,83",
        }
    }

    pub(crate) fn group(&self) -> &'static str {
        match self {
            ObservationKind::HalfHourly => "halfhourlyData0",
            ObservationKind::Daily => "dailyData2",
        }
    }

    pub(crate) fn station_id(&self) -> &'static str {
        match self {
            ObservationKind::HalfHourly => "1828",
            ObservationKind::Daily => "1895",
        }
    }
}

/// Allows formatting an `ObservationKind` using its `path_segment`.
///
/// # Examples
///
/// ```
/// use arso::ObservationKind;
///
/// assert_eq!(format!("{}", ObservationKind::HalfHourly), "halfhourly");
/// assert_eq!(ObservationKind::Daily.to_string(), "daily");
/// ```
impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
