//! Earthquake domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::earthquakes::geo::Coordinates;

pub const NO_RESULTS: &str = "No results found";
pub const MAX_CITY_NAME_LEN: usize = 100;

/// Errors raised by city registration and lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CityError {
    #[error("city {0} not found")]
    NotFound(u64),
    #[error("a city named '{0}' already exists")]
    DuplicateName(String),
    #[error("city name must be 1 to 100 characters")]
    InvalidName,
    #[error("coordinates out of range: latitude {latitude} must be within [-90, 90], longitude {longitude} within [-180, 180]")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Reject latitudes outside [-90, 90] and longitudes outside [-180, 180].
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), CityError> {
    if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
        Ok(())
    } else {
        Err(CityError::InvalidCoordinates {
            latitude,
            longitude,
        })
    }
}

/// A registered city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Payload for creating or replacing a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewCity {
    pub fn validate(&self) -> Result<(), CityError> {
        let len = self.name.trim().chars().count();
        if len == 0 || len > MAX_CITY_NAME_LEN {
            return Err(CityError::InvalidName);
        }
        check_coordinates(self.latitude, self.longitude)
    }
}

/// Errors raised when parsing a search date range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DateRangeError {
    #[error("invalid {field} '{value}', expected YYYY-MM-DD")]
    Malformed { field: &'static str, value: String },
    #[error("start_date {start} is after end_date {end}")]
    Reversed { start: NaiveDate, end: NaiveDate },
}

/// Inclusive date range of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse `start_date` / `end_date` query values.
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        let parse = |field: &'static str, value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                DateRangeError::Malformed {
                    field,
                    value: value.to_string(),
                }
            })
        };
        Self::new(parse("start_date", start)?, parse("end_date", end)?)
    }
}

/// USGS GeoJSON response body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Properties,
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// Epicenter position. GeoJSON stores `[longitude, latitude, depth]`.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self.geometry.as_ref()?.coordinates.as_slice() {
            [lon, lat, ..] => Some(Coordinates::new(*lat, *lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Properties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    /// Origin time in milliseconds since the epoch.
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    pub coordinates: Vec<f64>,
}

/// The earthquake closest to a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestEarthquake {
    pub city: String,
    pub magnitude: Option<f64>,
    pub place: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub distance_km: f64,
}

impl ClosestEarthquake {
    pub fn from_feature(city: &City, feature: &Feature, distance_km: f64) -> Self {
        Self {
            city: city.name.clone(),
            magnitude: feature.properties.mag,
            place: feature.properties.place.clone(),
            date: feature
                .properties
                .time
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            distance_km,
        }
    }
}

/// Result of a closest-earthquake search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    Found(ClosestEarthquake),
    NoResults { message: String },
}

impl SearchOutcome {
    pub fn no_results() -> Self {
        Self::NoResults {
            message: NO_RESULTS.to_string(),
        }
    }
}
