#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident record and street hotspot types.
//!
//! [`AccidentRecord`] is the normalized form of one uploaded CSV row. The
//! aggregation step derives [`StreetHotspot`] and [`StreetCount`] values
//! from a slice of records; neither is ever persisted.

use serde::{Deserialize, Serialize};

/// Names of the CSV columns every upload must carry.
pub mod columns {
    /// Latitude in decimal degrees.
    pub const LATITUDE: &str = "latitude";
    /// Longitude in decimal degrees.
    pub const LONGITUDE: &str = "longitude";
    /// Street the accident occurred on.
    pub const STREET_NAME: &str = "street_name";
    /// Whether alcohol was involved.
    pub const IS_DRUNK_DRIVING: &str = "is_drunk_driving";

    /// All required columns, in canonical order.
    pub const REQUIRED: [&str; 4] = [LATITUDE, LONGITUDE, STREET_NAME, IS_DRUNK_DRIVING];
}

/// A single traffic accident, as loaded from one CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentRecord {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Street name, compared case-sensitively when grouping.
    pub street_name: String,
    /// Whether the accident was alcohol-related.
    pub is_drunk_driving: bool,
}

impl AccidentRecord {
    /// Returns the accident location.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// A street ranked by its number of alcohol-related accidents, with a
/// coordinate to place its map marker at.
///
/// The coordinate belongs to the first qualifying record on that street in
/// input order. It is a representative point, not a centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetHotspot {
    /// Street name.
    pub street_name: String,
    /// Number of qualifying accidents on this street (always at least 1).
    pub count: usize,
    /// Latitude of the representative record.
    pub latitude: f64,
    /// Longitude of the representative record.
    pub longitude: f64,
}

impl StreetHotspot {
    /// Returns the marker location.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Text shown in the marker popup, e.g. `"Main St: 3 accidents"`.
    #[must_use]
    pub fn popup_label(&self) -> String {
        format!("{}: {} accidents", self.street_name, self.count)
    }
}

/// One row of the full street ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetCount {
    /// Street name.
    pub street_name: String,
    /// Number of qualifying accidents on this street.
    pub count: usize,
}

impl From<&StreetHotspot> for StreetCount {
    fn from(hotspot: &StreetHotspot) -> Self {
        Self {
            street_name: hotspot.street_name.clone(),
            count: hotspot.count,
        }
    }
}
