#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the accident hotspots server.
//!
//! These types are serialized to JSON for the page script and the CLI's
//! `--format json` output. They are separate from the aggregation types to
//! allow independent evolution of the API contract.

use accident_hotspots_accident_models::{GeoPoint, StreetCount, StreetHotspot};
use accident_hotspots_hotspot::HotspotReport;
use serde::{Deserialize, Serialize};

/// Initial zoom level for the hotspot map.
pub const DEFAULT_MAP_ZOOM: u8 = 12;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters for the report endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQueryParams {
    /// Maximum number of hotspot markers (server default when absent).
    pub limit: Option<usize>,
}

/// A coordinate as returned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCoordinate {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl From<GeoPoint> for ApiCoordinate {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// A map marker for one hotspot street.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHotspot {
    /// Street name.
    pub street_name: String,
    /// Number of alcohol-related accidents.
    pub count: usize,
    /// Marker latitude.
    pub latitude: f64,
    /// Marker longitude.
    pub longitude: f64,
    /// Popup text.
    pub label: String,
}

impl From<StreetHotspot> for ApiHotspot {
    fn from(hotspot: StreetHotspot) -> Self {
        let label = hotspot.popup_label();
        Self {
            street_name: hotspot.street_name,
            count: hotspot.count,
            latitude: hotspot.latitude,
            longitude: hotspot.longitude,
            label,
        }
    }
}

/// One row of the "top streets" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStreetCount {
    /// 1-based rank.
    pub rank: usize,
    /// Street name.
    pub street_name: String,
    /// Number of alcohol-related accidents.
    pub count: usize,
}

/// Everything the page needs to render one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReport {
    /// Total accidents in the upload.
    pub total_records: usize,
    /// Alcohol-related accidents in the upload.
    pub qualifying_records: usize,
    /// Map center; absent for an empty upload.
    pub center: Option<ApiCoordinate>,
    /// Initial map zoom level.
    pub zoom: u8,
    /// Top-N hotspot markers.
    pub hotspots: Vec<ApiHotspot>,
    /// Full street ranking.
    pub ranking: Vec<ApiStreetCount>,
    /// Non-fatal warnings to show alongside the results.
    pub warnings: Vec<String>,
}

impl ApiReport {
    /// Converts an aggregation result into its API form.
    #[must_use]
    pub fn new(report: HotspotReport, warnings: Vec<String>) -> Self {
        Self {
            total_records: report.total_records,
            qualifying_records: report.qualifying_records,
            center: report.center.map(ApiCoordinate::from),
            zoom: DEFAULT_MAP_ZOOM,
            hotspots: report.hotspots.into_iter().map(ApiHotspot::from).collect(),
            ranking: report
                .ranking
                .into_iter()
                .enumerate()
                .map(|(i, StreetCount { street_name, count })| ApiStreetCount {
                    rank: i + 1,
                    street_name,
                    count,
                })
                .collect(),
            warnings,
        }
    }
}

/// Error body returned for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error class (`format`, `parse`, `csv`, `io`,
    /// `too_large`, `payload`, `query`)..
    pub kind: String,
}
