#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street hotspot aggregation.
//!
//! Filters loaded records to alcohol-related accidents, groups them by exact
//! street name, and ranks the groups by count. Ties keep the order in which
//! each street first appeared in the upload, so the output is fully
//! determined by the input.
//!
//! Every function here is pure; [`HotspotReport::build`] bundles all derived
//! views for one `(records, limit)` pair and is what the UI shell re-runs on
//! every parameter change.

use std::collections::HashMap;

use accident_hotspots_accident_models::{AccidentRecord, GeoPoint, StreetCount, StreetHotspot};

/// Number of hotspots returned when the caller does not choose a limit.
pub const DEFAULT_HOTSPOT_LIMIT: usize = 10;

/// A street's qualifying records, before ranking.
struct StreetGroup<'a> {
    street_name: &'a str,
    count: usize,
    /// First qualifying record on this street in input order.
    first: &'a AccidentRecord,
}

impl StreetGroup<'_> {
    fn to_hotspot(&self) -> StreetHotspot {
        StreetHotspot {
            street_name: self.street_name.to_owned(),
            count: self.count,
            latitude: self.first.latitude,
            longitude: self.first.longitude,
        }
    }

    fn to_count(&self) -> StreetCount {
        StreetCount {
            street_name: self.street_name.to_owned(),
            count: self.count,
        }
    }
}

/// Groups qualifying records by street, in first-appearance order.
fn group_qualifying(records: &[AccidentRecord]) -> Vec<StreetGroup<'_>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<StreetGroup<'_>> = Vec::new();

    for record in records.iter().filter(|r| r.is_drunk_driving) {
        if let Some(&i) = positions.get(record.street_name.as_str()) {
            groups[i].count += 1;
        } else {
            positions.insert(&record.street_name, groups.len());
            groups.push(StreetGroup {
                street_name: &record.street_name,
                count: 1,
                first: record,
            });
        }
    }

    groups
}

/// Groups and sorts by count descending. `sort_by` is stable, which keeps
/// first-appearance order among equal counts.
fn ranked_groups(records: &[AccidentRecord]) -> Vec<StreetGroup<'_>> {
    let mut groups = group_qualifying(records);
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// Number of alcohol-related records.
#[must_use]
pub fn qualifying_count(records: &[AccidentRecord]) -> usize {
    records.iter().filter(|r| r.is_drunk_driving).count()
}

/// Returns the `limit` streets with the most alcohol-related accidents.
///
/// Each hotspot is placed at the coordinate of the first qualifying record
/// on its street. The result has `min(limit, distinct qualifying streets)`
/// entries and is empty when nothing qualifies.
#[must_use]
pub fn top_hotspots(records: &[AccidentRecord], limit: usize) -> Vec<StreetHotspot> {
    ranked_groups(records)
        .iter()
        .take(limit)
        .map(StreetGroup::to_hotspot)
        .collect()
}

/// Returns every street with at least one alcohol-related accident, ranked
/// the same way as [`top_hotspots`] but without truncation.
#[must_use]
pub fn rank_streets(records: &[AccidentRecord]) -> Vec<StreetCount> {
    ranked_groups(records)
        .iter()
        .map(StreetGroup::to_count)
        .collect()
}

/// Mean latitude and longitude over all records, qualifying or not.
///
/// Only used to center the map. Returns `None` for an empty record set.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn map_center(records: &[AccidentRecord]) -> Option<GeoPoint> {
    if records.is_empty() {
        return None;
    }

    let n = records.len() as f64;
    let (lat_sum, lng_sum) = records.iter().fold((0.0, 0.0), |(lat, lng), r| {
        (lat + r.latitude, lng + r.longitude)
    });

    Some(GeoPoint {
        latitude: lat_sum / n,
        longitude: lng_sum / n,
    })
}

/// All views derived from one upload and one hotspot limit.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotReport {
    /// Number of loaded records.
    pub total_records: usize,
    /// Number of alcohol-related records.
    pub qualifying_records: usize,
    /// Map center, `None` when there are no records.
    pub center: Option<GeoPoint>,
    /// Top streets with marker coordinates.
    pub hotspots: Vec<StreetHotspot>,
    /// Full street ranking for the table.
    pub ranking: Vec<StreetCount>,
}

impl HotspotReport {
    /// Computes every derived view for `records`, grouping them once.
    #[must_use]
    pub fn build(records: &[AccidentRecord], limit: usize) -> Self {
        let groups = ranked_groups(records);
        let ranking: Vec<StreetCount> = groups.iter().map(StreetGroup::to_count).collect();
        let hotspots = groups
            .iter()
            .take(limit)
            .map(StreetGroup::to_hotspot)
            .collect();
        let qualifying_records = groups.iter().map(|group| group.count).sum();

        log::debug!(
            "Aggregated {} records: {qualifying_records} qualifying across {} streets",
            records.len(),
            ranking.len()
        );

        Self {
            total_records: records.len(),
            qualifying_records,
            center: map_center(records),
            hotspots,
            ranking,
        }
    }
}
