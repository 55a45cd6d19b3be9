//! Terminal rendering of a hotspot report.

use std::fmt::Write as _;
use std::path::Path;

use accident_hotspots_hotspot::HotspotReport;
use accident_hotspots_loader::{LoadError, empty_input_warning, load_file};
use accident_hotspots_server_models::ApiReport;
use strum_macros::{Display, EnumString};

/// How `report` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary and ranking table.
    Table,
    /// The same JSON the web page receives.
    Json,
}

/// Loads `path` and builds the report the web page would show for it.
///
/// # Errors
///
/// Returns any [`LoadError`] from loading the file.
pub fn build(path: &Path, limit: usize) -> Result<ApiReport, LoadError> {
    let records = load_file(path)?;
    log::debug!("Building report for {} (limit {limit})", path.display());
    let warnings = empty_input_warning(&records)
        .map(|w| w.to_string())
        .into_iter()
        .collect();
    Ok(ApiReport::new(HotspotReport::build(&records, limit), warnings))
}

/// Renders `report` in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(report: &ApiReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

fn render_table(report: &ApiReport) -> String {
    let mut out = String::new();

    for warning in &report.warnings {
        let _ = writeln!(out, "Warning: {warning}");
    }

    let _ = writeln!(out, "Total accidents: {}", report.total_records);
    let _ = writeln!(out, "Drunk driving accidents: {}", report.qualifying_records);

    if let Some(center) = report.center {
        let _ = writeln!(
            out,
            "Map center: {:.6}, {:.6}",
            center.latitude, center.longitude
        );
    }

    if !report.hotspots.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "Top {} hotspots", report.hotspots.len());
        for hotspot in &report.hotspots {
            let _ = writeln!(
                out,
                "  {} @ {:.6}, {:.6}",
                hotspot.label, hotspot.latitude, hotspot.longitude
            );
        }
    }

    out.push('\n');
    let _ = writeln!(out, "{:<6}{:<40}{:>10}", "RANK", "STREET", "ACCIDENTS");
    let _ = writeln!(out, "{}", "-".repeat(56));
    for row in &report.ranking {
        let _ = writeln!(out, "{:<6}{:<40}{:>10}", row.rank, row.street_name, row.count);
    }

    out
}

#[cfg(test)]
mod tests {
    use accident_hotspots_hotspot::DEFAULT_HOTSPOT_LIMIT;

    use super::*;

    fn sample_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "accident_hotspots_{name}_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_output_formats() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn table_lists_ranking() {
        let path = sample_file(
            "table",
            "latitude,longitude,street_name,is_drunk_driving\n1,1,A,true\n2,2,B,true\n3,3,B,true\n",
        );
        let report = build(&path, DEFAULT_HOTSPOT_LIMIT).unwrap();
        std::fs::remove_file(&path).ok();

        let table = render(&report, OutputFormat::Table).unwrap();
        assert!(table.contains("Total accidents: 3"));
        assert!(table.contains("B: 2 accidents"));
        let b = table.find("\n1     B").unwrap();
        let a = table.find("\n2     A").unwrap();
        assert!(b < a);
    }

    #[test]
    fn json_matches_api_shape() {
        let path = sample_file(
            "json",
            "latitude,longitude,street_name,is_drunk_driving\n1,1,A,false\n",
        );
        let report = build(&path, 5).unwrap();
        std::fs::remove_file(&path).ok();

        let json: serde_json::Value =
            serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["totalRecords"], 1);
        assert_eq!(json["qualifyingRecords"], 0);
        assert!(json["ranking"].as_array().unwrap().is_empty());
    }

    #[test]
    fn empty_file_warns() {
        let path = sample_file("empty", "latitude,longitude,street_name,is_drunk_driving\n");
        let report = build(&path, 5).unwrap();
        std::fs::remove_file(&path).ok();

        let table = render(&report, OutputFormat::Table).unwrap();
        assert!(table.starts_with("Warning: "));
        assert!(table.contains("Total accidents: 0"));
    }
}
