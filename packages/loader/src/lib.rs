#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loader for uploaded accident records.
//!
//! Validates the header row against the required schema (see
//! [`accident_hotspots_accident_models::columns`]) before touching any data
//! row, then coerces every cell into an [`AccidentRecord`]. Loading is
//! all-or-nothing: the first bad cell fails the whole upload.
//!
//! [`cache::RecordCache`] memoizes loads by a fingerprint of the input bytes.

pub mod cache;

use std::path::Path;

use accident_hotspots_accident_models::{AccidentRecord, columns};
use strum_macros::{AsRefStr, Display};

/// Errors that can occur while loading an upload.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The header row lacks one or more required columns.
    #[error("missing required column(s): {}", columns.join(", "))]
    MissingColumns {
        /// The required columns that were not found, in canonical order.
        columns: Vec<&'static str>,
    },

    /// A cell could not be coerced to its column's type.
    #[error("line {line}: column `{column}` has value {value:?}, expected {expected}")]
    InvalidValue {
        /// 1-based line number in the input.
        line: u64,
        /// Column the cell belongs to.
        column: &'static str,
        /// Raw (trimmed) cell contents.
        value: String,
        /// Human-readable description of the accepted values.
        expected: &'static str,
    },

    /// The input is not well-formed CSV.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`LoadError`], used as a stable tag in API
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LoadErrorKind {
    /// Required columns are missing.
    Format,
    /// A cell failed type coercion.
    Parse,
    /// The CSV structure itself is broken.
    Csv,
    /// The input could not be read.
    Io,
}

impl LoadError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::MissingColumns { .. } => LoadErrorKind::Format,
            Self::InvalidValue { .. } => LoadErrorKind::Parse,
            Self::Csv(_) => LoadErrorKind::Csv,
            Self::Io(_) => LoadErrorKind::Io,
        }
    }
}

/// Non-fatal conditions detected after a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoadWarning {
    /// The upload has a valid header but no data rows.
    #[error("the uploaded file contains no accident records")]
    EmptyInput,
}

/// Returns [`LoadWarning::EmptyInput`] if no records were loaded.
#[must_use]
pub const fn empty_input_warning(records: &[AccidentRecord]) -> Option<LoadWarning> {
    if records.is_empty() {
        Some(LoadWarning::EmptyInput)
    } else {
        None
    }
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    latitude: usize,
    longitude: usize,
    street_name: usize,
    is_drunk_driving: usize,
}

impl ColumnIndex {
    /// Locates every required column, reporting all missing ones together.
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |column: &str| names.iter().position(|name| *name == column);

        let missing: Vec<&'static str> = columns::REQUIRED
            .into_iter()
            .filter(|column| find(column).is_none())
            .collect();

        match (
            find(columns::LATITUDE),
            find(columns::LONGITUDE),
            find(columns::STREET_NAME),
            find(columns::IS_DRUNK_DRIVING),
        ) {
            (Some(latitude), Some(longitude), Some(street_name), Some(is_drunk_driving)) => {
                Ok(Self {
                    latitude,
                    longitude,
                    street_name,
                    is_drunk_driving,
                })
            }
            _ => Err(LoadError::MissingColumns { columns: missing }),
        }
    }
}

/// Parses a CSV upload into accident records, preserving row order.
///
/// # Errors
///
/// * [`LoadError::MissingColumns`] if the header row lacks a required column
/// * [`LoadError::InvalidValue`] if a cell cannot be coerced to its type
/// * [`LoadError::Csv`] if the input is not well-formed CSV
pub fn load_records(bytes: &[u8]) -> Result<Vec<AccidentRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let index = ColumnIndex::resolve(reader.headers()?)?;

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, csv::Position::line);
        let cell = |i: usize| row.get(i).unwrap_or("");

        records.push(AccidentRecord {
            latitude: parse_coordinate(cell(index.latitude), line, Axis::Latitude)?,
            longitude: parse_coordinate(cell(index.longitude), line, Axis::Longitude)?,
            street_name: parse_street(cell(index.street_name), line)?,
            is_drunk_driving: parse_flag(cell(index.is_drunk_driving), line)?,
        });
    }

    log::info!("Loaded {} accident records from {} bytes", records.len(), bytes.len());

    Ok(records)
}

/// Reads and parses a CSV file from disk.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or any error
/// [`load_records`] produces.
pub fn load_file(path: &Path) -> Result<Vec<AccidentRecord>, LoadError> {
    log::debug!("Reading {}", path.display());
    let bytes = std::fs::read(path)?;
    load_records(&bytes)
}

/// Coordinate axes and their valid ranges in decimal degrees.
#[derive(Debug, Clone, Copy)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    const fn column(self) -> &'static str {
        match self {
            Self::Latitude => columns::LATITUDE,
            Self::Longitude => columns::LONGITUDE,
        }
    }

    const fn limit(self) -> f64 {
        match self {
            Self::Latitude => 90.0,
            Self::Longitude => 180.0,
        }
    }

    const fn expected(self) -> &'static str {
        match self {
            Self::Latitude => "a number between -90 and 90",
            Self::Longitude => "a number between -180 and 180",
        }
    }
}

/// Range-checked so that the map center mean can never overflow.
fn parse_coordinate(value: &str, line: u64, axis: Axis) -> Result<f64, LoadError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.abs() <= axis.limit())
        .ok_or_else(|| invalid(value, line, axis.column(), axis.expected()))
}

fn parse_street(value: &str, line: u64) -> Result<String, LoadError> {
    if value.is_empty() {
        return Err(invalid(value, line, columns::STREET_NAME, "a non-empty street name"));
    }
    Ok(value.to_owned())
}

/// Accepts `true`/`false`/`1`/`0`, ignoring ASCII case.
fn parse_flag(value: &str, line: u64) -> Result<bool, LoadError> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Ok(false)
    } else {
        Err(invalid(
            value,
            line,
            columns::IS_DRUNK_DRIVING,
            "one of true, false, 1, 0",
        ))
    }
}

fn invalid(value: &str, line: u64, column: &'static str, expected: &'static str) -> LoadError {
    LoadError::InvalidValue {
        line,
        column,
        value: value.to_owned(),
        expected,
    }
}
