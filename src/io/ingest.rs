//! CSV ingest and normalization.
//!
//! This module turns the body of a NYT live CSV into typed `LocationRecord`s.
//!
//! Conventions of the resource:
//! - header column 0 is the snapshot date
//! - header column 1 names the granularity (`state` or `county`) and holds the
//!   location name
//! - `state`, `cases` and `deaths` are always present
//!
//! Metric columns (any header containing `case` or `death`) are guaranteed
//! numeric in the record model: cells that fail to parse become `0`. That is a
//! deliberate policy ("no reported cases"), and the count of such cells is
//! logged so data-quality problems do not go unnoticed.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{FieldValue, LocationRecord, death_rate};
use crate::error::CovidError;

/// Ingest output: records plus what happened while reading them.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<LocationRecord>,
    /// Header name of the location column (`state` or `county`).
    pub location_column: String,
    pub rows_read: usize,
    /// Metric cells that were blank/malformed/negative and counted as zero.
    pub coerced_cells: usize,
}

/// Column indices resolved once from the header row.
struct Columns {
    names: Vec<String>,
    date: usize,
    location: usize,
    state: usize,
    cases: usize,
    deaths: usize,
}

/// Parse a CSV body into records, keeping only rows whose `state` matches
/// `location_filter` (case-insensitive) when one is given.
pub fn parse_records<R: Read>(
    body: R,
    location_filter: Option<&str>,
) -> Result<IngestedData, CovidError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| CovidError::parse(format!("failed to read CSV header: {e}")))?
        .clone();

    let columns = resolve_columns(&headers)?;
    let filter = location_filter.map(str::trim).filter(|f| !f.is_empty());

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    let mut coerced_cells = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let row = result.map_err(|e| CovidError::parse(format!("line {line}: {e}")))?;

        if !matches_filter(cell(&row, columns.state), filter) {
            continue;
        }

        let (record, coerced) = normalize_row(&row, &columns);
        coerced_cells += coerced;
        records.push(record);
    }

    if records.is_empty() {
        return Err(CovidError::EmptyResult {
            filter_value: filter.map(str::to_string),
        });
    }

    let location_column = columns.names[columns.location].clone();

    if coerced_cells > 0 {
        warn!(
            coerced_cells,
            "blank or non-numeric case/death cells were counted as zero"
        );
    }
    check_snapshot(&records);

    debug!(
        location_column = %location_column,
        rows_read,
        rows_used = records.len(),
        "parsed covid data by {location_column}"
    );
    debug!(
        preview = %serde_json::to_string(&records[..records.len().min(4)]).unwrap_or_default(),
        "first records"
    );

    Ok(IngestedData {
        records,
        location_column,
        rows_read,
        coerced_cells,
    })
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, CovidError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if names.len() < 2 {
        return Err(CovidError::parse(format!(
            "expected a date column and a location column, found {} column(s)",
            names.len()
        )));
    }
    if names[1].is_empty() {
        return Err(CovidError::parse("location column (header column 2) has no name"));
    }

    // First occurrence wins for repeated header names.
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (idx, name) in names.iter().enumerate() {
        index.entry(name.as_str()).or_insert(idx);
    }

    let required = |name: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| CovidError::parse(format!("missing required column: `{name}`")))
    };

    let state = required("state")?;
    let cases = required("cases")?;
    let deaths = required("deaths")?;

    Ok(Columns {
        date: 0,
        location: 1,
        state,
        cases,
        deaths,
        names,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Some exports prefix the first header with a UTF-8 BOM; without stripping
    // it the date column would not be recognized.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Build one record; returns it with the number of metric cells forced to zero.
fn normalize_row(row: &StringRecord, columns: &Columns) -> (LocationRecord, usize) {
    let mut coerced = 0usize;

    let mut metric = |idx: usize| {
        let (value, was_coerced) = parse_count(cell(row, idx));
        if was_coerced {
            coerced += 1;
        }
        value
    };
    let cases = metric(columns.cases);
    let deaths = metric(columns.deaths);

    let mut extra = Vec::new();
    for (idx, name) in columns.names.iter().enumerate() {
        if idx == columns.date
            || idx == columns.location
            || idx == columns.cases
            || idx == columns.deaths
        {
            continue;
        }
        let raw = cell(row, idx).unwrap_or("");
        let value = match FieldValue::coerce(raw) {
            FieldValue::Text(_) if is_metric_column(name) => {
                coerced += 1;
                FieldValue::Integer(0)
            }
            v => v,
        };
        extra.push((name.clone(), value));
    }

    let record = LocationRecord {
        location_name: cell(row, columns.location).unwrap_or("").to_string(),
        date: cell(row, columns.date).unwrap_or("").to_string(),
        cases,
        deaths,
        death_rate: death_rate(cases, deaths),
        extra,
    };
    (record, coerced)
}

fn is_metric_column(name: &str) -> bool {
    name.contains("case") || name.contains("death")
}

/// Parse a count; blanks, text and negatives become `0` (flagged as coerced).
fn parse_count(raw: Option<&str>) -> (u64, bool) {
    let Some(raw) = raw else { return (0, true) };
    if let Ok(v) = raw.parse::<u64>() {
        return (v, false);
    }
    // Counts occasionally arrive as "123.0".
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => (v as u64, false),
        _ => (0, true),
    }
}

fn cell(row: &StringRecord, idx: usize) -> Option<&str> {
    row.get(idx)
}

fn matches_filter(value: Option<&str>, filter: Option<&str>) -> bool {
    let Some(filter) = filter else { return true };
    let Some(value) = value else { return false };
    value.trim().to_lowercase() == filter.to_lowercase()
}

/// Warn when the snapshot invariants do not hold; records are left as published.
fn check_snapshot(records: &[LocationRecord]) {
    let first_date = &records[0].date;
    let mismatched = records.iter().filter(|r| &r.date != first_date).count();
    if mismatched > 0 {
        warn!(
            snapshot_date = %first_date,
            mismatched,
            "records do not share a single snapshot date"
        );
    }
    if chrono::NaiveDate::parse_from_str(first_date, "%Y-%m-%d").is_err() {
        debug!(snapshot_date = %first_date, "snapshot date is not ISO formatted");
    }

    let mut seen = HashSet::new();
    let duplicates = records
        .iter()
        .filter(|r| !seen.insert(r.location_name.as_str()))
        .count();
    if duplicates > 0 {
        warn!(duplicates, "location names are not unique in this result");
    }
}
