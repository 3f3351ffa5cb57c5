//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - built once at parse time and read everywhere else by field name
//! - previewed in debug logs as JSON
//! - passed by reference into every render call without hidden state

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Base URL of the New York Times "live" data set.
pub const NYT_LIVE_BASE_URL: &str = "https://raw.githubusercontent.com/nytimes/covid-19-data/master/live";

/// Default HTTP timeout for a fetch. The public resource has no SLA.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bar charts become unreadable past this many locations.
pub const MAX_BARS: usize = 50;

/// Prefix of every chart file this program writes.
pub const CHART_FILE_PREFIX: &str = "NYT_COVID_";

/// U.S. states, DC and territories accepted as a county-level scope (lowercase).
pub const US_STATES: [&str; 56] = [
    "alabama",
    "alaska",
    "american samoa",
    "arizona",
    "arkansas",
    "california",
    "colorado",
    "connecticut",
    "delaware",
    "district of columbia",
    "florida",
    "georgia",
    "guam",
    "hawaii",
    "idaho",
    "illinois",
    "indiana",
    "iowa",
    "kansas",
    "kentucky",
    "louisiana",
    "maine",
    "maryland",
    "massachusetts",
    "michigan",
    "minnesota",
    "mississippi",
    "missouri",
    "montana",
    "nebraska",
    "nevada",
    "new hampshire",
    "new jersey",
    "new mexico",
    "new york",
    "north carolina",
    "north dakota",
    "northern mariana islands",
    "ohio",
    "oklahoma",
    "oregon",
    "pennsylvania",
    "puerto rico",
    "rhode island",
    "south carolina",
    "south dakota",
    "tennessee",
    "texas",
    "utah",
    "vermont",
    "virgin islands",
    "virginia",
    "washington",
    "west virginia",
    "wisconsin",
    "wyoming",
];

/// Whether a record describes a U.S. state or a county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    State,
    County,
}

impl Granularity {
    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::State => "state",
            Granularity::County => "county",
        }
    }

    /// File name of the live CSV for this granularity.
    pub fn resource_file(self) -> &'static str {
        match self {
            Granularity::State => "us-states.csv",
            Granularity::County => "us-counties.csv",
        }
    }

    pub fn default_url(self) -> String {
        format!("{NYT_LIVE_BASE_URL}/{}", self.resource_file())
    }
}

/// The record field selected for sorting and plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Cases,
    Deaths,
    #[value(name = "death-rate", alias = "death_rate")]
    DeathRate,
}

impl MetricKey {
    pub const ALL: [MetricKey; 3] = [MetricKey::Cases, MetricKey::Deaths, MetricKey::DeathRate];

    pub fn value(self, record: &LocationRecord) -> f64 {
        match self {
            MetricKey::Cases => record.cases as f64,
            MetricKey::Deaths => record.deaths as f64,
            MetricKey::DeathRate => record.death_rate,
        }
    }

    /// Name used in chart titles.
    pub fn display_name(self) -> &'static str {
        match self {
            MetricKey::Cases => "Cases",
            MetricKey::Deaths => "Deaths",
            MetricKey::DeathRate => "Death Rate",
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            MetricKey::Cases => "COVID Cases",
            MetricKey::Deaths => "COVID Deaths",
            MetricKey::DeathRate => "COVID Death Rate (%)",
        }
    }

    /// Lowercase token used in output file names.
    pub fn slug(self) -> &'static str {
        match self {
            MetricKey::Cases => "cases",
            MetricKey::Deaths => "deaths",
            MetricKey::DeathRate => "death_rate",
        }
    }

    pub fn format_value(self, v: f64) -> String {
        match self {
            MetricKey::Cases | MetricKey::Deaths => format!("{v:.0}"),
            MetricKey::DeathRate => format!("{v:.2}"),
        }
    }
}

/// A pass-through cell value for columns the charts do not use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Integer first, then float, otherwise the original text.
    pub fn coerce(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            return FieldValue::Integer(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => FieldValue::Float(v),
            _ => FieldValue::Text(raw.to_string()),
        }
    }
}

/// One row of the source resource, normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    /// State or county name (header column 1).
    pub location_name: String,
    /// Snapshot date (header column 0), kept as published.
    pub date: String,
    pub cases: u64,
    pub deaths: u64,
    /// Percentage of cases that resulted in death; `0.0` when there are no cases.
    pub death_rate: f64,
    /// Every other column in header order.
    pub extra: Vec<(String, FieldValue)>,
}

impl LocationRecord {
    pub fn new(
        location_name: impl Into<String>,
        date: impl Into<String>,
        cases: u64,
        deaths: u64,
    ) -> Self {
        Self {
            location_name: location_name.into(),
            date: date.into(),
            cases,
            deaths,
            death_rate: death_rate(cases, deaths),
            extra: Vec::new(),
        }
    }

    pub fn extra(&self, column: &str) -> Option<&FieldValue> {
        self.extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

pub fn death_rate(cases: u64, deaths: u64) -> f64 {
    if cases == 0 {
        return 0.0;
    }
    deaths as f64 / cases as f64 * 100.0
}

/// One rendering request: ordered bars plus labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub metric: MetricKey,
    pub title: String,
    pub y_label: String,
    /// `(location_name, value)` in plotting order.
    pub bars: Vec<(String, f64)>,
}

/// Read-only chart template shared by every render call.
///
/// Titles live on `ChartSpec`, so nothing here changes between charts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub title_font_size: u32,
    pub label_font_size: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    /// Rotate x labels to vertical so long county names do not overlap.
    pub rotate_x_labels: bool,
    pub bar_rgb: (u8, u8, u8),
    pub max_bars: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            margin: 16,
            title_font_size: 20,
            label_font_size: 8,
            x_label_area: 140,
            y_label_area: 80,
            rotate_x_labels: true,
            bar_rgb: (52, 101, 164),
            max_bars: MAX_BARS,
        }
    }
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub states_url: String,
    pub counties_url: String,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub metrics: Vec<MetricKey>,
    pub style: ChartStyle,
}

impl AppConfig {
    pub fn url_for(&self, granularity: Granularity) -> &str {
        match granularity {
            Granularity::State => &self.states_url,
            Granularity::County => &self.counties_url,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            states_url: Granularity::State.default_url(),
            counties_url: Granularity::County.default_url(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_dir: PathBuf::from("."),
            metrics: MetricKey::ALL.to_vec(),
            style: ChartStyle::default(),
        }
    }
}

/// Capitalize each word: `"new york"` -> `"New York"`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Deterministic output file name for a chart.
///
/// - state level: `NYT_COVID_all_states_cases.svg`
/// - county level: `NYT_COVID_new_york_county_cases.svg`
pub fn chart_file_name(scope: Option<&str>, metric: MetricKey) -> String {
    match scope {
        None => format!("{CHART_FILE_PREFIX}all_states_{}.svg", metric.slug()),
        Some(state) => {
            let slug = state
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<String>>()
                .join("_");
            format!("{CHART_FILE_PREFIX}{slug}_county_{}.svg", metric.slug())
        }
    }
}
