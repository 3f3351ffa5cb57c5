//! Shared "fetch then chart" workflow used by both the subcommands and the menu.
//!
//! NYT fetch -> records -> one chart per metric
//!
//! The front-ends then only decide how to present the outcome.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::info;

use crate::chart;
use crate::data::NytClient;
use crate::domain::{AppConfig, Granularity, LocationRecord, MetricKey, chart_file_name};
use crate::error::CovidError;

/// Outputs of one fetch and its charts.
#[derive(Debug, Clone)]
pub struct ChartRun {
    pub granularity: Granularity,
    /// Canonical state name for county runs.
    pub scope: Option<String>,
    pub records: Vec<LocationRecord>,
    pub retrieved_at: DateTime<Local>,
    pub charts: Vec<(MetricKey, PathBuf)>,
}

/// Fetch state-level data (`scope == None`) or the counties of one state, then
/// write one chart per configured metric.
pub fn run_charts(
    client: &NytClient,
    config: &AppConfig,
    scope: Option<&str>,
) -> Result<ChartRun, CovidError> {
    let granularity = match scope {
        Some(_) => Granularity::County,
        None => Granularity::State,
    };

    // 1) One fetch feeds every chart.
    let records = client.fetch(config.url_for(granularity), scope)?;
    let retrieved_at = Local::now();

    // 2) Render each metric; the style is shared read-only.
    let mut charts = Vec::with_capacity(config.metrics.len());
    for &metric in &config.metrics {
        let path = config.output_dir.join(chart_file_name(scope, metric));
        chart::render(&records, metric, scope, &path, &config.style)?;
        info!(path = %path.display(), metric = metric.slug(), "created chart");
        charts.push((metric, path));
    }

    Ok(ChartRun {
        granularity,
        scope: scope.map(str::to_string),
        records,
        retrieved_at,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use super::*;

    const COUNTIES: &str = "date,county,state,fips,cases,deaths\n\
        2021-01-01,Harris,Texas,48201,900,12\n\
        2021-01-01,Kings,New York,36047,800,40\n\
        2021-01-01,Dallas,Texas,48113,700,21\n";

    /// Serve one canned `200 OK` CSV response on a loopback port.
    fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/live/us-counties.csv")
    }

    #[test]
    fn county_run_writes_one_chart_per_metric() {
        let output_dir = PathBuf::from("target/test_out/pipeline");
        let _ = fs::remove_dir_all(&output_dir);
        fs::create_dir_all(&output_dir).unwrap();

        let config = AppConfig {
            counties_url: serve_once(COUNTIES),
            output_dir: output_dir.clone(),
            metrics: vec![MetricKey::Cases, MetricKey::DeathRate],
            ..AppConfig::default()
        };
        let client = NytClient::new(Duration::from_secs(5)).unwrap();

        let run = run_charts(&client, &config, Some("texas")).unwrap();

        assert_eq!(run.granularity, Granularity::County);
        assert_eq!(run.records.len(), 2);
        let files: Vec<PathBuf> = run.charts.iter().map(|(_, p)| p.clone()).collect();
        assert_eq!(
            files,
            [
                output_dir.join("NYT_COVID_texas_county_cases.svg"),
                output_dir.join("NYT_COVID_texas_county_death_rate.svg"),
            ]
        );
        let svg = fs::read_to_string(&files[1]).unwrap();
        assert!(svg.contains("COVID-19 Death Rate in Texas Counties"));
        assert!(!svg.contains("Kings"));
    }
}
