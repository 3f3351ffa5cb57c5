//! Terminal summaries of fetches and charts.
//!
//! Formatting lives here so the fetch and chart code stay free of printing.

use chrono::{DateTime, Local};

use crate::domain::{ChartSpec, Granularity, LocationRecord, title_case};

/// One-paragraph summary of a fetch result.
pub fn format_fetch_summary(
    granularity: Granularity,
    scope: Option<&str>,
    records: &[LocationRecord],
    retrieved_at: DateTime<Local>,
) -> String {
    let mut out = String::new();

    let scope = match scope {
        Some(state) => format!("{} counties", title_case(state)),
        None => "U.S. states".to_string(),
    };
    out.push_str(&format!("=== NYT COVID-19 data: {scope} ===\n"));
    out.push_str(&format!("Granularity: {}\n", granularity.display_name()));
    out.push_str(&format!("Records: {}\n", records.len()));
    out.push_str(&format!(
        "Snapshot: {}\n",
        records.first().map(|r| r.date.as_str()).unwrap_or("-")
    ));

    let total_cases: u64 = records.iter().map(|r| r.cases).sum();
    let total_deaths: u64 = records.iter().map(|r| r.deaths).sum();
    out.push_str(&format!("Total: cases={total_cases} deaths={total_deaths}\n"));
    out.push_str(&format!(
        "Retrieved: {}\n",
        retrieved_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out
}

/// The first `top_n` bars of a chart as an aligned table.
pub fn format_chart_table(spec: &ChartSpec, top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", spec.title));
    out.push_str(format!("{:>4} {:<28} {:>14}", "#", "location", spec.metric.slug()).trim_end());
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<28} {:-<14}", "", "", "").trim_end());
    out.push('\n');

    for (rank, (name, value)) in spec.bars.iter().take(top_n).enumerate() {
        out.push_str(
            format!(
                "{:>4} {:<28} {:>14}",
                rank + 1,
                truncate(name, 28),
                spec.metric.format_value(*value)
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if spec.bars.len() > top_n {
        out.push_str(&format!("     ... {} more\n", spec.bars.len() - top_n));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::chart::build_chart_spec;
    use crate::domain::MetricKey;

    fn records() -> Vec<LocationRecord> {
        vec![
            LocationRecord::new("Alpha", "2021-01-01", 100, 5),
            LocationRecord::new("Beta", "2021-01-01", 300, 30),
            LocationRecord::new("Gamma", "2021-01-01", 50, 1),
        ]
    }

    #[test]
    fn fetch_summary_lists_totals_and_snapshot() {
        let at = Local.with_ymd_and_hms(2021, 1, 2, 8, 30, 0).unwrap();
        let text = format_fetch_summary(Granularity::County, Some("new york"), &records(), at);
        assert!(text.contains("New York counties"));
        assert!(text.contains("Granularity: county"));
        assert!(text.contains("Records: 3"));
        assert!(text.contains("Snapshot: 2021-01-01"));
        assert!(text.contains("cases=450 deaths=36"));
        assert!(text.contains("Retrieved: 2021-01-02 08:30:00"));
    }

    #[test]
    fn chart_table_shows_ranked_rows() {
        let spec = build_chart_spec(&records(), MetricKey::DeathRate, None, 50);
        let table = format_chart_table(&spec, 2);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[3].contains("Beta") && lines[3].contains("10.00"));
        assert!(lines[4].contains("Alpha") && lines[4].contains("5.00"));
        assert!(table.contains("... 1 more"));
        assert!(!table.contains("Gamma"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
