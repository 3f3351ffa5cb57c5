//! Retrieval of the New York Times live COVID-19 CSV files.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::domain::LocationRecord;
use crate::error::{CovidError, FetchError};
use crate::io::ingest::parse_records;

/// Blocking HTTP client for the NYT data set.
///
/// One client can serve any number of fetches; nothing is cached between them.
pub struct NytClient {
    client: Client,
    timeout: Duration,
}

impl NytClient {
    pub fn new(timeout: Duration) -> Result<Self, CovidError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nyt-covid-charts/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, timeout })
    }

    /// Download `url` and parse it into per-location records.
    ///
    /// When `location_filter` is set, only rows whose `state` column matches it
    /// (case-insensitive) are kept. The result is in resource order; sorting is
    /// left to the renderer so one fetch can feed several charts.
    pub fn fetch(&self, url: &str, location_filter: Option<&str>) -> Result<Vec<LocationRecord>, CovidError> {
        let body = self.fetch_body(url)?;
        let data = parse_records(body.as_slice(), location_filter)?;
        info!(
            url,
            records = data.records.len(),
            "successful retrieval of covid data by {}",
            data.location_column
        );
        Ok(data.records)
    }

    /// Raw response bytes; UTF-8 is validated by the CSV reader, not here.
    fn fetch_body(&self, url: &str) -> Result<Vec<u8>, CovidError> {
        debug!(url, timeout_secs = self.timeout.as_secs_f64(), "requesting CSV");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.transport_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp.bytes().map_err(|e| self.transport_error(url, e))?.to_vec();
        debug!(url, bytes = body.len(), "received CSV body");
        Ok(body)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> CovidError {
        let err = if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                reason: err.to_string(),
            }
        };
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::domain::MetricKey;

    const THREE_STATES: &str = "date,state,cases,deaths\n\
        2021-01-01,Alpha,100,5\n\
        2021-01-01,Beta,300,30\n\
        2021-01-01,Gamma,50,1\n";

    /// Serve `requests` canned HTTP responses on a loopback port.
    fn serve(status_line: &'static str, body: &'static [u8], requests: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap() > 0 {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                let head = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                stream.write_all(head.as_bytes()).unwrap();
                stream.write_all(body).unwrap();
            }
        });
        format!("http://{addr}/live/us-states.csv")
    }

    fn client() -> NytClient {
        NytClient::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn fetch_returns_records_in_resource_order() {
        let url = serve("200 OK", THREE_STATES.as_bytes(), 1);
        let records = client().fetch(&url, None).unwrap();

        assert_eq!(records.len(), 3);
        let names: Vec<&str> = records.iter().map(|r| r.location_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
        let rates: Vec<f64> = records.iter().map(|r| MetricKey::DeathRate.value(r)).collect();
        assert!((rates[0] - 5.0).abs() < 1e-9);
        assert!((rates[1] - 10.0).abs() < 1e-9);
        assert!((rates[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn filter_matches_regardless_of_case() {
        let url = serve("200 OK", THREE_STATES.as_bytes(), 2);
        let c = client();
        let a = c.fetch(&url, Some("BETA")).unwrap();
        let b = c.fetch(&url, Some("beta")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn non_success_status_fails_before_parsing() {
        // The body would parse fine; the status alone must reject it.
        let url = serve("404 Not Found", THREE_STATES.as_bytes(), 1);
        let err = client().fetch(&url, None).unwrap_err();
        match err {
            CovidError::Fetch(FetchError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_filter_is_reported_as_empty_result() {
        let url = serve("200 OK", THREE_STATES.as_bytes(), 1);
        let err = client().fetch(&url, Some("Delta")).unwrap_err();
        assert!(matches!(err, CovidError::EmptyResult { .. }));
    }

    #[test]
    fn invalid_utf8_body_is_a_parse_error() {
        let url = serve("200 OK", b"date,state,cases,deaths\n2021-01-01,\xff\xfe,1,1\n", 1);
        let err = client().fetch(&url, None).unwrap_err();
        match err {
            CovidError::Parse { reason } => assert!(reason.starts_with("line 2"), "{reason}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unresponsive_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let url = format!("http://{addr}/slow.csv");
        let handle = thread::spawn(move || {
            // Hold the connection open without answering.
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(2));
            drop(stream);
        });

        let c = NytClient::new(Duration::from_millis(300)).unwrap();
        let err = c.fetch(&url, None).unwrap_err();
        assert!(
            matches!(err, CovidError::Fetch(FetchError::Timeout { .. })),
            "unexpected error: {err:?}"
        );
        handle.join().unwrap();
    }

    #[test]
    fn refused_connection_is_a_network_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let err = client().fetch(&format!("http://{addr}/x.csv"), None).unwrap_err();
        assert!(matches!(err, CovidError::Fetch(FetchError::Network { .. })));
    }
}
