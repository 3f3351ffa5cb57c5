use std::path::PathBuf;
use std::time::Duration;

/// Binary-level error: a message plus the process exit code.
///
/// Exit codes:
/// - `2` invalid input, local IO, chart writing
/// - `3` the resource parsed but produced no usable rows
/// - `4` network retrieval failed
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Why the remote CSV could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} timed out after {}s", .timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
}

/// Errors raised by the fetch and render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CovidError {
    #[error("failed to retrieve data: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to parse CSV data: {reason}")]
    Parse { reason: String },

    /// A location filter matched nothing; usually a misspelled name.
    #[error("{}", empty_result_message(.filter_value.as_deref()))]
    EmptyResult { filter_value: Option<String> },

    #[error("failed to write chart '{}': {reason}", .path.display())]
    Render { path: PathBuf, reason: String },
}

impl CovidError {
    pub fn parse(reason: impl Into<String>) -> Self {
        CovidError::Parse {
            reason: reason.into(),
        }
    }

    pub fn render(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        CovidError::Render {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CovidError::Fetch(_) => 4,
            CovidError::Parse { .. } | CovidError::EmptyResult { .. } => 3,
            CovidError::Render { .. } => 2,
        }
    }
}

fn empty_result_message(filter_value: Option<&str>) -> String {
    match filter_value {
        Some(filter) => format!("no rows matched location '{filter}' (check the spelling)"),
        None => "the resource contained no data rows".to_string(),
    }
}

impl From<CovidError> for AppError {
    fn from(err: CovidError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
