//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - selection enums (`Granularity`, `MetricKey`)
//! - normalized per-location rows (`LocationRecord`)
//! - chart requests and the shared chart template (`ChartSpec`, `ChartStyle`)
//! - resolved run settings (`AppConfig`)

pub mod types;

pub use types::*;
