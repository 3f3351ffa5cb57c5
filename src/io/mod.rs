//! Input/output helpers.
//!
//! - CSV ingest + normalization (`ingest`)
//! - removal of rendered chart files (`cleanup`)

pub mod cleanup;
pub mod ingest;

pub use cleanup::*;
pub use ingest::*;
