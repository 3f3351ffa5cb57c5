//! Remote data sources.

pub mod nyt;

pub use nyt::NytClient;
