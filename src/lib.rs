//! `nyt-covid-charts` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - the fetch and chart pipeline is testable without spawning processes
//! - the two core entry points (`NytClient::fetch`, `chart::render`) can be
//!   driven from other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
