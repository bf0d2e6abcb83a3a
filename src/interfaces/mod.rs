//! Outer surfaces: the administrative HTTP API and CSV reports.

pub mod csv;
pub mod http;
