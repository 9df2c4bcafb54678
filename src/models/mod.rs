//! Serializable models
//!
//! Diagnostic snapshots of cache state for logs and tooling.

pub mod report;

pub use report::StatsReport;
