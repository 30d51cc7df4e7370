//! Access-log traffic and security statistics, computed under four
//! interchangeable concurrency strategies for side-by-side benchmarking.
//!
//! - [`source`]: line-by-line reading of the input file
//! - [`entry`]: access-log line parsing
//! - [`classify`]: suspicious-URL and bot user-agent detection
//! - [`statistic`]: mergeable aggregate counters
//! - [`strategy`]: sequential, worker pool, fan-out/fan-in and pipeline runs
//! - [`report`]: text report and speedup summary

pub mod classify;
pub mod config;
pub mod entry;
pub mod error;
pub mod logging;
pub mod report;
pub mod source;
pub mod statistic;
pub mod strategy;
pub mod thread_pool;

pub use config::AnalyzerConfig;
pub use entry::LogEntry;
pub use error::AnalyzerError;
pub use source::LineSource;
pub use statistic::{SharedStatistics, Statistics};
pub use strategy::Strategy;
pub use thread_pool::WorkerGroup;
