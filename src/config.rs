//! Tuning knobs for the concurrent strategies.
//!
//! None of these change the result of an analysis, only how the work is
//! spread across threads and how much is buffered between them.

use std::{num::NonZeroUsize, thread};

use crate::error::{AnalyzerError, Result};

const MAX_WORKERS: usize = 65_536;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Consumers for the worker-pool and fan-out strategies.
    pub workers: usize,
    /// Capacity of every bounded line/entry channel.
    pub channel_capacity: usize,
    /// Pipeline parse stage width.
    pub parse_workers: usize,
    /// Pipeline analyze stage width.
    pub analyze_workers: usize,
    /// Entries an analyze worker records before flushing its shard downstream.
    pub batch_size: usize,
    /// Parallel mergers in the fan-in stage.
    pub merge_groups: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            channel_capacity: 1000,
            parse_workers: 4,
            analyze_workers: 4,
            batch_size: 1000,
            merge_groups: 4,
        }
    }
}

/// One core is left for the reader thread.
fn default_workers() -> usize {
    let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    cores.saturating_sub(1).max(1)
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("workers", self.workers),
            ("channel_capacity", self.channel_capacity),
            ("parse_workers", self.parse_workers),
            ("analyze_workers", self.analyze_workers),
            ("batch_size", self.batch_size),
            ("merge_groups", self.merge_groups),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(AnalyzerError::Config {
                    field,
                    reason: "must be greater than 0".to_owned(),
                });
            }
        }

        for (field, value) in [
            ("workers", self.workers),
            ("parse_workers", self.parse_workers),
            ("analyze_workers", self.analyze_workers),
            ("merge_groups", self.merge_groups),
        ] {
            if value > MAX_WORKERS {
                return Err(AnalyzerError::Config {
                    field,
                    reason: format!("must be at most {MAX_WORKERS}"),
                });
            }
        }

        Ok(())
    }
}
