//! Error type shared by every analysis strategy.

use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The input file could not be opened. Fatal for the run.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading failed after the file was opened.
    #[error("read error in {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config error: {field}: {reason}")]
    Config { field: &'static str, reason: String },

    #[error("failed to spawn {group} worker: {source}")]
    Spawn {
        group: &'static str,
        #[source]
        source: io::Error,
    },

    /// A spawned unit panicked before handing back its result.
    #[error("{group} worker {id} panicked")]
    WorkerPanicked { group: &'static str, id: usize },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
