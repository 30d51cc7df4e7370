//! The four execution strategies.
//!
//! Every strategy reads the same [`LineSource`] and must produce a
//! [`Statistics`] equal to the one from [`Strategy::Sequential`]. The
//! concurrent ones only differ in how lines travel between threads:
//!
//! ```text
//! WorkerPool  reader -> [lines] -> N workers ----------------------> join + merge
//! FanOut      reader -> [lines] -> N consumers -> N results -> M mergers -> shared target
//! Pipeline    reader -> [lines] -> P parsers -> [entries] -> A analyzers -> [shards] -> aggregate
//! ```
//!
//! Channels are bounded, so a full channel is what slows the reader down.
//! Every stage finishes by dropping its senders, and every thread is joined
//! before `analyze` returns.

use std::fmt;

use clap::ValueEnum;
use crossbeam::channel::{Receiver, Sender, bounded};
use tracing::{debug, info, info_span};

use crate::{
    config::AnalyzerConfig,
    error::Result,
    source::{LineSource, Lines},
    statistic::Statistics,
    thread_pool::WorkerGroup,
};

mod fan_out;
mod pipeline;
mod sequential;
mod worker_pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    Sequential,
    WorkerPool,
    FanOut,
    Pipeline,
}

impl Strategy {
    /// All strategies, baseline first.
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::WorkerPool,
        Strategy::FanOut,
        Strategy::Pipeline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::WorkerPool => "worker-pool",
            Strategy::FanOut => "fan-out",
            Strategy::Pipeline => "pipeline",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Strategy::Sequential => "Sequential",
            Strategy::WorkerPool => "Worker Pool",
            Strategy::FanOut => "Fan-Out/Fan-In",
            Strategy::Pipeline => "Pipeline",
        }
    }

    pub fn is_baseline(self) -> bool {
        self == Strategy::Sequential
    }

    /// Runs one full pass over `source`.
    ///
    /// Fails if the file cannot be opened or read, or if any worker panics;
    /// no partial result is returned in that case.
    pub fn analyze(self, source: &LineSource, config: &AnalyzerConfig) -> Result<Statistics> {
        config.validate()?;
        let span = info_span!("analyze", strategy = self.name());
        let _enter = span.enter();

        info!(path = %source.path().display(), "analysis started");
        let stats = match self {
            Strategy::Sequential => sequential::analyze(source)?,
            Strategy::WorkerPool => worker_pool::analyze(source, config)?,
            Strategy::FanOut => fan_out::analyze(source, config)?,
            Strategy::Pipeline => pipeline::analyze(source, config)?,
        };
        info!(lines = stats.total_lines, "analysis finished");
        Ok(stats)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The dedicated thread that streams file lines into a bounded channel.
struct Reader {
    group: WorkerGroup<Result<u64>>,
}

impl Reader {
    fn spawn(lines: Lines, capacity: usize) -> Result<(Reader, Receiver<String>)> {
        let (tx, rx) = bounded(capacity);
        let mut group = WorkerGroup::new("reader");
        group.spawn(move |_| feed(lines, tx))?;
        Ok((Reader { group }, rx))
    }

    /// Joins the reader and returns how many lines it sent.
    fn finish(self) -> Result<u64> {
        self.group.join()?.into_iter().sum()
    }
}

fn feed(lines: Lines, tx: Sender<String>) -> Result<u64> {
    let mut sent = 0;
    for line in lines {
        // Every receiver is gone only when all consumers panicked; their
        // join reports it.
        if tx.send(line?).is_err() {
            break;
        }
        sent += 1;
    }
    // closes the stream for the consumers
    drop(tx);
    debug!(lines = sent, "reader finished");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::AnalyzerError;

    const LINES: &[&str] = &[
        r#"10.0.0.1 - - [01/Jan/2024:00:00:00 +0000] "GET / HTTP/1.1" 200 512 "-" "Mozilla/5.0""#,
        r#"10.0.0.2 - - [01/Jan/2024:00:00:01 +0000] "GET /.git/config HTTP/1.1" 404 - "-" "zgrab/0.x""#,
        r#"10.0.0.1 - - [01/Jan/2024:00:00:02 +0000] "POST /login HTTP/1.1" 302 0 "-" "Mozilla/5.0""#,
        "not an access log line",
        r#"10.0.0.3 - - [01/Jan/2024:00:00:03 +0000] "GET /api HTTP/1.1" 500 12 "-" "Googlebot/2.1""#,
    ];

    fn fixture(repeat: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..repeat {
            writeln!(file, "{}", LINES[i % LINES.len()]).unwrap();
        }
        file
    }

    fn small_config() -> AnalyzerConfig {
        AnalyzerConfig {
            workers: 3,
            channel_capacity: 4,
            parse_workers: 2,
            analyze_workers: 3,
            batch_size: 7,
            merge_groups: 2,
        }
    }

    #[test]
    fn every_strategy_matches_the_baseline() {
        let file = fixture(503);
        let source = LineSource::new(file.path());
        let config = small_config();

        let baseline = Strategy::Sequential.analyze(&source, &config).unwrap();
        assert_eq!(baseline.total_lines, 503);

        for strategy in Strategy::ALL {
            let stats = strategy.analyze(&source, &config).unwrap();
            assert_eq!(stats, baseline, "{strategy}");
        }
    }

    #[test]
    fn empty_file_yields_empty_statistics() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = LineSource::new(file.path());

        for strategy in Strategy::ALL {
            let stats = strategy.analyze(&source, &small_config()).unwrap();
            assert_eq!(stats, Statistics::new(), "{strategy}");
        }
    }

    #[test]
    fn more_workers_than_lines() {
        let file = fixture(2);
        let source = LineSource::new(file.path());
        let config = AnalyzerConfig {
            workers: 16,
            merge_groups: 5,
            parse_workers: 8,
            analyze_workers: 8,
            ..small_config()
        };

        for strategy in Strategy::ALL {
            assert_eq!(strategy.analyze(&source, &config).unwrap().total_lines, 2);
        }
    }

    #[test]
    fn missing_file_fails_every_strategy() {
        let source = LineSource::new("/no/such/access.log");
        for strategy in Strategy::ALL {
            let err = strategy.analyze(&source, &small_config()).unwrap_err();
            assert!(matches!(err, AnalyzerError::Open { .. }), "{strategy}");
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_reading() {
        let file = fixture(1);
        let config = AnalyzerConfig {
            channel_capacity: 0,
            ..small_config()
        };
        let err = Strategy::WorkerPool
            .analyze(&LineSource::new(file.path()), &config)
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Config { .. }));
    }
}
