//! Plain-text rendering of analysis results.

use std::{collections::HashMap, fmt, time::Duration};

use crate::{statistic::Statistics, strategy::Strategy};

const TOP_IPS: usize = 20;
const TOP_URLS: usize = 10;

/// `part` as a percentage of `total`; 0 when `total` is 0.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// The `n` keys with the highest counts, highest first.
///
/// Equal counts are ordered by key so output is stable between runs.
pub fn top_n(counts: &HashMap<String, u64>, n: usize) -> Vec<(&str, u64)> {
    let mut items: Vec<(&str, u64)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    items.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    items.truncate(n);
    items
}

/// How many times faster `current` was than `baseline`.
pub fn speedup(baseline: Duration, current: Duration) -> Option<f64> {
    if current.is_zero() {
        return None;
    }
    Some(baseline.as_secs_f64() / current.as_secs_f64())
}

/// Report for one strategy run.
pub struct Report<'a> {
    pub strategy: Strategy,
    pub elapsed: Duration,
    pub stats: &'a Statistics,
    /// Baseline duration, shown as a speedup for non-baseline strategies.
    pub baseline: Option<Duration>,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.stats;
        let total = s.total_lines;

        writeln!(f, "Elapsed: {} ms", self.elapsed.as_millis())?;
        writeln!(f, "Total lines: {total}")?;

        writeln!(f, "\nStatus codes:")?;
        for (label, count) in [
            ("2xx (OK):      ", s.status_2xx),
            ("3xx (Redirect):", s.status_3xx),
            ("4xx (Client):  ", s.status_4xx),
            ("5xx (Server):  ", s.status_5xx),
        ] {
            writeln!(f, "  {label} {count} ({:.2}%)", percent(count, total))?;
        }

        writeln!(f, "\nSecurity:")?;
        writeln!(
            f,
            "  Suspicious requests: {} ({:.2}%)",
            s.suspicious_requests,
            percent(s.suspicious_requests, total)
        )?;
        writeln!(
            f,
            "  Bot requests:        {} ({:.2}%)",
            s.bot_requests,
            percent(s.bot_requests, total)
        )?;

        writeln!(f, "\nUnique IPs: {}", s.unique_ips())?;

        writeln!(f, "\nTop {TOP_IPS} IPs:")?;
        for (rank, (ip, hits)) in top_n(&s.ip_hits, TOP_IPS).into_iter().enumerate() {
            writeln!(
                f,
                "  {}. {ip}: {hits} requests ({:.2}%)",
                rank + 1,
                percent(hits, total)
            )?;
        }

        writeln!(f, "\nTop {TOP_URLS} URLs:")?;
        for (rank, (url, hits)) in top_n(&s.url_hits, TOP_URLS).into_iter().enumerate() {
            writeln!(f, "  {}. {url}: {hits} requests", rank + 1)?;
        }

        writeln!(f, "\nHTTP methods:")?;
        for (method, hits) in top_n(&s.method_hits, s.method_hits.len()) {
            writeln!(f, "  {method}: {hits} ({:.2}%)", percent(hits, total))?;
        }

        if let Some(baseline) = self.baseline.filter(|_| !self.strategy.is_baseline()) {
            match speedup(baseline, self.elapsed) {
                Some(x) => writeln!(f, "\nSpeedup: {x:.2}x")?,
                None => writeln!(f, "\nSpeedup: n/a")?,
            }
        }
        Ok(())
    }
}

/// Closing comparison table of every strategy that ran.
pub struct Summary<'a> {
    pub timings: &'a [(Strategy, Duration)],
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}\nCOMPARISON SUMMARY\n{rule}")?;

        let baseline = self
            .timings
            .iter()
            .find(|(strategy, _)| strategy.is_baseline())
            .map(|(_, elapsed)| *elapsed);

        for (strategy, elapsed) in self.timings {
            let label = format!("{}:", strategy.title());
            write!(f, "{label:<19}{elapsed:?}")?;
            if let Some(x) = baseline
                .filter(|_| !strategy.is_baseline())
                .and_then(|b| speedup(b, *elapsed))
            {
                write!(f, " ({x:.2}x faster)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
