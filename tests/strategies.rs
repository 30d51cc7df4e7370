//! End-to-end runs of every strategy over fixture files.

use std::io::Write;

use access_log_analyzer::{AnalyzerConfig, AnalyzerError, LineSource, Statistics, Strategy};
use tempfile::NamedTempFile;

const BROWSER: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36";

fn line(ip: &str, method: &str, url: &str, status: u16, agent: &str) -> String {
    format!(
        r#"{ip} - - [29/Nov/2025:10:15:32 +0200] "{method} {url} HTTP/1.1" {status} 1043 "https://github.com/" "{agent}""#
    )
}

fn write_fixture(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create fixture");
    for l in lines {
        writeln!(file, "{l}").expect("write fixture");
    }
    file.flush().expect("flush fixture");
    file
}

/// 10 lines: three 500s, two bot user agents, one suspicious URL.
fn ten_line_fixture() -> NamedTempFile {
    write_fixture(&[
        line("203.0.113.5", "GET", "/", 200, BROWSER),
        line("203.0.113.5", "GET", "/index.html", 200, BROWSER),
        line("198.51.100.7", "POST", "/login", 302, BROWSER),
        line("198.51.100.7", "GET", "/api/items", 500, BROWSER),
        line("192.0.2.44", "GET", "/api/items/123", 500, "Googlebot/2.1 (+http://www.google.com/bot.html)"),
        line("192.0.2.44", "PUT", "/api/items/123", 500, BROWSER),
        line("203.0.113.9", "GET", "/../../etc/passwd", 404, BROWSER),
        line("203.0.113.9", "HEAD", "/assets/style.css", 304, "Mozilla/5.0 (compatible; bingbot/2.0)"),
        line("10.20.30.40", "DELETE", "/api/items/9", 204, BROWSER),
        line("10.20.30.40", "GET", "/logout", 401, BROWSER),
    ])
}

fn config() -> AnalyzerConfig {
    AnalyzerConfig {
        workers: 4,
        channel_capacity: 2,
        parse_workers: 3,
        analyze_workers: 2,
        batch_size: 3,
        merge_groups: 2,
    }
}

fn run_all(file: &NamedTempFile, config: &AnalyzerConfig) -> Vec<(Strategy, Statistics)> {
    let source = LineSource::new(file.path());
    Strategy::ALL
        .into_iter()
        .map(|s| (s, s.analyze(&source, config).expect("analysis succeeds")))
        .collect()
}

#[test]
fn ten_line_fixture_counts_agree_across_strategies() {
    let file = ten_line_fixture();

    for (strategy, stats) in run_all(&file, &config()) {
        assert_eq!(stats.total_lines, 10, "{strategy}");
        assert_eq!(stats.status_5xx, 3, "{strategy}");
        assert_eq!(stats.bot_requests, 2, "{strategy}");
        assert_eq!(stats.suspicious_requests, 1, "{strategy}");
        assert_eq!(stats.status_2xx, 3, "{strategy}");
        assert_eq!(stats.status_3xx, 2, "{strategy}");
        assert_eq!(stats.status_4xx, 2, "{strategy}");
        assert_eq!(stats.unique_ips(), 5, "{strategy}");
        assert_eq!(stats.method_hits["GET"], 6, "{strategy}");
        assert_eq!(stats.url_hits["/api/items/123"], 2, "{strategy}");
    }
}

#[test]
fn large_mixed_input_is_identical_across_strategies() {
    let agents = [BROWSER, "curl/7.68.0", "Bytespider", "Wget/1.20.3 (linux-gnu)"];
    let urls = ["/", "/login", "/search?q=go", "/.env", "/cgi-bin/test", "/api/items"];
    let methods = ["GET", "POST", "PUT", "DELETE", "HEAD", "PATCH"];
    let statuses = [200, 201, 204, 301, 302, 400, 401, 403, 404, 500, 99, 600];

    let lines: Vec<String> = (0..5_000usize)
        .map(|i| {
            if i % 97 == 0 {
                return format!("10.9.{}.{} garbled line {i}", i % 7, i % 11);
            }
            line(
                &format!("172.16.{}.{}", i % 13, i % 29),
                methods[i % methods.len()],
                urls[i % urls.len()],
                statuses[i % statuses.len()],
                agents[i % agents.len()],
            )
        })
        .collect();
    let file = write_fixture(&lines);

    let results = run_all(&file, &config());
    let (_, baseline) = &results[0];
    assert_eq!(baseline.total_lines, 5_000);

    for (strategy, stats) in &results[1..] {
        assert_eq!(stats, baseline, "{strategy} differs from sequential");
    }
}

#[test]
fn tunables_do_not_change_results() {
    let file = ten_line_fixture();
    let source = LineSource::new(file.path());
    let expected = Strategy::Sequential.analyze(&source, &config()).unwrap();

    for (workers, capacity, batch) in [(1, 1, 1), (2, 1000, 1000), (32, 3, 2)] {
        let config = AnalyzerConfig {
            workers,
            channel_capacity: capacity,
            parse_workers: workers,
            analyze_workers: workers,
            batch_size: batch,
            merge_groups: workers,
        };
        for strategy in Strategy::ALL {
            assert_eq!(strategy.analyze(&source, &config).unwrap(), expected, "{strategy}");
        }
    }
}

#[test]
fn degraded_lines_still_count() {
    let file = write_fixture(&[
        "10.0.0.1 totally malformed".to_owned(),
        String::new(),
        line("10.0.0.1", "GET", "/", 200, BROWSER),
    ]);

    for (strategy, stats) in run_all(&file, &config()) {
        assert_eq!(stats.total_lines, 3, "{strategy}");
        assert_eq!(stats.ip_hits["10.0.0.1"], 2, "{strategy}");
        assert_eq!(stats.method_hits.values().sum::<u64>(), 1, "{strategy}");
        assert_eq!(stats.status_2xx, 1, "{strategy}");
    }
}

#[cfg(unix)]
#[test]
fn read_failure_after_open_fails_every_strategy() {
    // Opening a directory succeeds; the first read fails with EISDIR.
    let dir = tempfile::tempdir().expect("create dir");
    let source = LineSource::new(dir.path());

    for strategy in Strategy::ALL {
        let err = strategy.analyze(&source, &config()).unwrap_err();
        assert!(matches!(err, AnalyzerError::Read { .. }), "{strategy}: {err}");
    }
}
