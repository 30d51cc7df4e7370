//! Access-log record parsing.
//!
//! Expected layout, one record per line:
//!
//! ```text
//! IP - - [DD/Mon/YYYY:HH:MM:SS +ZZZZ] "METHOD URL PROTOCOL" STATUS SIZE "REFERER" "USER-AGENT"
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Token separators. ASCII only: `\v` and non-ASCII spaces belong to a token.
const SEPARATORS: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

// Classes are spelled out in ASCII; the regex crate's `\S` and `\d` are Unicode.
static ACCESS_LOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^([^ \t\n\f\r]+) - [^ \t\n\f\r]* \[([^\]]+)\] "#,
        r#""([^ \t\n\f\r]+) ([^"]*) [^ \t\n\f\r]+" "#,
        r#"([0-9]+) ([0-9]+|-) "([^"]*)" "([^"]*)""#,
    ))
    .expect("access log pattern is valid")
});

/// One parsed line. Lines that do not match the access-log layout keep only
/// the leading token as `ip`, every other field stays empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub ip: String,
    pub timestamp: String,
    pub method: String,
    pub url: String,
    pub status: u32,
    /// `-` in the log is stored as 0.
    pub size: u64,
    pub user_agent: String,
    pub raw: String,
}

impl LogEntry {
    /// Never fails: malformed input degrades to an ip-only entry.
    pub fn parse(line: String) -> LogEntry {
        let mut entry = match ACCESS_LOG.captures(&line) {
            Some(caps) => LogEntry {
                ip: caps[1].to_owned(),
                timestamp: caps[2].to_owned(),
                method: caps[3].to_owned(),
                url: caps[4].to_owned(),
                status: caps[5].parse().unwrap_or(0),
                size: match &caps[6] {
                    "-" => 0,
                    digits => digits.parse().unwrap_or(0),
                },
                user_agent: caps[8].to_owned(),
                raw: String::new(),
            },
            None => LogEntry {
                ip: leading_token(&line).to_owned(),
                ..LogEntry::default()
            },
        };
        entry.raw = line;
        entry
    }

}

fn leading_token(line: &str) -> &str {
    let end = line.find(SEPARATORS).unwrap_or(line.len());
    &line[..end]
}
