//! Request classification. Both predicates are pure and lowercase their
//! input once, so they can be called from any thread without coordination.

use crate::entry::LogEntry;

/// Lowercase probe/attack markers matched anywhere in the request URL.
const SUSPICIOUS_URL: &[&str] = &[
    ".env",
    "phpinfo",
    "eval-stdin",
    "cgi-bin",
    "shell",
    "/bin/sh",
    "wget",
    "curl",
    "etc/passwd",
    "../",
    "..\\",
    "cmd=",
    "exec",
    "system(",
    "docker",
    "actuator",
    ".git",
    "phpunit",
    "invokefunction",
    "xdebug",
    "\\x",
    "union",
    "select",
    "<script",
    "javascript:",
];

/// Lowercase automated-client markers matched anywhere in the user agent.
const BOT_USER_AGENT: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "bytespider",
    "zgrab",
    "masscan",
    "censys",
    "shodan",
];

pub fn is_suspicious(entry: &LogEntry) -> bool {
    is_suspicious_url(&entry.url)
}

pub fn is_suspicious_url(url: &str) -> bool {
    contains_any(url, SUSPICIOUS_URL)
}

pub fn is_bot(user_agent: &str) -> bool {
    contains_any(user_agent, BOT_USER_AGENT)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    if haystack.is_empty() {
        return false;
    }
    let lower = haystack.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}
