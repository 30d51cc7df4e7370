use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    classify::{is_bot, is_suspicious},
    entry::LogEntry,
};

/// Running totals for a set of processed lines.
///
/// Every field is a sum or a per-key count, so [`Statistics::merge`] is
/// associative and commutative and shards can be combined in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total_lines: u64,
    pub status_2xx: u64,
    pub status_3xx: u64,
    pub status_4xx: u64,
    pub status_5xx: u64,
    pub suspicious_requests: u64,
    pub bot_requests: u64,
    pub ip_hits: HashMap<String, u64>,
    pub url_hits: HashMap<String, u64>,
    pub method_hits: HashMap<String, u64>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_lines == 0
    }

    pub fn unique_ips(&self) -> usize {
        self.ip_hits.len()
    }

    pub fn record(&mut self, entry: &LogEntry) {
        self.total_lines += 1;

        // Codes outside 200..600 land in no bucket.
        match entry.status {
            200..=299 => self.status_2xx += 1,
            300..=399 => self.status_3xx += 1,
            400..=499 => self.status_4xx += 1,
            500..=599 => self.status_5xx += 1,
            _ => {}
        }

        bump(&mut self.ip_hits, &entry.ip);
        bump(&mut self.url_hits, &entry.url);
        bump(&mut self.method_hits, &entry.method);

        if is_suspicious(entry) {
            self.suspicious_requests += 1;
        }
        if is_bot(&entry.user_agent) {
            self.bot_requests += 1;
        }
    }

    /// Folds `other` into `self`. `other` is consumed.
    pub fn merge(&mut self, other: Statistics) {
        self.total_lines += other.total_lines;
        self.status_2xx += other.status_2xx;
        self.status_3xx += other.status_3xx;
        self.status_4xx += other.status_4xx;
        self.status_5xx += other.status_5xx;
        self.suspicious_requests += other.suspicious_requests;
        self.bot_requests += other.bot_requests;

        merge_counts(&mut self.ip_hits, other.ip_hits);
        merge_counts(&mut self.url_hits, other.url_hits);
        merge_counts(&mut self.method_hits, other.method_hits);
    }

    pub fn merged<I: IntoIterator<Item = Statistics>>(parts: I) -> Statistics {
        parts.into_iter().fold(Statistics::new(), |mut acc, part| {
            acc.merge(part);
            acc
        })
    }
}

fn bump(counts: &mut HashMap<String, u64>, key: &str) {
    if key.is_empty() {
        return;
    }
    match counts.get_mut(key) {
        Some(hits) => *hits += 1,
        None => {
            counts.insert(key.to_owned(), 1);
        }
    }
}

fn merge_counts(into: &mut HashMap<String, u64>, from: HashMap<String, u64>) {
    if into.is_empty() {
        *into = from;
        return;
    }
    for (key, count) in from {
        *into.entry(key).or_default() += count;
    }
}

/// A merge target several threads can fold their shards into.
///
/// Only [`SharedStatistics::merge`] takes the lock; recording always happens
/// on a thread-private [`Statistics`].
#[derive(Clone, Default)]
pub struct SharedStatistics {
    inner: Arc<Mutex<Statistics>>,
}

impl SharedStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, shard: Statistics) {
        // A poisoned lock only means another merger panicked, which is
        // reported when its thread is joined.
        let mut stats = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        stats.merge(shard);
    }

    /// Takes the merged result out, leaving an empty accumulator behind.
    pub fn take(&self) -> Statistics {
        let mut stats = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *stats)
    }
}
