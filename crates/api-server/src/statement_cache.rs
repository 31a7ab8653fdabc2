use dart_core::{CanonicalStatement, StatementRequest};
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Normalized statements keyed by `(corp_code, year, report_code)`.
/// Only successful results are ever inserted.
pub struct StatementCache {
    entries: DashMap<StatementRequest, (Instant, CanonicalStatement)>,
    ttl: Duration,
}

impl StatementCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, request: &StatementRequest) -> Option<CanonicalStatement> {
        let fresh = self
            .entries
            .get(request)
            .filter(|entry| entry.0.elapsed() < self.ttl)
            .map(|entry| entry.1.clone());

        if fresh.is_none() {
            self.entries.remove(request);
        }
        fresh
    }

    pub fn insert(&self, request: StatementRequest, statement: CanonicalStatement) {
        self.evict_expired();
        self.entries.insert(request, (Instant::now(), statement));
    }

    /// Drops every entry older than the TTL.
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (at, _)| at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
