use crate::route::RouteKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct Mismatches {
    counts: HashMap<RouteKey, usize>,
    last: Option<RouteKey>,
}

///
/// Per-route match and mismatch counters plus the grand total of requests.
/// Matches and mismatches are counted under separate locks.
///
#[derive(Default)]
pub(crate) struct Statistics {
    matched: Mutex<HashMap<RouteKey, usize>>,
    mismatched: Mutex<Mismatches>,
    total: AtomicUsize,
}

impl Statistics {
    pub(crate) fn record_request(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_match(&self, key: &RouteKey) {
        *self.matched.lock().entry(key.clone()).or_insert(0) += 1;
    }

    pub(crate) fn record_mismatch(&self, key: &RouteKey) {
        let mut mismatched = self.mismatched.lock();
        *mismatched.counts.entry(key.clone()).or_insert(0) += 1;
        mismatched.last = Some(key.clone());
    }

    pub(crate) fn matched(&self, key: &RouteKey) -> usize {
        self.matched.lock().get(key).copied().unwrap_or(0)
    }

    pub(crate) fn mismatched(&self, key: &RouteKey) -> usize {
        self.mismatched.lock().counts.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub(crate) fn last_unmatched(&self) -> Option<RouteKey> {
        self.mismatched.lock().last.clone()
    }

    pub(crate) fn reset(&self) {
        let mut matched = self.matched.lock();
        let mut mismatched = self.mismatched.lock();
        matched.clear();
        *mismatched = Mismatches::default();
        self.total.store(0, Ordering::SeqCst);
    }
}
