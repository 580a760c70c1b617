//! Result cache: memoized analysis keyed by a hash of the exact input text.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::reports::AnalysisReport;

/// Default number of cached analyses.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Entry {
    text: Box<str>,
    seq: u64,
    report: Arc<AnalysisReport>,
}

/// Thread-safe, bounded analysis cache.
///
/// Entries are keyed by the xxh3 hash of the text and store the text
/// itself, so a hash collision is treated as a miss. When full, the entry
/// inserted earliest is evicted. A capacity of zero disables caching.
#[derive(Debug)]
pub struct ResultCache {
    entries: DashMap<u64, Entry>,
    capacity: usize,
    seq: AtomicU64,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` analyses.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            seq: AtomicU64::new(0),
        }
    }

    /// Return the cached analysis of `text`, computing it on a miss.
    ///
    /// Concurrent misses on the same text may both compute; the last
    /// insert wins, and both results are identical.
    pub fn get_or_compute<F>(&self, text: &str, compute: F) -> Arc<AnalysisReport>
    where
        F: FnOnce() -> AnalysisReport,
    {
        if self.capacity == 0 {
            return Arc::new(compute());
        }

        let key = xxh3_64(text.as_bytes());
        if let Some(hit) = self.lookup(key, text) {
            tracing::trace!(key, "analysis cache hit");
            return hit;
        }

        let report = Arc::new(compute());
        self.insert(key, text, Arc::clone(&report));
        report
    }

    fn lookup(&self, key: u64, text: &str) -> Option<Arc<AnalysisReport>> {
        let entry = self.entries.get(&key)?;
        (*entry.text == *text).then(|| Arc::clone(&entry.report))
    }

    fn insert(&self, key: u64, text: &str, report: Arc<AnalysisReport>) {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key,
            Entry {
                text: text.into(),
                seq,
                report,
            },
        );
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().seq)
            .map(|e| *e.key());
        match oldest {
            Some(key) => {
                self.entries.remove(&key);
                tracing::trace!(key, "analysis cache evicted");
                true
            }
            None => false,
        }
    }

    /// Drop every cached analysis.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached analyses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached analyses.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::reports::{RiskBand, ScoreBreakdown, ScoreSource, StructureReport, TextStats};

    fn report(score: u8) -> AnalysisReport {
        AnalysisReport {
            score,
            band: RiskBand::from_score(score),
            reasoning: String::new(),
            flags: Vec::new(),
            hidden_flags: 0,
            stats: TextStats::default(),
            breakdown: ScoreBreakdown::default(),
            structure: StructureReport::default(),
            score_source: ScoreSource::Pattern,
            model_note: None,
        }
    }

    #[test]
    fn computes_once_per_text() {
        let cache = ResultCache::new(8);
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            report(42)
        };
        let a = cache.get_or_compute("same text", compute);
        let b = cache.get_or_compute("same text", || report(99));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert_eq!(b.score, 42);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_texts_are_distinct_entries() {
        let cache = ResultCache::new(8);
        cache.get_or_compute("one", || report(10));
        let two = cache.get_or_compute("two", || report(20));
        assert_eq!(two.score, 20);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let cache = ResultCache::new(2);
        cache.get_or_compute("a", || report(10));
        cache.get_or_compute("b", || report(20));
        cache.get_or_compute("c", || report(30));
        assert_eq!(cache.len(), 2);

        // "a" was evicted, so it recomputes
        let again = cache.get_or_compute("a", || report(11));
        assert_eq!(again.score, 11);
        // "c" survived
        let c = cache.get_or_compute("c", || report(99));
        assert_eq!(c.score, 30);
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = ResultCache::new(0);
        cache.get_or_compute("a", || report(10));
        let second = cache.get_or_compute("a", || report(20));
        assert_eq!(second.score, 20);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties() {
        let cache = ResultCache::default();
        cache.get_or_compute("a", || report(10));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn concurrent_access_is_safe() {
        let cache = Arc::new(ResultCache::new(16));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let text = format!("text {}", (i + j) % 20);
                        let r = cache.get_or_compute(&text, || report(50));
                        assert_eq!(r.score, 50);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // racing inserts may overshoot by at most one entry per thread
        assert!(cache.len() <= 16 + 8);
    }
}
