//! Run-wide success/failure counters and progress reporting.
//!
//! Counters and reporter callbacks share one mutex: the counts a reporter sees
//! are the counts right after its own update, and console lines from different
//! workers never interleave.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::link::ItemId;
use crate::memory::MemorySampler;

/// Snapshot of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub succeeded: usize,
    pub failed: usize,
}

impl Counts {
    pub fn done(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Emitted after a successful download.
#[derive(Debug, Clone)]
pub struct ProgressEvent<'a> {
    pub counts: Counts,
    pub total: usize,
    pub id: &'a ItemId,
    /// Declared size in MiB, 0 when the server sent no `Content-Length`.
    pub size_mib: f64,
    pub rss_mib: Option<u64>,
}

/// Emitted after a failed download.
#[derive(Debug, Clone)]
pub struct FailureEvent<'a> {
    pub counts: Counts,
    pub total: usize,
    pub id: &'a ItemId,
    pub reason: &'a str,
}

/// Receives per-item events; called with the tally lock held.
pub trait Reporter: Send + Sync {
    fn on_success(&self, event: &ProgressEvent<'_>);

    fn on_failure(&self, _event: &FailureEvent<'_>) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn on_success(&self, _event: &ProgressEvent<'_>) {}
}

struct State {
    counts: Counts,
    sampler: MemorySampler,
}

/// Shared counters for one pool run.
pub struct Tally {
    total: usize,
    state: Mutex<State>,
}

impl Tally {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            state: Mutex::new(State {
                counts: Counts::default(),
                sampler: MemorySampler::new(),
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking reporter must not wedge the other workers.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn counts(&self) -> Counts {
        self.lock().counts
    }

    /// Count one success and report it. Returns the counts after the update.
    pub fn record_success(&self, id: &ItemId, size_mib: f64, reporter: &dyn Reporter) -> Counts {
        let mut state = self.lock();
        state.counts.succeeded += 1;
        let rss_mib = state.sampler.resident_mib();
        let counts = state.counts;
        reporter.on_success(&ProgressEvent {
            counts,
            total: self.total,
            id,
            size_mib,
            rss_mib,
        });
        counts
    }

    /// Count one failure and report it. Returns the counts after the update.
    pub fn record_failure(&self, id: &ItemId, reason: &str, reporter: &dyn Reporter) -> Counts {
        let mut state = self.lock();
        state.counts.failed += 1;
        let counts = state.counts;
        reporter.on_failure(&FailureEvent {
            counts,
            total: self.total,
            id,
            reason,
        });
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recording {
        successes: Mutex<Vec<(String, Counts)>>,
        failures: Mutex<Vec<(String, String)>>,
    }

    impl Reporter for Recording {
        fn on_success(&self, event: &ProgressEvent<'_>) {
            self.successes
                .lock()
                .unwrap()
                .push((event.id.to_string(), event.counts));
        }

        fn on_failure(&self, event: &FailureEvent<'_>) {
            self.failures
                .lock()
                .unwrap()
                .push((event.id.to_string(), event.reason.to_string()));
        }
    }

    fn id(s: &str) -> ItemId {
        ItemId::parse(s).unwrap()
    }

    #[test]
    fn success_and_failure_update_separate_counters() {
        let tally = Tally::new(3);
        let rec = Recording::default();
        tally.record_success(&id("aaaaaa"), 1.5, &rec);
        let after = tally.record_failure(&id("bbbbbb"), "HTTP 404", &rec);
        assert_eq!(after, Counts { succeeded: 1, failed: 1 });
        assert_eq!(tally.counts().done(), 2);
        assert_eq!(
            rec.successes.lock().unwrap()[0],
            ("aaaaaa".to_string(), Counts { succeeded: 1, failed: 0 })
        );
        assert_eq!(
            rec.failures.lock().unwrap()[0],
            ("bbbbbb".to_string(), "HTTP 404".to_string())
        );
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let tally = Arc::new(Tally::new(800));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let tally = Arc::clone(&tally);
                std::thread::spawn(move || {
                    let item = id("cccccc");
                    for i in 0..100 {
                        if (i + t) % 2 == 0 {
                            tally.record_success(&item, 0.0, &SilentReporter);
                        } else {
                            tally.record_failure(&item, "x", &SilentReporter);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let counts = tally.counts();
        assert_eq!(counts.done(), 800);
        assert_eq!(counts.succeeded, 400);
        assert_eq!(counts.failed, 400);
    }
}
