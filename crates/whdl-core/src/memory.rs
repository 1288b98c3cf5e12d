//! Process memory sampling and the soft memory watchdog.
//!
//! The watchdog is best effort: it samples resident memory on an interval and,
//! above a threshold, asks the allocator to hand free pages back to the OS.
//! Downloads stream in bounded chunks, so it is a mitigation and nothing
//! depends on it for correctness.

use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIB: u64 = 1024 * 1024;

/// Samples the resident set size of the current process.
pub struct MemorySampler {
    system: System,
    pid: Option<Pid>,
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Current RSS in MiB, or `None` when the platform gives no answer.
    pub fn resident_mib(&mut self) -> Option<u64> {
        let pid = self.pid?;
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.system.process(pid).map(|p| p.memory() / MIB)
    }
}

/// One-shot RSS sample in MiB.
pub fn resident_mib() -> Option<u64> {
    MemorySampler::new().resident_mib()
}

/// Return freed heap pages to the OS. Returns true if memory was released.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub fn reclaim() -> bool {
    // SAFETY: malloc_trim only walks glibc's own arenas; no pointers are passed.
    unsafe { libc::malloc_trim(0) != 0 }
}

/// Return freed heap pages to the OS. No allocator hook on this platform.
#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub fn reclaim() -> bool {
    false
}

/// Watchdog parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogOptions {
    pub interval: Duration,
    pub threshold_mib: u64,
}

/// Handle to a running watchdog task.
pub struct Watchdog {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<u32>,
}

impl Watchdog {
    /// Start the watchdog on the current tokio runtime.
    /// Returns `None` for a zero interval (watchdog disabled).
    pub fn spawn(opts: WatchdogOptions) -> Option<Self> {
        if opts.interval.is_zero() {
            return None;
        }
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut sampler = MemorySampler::new();
            let mut ticker = tokio::time::interval(opts.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut passes = 0u32;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let Some(rss) = sampler.resident_mib() else { continue };
                        if rss > opts.threshold_mib {
                            let released = reclaim();
                            passes += 1;
                            let after = sampler.resident_mib().unwrap_or(rss);
                            tracing::warn!(
                                rss_mib = rss,
                                after_mib = after,
                                released,
                                threshold_mib = opts.threshold_mib,
                                "memory above threshold, reclaimed"
                            );
                        }
                    }
                }
            }
            passes
        });
        Some(Self { stop_tx, handle })
    }

    /// Stop the watchdog and return how many reclamation passes it ran.
    pub async fn stop(self) -> u32 {
        let _ = self.stop_tx.send(());
        self.handle.await.unwrap_or(0)
    }
}
