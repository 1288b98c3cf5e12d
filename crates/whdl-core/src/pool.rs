//! Pool orchestrator: one download task per link on a fixed set of worker
//! threads, plus the memory watchdog for the duration of the run.
//!
//! Workers drain a shared queue in submission order. A failed link never
//! stops the others; the run ends when the queue is empty and every worker
//! has returned.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::WhdlConfig;
use crate::link::{Link, NoLinks};
use crate::memory::{Watchdog, WatchdogOptions};
use crate::resolver::Resolver;
use crate::tally::{Counts, Reporter, Tally};
use crate::worker::{self, TransferOptions};

/// Settings for one pool run.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub workers: usize,
    pub output_dir: PathBuf,
    pub transfer: TransferOptions,
    /// `None` runs without the memory watchdog.
    pub watchdog: Option<WatchdogOptions>,
}

impl PoolOptions {
    pub fn from_config(cfg: &WhdlConfig, workers: usize, output_dir: PathBuf) -> Self {
        Self {
            workers,
            output_dir,
            transfer: TransferOptions::from_config(cfg),
            watchdog: Some(WatchdogOptions {
                interval: std::time::Duration::from_secs(cfg.memory.watch_interval_secs),
                threshold_mib: cfg.memory.threshold_mib,
            }),
        }
    }
}

/// Final tallies of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
    /// Reclamation passes the watchdog ran.
    pub reclaim_passes: u32,
}

/// Worker threads actually started for `total` links: at least one, never
/// more than there are links.
pub fn effective_workers(workers: usize, total: usize) -> usize {
    workers.max(1).min(total.max(1))
}

/// Run every link through the download worker with at most `opts.workers`
/// transfers in flight, and wait for all of them.
pub async fn run(
    links: Vec<Link>,
    opts: PoolOptions,
    resolver: Arc<dyn Resolver>,
    reporter: Arc<dyn Reporter>,
) -> Result<PoolReport> {
    if links.is_empty() {
        return Err(NoLinks.into());
    }
    tokio::fs::create_dir_all(&opts.output_dir)
        .await
        .with_context(|| format!("create output dir {}", opts.output_dir.display()))?;

    let total = links.len();
    let workers = effective_workers(opts.workers, total);
    tracing::info!(total, workers, dir = %opts.output_dir.display(), "starting download pool");

    let watchdog = opts.watchdog.and_then(Watchdog::spawn);

    let output_dir = opts.output_dir.clone();
    let transfer = opts.transfer.clone();
    let joined = tokio::task::spawn_blocking(move || {
        drain(links, workers, &output_dir, &transfer, resolver.as_ref(), reporter.as_ref())
    })
    .await;

    let reclaim_passes = match watchdog {
        Some(w) => w.stop().await,
        None => 0,
    };
    let counts = joined.context("download pool join")?;

    tracing::info!(
        total,
        succeeded = counts.succeeded,
        failed = counts.failed,
        "download pool finished"
    );
    Ok(PoolReport {
        total,
        succeeded: counts.succeeded,
        failed: counts.failed,
        output_dir: opts.output_dir,
        reclaim_passes,
    })
}

/// Blocking core of `run`: `workers` threads pop links until the queue is empty.
fn drain(
    links: Vec<Link>,
    workers: usize,
    output_dir: &Path,
    transfer: &TransferOptions,
    resolver: &dyn Resolver,
    reporter: &dyn Reporter,
) -> Counts {
    let tally = Tally::new(links.len());
    let queue: Mutex<VecDeque<Link>> = Mutex::new(links.into());
    let next = || queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
    let (tally_ref, next) = (&tally, &next);

    std::thread::scope(|s| {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers.max(1) {
            handles.push(s.spawn(move || {
                while let Some(link) = next() {
                    worker::download_one(&link, resolver, transfer, output_dir, tally_ref, reporter);
                }
            }));
        }
        for h in handles {
            if h.join().is_err() {
                tracing::error!("download worker panicked");
            }
        }
    });

    tally.counts()
}
