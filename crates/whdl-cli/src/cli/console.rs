//! User-facing console output: banner, per-page lines, live progress, summary.

use std::io::Write;
use std::path::Path;
use whdl_core::catalog::PageOutcome;
use whdl_core::config::RunConfig;
use whdl_core::pool::PoolReport;
use whdl_core::tally::{ProgressEvent, Reporter};

const RULE: &str = "============================================================";

fn absolute(p: &Path) -> String {
    std::path::absolute(p)
        .unwrap_or_else(|_| p.to_path_buf())
        .display()
        .to_string()
}

pub fn banner(run: &RunConfig, links_only: bool) {
    println!("{RULE}");
    println!("whdl: wallhaven batch downloader");
    println!("sorting:    {}", run.sorting);
    println!("pages:      {}", run.pages);
    println!("workers:    {}", run.workers);
    println!("links file: {}", run.links_file.display());
    println!("links only: {}", if links_only { "yes" } else { "no" });
    println!("{RULE}");
}

pub fn page_line(outcome: &PageOutcome) {
    match &outcome.result {
        Ok(n) => println!("page {}/{}: {} links", outcome.page, outcome.pages, n),
        Err(e) => println!("page {}/{}: skipped ({})", outcome.page, outcome.pages, e),
    }
}

pub fn pool_start(total: usize, workers: usize, output: &Path) {
    println!(
        "downloading {} wallpapers with {} workers into {}",
        total,
        workers,
        absolute(output)
    );
}

/// Prints `[ok/total] id (size) failed N | rss M MiB` in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

pub fn progress_line(e: &ProgressEvent<'_>) -> String {
    let rss = e
        .rss_mib
        .map(|m| format!("{m:4}"))
        .unwrap_or_else(|| "   ?".to_string());
    format!(
        "[{:3}/{:3}] {} ({:5.1} MiB) failed {} | rss {} MiB",
        e.counts.succeeded, e.total, e.id, e.size_mib, e.counts.failed, rss
    )
}

impl Reporter for ConsoleReporter {
    fn on_success(&self, event: &ProgressEvent<'_>) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{}", progress_line(event));
        let _ = out.flush();
    }
}

pub fn summary(report: &PoolReport) {
    println!();
    println!("{RULE}");
    println!("done");
    println!("succeeded: {}/{}", report.succeeded, report.total);
    println!("failed:    {}", report.failed);
    println!("saved to:  {}", absolute(&report.output_dir));
    if report.reclaim_passes > 0 {
        println!("memory reclaim passes: {}", report.reclaim_passes);
    }
}
