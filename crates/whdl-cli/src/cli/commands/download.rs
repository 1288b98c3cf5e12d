//! `whdl download <file>` – download every link in a text file.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use whdl_core::config::WhdlConfig;
use whdl_core::link::{self, Link};
use whdl_core::pool::{self, PoolOptions};
use whdl_core::resolver::ApiResolver;

use crate::cli::console::{self, ConsoleReporter};

/// Extract links from `links_file`. Missing or link-less files abort the run
/// here, before config is touched or any network or disk activity starts.
pub fn read_links(links_file: &Path) -> Result<Vec<Link>> {
    let links = link::load_links(links_file)?;
    println!("Parsed {} links from {}", links.len(), links_file.display());
    Ok(links)
}

pub async fn run_download(
    cfg: &WhdlConfig,
    links: Vec<Link>,
    threads: Option<usize>,
    output: PathBuf,
) -> Result<()> {
    let workers = threads.unwrap_or(cfg.workers).max(1);
    download_links(cfg, links, workers, output).await
}

pub(super) async fn download_links(
    cfg: &WhdlConfig,
    links: Vec<Link>,
    workers: usize,
    output: PathBuf,
) -> Result<()> {
    console::pool_start(links.len(), pool::effective_workers(workers, links.len()), &output);
    let opts = PoolOptions::from_config(cfg, workers, output);
    let resolver = Arc::new(ApiResolver::from_config(cfg));
    let report = pool::run(links, opts, resolver, Arc::new(ConsoleReporter)).await?;
    console::summary(&report);
    Ok(())
}
