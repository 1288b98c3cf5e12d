//! `whdl fetch` – page the catalog, save the links, optionally download them.

use anyhow::{Context, Result};
use std::path::PathBuf;
use whdl_core::catalog::{self, CatalogOptions, Sorting};
use whdl_core::config::{RunConfig, WhdlConfig};
use whdl_core::link::{self, NoLinks};

use super::download::download_links;
use crate::cli::console;

#[derive(Debug)]
pub struct FetchArgs {
    pub sorting: Sorting,
    pub pages: u32,
    pub per_page: Option<u32>,
    pub threads: Option<usize>,
    pub output: PathBuf,
    pub links_file: Option<PathBuf>,
    pub links_only: bool,
}

/// `wallhaven_<sorting>_P<pages>.txt` in the working directory.
pub fn default_links_file(sorting: Sorting, pages: u32) -> PathBuf {
    PathBuf::from(format!("wallhaven_{}_P{}.txt", sorting, pages))
}

pub async fn run_fetch(cfg: &WhdlConfig, args: FetchArgs) -> Result<()> {
    let mut opts = CatalogOptions::from_config(cfg);
    if let Some(n) = args.per_page {
        opts.per_page = n;
    }
    let run = RunConfig {
        links_file: args
            .links_file
            .unwrap_or_else(|| default_links_file(args.sorting, args.pages)),
        output_dir: args.output,
        workers: args.threads.unwrap_or(cfg.workers).max(1),
        sorting: args.sorting,
        pages: args.pages,
    };
    console::banner(&run, args.links_only);

    let (sorting, pages) = (run.sorting, run.pages);
    let links = tokio::task::spawn_blocking(move || {
        catalog::fetch_links(&opts, sorting, pages, console::page_line)
    })
    .await
    .context("catalog task join")??;

    if links.is_empty() {
        println!("No links fetched; nothing to do.");
        return Err(NoLinks.into());
    }
    link::write_links(&run.links_file, &links)?;
    println!("Saved {} links to {}", links.len(), run.links_file.display());

    if args.links_only {
        println!("Links only: download skipped.");
        return Ok(());
    }

    // Download from the saved file so a fetched run and `whdl download` see the same links.
    let links = link::load_links(&run.links_file)?;
    download_links(cfg, links, run.workers, run.output_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_links_file_names_sorting_and_pages() {
        assert_eq!(
            default_links_file(Sorting::Hot, 20),
            PathBuf::from("wallhaven_hot_P20.txt")
        );
        assert_eq!(
            default_links_file(Sorting::Toplist, 1),
            PathBuf::from("wallhaven_toplist_P1.txt")
        );
    }
}
