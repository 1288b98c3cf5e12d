//! CLI for the whdl wallpaper downloader.

mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use whdl_core::catalog::Sorting;
use whdl_core::config;
use whdl_core::link::{LinkError, NoLinks};

use commands::{read_links, run_download, run_fetch, FetchArgs};

/// Exit code for a run aborted because there was nothing to download.
pub const EXIT_NO_LINKS: i32 = 2;

/// Top-level CLI for whdl.
#[derive(Debug, Parser)]
#[command(name = "whdl")]
#[command(about = "whdl: bulk wallpaper downloader for the wallhaven API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Catalog sort order as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Hot,
    Toplist,
    Latest,
}

impl From<SortArg> for Sorting {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Hot => Sorting::Hot,
            SortArg::Toplist => Sorting::Toplist,
            SortArg::Latest => Sorting::Latest,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Page through the catalog, save the links, then download them.
    Fetch {
        /// Catalog sort order.
        #[arg(long, value_enum, default_value = "hot")]
        sorting: SortArg,
        /// Number of catalog pages to read.
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
        /// Results per page (default from config, normally 24).
        #[arg(long, value_name = "N")]
        per_page: Option<u32>,
        /// Concurrent download workers (default from config, normally 4).
        #[arg(long, value_name = "N")]
        threads: Option<usize>,
        /// Directory the wallpapers are saved to.
        #[arg(long, default_value = "wallpapers")]
        output: PathBuf,
        /// Where to write the link list (default: wallhaven_<sorting>_P<pages>.txt).
        #[arg(long, value_name = "PATH")]
        links_file: Option<PathBuf>,
        /// Only fetch and save links; do not download.
        #[arg(long)]
        links_only: bool,
    },

    /// Download every link found in an existing text file.
    Download {
        /// Text file with wallpaper links (bare, [bracketed], (parenthesized) or Markdown).
        links_file: PathBuf,
        /// Concurrent download workers (default from config, normally 4).
        #[arg(long, value_name = "N")]
        threads: Option<usize>,
        /// Directory the wallpapers are saved to.
        #[arg(long, default_value = "wallpapers")]
        output: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch {
                sorting,
                pages,
                per_page,
                threads,
                output,
                links_file,
                links_only,
            } => {
                let args = FetchArgs {
                    sorting: sorting.into(),
                    pages,
                    per_page,
                    threads,
                    output,
                    links_file,
                    links_only,
                };
                run_fetch(&load_config()?, args).await?;
            }
            CliCommand::Download {
                links_file,
                threads,
                output,
            } => {
                let links = read_links(&links_file)?;
                run_download(&load_config()?, links, threads, output).await?;
            }
        }

        Ok(())
    }
}

fn load_config() -> Result<config::WhdlConfig> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

/// Process exit code for a failed run: 2 when there was nothing to download, else 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<NoLinks>().is_some() || err.downcast_ref::<LinkError>().is_some() {
        EXIT_NO_LINKS
    } else {
        1
    }
}

#[cfg(test)]
mod tests;
