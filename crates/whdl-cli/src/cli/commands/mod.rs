//! CLI command handlers, one file per command.

mod download;
mod fetch;

pub use download::{read_links, run_download};
pub use fetch::{run_fetch, FetchArgs};
