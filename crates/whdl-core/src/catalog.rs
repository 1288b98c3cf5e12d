//! Catalog client: pages through the search endpoint and turns every result
//! into a canonical link.
//!
//! Transient failures (timeouts, connection errors, malformed JSON) are retried
//! with linear backoff; a non-200 status ends the page at once. A page that
//! never succeeds contributes nothing and paging moves on.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::WhdlConfig;
use crate::fetch::{self, Accept};
use crate::link::{ItemId, Link};
use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// Catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sorting {
    #[default]
    Hot,
    Toplist,
    Latest,
}

impl Sorting {
    pub const ALL: [Sorting; 3] = [Sorting::Hot, Sorting::Toplist, Sorting::Latest];

    pub fn as_str(self) -> &'static str {
        match self {
            Sorting::Hot => "hot",
            Sorting::Toplist => "toplist",
            Sorting::Latest => "latest",
        }
    }
}

impl fmt::Display for Sorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sorting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Sorting::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown sorting {:?} (expected hot, toplist or latest)", s))
    }
}

/// Settings for one paging session.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub api_base: String,
    pub user_agent: String,
    pub per_page: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Pause between consecutive pages.
    pub page_delay: Duration,
    pub retry: RetryPolicy,
}

impl CatalogOptions {
    pub fn from_config(cfg: &WhdlConfig) -> Self {
        Self {
            api_base: cfg.api_base.clone(),
            user_agent: cfg.user_agent.clone(),
            per_page: cfg.per_page,
            timeout: cfg.catalog_timeout(),
            page_delay: cfg.page_delay(),
            // Rate-limit and server errors on a page get the same attempt budget.
            retry: RetryPolicy {
                retry_status: true,
                ..cfg.retry.policy()
            },
        }
    }
}

/// Result of one page, reported to the caller as paging proceeds.
#[derive(Debug)]
pub struct PageOutcome {
    pub page: u32,
    pub pages: u32,
    /// Links found on the page, or the last error once retries ran out.
    pub result: Result<usize, FetchError>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: String,
}

/// Search endpoint URL for one page.
pub fn search_url(api_base: &str, sorting: Sorting, per_page: u32, page: u32) -> String {
    format!(
        "{}/search?sorting={}&per_page={}&page={}",
        api_base.trim_end_matches('/'),
        sorting,
        per_page,
        page
    )
}

fn page_links(page: SearchPage) -> Vec<Link> {
    page.data
        .into_iter()
        .filter_map(|item| match ItemId::parse(&item.id) {
            Some(id) => Some(Link::new(id)),
            None => {
                tracing::warn!(id = %item.id, "skipping catalog item with malformed id");
                None
            }
        })
        .collect()
}

/// Fetch pages `1..=pages` and concatenate their links in page order, then
/// in-page order. `on_page` sees every page's outcome. Only a failure to set
/// up the HTTP handle is an error; an empty result is left to the caller.
pub fn fetch_links<F>(opts: &CatalogOptions, sorting: Sorting, pages: u32, mut on_page: F) -> Result<Vec<Link>>
where
    F: FnMut(&PageOutcome),
{
    let mut easy = fetch::new_handle(&opts.user_agent, opts.timeout, Accept::Json)?;
    let mut all = Vec::new();

    for page in 1..=pages {
        let url = search_url(&opts.api_base, sorting, opts.per_page, page);
        tracing::debug!(page, pages, %url, "fetching catalog page");

        let fetched = run_with_retry(&opts.retry, |attempt| {
            tracing::trace!(page, attempt, "catalog attempt");
            fetch::get_json::<SearchPage>(&mut easy, &url).map(page_links)
        });

        let result = match fetched {
            Ok(links) => {
                tracing::info!(page, count = links.len(), "catalog page fetched");
                let n = links.len();
                all.extend(links);
                Ok(n)
            }
            Err(e) => {
                tracing::warn!(page, "catalog page skipped: {}", e);
                Err(e)
            }
        };
        on_page(&PageOutcome {
            page,
            pages,
            result,
        });

        if page < pages && !opts.page_delay.is_zero() {
            std::thread::sleep(opts.page_delay);
        }
    }

    tracing::info!(total = all.len(), %sorting, pages, "catalog paging finished");
    Ok(all)
}
