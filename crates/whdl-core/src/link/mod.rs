//! Canonical item links and the text files that carry them.
//!
//! A link is always `https://wallhaven.cc/w/<id>` where `<id>` is exactly six
//! lowercase ASCII alphanumerics. Everything else in this crate keys off the id.

mod extract;
mod write;

pub use extract::{extract_links, load_links};
pub use write::{render_links, write_links};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Host and path every canonical link starts with.
pub const LINK_PREFIX: &str = "https://wallhaven.cc/w/";

/// Length of an item identifier.
pub const ID_LEN: usize = 6;

/// Opaque six-character item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Accepts exactly [`ID_LEN`] lowercase ASCII letters or digits.
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == ID_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        valid.then(|| ItemId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical item-page URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    id: ItemId,
}

impl Link {
    pub fn new(id: ItemId) -> Self {
        Self { id }
    }

    /// Parse an already-bare canonical URL.
    pub fn parse(url: &str) -> Option<Self> {
        url.strip_prefix(LINK_PREFIX)
            .and_then(ItemId::parse)
            .map(Link::new)
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn url(&self) -> String {
        format!("{}{}", LINK_PREFIX, self.id)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", LINK_PREFIX, self.id)
    }
}

/// Nothing to work on: paging found no items, or a pool was handed no links.
#[derive(Debug, Error)]
#[error("no links to process")]
pub struct NoLinks;

/// Why a link file produced nothing to work on. Always fatal to a run.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("no valid links in {}", .0.display())]
    Empty(PathBuf),
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
