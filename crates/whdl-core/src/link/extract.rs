//! Link extraction from free-form text.
//!
//! Tolerates bare URLs, `[url]`, `(url)`, Markdown `[url](url)` and a stray
//! trailing `)` or `]`. Wrapping characters never end up in the canonical form.
//!
//! The id must be exactly six `[a-z0-9]` characters and end the URL segment:
//! `.../w/l853ypq` is rejected whole, not truncated to `l853yp`.

use super::{ItemId, Link, LinkError};
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

/// Candidate: prefix, optional wrapping, then the id segment up to the first
/// non-alphanumeric. The id is validated separately so `abcdefg` is rejected
/// instead of being truncated to `abcdef`.
static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[(]?https://wallhaven\.cc/w/([A-Za-z0-9]*)[\])]?")
        .unwrap_or_else(|e| panic!("link pattern: {}", e))
});

/// Lines echoed to the debug log while parsing, to help diagnose odd files.
const TRACE_LINES: usize = 5;

fn links_in_line(line: &str) -> impl Iterator<Item = Link> + '_ {
    CANDIDATE
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .filter_map(|id| ItemId::parse(id.as_str()))
        .map(Link::new)
}

fn push_line(line: &str, seen: &mut HashSet<Link>, out: &mut Vec<Link>) {
    for link in links_in_line(line) {
        if seen.insert(link.clone()) {
            out.push(link);
        }
    }
}

/// Extract unique canonical links from `text`, preserving first-seen order.
pub fn extract_links(text: &str) -> Vec<Link> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        push_line(line, &mut seen, &mut out);
    }
    out
}

/// Read `path` (UTF-8, line by line) and extract unique canonical links.
///
/// A missing file and a file without any valid link are both errors: the run
/// must stop before touching the network or creating directories.
pub fn load_links(path: &Path) -> Result<Vec<Link>, LinkError> {
    let io_err = |source: std::io::Error| LinkError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LinkError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(io_err(e)),
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let before = out.len();
        push_line(line, &mut seen, &mut out);
        if idx < TRACE_LINES && out.len() > before {
            tracing::debug!(line = idx + 1, found = %out[before], "parsed link line");
        }
    }

    tracing::info!(count = out.len(), "extracted links from {}", path.display());
    if out.is_empty() {
        return Err(LinkError::Empty(path.to_path_buf()));
    }
    Ok(out)
}
