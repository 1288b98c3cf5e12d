//! Link file writer: two header comment lines, a blank line, one URL per line.

use super::Link;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Render the link file contents.
pub fn render_links(links: &[Link]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Wallhaven wallpaper links");
    let _ = writeln!(out, "# Total: {}", links.len());
    out.push('\n');
    for link in links {
        let _ = writeln!(out, "{}", link);
    }
    out
}

/// Write `links` to `path`, replacing any previous file.
pub fn write_links(path: &Path, links: &[Link]) -> Result<()> {
    fs::write(path, render_links(links))
        .with_context(|| format!("write link file {}", path.display()))?;
    tracing::info!(count = links.len(), "saved links to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{load_links, ItemId};

    fn link(id: &str) -> Link {
        Link::new(ItemId::parse(id).unwrap())
    }

    #[test]
    fn render_has_header_and_one_url_per_line() {
        let text = render_links(&[link("aaaaaa"), link("bbbbbb")]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "# Wallhaven wallpaper links");
        assert_eq!(lines[1], "# Total: 2");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "https://wallhaven.cc/w/aaaaaa");
        assert_eq!(lines[4], "https://wallhaven.cc/w/bbbbbb");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        let links = vec![link("l853yp"), link("ogy6zm"), link("zpzd3j")];
        write_links(&path, &links).unwrap();
        assert_eq!(load_links(&path).unwrap(), links);
    }
}
