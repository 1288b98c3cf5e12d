//! Local filename derivation for resolved asset URLs.
//!
//! Files are named `<id>.<ext>`; the extension comes from the last path
//! segment of the asset URL (query stripped) and is sanitized so it can never
//! escape the output directory or carry odd characters.

use crate::link::ItemId;

/// Extension used when the asset URL has none usable.
const DEFAULT_EXTENSION: &str = "bin";

/// Longest extension kept as-is; anything longer is treated as garbage.
const MAX_EXTENSION_LEN: usize = 8;

/// Extension of the last path segment of `url`, lowercased ASCII alphanumerics only.
pub fn extension_from_url(url: &str) -> String {
    let segment = url::Url::parse(url).ok().and_then(|u| {
        u.path_segments()?
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string)
    });

    segment
        .as_deref()
        .and_then(|s| s.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.bytes().all(|b| b.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// `<id>.<ext>` for an asset resolved from `asset_url`.
pub fn asset_filename(id: &ItemId, asset_url: &str) -> String {
    format!("{}.{}", id, extension_from_url(asset_url))
}
