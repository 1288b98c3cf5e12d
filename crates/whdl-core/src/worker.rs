//! Download worker: resolve one link, stream its asset to disk, count the outcome.
//!
//! Each link is tried exactly once. The curl handle and the temp file live for
//! the duration of one call and are released on return, whatever the outcome.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::WhdlConfig;
use crate::fetch::{self, Accept, Transferred};
use crate::link::{ItemId, Link};
use crate::resolver::Resolver;
use crate::retry::FetchError;
use crate::storage::PartFile;
use crate::tally::{Reporter, Tally};
use crate::url_model;

const MIB: f64 = 1024.0 * 1024.0;

/// Settings for the binary transfer step.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub user_agent: String,
    /// Whole-transfer timeout.
    pub timeout: Duration,
}

impl TransferOptions {
    pub fn from_config(cfg: &WhdlConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            timeout: cfg.transfer_timeout(),
        }
    }
}

/// Which step a failed download stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Transfer,
}

/// Per-link result.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Success {
        id: ItemId,
        path: PathBuf,
        bytes: u64,
        /// `Content-Length` declared by the server, if any.
        content_length: Option<u64>,
    },
    Failed {
        id: ItemId,
        stage: Stage,
        reason: String,
    },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }
}

/// Stream `asset_url` into `<output_dir>/<id>.<ext>`. Nothing is left on disk
/// unless the whole body arrived with a 200.
fn transfer(
    id: &ItemId,
    asset_url: &str,
    output_dir: &Path,
    opts: &TransferOptions,
) -> Result<(PathBuf, Transferred), FetchError> {
    let final_path = output_dir.join(url_model::asset_filename(id, asset_url));
    let mut part = PartFile::create(&final_path)?;
    let mut easy = fetch::new_handle(&opts.user_agent, opts.timeout, Accept::Any)?;
    let transferred = fetch::stream_to(&mut easy, asset_url, &mut part)?;
    let path = part.finalize()?;
    Ok((path, transferred))
}

/// Download one link and record the outcome in `tally` exactly once.
pub fn download_one(
    link: &Link,
    resolver: &dyn Resolver,
    opts: &TransferOptions,
    output_dir: &Path,
    tally: &Tally,
    reporter: &dyn Reporter,
) -> DownloadOutcome {
    let id = link.id();

    let asset = match resolver.resolve(id) {
        Ok(asset) => asset,
        Err(e) => {
            tracing::debug!(%id, "resolve failed: {}", e);
            let reason = format!("resolve: {}", e);
            tally.record_failure(id, &reason, reporter);
            return DownloadOutcome::Failed {
                id: id.clone(),
                stage: Stage::Resolve,
                reason,
            };
        }
    };

    match transfer(id, &asset.url, output_dir, opts) {
        Ok((path, t)) => {
            let size_mib = t.content_length.map(|n| n as f64 / MIB).unwrap_or(0.0);
            tracing::debug!(%id, bytes = t.bytes, path = %path.display(), "saved");
            tally.record_success(id, size_mib, reporter);
            DownloadOutcome::Success {
                id: id.clone(),
                path,
                bytes: t.bytes,
                content_length: t.content_length,
            }
        }
        Err(e) => {
            tracing::debug!(%id, url = %asset.url, "transfer failed: {}", e);
            let reason = format!("transfer: {}", e);
            tally.record_failure(id, &reason, reporter);
            DownloadOutcome::Failed {
                id: id.clone(),
                stage: Stage::Transfer,
                reason,
            }
        }
    }
}
