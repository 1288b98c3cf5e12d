//! Item resolver: turns an item id into the direct URL of its asset.
//!
//! The download worker only depends on the `Resolver` trait; `ApiResolver`
//! is the implementation backed by the detail endpoint.

use serde::Deserialize;
use std::time::Duration;

use crate::config::WhdlConfig;
use crate::fetch::{self, Accept};
use crate::link::ItemId;
use crate::retry::FetchError;

/// Direct download location of one item's binary asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub url: String,
}

/// Implemented by anything that can look up an item's asset URL.
/// Shared by every worker thread, so it must be `Sync`.
pub trait Resolver: Send + Sync {
    fn resolve(&self, id: &ItemId) -> Result<AssetDescriptor, FetchError>;
}

#[derive(Debug, Deserialize)]
struct Detail {
    data: DetailData,
}

#[derive(Debug, Deserialize)]
struct DetailData {
    path: String,
}

/// Resolver backed by the `GET {api_base}/w/{id}` detail endpoint.
#[derive(Debug, Clone)]
pub struct ApiResolver {
    api_base: String,
    user_agent: String,
    timeout: Duration,
}

impl ApiResolver {
    pub fn new(api_base: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_base: api_base.into(),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &WhdlConfig) -> Self {
        Self::new(&cfg.api_base, &cfg.user_agent, cfg.resolve_timeout())
    }

    pub fn detail_url(&self, id: &ItemId) -> String {
        format!("{}/w/{}", self.api_base.trim_end_matches('/'), id)
    }
}

impl Resolver for ApiResolver {
    fn resolve(&self, id: &ItemId) -> Result<AssetDescriptor, FetchError> {
        let mut easy = fetch::new_handle(&self.user_agent, self.timeout, Accept::Json)?;
        let detail: Detail = fetch::get_json(&mut easy, &self.detail_url(id))?;
        Ok(AssetDescriptor {
            url: detail.data.path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_url_embeds_id() {
        let r = ApiResolver::new("https://wallhaven.cc/api/v1/", "ua", Duration::from_secs(1));
        let id = ItemId::parse("l853yp").unwrap();
        assert_eq!(r.detail_url(&id), "https://wallhaven.cc/api/v1/w/l853yp");
    }

    #[test]
    fn detail_document_yields_path() {
        let detail: Detail = serde_json::from_str(
            r#"{"data":{"id":"l853yp","path":"https://w.wallhaven.cc/full/l8/wallhaven-l853yp.jpg","file_size":123}}"#,
        )
        .unwrap();
        assert_eq!(
            detail.data.path,
            "https://w.wallhaven.cc/full/l8/wallhaven-l853yp.jpg"
        );
    }

    #[test]
    fn detail_without_path_is_malformed() {
        assert!(serde_json::from_str::<Detail>(r#"{"data":{"id":"l853yp"}}"#).is_err());
    }
}
