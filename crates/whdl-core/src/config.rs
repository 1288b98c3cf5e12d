use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::Sorting;
use crate::retry::RetryPolicy;

/// Retry policy parameters for catalog page requests (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per page (including the first).
    pub max_attempts: u32,
    /// Delay in seconds before the first retry.
    pub base_delay_secs: f64,
    /// Added to the delay on every further retry.
    pub step_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 2.0,
            step_delay_secs: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: secs(self.base_delay_secs),
            step: secs(self.step_delay_secs),
            retry_status: false,
        }
    }
}

/// Memory watchdog parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Seconds between RSS samples.
    pub watch_interval_secs: u64,
    /// Resident size in MiB above which a reclamation pass runs.
    pub threshold_mib: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            watch_interval_secs: 5,
            threshold_mib: 3000,
        }
    }
}

/// Global configuration loaded from `~/.config/whdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhdlConfig {
    /// Base URL of the gallery API (search and detail endpoints hang off it).
    pub api_base: String,
    /// User-Agent sent on every request.
    pub user_agent: String,
    /// Catalog results per page.
    pub per_page: u32,
    /// Default number of download workers.
    pub workers: usize,
    /// Pause between catalog pages, applied whatever the page outcome.
    pub page_delay_secs: f64,
    pub catalog_timeout_secs: u64,
    pub resolve_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Default for WhdlConfig {
    fn default() -> Self {
        Self {
            api_base: "https://wallhaven.cc/api/v1".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
                .to_string(),
            per_page: 24,
            workers: 4,
            page_delay_secs: 2.0,
            catalog_timeout_secs: 15,
            resolve_timeout_secs: 10,
            transfer_timeout_secs: 30,
            retry: RetryConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl WhdlConfig {
    pub fn page_delay(&self) -> Duration {
        secs(self.page_delay_secs)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }
}

/// Immutable inputs of one run, built once by the driver from config and flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Link file read by the extractor (and written by catalog paging).
    pub links_file: PathBuf,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub sorting: Sorting,
    pub pages: u32,
}

/// Negative or non-finite seconds collapse to zero.
fn secs(s: f64) -> Duration {
    if s.is_finite() && s > 0.0 {
        Duration::from_secs_f64(s)
    } else {
        Duration::ZERO
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("whdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WhdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WhdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: WhdlConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = WhdlConfig::default();
        assert_eq!(cfg.per_page, 24);
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.memory.threshold_mib, 3000);
        assert_eq!(cfg.memory.watch_interval_secs, 5);
        assert_eq!(cfg.resolve_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.transfer_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = WhdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: WhdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.api_base, cfg.api_base);
        assert_eq!(parsed.user_agent, cfg.user_agent);
        assert_eq!(parsed.workers, cfg.workers);
        assert_eq!(parsed.retry.max_attempts, cfg.retry.max_attempts);
    }

    #[test]
    fn config_toml_without_optional_sections() {
        let toml = r#"
            api_base = "http://127.0.0.1:8080/api/v1"
            user_agent = "test"
            per_page = 10
            workers = 2
            page_delay_secs = 0.0
            catalog_timeout_secs = 5
            resolve_timeout_secs = 5
            transfer_timeout_secs = 5
        "#;
        let cfg: WhdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.api_base, "http://127.0.0.1:8080/api/v1");
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.page_delay(), Duration::ZERO);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.memory.threshold_mib, 3000);
    }

    #[test]
    fn retry_section_builds_linear_policy() {
        let toml = r#"
            max_attempts = 5
            base_delay_secs = 0.5
            step_delay_secs = 0.25
        "#;
        let retry: RetryConfig = toml::from_str(toml).unwrap();
        let policy = retry.policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.step, Duration::from_millis(250));
    }

    #[test]
    fn negative_delays_clamp_to_zero() {
        let retry = RetryConfig {
            max_attempts: 0,
            base_delay_secs: -1.0,
            step_delay_secs: f64::NAN,
        };
        let policy = retry.policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::ZERO);
        assert_eq!(policy.step, Duration::ZERO);
    }
}
