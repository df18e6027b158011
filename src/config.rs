use crate::error::{PiiLensError, Result};
use pii_lens_common::{EndpointMode, ServiceConfig, StaleMaskPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// APIベースURLを上書きする環境変数
pub const API_BASE_ENV: &str = "PII_LENS_API_BASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: Option<String>,
    pub default_mode: EndpointMode,
    pub stale_mask_policy: StaleMaskPolicy,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            default_mode: EndpointMode::Process,
            stale_mask_policy: StaleMaskPolicy::Keep,
            timeout_seconds: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PiiLensError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("pii-lens").join("config.json"))
    }

    /// 接続先。優先順位: 引数 > 環境変数 > 設定ファイル > デフォルト
    pub fn service(&self, api_base_arg: Option<&str>) -> ServiceConfig {
        let env = std::env::var(API_BASE_ENV).ok();
        self.resolve_service(api_base_arg, env.as_deref())
    }

    pub fn resolve_service(&self, api_base_arg: Option<&str>, env: Option<&str>) -> ServiceConfig {
        let chosen = [api_base_arg, env, self.api_base.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty());
        ServiceConfig::from_override(chosen)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub fn set_api_base(&mut self, api_base: String) -> Result<()> {
        let trimmed = api_base.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(PiiLensError::Config(format!(
                "api base must start with http:// or https://: {}",
                trimmed
            )));
        }
        self.api_base = Some(trimmed.trim_end_matches('/').to_string());
        Ok(())
    }
}
