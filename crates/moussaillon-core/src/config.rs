use crate::provider::Provider;
use crate::resources::{ResourceCatalog, ResourceRule, RouteRule, RouteTable};
use crate::session::SessionSettings;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    /// Replaces the built-in keyword table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceRule>>,
    /// Replaces the built-in route table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteRule>>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            provider: Some(Provider::default().as_str().to_string()),
            resources: None,
            routes: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_provider(provider: &str) -> Result<()> {
        let provider = Provider::from_str(provider)
            .ok_or_else(|| anyhow!("Unknown provider: {}", provider))?;
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.provider = Some(provider.as_str().to_string());
        config.save()
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    /// Configured provider; an unknown name falls back to the default.
    pub fn provider(&self) -> Provider {
        match self.provider.as_deref() {
            None => Provider::default(),
            Some(name) => Provider::from_str(name).unwrap_or_else(|| {
                warn!(provider = name, "unknown provider in config, using default");
                Provider::default()
            }),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            provider: self.provider(),
            catalog: self
                .resources
                .clone()
                .map(ResourceCatalog::new)
                .unwrap_or_default(),
            routes: self.routes.clone().map(RouteTable::new).unwrap_or_default(),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("moussaillon").join("config.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
