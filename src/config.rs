use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sort::SortConfig;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    #[default]
    Table,
    Kanban,
}

#[derive(Debug, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub default_view: DefaultView,
    pub default_sort: Option<String>,
}

impl AppConfig {
    /// The configured initial sort, or none when absent.
    pub fn initial_sort(&self) -> Result<SortConfig> {
        match &self.ui.default_sort {
            Some(text) => text
                .parse()
                .with_context(|| format!("Invalid ui.default_sort '{text}'")),
            None => Ok(SortConfig::new()),
        }
    }

    fn apply_env(&mut self, url: Option<String>, token: Option<String>) {
        if let Some(url) = url {
            match &mut self.api {
                Some(api) => api.base_url = url,
                None => {
                    self.api = Some(ApiConfig {
                        base_url: url,
                        token: None,
                        timeout_secs: None,
                    })
                }
            }
        }
        if let (Some(token), Some(api)) = (token, self.api.as_mut()) {
            api.token = Some(token);
        }
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".taskboard")
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    let mut config = load_config_from(&config_path())?;
    config.apply_env(
        std::env::var("TASKBOARD_API_URL").ok(),
        std::env::var("TASKBOARD_API_TOKEN").ok(),
    );
    Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}
