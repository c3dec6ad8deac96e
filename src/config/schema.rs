use serde::{Deserialize, Serialize};

use crate::scoring::ScoringConfig;
use crate::store::{StoreError, StoreLocation};

pub const DEFAULT_REPO: &str = "coasterbook-data";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_PATH: &str = "data.json";

fn default_repo() -> String {
    DEFAULT_REPO.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub theme: ThemeMode,
}

impl Config {
    /// Scoring settings with defaults filled in
    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }
}

/// Where the data file lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Route reads and writes through a proxy that holds the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// Override for GitHub Enterprise or a local fake
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: default_repo(),
            branch: default_branch(),
            path: default_path(),
            proxy_url: None,
            api_url: None,
        }
    }
}

impl StoreConfig {
    /// Validated location. Lists every blank field in one error.
    pub fn location(&self) -> Result<StoreLocation, StoreError> {
        let fields = [
            ("store.owner", &self.owner),
            ("store.repo", &self.repo),
            ("store.branch", &self.branch),
            ("store.path", &self.path),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Config(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        Ok(StoreLocation {
            owner: self.owner.trim().to_string(),
            repo: self.repo.trim().to_string(),
            branch: self.branch.trim().to_string(),
            path: self.path.trim().trim_start_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Detect from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}
