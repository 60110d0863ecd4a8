use crate::constants::{catalog, upstream};
use crate::domain::TableId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub upstream: UpstreamConfig,

    pub tables: TablesConfig,

    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,

    /// Integration token. Usually supplied through `NOTION_API_KEY`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    pub api_version: String,

    pub request_timeout_seconds: u64,

    /// Total attempts per request, the first one included.
    pub max_attempts: u32,

    pub initial_backoff_ms: u64,

    pub page_size: usize,

    pub max_concurrent_lookups: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: upstream::DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_version: upstream::API_VERSION.to_string(),
            request_timeout_seconds: upstream::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_attempts: upstream::DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: u64::try_from(upstream::DEFAULT_INITIAL_BACKOFF.as_millis())
                .unwrap_or(u64::MAX),
            page_size: crate::query::MAX_PAGE_SIZE,
            max_concurrent_lookups: upstream::DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub const fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

/// Remote table ids. Empty means the table is not configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub people: String,
    pub contents: String,
    pub genres: String,
    pub uniform_categories: String,
    pub rankings: String,
    pub ranking_details: String,
    pub affiliates: String,
}

impl TablesConfig {
    #[must_use]
    pub fn people(&self) -> TableId {
        TableId::new(self.people.trim())
    }

    #[must_use]
    pub fn contents(&self) -> TableId {
        TableId::new(self.contents.trim())
    }

    #[must_use]
    pub fn genres(&self) -> TableId {
        TableId::new(self.genres.trim())
    }

    #[must_use]
    pub fn uniform_categories(&self) -> TableId {
        TableId::new(self.uniform_categories.trim())
    }

    #[must_use]
    pub fn rankings(&self) -> TableId {
        TableId::new(self.rankings.trim())
    }

    #[must_use]
    pub fn ranking_details(&self) -> TableId {
        TableId::new(self.ranking_details.trim())
    }

    #[must_use]
    pub fn affiliates(&self) -> TableId {
        TableId::new(self.affiliates.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Scoped queries returning this many results or fewer are widened to
    /// all published records.
    pub fallback_threshold: usize,

    pub related_limit: usize,

    /// Related sets draw `limit * candidate_multiplier` candidates before
    /// shuffling.
    pub candidate_multiplier: usize,

    pub default_ranking_limit: usize,

    pub default_page_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: catalog::FALLBACK_THRESHOLD,
            related_limit: catalog::RELATED_LIMIT,
            candidate_multiplier: catalog::CANDIDATE_MULTIPLIER,
            default_ranking_limit: catalog::DEFAULT_RANKING_LIMIT,
            default_page_limit: catalog::DEFAULT_PAGE_LIMIT,
        }
    }
}

const ENV_OVERRIDES: &[&str] = &[
    "NOTION_API_KEY",
    "NOTION_PERSON_DB_ID",
    "NOTION_CONTENT_DB_ID",
    "NOTION_GENRE_DB_ID",
    "NOTION_UNIFORM_CATEGORY_DB_ID",
    "NOTION_RANKING_DB_ID",
    "NOTION_RANKING_DETAIL_DB_ID",
    "NOTION_AFFILIATE_DB_ID",
];

fn env_field<'a>(config: &'a mut Config, key: &str) -> Option<&'a mut String> {
    let field = match key {
        "NOTION_API_KEY" => &mut config.upstream.api_key,
        "NOTION_PERSON_DB_ID" => &mut config.tables.people,
        "NOTION_CONTENT_DB_ID" => &mut config.tables.contents,
        "NOTION_GENRE_DB_ID" => &mut config.tables.genres,
        "NOTION_UNIFORM_CATEGORY_DB_ID" => &mut config.tables.uniform_categories,
        "NOTION_RANKING_DB_ID" => &mut config.tables.rankings,
        "NOTION_RANKING_DETAIL_DB_ID" => &mut config.tables.ranking_details,
        "NOTION_AFFILIATE_DB_ID" => &mut config.tables.affiliates,
        _ => return None,
    };
    Some(field)
}

impl Config {
    /// Loads the first config file found, then applies environment overrides
    /// (a `.env` file in the working directory is honored).
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from: {}", path.display());
        }

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overwrites settings with non-blank values returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ENV_OVERRIDES {
            let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            if let Some(field) = env_field(self, key) {
                *field = value.trim().to_string();
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("navi").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".navi").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.upstream.api_key.trim().is_empty() {
            anyhow::bail!("Upstream API key is missing (set NOTION_API_KEY)");
        }

        if self.tables.people().is_empty() || self.tables.contents().is_empty() {
            anyhow::bail!(
                "People and contents table ids are required (set NOTION_PERSON_DB_ID and NOTION_CONTENT_DB_ID)"
            );
        }

        if self.upstream.max_attempts == 0 {
            anyhow::bail!("upstream.max_attempts must be at least 1");
        }

        if !(1..=crate::query::MAX_PAGE_SIZE).contains(&self.upstream.page_size) {
            anyhow::bail!(
                "upstream.page_size must be between 1 and {}",
                crate::query::MAX_PAGE_SIZE
            );
        }

        if self.upstream.max_concurrent_lookups == 0 {
            anyhow::bail!("upstream.max_concurrent_lookups must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn configured() -> Config {
        let mut config = Config::default();
        config.upstream.api_key = "secret".to_string();
        config.tables.people = "people-db".to_string();
        config.tables.contents = "contents-db".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upstream.max_attempts, 3);
        assert_eq!(config.upstream.initial_backoff(), Duration::from_millis(1000));
        assert_eq!(
            config.upstream.initial_backoff(),
            upstream::DEFAULT_INITIAL_BACKOFF
        );
        assert_eq!(config.catalog.fallback_threshold, 10);
        assert_eq!(config.upstream.base_url, "https://api.notion.com");
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[upstream]"));
        assert!(toml_str.contains("[catalog]"));
        assert!(!toml_str.contains("api_key"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [upstream]
            max_attempts = 5

            [tables]
            people = "abc"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.upstream.max_attempts, 5);
        assert_eq!(config.tables.people, "abc");
        assert_eq!(config.upstream.page_size, 100);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn env_overrides_replace_non_blank_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("NOTION_API_KEY", " token "),
            ("NOTION_RANKING_DB_ID", "rankings-db"),
            ("NOTION_PERSON_DB_ID", "  "),
        ]);
        let mut config = configured();
        config.apply_env_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.upstream.api_key, "token");
        assert_eq!(config.tables.rankings, "rankings-db");
        assert_eq!(config.tables.people, "people-db");
    }

    #[test]
    fn validate_rejects_incomplete_setups() {
        assert!(configured().validate().is_ok());
        assert!(Config::default().validate().is_err());

        let mut zero_attempts = configured();
        zero_attempts.upstream.max_attempts = 0;
        assert!(zero_attempts.validate().is_err());

        let mut big_pages = configured();
        big_pages.upstream.page_size = 101;
        assert!(big_pages.validate().is_err());
    }
}
