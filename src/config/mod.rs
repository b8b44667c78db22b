//! Configuration module
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, `ESA_DIARY_CONFIG`, or `<config dir>/esa-diary/config.toml`)
//! 3. Environment (`ESA_API_TOKEN`, `ESA_TEAM_NAME`), including a `.env` file
//!    loaded by the binary before this runs

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

pub const TOKEN_VAR: &str = "ESA_API_TOKEN";
pub const TEAM_VAR: &str = "ESA_TEAM_NAME";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub esa: EsaConfig,

    #[serde(default)]
    pub diary: DiaryConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

/// esa.io connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsaConfig {
    /// Bearer token (prefer the environment over the file)
    #[serde(default)]
    pub token: Option<String>,

    /// Team name, e.g. `docs` for docs.esa.io
    #[serde(default)]
    pub team: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EsaConfig {
    fn default() -> Self {
        Self {
            token: None,
            team: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.esa.io".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Where the daily article lives and how much history the session keeps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryConfig {
    /// First category segment (`dairy/YY/MM/DD`)
    #[serde(default = "default_root")]
    pub root: String,

    /// Article name inside the day's category
    #[serde(default = "default_article_name")]
    pub article_name: String,

    /// Category prefix of the template article
    #[serde(default = "default_template_root")]
    pub template_root: String,

    /// Number of outcome lines kept on screen, at least 1
    #[serde(
        default = "default_history_limit",
        deserialize_with = "deserialize_history_limit"
    )]
    pub history_limit: usize,
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            article_name: default_article_name(),
            template_root: default_template_root(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_root() -> String {
    "dairy".to_string()
}

fn default_article_name() -> String {
    "dairy".to_string()
}

fn default_template_root() -> String {
    "Templates".to_string()
}

fn default_history_limit() -> usize {
    10
}

fn deserialize_history_limit<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let limit = usize::deserialize(deserializer)?;
    if limit == 0 {
        return Err(serde::de::Error::custom("history_limit must be at least 1"));
    }
    Ok(limit)
}

/// Post-create lookup schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Wait after creating the article before the first lookup
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Wait between lookups
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Total lookups before giving up
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            interval_ms: default_interval_ms(),
            attempts: default_attempts(),
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_attempts() -> u32 {
    3
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Validated credentials, present and non-empty
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub team: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("team", &self.team)
            .finish()
    }
}

impl Config {
    /// Load config from the explicit path, or the default location if it exists,
    /// then overlay the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };

        config.merge_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlay credentials from an environment lookup
    pub fn merge_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_VAR).filter(|v| !v.trim().is_empty()) {
            self.esa.token = Some(token);
        }
        if let Some(team) = lookup(TEAM_VAR).filter(|v| !v.trim().is_empty()) {
            self.esa.team = Some(team);
        }
    }

    /// Credentials required to talk to esa.io
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let token = non_empty(&self.esa.token).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let team = non_empty(&self.esa.team).ok_or(ConfigError::Missing(TEAM_VAR))?;
        Ok(Credentials {
            token: token.to_string(),
            team: team.to_string(),
        })
    }

    /// `<config dir>/esa-diary/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "esa-diary").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.esa.base_url, "https://api.esa.io");
        assert_eq!(config.diary.root, "dairy");
        assert_eq!(config.diary.article_name, "dairy");
        assert_eq!(config.diary.template_root, "Templates");
        assert_eq!(config.diary.history_limit, 10);
        assert_eq!(config.retry.attempts, 3);
    }

    #[test]
    fn test_missing_token() {
        let mut config = Config::default();
        config.merge_env(env(&[(TEAM_VAR, "myteam")]));
        let err = config.credentials().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(TOKEN_VAR)));
    }

    #[test]
    fn test_missing_team() {
        let mut config = Config::default();
        config.merge_env(env(&[(TOKEN_VAR, "secret")]));
        let err = config.credentials().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(TEAM_VAR)));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut config = Config::default();
        config.merge_env(env(&[(TOKEN_VAR, "  "), (TEAM_VAR, "myteam")]));
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[esa]
token = "from-file"
team = "file-team"

[diary]
history_limit = 5

[retry]
initial_delay_ms = 250
"#,
        )
        .unwrap();

        let mut config = Config::load_from(&path).unwrap();
        assert_eq!(config.diary.history_limit, 5);
        assert_eq!(config.retry.initial_delay(), Duration::from_millis(250));
        assert_eq!(config.retry.interval(), Duration::from_millis(1000));

        config.merge_env(env(&[(TOKEN_VAR, "from-env")]));
        let creds = config.credentials().unwrap();
        assert_eq!(creds.token, "from-env");
        assert_eq!(creds.team, "file-team");
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[diary\nhistory_limit = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_zero_history_limit_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[diary]\nhistory_limit = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("history_limit must be at least 1"));
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = Credentials {
            token: "secret".to_string(),
            team: "myteam".to_string(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("myteam"));
    }
}
