use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
    pub workspace_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LinksConfig {
    /// Inactivity window before a page's links are reconciled.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl LinksConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SuggestConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default)]
    pub query_debounce_ms: u64,
    #[serde(default)]
    pub close_on_empty: bool,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            search_limit: default_search_limit(),
            query_debounce_ms: 0,
            close_on_empty: false,
        }
    }
}

impl SuggestConfig {
    pub fn query_debounce(&self) -> Duration {
        Duration::from_millis(self.query_debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_recent_limit() -> usize {
    10
}

fn default_search_limit() -> usize {
    50
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::defaults()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("WORKLIN_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.is_empty() {
            return Err(Error::Config("backend.base_url is required".into()));
        }
        if self.backend.workspace_id.is_empty() {
            return Err(Error::Config("backend.workspace_id is required".into()));
        }
        if self.backend.api_token.is_empty() {
            return Err(Error::Config(
                concat!(
                    "backend.api_token is required ",
                    "(set in config or WORKLIN_BACKEND__API_TOKEN env var)"
                )
                .into(),
            ));
        }
        if self.suggest.recent_limit == 0 || self.suggest.search_limit == 0 {
            return Err(Error::Config(
                "suggest.recent_limit and suggest.search_limit must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("worklin"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("worklin"))
            })
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = r#"[backend]
base_url = "https://api.example.com/v1/projects/your-project"
api_token = ""  # or set WORKLIN_BACKEND__API_TOKEN env var
workspace_id = "your-workspace-id"

[links]
debounce_ms = 2000  # inactivity before backlinks are reconciled

[suggest]
recent_limit = 10   # candidates shown for an empty query
search_limit = 50   # pages fetched before client-side filtering
query_debounce_ms = 0
close_on_empty = false
"#;

        std::fs::write(path, content)?;
        Ok(())
    }

    fn defaults() -> Self {
        Self {
            backend: BackendConfig {
                base_url: String::new(),
                api_token: String::new(),
                workspace_id: String::new(),
            },
            links: LinksConfig::default(),
            suggest: SuggestConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_config_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
base_url = "https://backend.test"
api_token = "token-123"
workspace_id = "ws-1"

[links]
debounce_ms = 500

[suggest]
recent_limit = 5
close_on_empty = true
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.backend.base_url, "https://backend.test");
        assert_eq!(config.backend.api_token, "token-123");
        assert_eq!(config.backend.workspace_id, "ws-1");
        assert_eq!(config.links.debounce(), Duration::from_millis(500));
        assert_eq!(config.suggest.recent_limit, 5);
        assert_eq!(config.suggest.search_limit, 50);
        assert!(config.suggest.close_on_empty);
    }

    #[test]
    fn defaults_apply_for_missing_optional_sections() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
base_url = "https://backend.test"
api_token = "token-123"
workspace_id = "ws-1"
"#,
        );

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.links.debounce_ms, 2000);
        assert_eq!(config.suggest.recent_limit, 10);
        assert_eq!(config.suggest.search_limit, 50);
        assert!(!config.suggest.close_on_empty);
    }

    #[test]
    fn validate_fails_without_workspace() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
base_url = "https://backend.test"
api_token = "token-123"
workspace_id = ""
"#,
        );

        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("workspace_id"));
    }

    #[test]
    fn validate_fails_without_api_token() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
base_url = "https://backend.test"
api_token = ""
workspace_id = "ws-1"
"#,
        );

        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("api_token"));
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
base_url = "https://backend.test"
api_token = "token-123"
workspace_id = "ws-1"

[suggest]
search_limit = 0
"#,
        );

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_var_overrides_file_value() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[backend]
base_url = "https://backend.test"
api_token = "token-123"
workspace_id = "ws-1"

[suggest]
query_debounce_ms = 10
"#,
        );

        // WORKLIN_SUGGEST__QUERY_DEBOUNCE_MS → suggest.query_debounce_ms
        env::set_var("WORKLIN_SUGGEST__QUERY_DEBOUNCE_MS", "125");
        let config = AppConfig::load_from_path(&path);
        env::remove_var("WORKLIN_SUGGEST__QUERY_DEBOUNCE_MS");

        assert_eq!(config.unwrap().suggest.query_debounce_ms, 125);
    }

    #[test]
    fn write_default_creates_loadable_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("subdir").join("config.toml");

        AppConfig::write_default(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("your-workspace-id"));
        assert!(content.contains("debounce_ms = 2000"));
        // api_token is blank in the template, so loading must point at it
        let msg = AppConfig::load_from_path(&path).unwrap_err().to_string();
        assert!(msg.contains("api_token"));
    }

    #[test]
    fn config_dir_returns_some() {
        assert!(AppConfig::config_dir().is_some());
    }
}
