//! Application configuration (msm.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file name
pub const CONFIG_FILE: &str = "msm.yml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Heading of the landing page
    pub title: String,
    pub cms: CmsConfig,
    pub server: ServerConfig,
    pub render: RenderConfig,
    /// Seconds a CMS response may be reused; `0` disables caching
    pub revalidate_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "MSM POC".to_string(),
            cms: CmsConfig::default(),
            server: ServerConfig::default(),
            render: RenderConfig::default(),
            revalidate_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Load `msm.yml` from a directory, or defaults if it does not exist
    pub fn discover<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join(CONFIG_FILE);
        if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `SANITY_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(project_id) = lookup("SANITY_PROJECT_ID") {
            self.cms.project_id = Some(project_id);
        }
        if let Some(dataset) = lookup("SANITY_DATASET") {
            self.cms.dataset = Some(dataset);
        }
        if let Some(api_version) = lookup("SANITY_API_VERSION") {
            self.cms.api_version = api_version;
        }
        if let Some(token) = lookup("SANITY_API_TOKEN") {
            self.cms.token = Some(token);
        }
    }

    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub project_id: Option<String>,
    pub dataset: Option<String>,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    /// Replaces the project API host (e.g. a local proxy)
    pub api_host: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: None,
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            token: None,
            api_host: None,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Moment.js-style date format
    pub date_format: String,
    /// IANA timezone name
    pub timezone: String,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            date_format: "M/D/YYYY".to_string(),
            timezone: "UTC".to_string(),
            image_width: 550,
            image_height: 310,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.title, "MSM POC");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.revalidate_secs, 5);
        assert_eq!(config.render.image_width, 550);
        assert!(config.cms.project_id.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Network
cms:
  project_id: abc123
  dataset: production
  use_cdn: false
render:
  timezone: Europe/Berlin
revalidate_secs: 0
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Network");
        assert_eq!(config.cms.project_id.as_deref(), Some("abc123"));
        assert!(!config.cms.use_cdn);
        assert_eq!(config.cms.api_version, "2024-01-01");
        assert_eq!(config.render.timezone, "Europe/Berlin");
        assert_eq!(config.render.date_format, "M/D/YYYY");
        assert_eq!(config.revalidate(), Duration::ZERO);
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::discover(dir.path()).unwrap();
        assert_eq!(config.title, "MSM POC");

        fs::write(dir.path().join(CONFIG_FILE), "title: From File\n").unwrap();
        let config = AppConfig::discover(dir.path()).unwrap();
        assert_eq!(config.title, "From File");
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "server: [not, a, map]\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SANITY_PROJECT_ID", "env-project"),
            ("SANITY_DATASET", "staging"),
            ("SANITY_API_TOKEN", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.cms.token = Some("file-token".to_string());
        config.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.cms.project_id.as_deref(), Some("env-project"));
        assert_eq!(config.cms.dataset.as_deref(), Some("staging"));
        assert_eq!(config.cms.token.as_deref(), Some("file-token"));
        assert_eq!(config.cms.api_version, "2024-01-01");
    }
}
