//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! User-editable settings for the documentation viewer, stored as TOML in the
//! platform config directory resolved with [`directories`].
//!
//! ## Features
//! - Missing file falls back to defaults, which are written out
//! - `DOCVIEW_CONFIG` overrides the config file location
//! - Async load/save with `tokio::fs`
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use compact_str::CompactString;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::error::AppError;

pub const CONFIG_ENV_VAR: &str = "DOCVIEW_CONFIG";

/// Colour scheme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,

    Light,
}

/// Where linked document paths are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSourceKind {
    /// Paths are read from a local directory.
    #[default]
    Directory,

    /// Paths are fetched with HTTP GET against `base_url`.
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub source: DocumentSourceKind,

    /// Directory that application-relative paths resolve against.
    pub root: PathBuf,

    pub base_url: String,

    /// No timeout unless set.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub fetch_timeout: Option<Duration>,

    /// JSON seed replacing the built-in dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            source: DocumentSourceKind::Directory,
            root: PathBuf::from("./public"),
            base_url: "http://localhost:8080".to_string(),
            fetch_timeout: None,
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContentConfig {
    /// Show fetched HTML without stripping scripts, handlers and embeds.
    pub allow_unsanitized_html: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Never,

    #[default]
    Daily,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,

    pub log_file_prefix: CompactString,

    /// Default filter directive when `RUST_LOG` is unset.
    pub level: CompactString,

    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: CompactString::const_new("docview"),
            level: CompactString::const_new("info"),
            rotation: LogRotation::Daily,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,

    /// Redraw cadence of the event loop.
    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,

    /// How long notifications stay on screen.
    pub notification_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            tick_rate: Duration::from_millis(250),
            notification_ms: 3000,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Loads config from the default location, or returns defaults and writes them out.
    pub async fn load() -> Result<Self, AppError> {
        let path = Self::config_path()?;
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, AppError> {
        if TokioFs::try_exists(path).await.unwrap_or(false) {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(path)
                .await
                .map_err(|source| AppError::ConfigIo {
                    path: path.to_path_buf(),
                    source,
                })?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(path).await?;

            Ok(default_config)
        }
    }

    pub async fn save(&self) -> Result<(), AppError> {
        let path = Self::config_path()?;
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), AppError> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|source| AppError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(())
    }

    /// `DOCVIEW_CONFIG` if set, else `<config_dir>/config.toml`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "docview", "DocView")
            .ok_or_else(|| AppError::Other("Could not determine config directory.".into()))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [documents]
            source = "http"
            base_url = "https://docs.example.org"
            fetch_timeout = "5s"

            [ui]
            theme = "light"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.documents.source, DocumentSourceKind::Http);
        assert_eq!(cfg.documents.fetch_timeout, Some(Duration::from_secs(5)));
        assert_eq!(cfg.documents.root, PathBuf::from("./public"));
        assert_eq!(cfg.ui.theme, Theme::Light);
        assert_eq!(cfg.ui.tick_rate, Duration::from_millis(250));
        assert!(!cfg.content.allow_unsanitized_html);
        assert_eq!(cfg.logging.rotation, LogRotation::Daily);
    }

    #[test]
    fn no_fetch_timeout_by_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.documents.fetch_timeout.is_none());
        assert!(cfg.documents.seed_file.is_none());
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = toml::from_str::<Config>("[documents]\nsource = \"ftp\"\n");
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config::load_from(&path).await.unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_from(&path).await.unwrap();
        assert_eq!(reloaded, cfg);
    }

    #[tokio::test]
    async fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ntick_rate = 12\n").unwrap();

        let err = Config::load_from(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
