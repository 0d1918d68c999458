use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::export::Orientation;

/// Every section, and every key inside a section, falls back to its
/// default when absent from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub layout: LayoutConfig,
    pub feedback: FeedbackConfig,
    pub export: ExportConfig,
}

/// Namespace and key slots used by the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub namespace: String,
    pub content_key: String,
    pub scroll_sync_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: String::from("com.markdownlivepreview"),
            content_key: String::from("last_state"),
            scroll_sync_key: String::from("scroll_bar_settings"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_pane_width: f64,
    pub initial_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_pane_width: 100.0,
            initial_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub copy_label: String,
    pub copied_label: String,
    pub copied_duration_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            copy_label: String::from("Copy"),
            copied_label: String::from("Copied!"),
            copied_duration_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub filename_prefix: String,
    pub margin: f64,
    pub orientation: Orientation,
    pub image_quality: f64,
    pub scale: u32,
    pub page_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: String::from("markdown-preview"),
            margin: 0.5,
            orientation: Orientation::Portrait,
            image_quality: 0.98,
            scale: 2,
            page_format: String::from("a4"),
        }
    }
}

/// What was found at the config path.
enum Stored {
    Missing,
    Empty,
    Parsed(Config),
    Broken(serde_json::Error),
}

impl Config {
    /// Load the config file, writing the defaults back when it is missing,
    /// empty or unparseable. A broken file is kept next to it as `.bak`.
    pub async fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            log::debug!("No config directory available, using defaults");
            return Ok(Self::default());
        };

        match Self::read_stored(&path).await {
            Ok(Stored::Parsed(mut config)) => {
                config.validate()?;
                log::info!("Loaded config from {}", path.display());
                return Ok(config);
            }
            Ok(Stored::Missing) => log::info!("No config at {}, writing defaults", path.display()),
            Ok(Stored::Empty) => log::warn!("Config at {} is empty, rewriting it", path.display()),
            Ok(Stored::Broken(parse_err)) => {
                log::error!("Config at {} is not valid JSON: {}", path.display(), parse_err);
                let backup = path.with_extension("bak");
                match tokio::fs::copy(&path, &backup).await {
                    Ok(_) => log::info!("Kept the broken config as {}", backup.display()),
                    Err(e) => log::warn!("Could not keep a copy of the broken config: {}", e),
                }
            }
            Err(e) => log::error!("Could not read {}: {}", path.display(), e),
        }

        let config = Self::default();
        if let Err(e) = config.save().await {
            log::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    async fn read_stored(path: &Path) -> Result<Stored> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Stored::Missing);
        }
        let raw = tokio::fs::read_to_string(path).await?;
        if raw.trim().is_empty() {
            return Ok(Stored::Empty);
        }
        Ok(match serde_json::from_str::<Self>(&raw) {
            Ok(config) => Stored::Parsed(config),
            Err(e) => Stored::Broken(e),
        })
    }

    pub async fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        let mut validated = self.clone();
        validated.validate()?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating config directory {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&validated).context("serializing config")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("writing config file {}", path.display()))?;
        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace out-of-range values with their defaults.
    pub fn validate(&mut self) -> Result<()> {
        let defaults = Self::default();
        let mut repaired = 0;

        if self.storage.namespace.trim().is_empty() {
            log::warn!("Empty storage namespace, using default");
            self.storage.namespace = defaults.storage.namespace.clone();
            repaired += 1;
        }

        let storage = &self.storage;
        if storage.content_key.trim().is_empty()
            || storage.scroll_sync_key.trim().is_empty()
            || storage.content_key == storage.scroll_sync_key
        {
            log::warn!(
                "Storage keys {:?} and {:?} must be distinct and non-empty, using defaults",
                storage.content_key,
                storage.scroll_sync_key
            );
            self.storage.content_key = defaults.storage.content_key.clone();
            self.storage.scroll_sync_key = defaults.storage.scroll_sync_key.clone();
            repaired += 1;
        }

        let min_width = self.layout.min_pane_width;
        if !min_width.is_finite() || min_width < 0.0 {
            log::warn!("Minimum pane width {} out of range, using default", min_width);
            self.layout.min_pane_width = defaults.layout.min_pane_width;
            repaired += 1;
        }

        let ratio = self.layout.initial_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            log::warn!("Split ratio {} out of range, using default", ratio);
            self.layout.initial_ratio = defaults.layout.initial_ratio;
            repaired += 1;
        }

        if !(1..=60_000).contains(&self.feedback.copied_duration_ms) {
            log::warn!(
                "Copy feedback duration {}ms out of range, using default",
                self.feedback.copied_duration_ms
            );
            self.feedback.copied_duration_ms = defaults.feedback.copied_duration_ms;
            repaired += 1;
        }

        let export = &mut self.export;
        if !export.margin.is_finite() || export.margin < 0.0 {
            log::warn!("Export margin {} out of range, using default", export.margin);
            export.margin = defaults.export.margin;
            repaired += 1;
        }
        if !(export.image_quality > 0.0 && export.image_quality <= 1.0) {
            log::warn!("Image quality {} out of range, using default", export.image_quality);
            export.image_quality = defaults.export.image_quality;
            repaired += 1;
        }
        if !(1..=8).contains(&export.scale) {
            log::warn!("Export scale {} out of range, using default", export.scale);
            export.scale = defaults.export.scale;
            repaired += 1;
        }
        if export.filename_prefix.trim().is_empty() {
            export.filename_prefix = defaults.export.filename_prefix;
            repaired += 1;
        }
        if export.page_format.trim().is_empty() {
            export.page_format = defaults.export.page_format;
            repaired += 1;
        }

        if repaired > 0 {
            log::info!("Repaired {} config value(s)", repaired);
        }
        Ok(())
    }

    /// `MDLIVE_CONFIG_PATH` wins over `MDLIVE_CONFIG_DIR`, which wins over
    /// the platform config directory.
    fn config_path() -> Option<PathBuf> {
        if let Some(file) = std::env::var_os("MDLIVE_CONFIG_PATH") {
            return Some(PathBuf::from(file));
        }
        if let Some(dir) = std::env::var_os("MDLIVE_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }
        ProjectDirs::from("com", "mdlive", "mdlive").map(|dirs| dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV: OnceLock<Mutex<()>> = OnceLock::new();
        ENV.get_or_init(|| Mutex::new(()))
    }

    fn set_config_path(path: &std::path::Path) -> (Option<String>, Option<String>) {
        let previous_dir = std::env::var("MDLIVE_CONFIG_DIR").ok();
        let previous_path = std::env::var("MDLIVE_CONFIG_PATH").ok();
        std::env::set_var("MDLIVE_CONFIG_PATH", path);
        std::env::remove_var("MDLIVE_CONFIG_DIR");
        (previous_dir, previous_path)
    }

    fn restore_config_env(previous: (Option<String>, Option<String>)) {
        match previous.0 {
            Some(value) => std::env::set_var("MDLIVE_CONFIG_DIR", value),
            None => std::env::remove_var("MDLIVE_CONFIG_DIR"),
        }

        match previous.1 {
            Some(value) => std::env::set_var("MDLIVE_CONFIG_PATH", value),
            None => std::env::remove_var("MDLIVE_CONFIG_PATH"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.storage.namespace, "com.markdownlivepreview");
        assert_eq!(config.storage.content_key, "last_state");
        assert_eq!(config.storage.scroll_sync_key, "scroll_bar_settings");
        assert_eq!(config.layout.min_pane_width, 100.0);
        assert_eq!(config.layout.initial_ratio, 0.5);
        assert_eq!(config.feedback.copy_label, "Copy");
        assert_eq!(config.feedback.copied_label, "Copied!");
        assert_eq!(config.feedback.copied_duration_ms, 1000);
        assert_eq!(config.export.filename_prefix, "markdown-preview");
        assert_eq!(config.export.margin, 0.5);
        assert_eq!(config.export.orientation, Orientation::Portrait);
        assert_eq!(config.export.scale, 2);
        assert_eq!(config.export.page_format, "a4");
    }

    #[test]
    fn test_validate_repairs_invalid_values() {
        let mut config = Config::default();
        config.layout.initial_ratio = 1.5;
        config.layout.min_pane_width = f64::NAN;
        config.export.margin = -1.0;
        config.export.scale = 0;
        config.storage.scroll_sync_key = config.storage.content_key.clone();

        config.validate().unwrap();

        assert_eq!(config.layout.initial_ratio, 0.5);
        assert_eq!(config.layout.min_pane_width, 100.0);
        assert_eq!(config.export.margin, 0.5);
        assert_eq!(config.export.scale, 2);
        assert_ne!(config.storage.content_key, config.storage.scroll_sync_key);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"storage\""));
        assert!(json.contains("\"layout\""));
        assert!(json.contains("\"export\""));
        assert!(json.contains("\"portrait\""));

        let config_from_json: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.storage.namespace, config_from_json.storage.namespace);
        assert_eq!(
            config.feedback.copied_duration_ms,
            config_from_json.feedback.copied_duration_ms
        );
        assert_eq!(config.export.orientation, config_from_json.export.orientation);
    }

    #[tokio::test]
    async fn test_config_load_default_and_broken_file() {
        let _guard = env_lock().lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        let previous_env = set_config_path(&config_path);

        let config = Config::load().await.unwrap();
        assert_eq!(config.storage.namespace, "com.markdownlivepreview");
        assert!(config_path.exists());

        tokio::fs::write(&config_path, "{ not json").await.unwrap();
        let config = Config::load().await.unwrap();
        assert_eq!(config.layout.min_pane_width, 100.0);
        assert!(config_path.with_extension("bak").exists());

        restore_config_env(previous_env);
    }

    #[tokio::test]
    async fn test_partial_config_keeps_given_values() {
        let _guard = env_lock().lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        let previous_env = set_config_path(&config_path);

        tokio::fs::write(
            &config_path,
            r#"{"layout":{"min_pane_width":150.0,"initial_ratio":0.3},"export":{"scale":3}}"#,
        )
        .await
        .unwrap();

        let config = Config::load().await.unwrap();
        assert_eq!(config.layout.min_pane_width, 150.0);
        assert_eq!(config.layout.initial_ratio, 0.3);
        assert_eq!(config.export.scale, 3);
        assert_eq!(config.export.filename_prefix, "markdown-preview");
        assert_eq!(config.feedback.copied_label, "Copied!");
        assert_eq!(config.storage.content_key, "last_state");
        assert!(!config_path.with_extension("bak").exists());

        restore_config_env(previous_env);
    }

    #[test]
    fn test_partial_section_is_still_validated() {
        let mut config: Config =
            serde_json::from_str(r#"{"layout":{"initial_ratio":4.0}}"#).unwrap();
        config.validate().unwrap();
        assert_eq!(config.layout.initial_ratio, 0.5);
        assert_eq!(config.layout.min_pane_width, 100.0);
    }
}
