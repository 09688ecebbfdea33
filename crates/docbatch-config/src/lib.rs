use docbatch_engine::{BuildOptions, IndexUnit, MIN_INSERT_INDEX, NamedStyle, Strategy, TextStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Index at which content insertion begins
    pub anchor_offset: usize,
    pub strategy: Strategy,
    pub heading_style: NamedStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_style: Option<NamedStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_text_style: Option<TextStyle>,
    pub index_unit: IndexUnit,
    /// Insert the topic as a title paragraph in newly created documents
    pub title: bool,
    /// Where topic → document ids are persisted; in-memory only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let build = BuildOptions::default();
        Self {
            anchor_offset: MIN_INSERT_INDEX,
            strategy: build.strategy,
            heading_style: build.heading_style,
            body_style: build.body_style,
            label_text_style: build.label_text_style,
            index_unit: build.index_unit,
            title: false,
            topic_store_path: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the topic store path
        config.topic_store_path = config
            .topic_store_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/docbatch");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Builder options described by this config
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            strategy: self.strategy,
            heading_style: self.heading_style,
            body_style: self.body_style,
            label_text_style: self.label_text_style.clone(),
            index_unit: self.index_unit,
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
