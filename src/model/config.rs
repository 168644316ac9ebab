use anyhow::{Result, anyhow, ensure};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::engine::EngineOptions;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub editor: EditorConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub default_filename: String,
    #[serde(default)]
    pub documents_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct EditorConfig {
    pub tab_width: usize,
    pub auto_indent: bool,
    pub auto_complete: bool,
    pub scroll_off: u16,
}

const DEFAULTS: &str = include_str!("../../config/default.toml");

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let mut config = Self::defaults()?;

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "liquorice") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let user_str = fs::read_to_string(&config_path)?;
                config = Self::parse(&user_str)?;
                tracing::info!("loaded config from {}", config_path.display());
            }
        }

        Ok(config)
    }

    pub fn defaults() -> Result<Self> {
        Self::parse(DEFAULTS)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(text)?;
        ensure!(config.editor.tab_width >= 1, "editor.tab_width must be at least 1");
        ensure!(
            !config.general.default_filename.trim().is_empty(),
            "general.default_filename must not be empty"
        );

        // Expand ~ in documents_dir
        if config.general.documents_dir.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.general.documents_dir =
                config
                    .general
                    .documents_dir
                    .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            tab_width: self.editor.tab_width,
            auto_indent: self.editor.auto_indent,
            auto_complete: self.editor.auto_complete,
        }
    }

    /// Directory new documents are created in.
    pub fn documents_dir(&self) -> PathBuf {
        if !self.general.documents_dir.is_empty() {
            return PathBuf::from(&self.general.documents_dir);
        }

        directories::UserDirs::new()
            .and_then(|d| {
                d.document_dir()
                    .map(|p| p.to_path_buf())
                    .or_else(|| Some(d.home_dir().to_path_buf()))
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path a new, not yet saved document is given.
    pub fn default_document_path(&self) -> PathBuf {
        self.documents_dir().join(&self.general.default_filename)
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
