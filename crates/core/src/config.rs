use crate::planner::DEFAULT_ORDINAL_WIDTH;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoProberKind {
    #[default]
    Ffprobe,
    Exiftool,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub video_prober: VideoProberKind,
    pub ffprobe_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exiftool_path: Option<String>,
    pub skip_hidden: bool,
    pub ordinal_width: usize,
    pub dry_run_default: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            video_prober: VideoProberKind::Ffprobe,
            ffprobe_path: "ffprobe".to_string(),
            exiftool_path: None,
            skip_hidden: false,
            ordinal_width: DEFAULT_ORDINAL_WIDTH,
            dry_run_default: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub undo_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "media-renamer", "media-renamer")
        .context("could not resolve the OS config directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        undo_path: config_dir.join("undo-last.json"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&app_paths()?.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;
    toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("could not parse config file: {}", path.display()))
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&app_paths()?.config_path, config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create config directory: {}", dir.display()))?;
    }
    let body = toml::to_string_pretty(config).context("could not serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("could not write config file: {}", path.display()))?;
    Ok(())
}

pub fn init_config() -> Result<bool> {
    let path = app_paths()?.config_path;
    if path.exists() {
        return Ok(false);
    }
    save_config_to(&path, &AppConfig::default())?;
    Ok(true)
}
