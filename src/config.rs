use crossterm::style::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GhxError, Result};
use crate::render::Palette;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub host: String,
    pub token_env: Option<String>,
    pub token_command: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            host: "github.com".to_string(),
            token_env: Some("GITHUB_TOKEN".to_string()),
            token_command: Some("gh auth token".to_string()),
        }
    }
}

impl GitHubConfig {
    /// REST base URL: api.github.com for github.com, `/api/v3` on Enterprise hosts.
    pub fn api_base(&self) -> String {
        if self.host == "github.com" {
            "https://api.github.com".to_string()
        } else {
            format!("https://{}/api/v3", self.host.trim_end_matches('/'))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_column_width: usize,
    /// Lines before paging kicks in; 0 means the terminal height.
    pub page_threshold: usize,
    pub pager: bool,
    pub pager_command: Option<String>,
    pub color: ColorMode,
    pub limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_column_width: 40,
            page_threshold: 0,
            pager: true,
            pager_command: None,
            color: ColorMode::Auto,
            limit: 30,
        }
    }
}

/// Color names as crossterm spells them (`green`, `dark_grey`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub open: String,
    pub closed: String,
    pub merged: String,
    pub draft: String,
    pub position: String,
    pub accent: String,
    pub muted: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            open: "green".to_string(),
            closed: "red".to_string(),
            merged: "magenta".to_string(),
            draft: "dark_grey".to_string(),
            position: "magenta".to_string(),
            accent: "cyan".to_string(),
            muted: "yellow".to_string(),
        }
    }
}

impl ColorsConfig {
    pub fn palette(&self) -> Result<Palette> {
        Ok(Palette {
            open: parse_color("open", &self.open)?,
            closed: parse_color("closed", &self.closed)?,
            merged: parse_color("merged", &self.merged)?,
            draft: parse_color("draft", &self.draft)?,
            position: parse_color("position", &self.position)?,
            accent: parse_color("accent", &self.accent)?,
            muted: parse_color("muted", &self.muted)?,
        })
    }
}

fn parse_color(key: &str, name: &str) -> Result<Color> {
    Color::try_from(name.trim().to_ascii_lowercase().as_str())
        .map_err(|_| GhxError::Config(format!("unknown color `{}` for colors.{}", name, key)))
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("ghx").join("config.toml"))
}

impl Config {
    /// Loads ~/.config/ghx/config.toml, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Config::default();
        };

        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Config::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| GhxError::Config(e.to_string()))?;
        // Surface bad color names at load time rather than mid-render.
        config.colors.palette()?;
        Ok(config)
    }
}
