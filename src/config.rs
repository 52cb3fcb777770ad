// src/config.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{Result, TesterError};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080";

/// Fade timings handed to the blocking overlay on page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTimings {
    pub fade_in: Duration,
    pub fade_out: Duration,
}

impl Default for OverlayTimings {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(1000),
            fade_out: Duration::from_millis(0),
        }
    }
}

/// Values pre-selected in the option fields when the user does not pick one.
/// Empty means "let the service use its own default".
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDefaults {
    #[serde(default)]
    pub output_format: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub time_zone: String,
}

/// Client configuration, layered from defaults, a TOML file and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub overlay: OverlayTimings,
    pub defaults: FormDefaults,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            overlay: OverlayTimings::default(),
            defaults: FormDefaults::default(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct FileConfig {
    api_base: Option<String>,
    fade_in_ms: Option<u64>,
    fade_out_ms: Option<u64>,
    #[serde(default)]
    defaults: Option<FormDefaults>,
}

impl ClientConfig {
    /// Loads the full configuration. An explicit `path` must exist; otherwise the
    /// per-user config file is read only when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(raw)?;
        let mut config = Self::default();
        if let Some(api_base) = file.api_base {
            config.api_base = api_base;
        }
        if let Some(ms) = file.fade_in_ms {
            config.overlay.fade_in = Duration::from_millis(ms);
        }
        if let Some(ms) = file.fade_out_ms {
            config.overlay.fade_out = Duration::from_millis(ms);
        }
        if let Some(defaults) = file.defaults {
            config.defaults = defaults;
        }
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from `TESTER_*` variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("TESTER_API_BASE") {
            self.api_base = api_base.trim().to_string();
        }
        if let Some(raw) = lookup("TESTER_FADE_IN_MS") {
            self.overlay.fade_in = parse_millis("TESTER_FADE_IN_MS", &raw)?;
        }
        if let Some(raw) = lookup("TESTER_FADE_OUT_MS") {
            self.overlay.fade_out = parse_millis("TESTER_FADE_OUT_MS", &raw)?;
        }
        self.validate()
    }

    /// Full URL of the execute endpoint.
    pub fn execute_url(&self) -> String {
        format!("{}/api/execute", self.api_base.trim_end_matches('/'))
    }

    fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(TesterError::Config("API base URL must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| TesterError::Config(format!("{key} must be a number of milliseconds, got '{raw}'")))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("online-tester").join("config.toml"))
}
