use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::ui::widgets::Orientation;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Terminal control panel for a Freyr LED installation
#[derive(Parser, Debug, Default)]
#[command(name = "freyr-panel", version, about)]
pub struct Args {
    /// Backend URL commands are posted to
    #[arg(long, value_name = "URL")]
    pub backend: Option<String>,

    /// Log commands instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Preset database file
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Animation and cell catalog (TOML)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Config file used instead of the per-user one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    backend: BackendConfig,
    #[serde(default)]
    slider: SliderFileConfig,
    #[serde(default)]
    battery: BatteryConfig,
    #[serde(default)]
    storage: PathConfig,
    #[serde(default)]
    catalog: PathConfig,
}

#[derive(Deserialize, Default)]
struct BackendConfig {
    url: Option<String>,
}

#[derive(Deserialize, Default)]
struct SliderFileConfig {
    orientation: Option<String>,
    immediate: Option<bool>,
    step: Option<f64>,
}

#[derive(Deserialize, Default)]
struct BatteryConfig {
    poll_secs: Option<u64>,
}

#[derive(Deserialize, Default)]
struct PathConfig {
    path: Option<PathBuf>,
}

/// Slider behaviour settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSettings {
    pub orientation: Orientation,
    pub immediate: bool,
    /// Keyboard step as a fraction of the range
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub dry_run: bool,
    pub slider: SliderSettings,
    pub battery_poll: Duration,
    pub db_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn load(args: &Args) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        let user_path = args.config.clone().or_else(user_config_path);
        if let Some(path) = user_path {
            if let Some(user) = read_config_file(&path) {
                merge(&mut base, user);
            }
        }

        Self::resolve(base, args)
    }

    fn resolve(file: ConfigFile, args: &Args) -> Self {
        let orientation = file
            .slider
            .orientation
            .as_deref()
            .and_then(parse_orientation)
            .unwrap_or_default();
        let step = file
            .slider
            .step
            .filter(|s| *s > 0.0 && *s <= 1.0)
            .unwrap_or(0.02);

        Config {
            backend_url: args
                .backend
                .clone()
                .or(file.backend.url)
                .unwrap_or_else(|| "http://127.0.0.1:8080/".to_string()),
            dry_run: args.dry_run,
            slider: SliderSettings {
                orientation,
                immediate: file.slider.immediate.unwrap_or(false),
                step,
            },
            battery_poll: Duration::from_secs(file.battery.poll_secs.unwrap_or(60).max(1)),
            db_path: args.db.clone().or(file.storage.path),
            catalog_path: args.catalog.clone().or(file.catalog.path),
        }
    }

    /// Database path, falling back to the per-user data directory
    pub fn db_path(&self) -> Option<PathBuf> {
        self.db_path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("freyr-panel").join("panel.sqlite")))
    }
}

fn read_config_file(path: &Path) -> Option<ConfigFile> {
    if !path.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|contents| toml::from_str::<ConfigFile>(&contents).map_err(|e| e.to_string()));
    match parsed {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("ignoring config {}: {}", path.display(), e);
            None
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("freyr-panel").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.backend.url.is_some() {
        base.backend.url = user.backend.url;
    }
    if user.slider.orientation.is_some() {
        base.slider.orientation = user.slider.orientation;
    }
    if user.slider.immediate.is_some() {
        base.slider.immediate = user.slider.immediate;
    }
    if user.slider.step.is_some() {
        base.slider.step = user.slider.step;
    }
    if user.battery.poll_secs.is_some() {
        base.battery.poll_secs = user.battery.poll_secs;
    }
    if user.storage.path.is_some() {
        base.storage.path = user.storage.path;
    }
    if user.catalog.path.is_some() {
        base.catalog.path = user.catalog.path;
    }
}

fn parse_orientation(s: &str) -> Option<Orientation> {
    match s.to_lowercase().as_str() {
        "vertical" => Some(Orientation::Vertical),
        "horizontal" => Some(Orientation::Horizontal),
        _ => None,
    }
}
