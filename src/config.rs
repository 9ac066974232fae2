use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::calendar::WeekStart;
use crate::error::{Error, ErrorKind, Result};
use crate::tracker::ViewMode;

const CONFIG_PATH_ENV_VAR: &str = "MORSEL_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    // Honours XDG_CONFIG_HOME
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("morsel").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".morsel.toml"));
    }

    locations
}

fn default_meal_log() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("morsel").join("meals.toml"))
        .unwrap_or_else(|| PathBuf::from("meals.toml"))
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub calorie_goal: f64,
    pub meal_log: PathBuf,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub tick_rate: Duration,
    pub week_start: WeekStart,
    pub view: ViewMode,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            calorie_goal: 2000.0,
            meal_log: default_meal_log(),
            tick_rate: Duration::from_millis(500),
            week_start: WeekStart::default(),
            view: ViewMode::default(),
        }
    }
}

impl Config {
    /// Relative meal log paths are resolved against `base_dir`.
    pub fn from_toml_str(text: &str, base_dir: Option<&Path>) -> Result<Config> {
        let mut config: Config = toml::from_str(text)?;

        if let Some(base) = base_dir {
            if config.meal_log.is_relative() {
                config.meal_log = base.join(&config.meal_log);
            }
        }

        if !config.calorie_goal.is_finite() {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                "calorie_goal must be a number",
            ));
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        Config::from_toml_str(&text, path.parent()).map_err(|err| {
            let message = format!(
                "{}: {}",
                path.display(),
                err.message.as_deref().unwrap_or("")
            );
            err.with_msg(&message)
        })
    }
}

/// Loads `path` if given, otherwise the first config file found in the
/// usual locations, otherwise the defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        log::info!("Loading config from {}", path.display());
        return Config::from_file(path);
    }

    match find_configfile_locations()
        .into_iter()
        .find(|location| location.is_file())
    {
        Some(location) => {
            log::info!("Loading config from {}", location.display());
            Config::from_file(&location)
        }
        None => {
            log::info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
