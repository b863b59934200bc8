use std::{
    env,
    fmt,
    path::{Path, PathBuf},
};

use jiff::tz::TimeZone;
use log::{info, warn};

use crate::error::UpdateError;

pub const EIA_BASE_URL: &str = "https://api.eia.gov/v2/electricity/rto/daily-fuel-type-data/data/";

pub const PROCESSED_OUTPUT_FILE: &str = "daily_energy_mix_latest.json";
pub const RAW_OUTPUT_FILE: &str = "raw.json";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEV_OUTPUT_SUBDIR: &str = "dev";
pub const DEFAULT_DEV_FIXTURE: &str = "data/fixtures/eia_daily_fuel_type.json";

/// US48 is all lower 48 states, CISO is CAISO.
pub const SUPPORTED_REGIONS: [&str; 2] = ["US48", "CISO"];

/// EIA label of the timezone used for the headline numbers.
pub const DEFAULT_TIMEZONE: &str = "Central";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Normal,
    /// Reads the source from a local fixture and writes under `data/dev/`.
    Development,
}

impl RunMode {
    /// Only the exact value `true` selects a development run.
    pub fn from_dev_run(value: Option<&str>) -> RunMode {
        match value {
            Some("true") => RunMode::Development,
            _ => RunMode::Normal,
        }
    }

    pub fn from_env() -> RunMode {
        RunMode::from_dev_run(env::var("DEV_RUN").ok().as_deref())
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunMode::Normal => write!(f, "normal"),
            RunMode::Development => write!(f, "development"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: RunMode,
    pub api_key: Option<String>,
    pub base_url: String,
    pub output_dir: PathBuf,
    pub dev_fixture: PathBuf,
    pub regions: Vec<String>,
    /// EIA timezone label, e.g. `Central`
    pub timezone: String,
}

impl Config {
    /// Settings for a run in the given mode with no environment overrides.
    pub fn new(mode: RunMode, output_dir: impl Into<PathBuf>) -> Config {
        Config {
            mode,
            api_key: None,
            base_url: EIA_BASE_URL.to_string(),
            output_dir: output_dir.into(),
            dev_fixture: PathBuf::from(DEFAULT_DEV_FIXTURE),
            regions: SUPPORTED_REGIONS.iter().map(|r| r.to_string()).collect(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    /// Read the settings from the process environment.  The api key is only
    /// required for a normal run.
    pub fn from_env(mode: RunMode) -> Result<Config, UpdateError> {
        let output_dir =
            env::var("DAILYGRID_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());
        let mut config = Config::new(mode, output_dir);
        if let Ok(url) = env::var("EIA_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(fixture) = env::var("DEV_FIXTURE") {
            config.dev_fixture = PathBuf::from(fixture);
        }
        config.api_key = env::var("EIA_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if mode == RunMode::Normal && config.api_key.is_none() {
            return Err(UpdateError::Config(
                "EIA_API_KEY not found in environment".to_string(),
            ));
        }
        Ok(config)
    }

    /// Directory the job writes into.  Development runs never touch the
    /// production artifact.
    pub fn data_dir(&self) -> PathBuf {
        match self.mode {
            RunMode::Normal => self.output_dir.clone(),
            RunMode::Development => self.output_dir.join(DEV_OUTPUT_SUBDIR),
        }
    }

    pub fn processed_output_file(&self) -> PathBuf {
        self.data_dir().join(PROCESSED_OUTPUT_FILE)
    }

    pub fn raw_output_file(&self) -> PathBuf {
        self.data_dir().join(RAW_OUTPUT_FILE)
    }

    /// IANA timezone matching the EIA timezone label.
    pub fn tz(&self) -> Result<TimeZone, UpdateError> {
        let name = match self.timezone.as_str() {
            "Eastern" => "America/New_York",
            "Central" => "America/Chicago",
            "Mountain" => "America/Denver",
            "Pacific" => "America/Los_Angeles",
            "Arizona" => "America/Phoenix",
            other => {
                return Err(UpdateError::Config(format!(
                    "Unsupported timezone label {}",
                    other
                )))
            }
        };
        TimeZone::get(name).map_err(|e| UpdateError::Config(e.to_string()))
    }
}

/// Load `.env/<env>.env` into the process environment.  A missing file is not
/// an error, settings may come from the environment directly.
pub fn load_dotenv(env_name: &str) {
    let path = format!(".env/{}.env", env_name);
    match dotenvy::from_path(Path::new(&path)) {
        Ok(_) => info!("Loaded settings from {}", path),
        Err(e) => warn!("Could not load {}: {}", path, e),
    }
}
