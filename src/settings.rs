use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::models::Site;
use crate::utils::constants::{
    DEFAULT_FEED_BASE_URL, DEFAULT_FEED_RECORDS, DEFAULT_RELOAD_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEFAULT_WINDOW_HOURS,
};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mesoplot.toml";

/// Environment variable prefix, e.g. `MESOPLOT_INPUT_DIR`
pub const ENV_PREFIX: &str = "MESOPLOT";

/// Runtime settings, passed explicitly into every component
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// Directory holding one `<Site>.csv` store per site
    pub input_dir: PathBuf,

    /// Directory for derived exports and rendered charts
    pub output_dir: PathBuf,

    /// Root of the product metadata tree
    pub metadata_dir: PathBuf,

    pub feed_base_url: String,

    /// Most-recent rows requested per fetch
    #[validate(range(min = 1))]
    pub feed_records: u32,

    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,

    #[validate(range(min = 1))]
    pub window_hours: i64,

    pub reload_interval_secs: u64,

    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            metadata_dir: PathBuf::from("output").join("metadata"),
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            feed_records: DEFAULT_FEED_RECORDS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            window_hours: DEFAULT_WINDOW_HOURS,
            reload_interval_secs: DEFAULT_RELOAD_INTERVAL_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    /// Load defaults, then the config file (explicit path, or
    /// `mesoplot.toml` if present), then `MESOPLOT_*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = config::Config::builder()
            .set_default("input_dir", path_string(&defaults.input_dir))?
            .set_default("output_dir", path_string(&defaults.output_dir))?
            .set_default("metadata_dir", path_string(&defaults.metadata_dir))?
            .set_default("feed_base_url", defaults.feed_base_url)?
            .set_default("feed_records", i64::from(defaults.feed_records))?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("window_hours", defaults.window_hours)?
            .set_default("reload_interval_secs", defaults.reload_interval_secs as i64)?
            .set_default("user_agent", defaults.user_agent)?;

        builder = match config_file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => {
                builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
            }
        };

        let settings: Settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn store_path(&self, site: Site) -> PathBuf {
        crate::utils::store_path(&self.input_dir, site)
    }

    pub fn derived_path(&self, site: Site) -> PathBuf {
        crate::utils::derived_path(&self.output_dir, site)
    }

    pub fn image_path(&self, site: Site) -> PathBuf {
        crate::utils::image_path(&self.output_dir, site)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
