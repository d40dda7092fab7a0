use std::{collections::HashMap, time::Duration};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use thiserror::Error;

use crate::{
    profile::{CampaignsProfile, ReportProfile, StatsProfile},
    util::ApiUrl,
};

pub use toml::de::Error as TomlError;

pub static PRODUCTION_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::try_toml(include_str!("../../docs/config/prod.toml"))
        .expect("Failed to parse prod.toml config file")
});

pub static DEVELOPMENT_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::try_toml(include_str!("../../docs/config/dev.toml"))
        .expect("Failed to parse dev.toml config file")
});

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
/// The environment in which the application is running
/// Defaults to [`Environment::Development`]
pub enum Environment {
    /// Talks to a locally running mock of the Search Ad API.
    Development,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Self::Development
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// The base url of the Search Ad API, e.g. `https://api.searchad.naver.com`
    pub base_url: ApiUrl,
    /// in milliseconds
    /// Set's the Client timeout for every request to the Search Ad API.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub fetch_timeout: Duration,
    /// in milliseconds
    /// The delay inserted between consecutive stats requests
    /// in order to stay below the API rate limit.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub request_delay: Duration,
    pub report_job: ReportJobConfig,
    /// The key of this map is the name of the profile, e.g. `master-report`
    #[serde(rename = "report_profile", default)]
    pub report_profiles: HashMap<String, ReportProfile>,
    pub stats: StatsProfile,
    #[serde(default)]
    pub campaigns: CampaignsProfile,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReportJobConfig {
    /// Maximum number of polls of a single job before giving up.
    pub max_attempts: u32,
    /// In milliseconds
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub poll_interval: Duration,
    /// The report profile used when a request doesn't name one.
    pub default_profile: String,
}

impl Config {
    /// Utility method that will deserialize a Toml file content into a [`Config`]
    /// and validate it.
    ///
    /// Instead of relying on the `toml` crate directly, use this method instead.
    pub fn try_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;

        if !config
            .report_profiles
            .contains_key(&config.report_job.default_profile)
        {
            return Err(ConfigError::UnknownProfile(
                config.report_job.default_profile,
            ));
        }

        Ok(config)
    }

    /// Finds a [`ReportProfile`] by name, or the default one when no name is given.
    pub fn report_profile(&self, name: Option<&str>) -> Result<&ReportProfile, ConfigError> {
        let name = name.unwrap_or(&self.report_job.default_profile);

        self.report_profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Toml parsing: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("File reading: {0}")]
    InvalidFile(#[from] std::io::Error),
    #[error("Unknown report profile '{0}'")]
    UnknownProfile(String),
}

/// If no `config_file` path is provided it will load the [`Environment`] configuration.
/// If `config_file` path is provided it will try to read and parse the file in Toml format.
pub fn configuration(
    environment: Environment,
    config_file: Option<&str>,
) -> Result<Config, ConfigError> {
    match config_file {
        Some(config_file) => {
            let content = std::fs::read_to_string(config_file)?;

            Config::try_toml(&content)
        }
        None => match environment {
            Environment::Production => Ok(PRODUCTION_CONFIG.clone()),
            Environment::Development => Ok(DEVELOPMENT_CONFIG.clone()),
        },
    }
}
