use std::fs;
use std::path::{Path, PathBuf};

use leads_engine::{
    DownloadSettings, FailureInjection, ScheduleError, ScheduleSettings, Stage, UnknownStage,
    DEFAULT_DOWNLOAD_PREFIX,
};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub(crate) const CONFIG_FILENAME: &str = "leads_agent.ron";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("invalid failure stage: {0}")]
    Stage(#[from] UnknownStage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FailureConfig {
    pub stage: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub download_dir: PathBuf,
    pub filename_prefix: String,
    pub step_offsets_ms: Vec<u64>,
    pub inject_failure: Option<FailureConfig>,
    pub log_destination: LogDestination,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            filename_prefix: DEFAULT_DOWNLOAD_PREFIX.to_string(),
            step_offsets_ms: vec![1_000, 2_000, 3_000, 4_000, 6_000, 8_000, 10_000, 11_000],
            inject_failure: None,
            log_destination: LogDestination::File,
            verbose: false,
        }
    }
}

impl AppConfig {
    pub fn schedule_settings(&self) -> Result<ScheduleSettings, ConfigError> {
        let failure = match &self.inject_failure {
            Some(failure) => Some(FailureInjection {
                stage: failure.stage.parse::<Stage>()?,
                message: failure.message.clone(),
            }),
            None => None,
        };
        Ok(ScheduleSettings::from_offsets_ms(&self.step_offsets_ms)?.with_failure(failure))
    }

    pub fn download_settings(&self) -> DownloadSettings {
        DownloadSettings {
            dir: self.download_dir.clone(),
            prefix: self.filename_prefix.clone(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

/// Load the optional config file. `Ok(None)` when the file does not exist.
pub(crate) fn load_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: AppConfig = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    // Surface schedule problems at load time rather than on the first run.
    config.schedule_settings()?;
    Ok(Some(config))
}
