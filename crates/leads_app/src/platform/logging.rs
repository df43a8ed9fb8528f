//! Logger setup for the leads agent binary.
//!
//! The dashboard owns stdout, so by default everything goes to
//! `./leads_agent.log`. `Terminal` and `Both` route through stderr instead.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILENAME: &str = "./leads_agent.log";

/// Where log records end up. Read from `leads_agent.ron`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    #[default]
    File,
    Terminal,
    Both,
}

impl LogDestination {
    fn wants_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }

    fn wants_terminal(self) -> bool {
        matches!(self, Self::Terminal | Self::Both)
    }
}

/// Install the global logger. A second call, or a log file that cannot be
/// created, leaves logging degraded but never aborts startup.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = log_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(2);

    if destination.wants_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if destination.wants_file() {
        if let Some(file_logger) = file_logger(Path::new(LOG_FILENAME), level, config) {
            loggers.push(file_logger);
        }
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Debug)
        .build()
}

fn file_logger(path: &Path, level: LevelFilter, config: Config) -> Option<Box<dyn SharedLogger>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: cannot open log file {}: {err}", path.display());
            None
        }
    }
}
