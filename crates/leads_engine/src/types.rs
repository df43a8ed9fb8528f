use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Login,
    Filters,
    Export,
    Upload,
    Done,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Login => "login",
            Stage::Filters => "filters",
            Stage::Export => "export",
            Stage::Upload => "upload",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage {0:?}")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(Stage::Login),
            "filters" => Ok(Stage::Filters),
            "export" => Ok(Stage::Export),
            "upload" => Ok(Stage::Upload),
            "done" => Ok(Stage::Done),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub generation: Generation,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Status(StatusUpdate),
    RunCompleted {
        generation: Generation,
        result: Result<RunSummary, FailureKind>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Injected { stage: Stage, message: String },
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Injected { stage, message } => {
                write!(f, "{message} (stage {stage})")
            }
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
