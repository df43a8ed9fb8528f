use std::time::Duration;

use rand::Rng;

use crate::{Level, Stage};

pub const STEP_COUNT: usize = 8;

/// Filter details the simulated pipeline reports back in its log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub keyword_count: usize,
    pub size_label: Option<String>,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInjection {
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Offset of each step from the moment the run starts.
    pub step_offsets: [Duration; STEP_COUNT],
    pub failure: Option<FailureInjection>,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            step_offsets: [1_000, 2_000, 3_000, 4_000, 6_000, 8_000, 10_000, 11_000]
                .map(Duration::from_millis),
            failure: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("expected {expected} step offsets, got {0}", expected = STEP_COUNT)]
    WrongStepCount(usize),
    #[error("step offsets must strictly increase (step {index}: {offset_ms} ms)")]
    NotIncreasing { index: usize, offset_ms: u64 },
}

impl ScheduleSettings {
    pub fn from_offsets_ms(offsets: &[u64]) -> Result<Self, ScheduleError> {
        let offsets: [u64; STEP_COUNT] = offsets
            .try_into()
            .map_err(|_| ScheduleError::WrongStepCount(offsets.len()))?;
        for index in 1..STEP_COUNT {
            if offsets[index] <= offsets[index - 1] {
                return Err(ScheduleError::NotIncreasing {
                    index,
                    offset_ms: offsets[index],
                });
            }
        }
        Ok(Self {
            step_offsets: offsets.map(Duration::from_millis),
            failure: None,
        })
    }

    pub fn with_failure(mut self, failure: Option<FailureInjection>) -> Self {
        self.failure = failure;
        self
    }

    pub fn total_duration(&self) -> Duration {
        self.step_offsets[STEP_COUNT - 1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStep {
    pub at: Duration,
    pub stage: Stage,
    pub level: Level,
    pub message: String,
}

/// The fixed sequence of status lines one run emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub steps: Vec<ScheduledStep>,
    pub total_rows: u32,
    pub failure: Option<FailureInjection>,
}

impl RunPlan {
    pub fn standard(request: &RunRequest, settings: &ScheduleSettings, rng: &mut impl Rng) -> Self {
        let total_rows = rng.gen_range(100..600).min(request.limit);
        let size = request.size_label.as_deref().unwrap_or("all sizes");
        let lines = [
            (Stage::Login, "Logging into Clay platform...".to_string()),
            (Stage::Login, "Authentication successful".to_string()),
            (
                Stage::Filters,
                format!(
                    "Applying filters: Location=Ottawa, {} keywords",
                    request.keyword_count
                ),
            ),
            (Stage::Filters, format!("Company size filter: {size}")),
            (Stage::Export, "Searching for matching companies...".to_string()),
            (Stage::Export, "Generating CSV export...".to_string()),
            (Stage::Upload, "Processing export data...".to_string()),
            (
                Stage::Done,
                format!("Found {total_rows} leads matching your criteria"),
            ),
        ];

        let steps = lines
            .into_iter()
            .zip(settings.step_offsets)
            .map(|((stage, message), at)| ScheduledStep {
                at,
                stage,
                level: Level::Info,
                message,
            })
            .collect();

        Self {
            steps,
            total_rows,
            failure: settings.failure.clone(),
        }
    }
}
