use std::fmt;

use chrono::{DateTime, Utc};
use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::view_model::AppViewModel;
use crate::{FilterErrors, Filters, LogLevel, Stage};

/// Identifies one scheduled run. Every engine event carries the generation it
/// was scheduled under; anything else is stale.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(String);

impl RunId {
    const SUFFIX_LEN: usize = 9;

    /// `run-{unix_millis}-{9 base36 chars}`. Callers supply the clock reading
    /// and the entropy so the state machine itself stays deterministic.
    pub fn new(timestamp_millis: i64, entropy: u64) -> Self {
        let mut suffix = to_base36(entropy);
        if suffix.len() < Self::SUFFIX_LEN {
            suffix = format!("{suffix:0>width$}", width = Self::SUFFIX_LEN);
        }
        suffix.truncate(Self::SUFFIX_LEN);
        Self(format!("run-{timestamp_millis}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub stage: Stage,
    pub message: String,
}

impl StatusEvent {
    pub fn info(timestamp: DateTime<Utc>, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level: LogLevel::Info,
            stage,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    pub run_id: Option<RunId>,
    pub is_running: bool,
    pub logs: Vec<StatusEvent>,
    pub csv_ready: bool,
    pub error: Option<String>,
    pub total_rows: Option<u32>,
}

impl RunState {
    fn started(run_id: RunId) -> Self {
        Self {
            run_id: Some(run_id),
            is_running: true,
            ..Self::default()
        }
    }

    pub fn last_stage(&self) -> Option<Stage> {
        self.logs.last().map(|event| event.stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    run: RunState,
    generation: Generation,
    filters: Option<Filters>,
    form_errors: FilterErrors,
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn filters(&self) -> Option<&Filters> {
        self.filters.as_ref()
    }

    pub fn form_errors(&self) -> &FilterErrors {
        &self.form_errors
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_form_errors(&mut self, errors: FilterErrors) {
        self.form_errors = errors;
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    /// Replace whatever run exists with a fresh one. Returns the retired
    /// generation when its schedule may still have pending steps.
    pub(crate) fn start_run(
        &mut self,
        run_id: RunId,
        filters: Filters,
    ) -> (Generation, Option<Generation>) {
        let superseded = self.run.is_running.then_some(self.generation);
        self.generation += 1;
        engine_info!(
            "Starting run {} generation={} superseded={:?}",
            run_id,
            self.generation,
            superseded
        );
        self.run = RunState::started(run_id);
        self.filters = Some(filters);
        self.form_errors = FilterErrors::default();
        self.mark_dirty();
        (self.generation, superseded)
    }

    /// Freeze a running run. Returns the generation whose timers must go.
    pub(crate) fn stop_run(&mut self) -> Option<Generation> {
        if !self.run.is_running {
            return None;
        }
        let retired = self.retire_generation();
        self.run.is_running = false;
        engine_info!(
            "Stopped run {:?} with {} events",
            self.run.run_id.as_ref().map(RunId::as_str),
            self.run.logs.len()
        );
        self.mark_dirty();
        Some(retired)
    }

    /// Back to the empty baseline. Always retires the current generation.
    pub(crate) fn reset_run(&mut self) -> Generation {
        let retired = self.retire_generation();
        self.run = RunState::default();
        self.filters = None;
        self.form_errors = FilterErrors::default();
        self.mark_dirty();
        retired
    }

    /// Append one event to the feed. Returns false when the event was dropped.
    pub(crate) fn append_event(&mut self, generation: Generation, mut event: StatusEvent) -> bool {
        if !self.accepts(generation) {
            engine_debug!(
                "Dropping stale {} event for generation {} (current {})",
                event.stage,
                generation,
                self.generation
            );
            return false;
        }
        if !Stage::permits(self.run.last_stage(), event.stage) {
            engine_warn!(
                "Dropping out-of-order {} event after {:?}",
                event.stage,
                self.run.last_stage()
            );
            return false;
        }
        if let Some(last) = self.run.logs.last() {
            if event.timestamp < last.timestamp {
                event.timestamp = last.timestamp;
            }
        }

        // An error line at the last stage is a failure report; the run stays
        // open for the `RunFailed` that follows it.
        let finished = event.stage.is_terminal() && event.level != LogLevel::Error;
        self.run.logs.push(event);
        if finished {
            self.run.is_running = false;
            self.run.csv_ready = true;
            self.notice = Some("CSV Ready! Your lead data is ready for download".to_string());
        }
        self.mark_dirty();
        true
    }

    pub(crate) fn record_total_rows(&mut self, generation: Generation, total_rows: u32) {
        if generation != self.generation || !self.run.csv_ready {
            return;
        }
        self.run.total_rows = Some(total_rows);
        self.mark_dirty();
    }

    pub(crate) fn fail_run(&mut self, generation: Generation, message: String) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        engine_warn!("Run failed at generation {}: {}", generation, message);
        self.run.is_running = false;
        self.run.csv_ready = false;
        self.run.error = Some(message);
        self.mark_dirty();
        true
    }

    pub(crate) fn dismiss_error(&mut self) -> bool {
        if self.run.error.take().is_some() {
            self.mark_dirty();
            true
        } else {
            false
        }
    }

    fn accepts(&self, generation: Generation) -> bool {
        generation == self.generation && self.run.is_running
    }

    fn retire_generation(&mut self) -> Generation {
        let retired = self.generation;
        self.generation += 1;
        retired
    }
}
