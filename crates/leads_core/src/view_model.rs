use chrono::{DateTime, Utc};

use crate::{AppState, FilterField, LogLevel, Stage, LOCATION};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub form: FormView,
    pub controls: ControlsView,
    pub feed: FeedView,
    pub download: DownloadView,
    /// Shown instead of progress when the run failed.
    pub error: Option<String>,
    /// Latest notification, rendered in the status line.
    pub notice: Option<String>,
    /// The first-visit panel: no run yet and nothing logged.
    pub show_empty_state: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormView {
    pub enabled: bool,
    pub location: &'static str,
    pub errors: Vec<FieldErrorView>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorView {
    pub field: FilterField,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControlsView {
    pub run_id: Option<String>,
    pub is_running: bool,
    pub can_start: bool,
    pub can_stop: bool,
    pub can_reset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedView {
    pub lines: Vec<LogLineView>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLineView {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub stage: Stage,
    pub message: String,
}

impl LogLineView {
    /// 24-hour `HH:MM:SS`, as the feed shows it.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    NoRun,
    Running,
    Ready,
    CompletedWithoutCsv,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadView {
    pub status: DownloadStatus,
    pub title: &'static str,
    pub description: String,
    pub button_text: &'static str,
    pub enabled: bool,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let run = state.run();
        let has_run = run.run_id.is_some();

        let form = FormView {
            enabled: !run.is_running,
            location: LOCATION,
            errors: state
                .form_errors()
                .iter()
                .map(|(field, err)| FieldErrorView {
                    field,
                    message: err.to_string(),
                })
                .collect(),
            summary: state.filters().map(|filters| {
                let keywords = if filters.keywords().is_empty() {
                    "none".to_string()
                } else {
                    filters.keywords().join(", ")
                };
                let size = filters.size().map_or("all sizes", |size| size.as_str());
                format!(
                    "Keywords: {keywords} | Size: {size} | Limit: {}",
                    filters.limit()
                )
            }),
        };

        let controls = ControlsView {
            run_id: run.run_id.as_ref().map(ToString::to_string),
            is_running: run.is_running,
            can_start: !run.is_running,
            can_stop: run.is_running,
            can_reset: !run.is_running,
        };

        let feed = FeedView {
            lines: run
                .logs
                .iter()
                .map(|event| LogLineView {
                    timestamp: event.timestamp,
                    level: event.level,
                    stage: event.stage,
                    message: event.message.clone(),
                })
                .collect(),
            active: run.is_running,
        };

        Self {
            form,
            controls,
            feed,
            download: download_view(has_run, run.is_running, run.csv_ready, run.total_rows),
            error: run.error.clone(),
            notice: state.notice().map(ToOwned::to_owned),
            show_empty_state: !has_run && run.logs.is_empty(),
        }
    }
}

fn download_view(
    has_run: bool,
    is_running: bool,
    csv_ready: bool,
    total_rows: Option<u32>,
) -> DownloadView {
    if !has_run {
        return DownloadView {
            status: DownloadStatus::NoRun,
            title: "Ready to Start",
            description: "Configure filters and click 'Start Lead Generation' to begin."
                .to_string(),
            button_text: "No CSV Available",
            enabled: false,
        };
    }
    if is_running {
        return DownloadView {
            status: DownloadStatus::Running,
            title: "Processing...",
            description: "Your CSV is being generated. This may take a few minutes.".to_string(),
            button_text: "CSV Not Ready",
            enabled: false,
        };
    }
    if csv_ready {
        let description = match total_rows {
            Some(rows) => format!(
                "{} leads found and ready for download.",
                format_with_commas(u64::from(rows))
            ),
            None => "Your leads are ready for download.".to_string(),
        };
        return DownloadView {
            status: DownloadStatus::Ready,
            title: "CSV Ready!",
            description,
            button_text: "Download CSV",
            enabled: true,
        };
    }
    DownloadView {
        status: DownloadStatus::CompletedWithoutCsv,
        title: "Run Completed",
        description: "The process completed but no CSV is available yet.".to_string(),
        button_text: "CSV Not Available",
        enabled: false,
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::format_with_commas;

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_with_commas(7), "7");
        assert_eq!(format_with_commas(1234), "1,234");
        assert_eq!(format_with_commas(1_000_000), "1,000,000");
    }
}
