use leads_core::{AppViewModel, DownloadView, FeedView, LogLevel, LogLineView, Stage};

const RULE: &str = "------------------------------------------------------------";

/// Render the whole dashboard as terminal lines, top to bottom.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("== Ottawa Leads Agent == Automated lead generation via Clay integration".to_string());
    lines.push(RULE.to_string());

    render_filters(view, &mut lines);
    render_controls(view, &mut lines);
    render_feed(&view.feed, &mut lines);
    render_download(&view.download, &mut lines);

    if view.show_empty_state {
        lines.push(RULE.to_string());
        lines.push("Ready to Generate Ottawa Leads".to_string());
        lines.push(
            "  Configure your filters and type 'run' to begin finding potential customers in the Ottawa area."
                .to_string(),
        );
    }

    if let Some(error) = &view.error {
        lines.push(RULE.to_string());
        lines.push("!! Something went wrong".to_string());
        lines.push(format!("   {error}"));
        lines.push("   Type 'retry' to dismiss.".to_string());
    }

    lines.push(RULE.to_string());
    let notice = view.notice.as_deref().unwrap_or("Ready");
    lines.push(format!("Status: {notice}"));
    lines
}

fn render_filters(view: &AppViewModel, lines: &mut Vec<String>) {
    let form = &view.form;
    let state = if form.enabled { "" } else { " (locked while running)" };
    lines.push(format!("[Lead Filters]{state}"));
    lines.push(format!("  Location: {} (fixed)", form.location));
    if let Some(summary) = &form.summary {
        lines.push(format!("  {summary}"));
    }
    for error in &form.errors {
        lines.push(format!("  ! {}: {}", error.field.label(), error.message));
    }
}

fn render_controls(view: &AppViewModel, lines: &mut Vec<String>) {
    let controls = &view.controls;
    let status = if controls.is_running { "Running" } else { "Ready" };
    lines.push(format!("[Run] {status}"));
    if let Some(run_id) = &controls.run_id {
        lines.push(format!("  Run ID: {run_id}"));
    }
    let actions = [
        ("run", controls.can_start),
        ("stop", controls.can_stop),
        ("reset", controls.can_reset),
    ]
    .iter()
    .map(|(name, enabled)| action_label(name, *enabled))
    .collect::<Vec<_>>()
    .join("  ");
    lines.push(format!("  Actions: {actions}"));
}

fn render_feed(feed: &FeedView, lines: &mut Vec<String>) {
    if feed.active {
        lines.push("[Live Status] * Active".to_string());
    } else {
        lines.push("[Live Status]".to_string());
    }
    if feed.lines.is_empty() {
        lines.push("  Waiting for activity...".to_string());
        return;
    }
    lines.extend(feed.lines.iter().map(format_log_line));
}

fn render_download(download: &DownloadView, lines: &mut Vec<String>) {
    lines.push("[Download Results]".to_string());
    lines.push(format!("  {}", download.title));
    lines.push(format!("  {}", download.description));
    lines.push(format!(
        "  {}",
        action_label(download.button_text, download.enabled)
    ));
    if download.enabled {
        lines.push(
            "  File format: CSV. Includes all lead data and contact information.".to_string(),
        );
    }
}

fn format_log_line(line: &LogLineView) -> String {
    let stage = format!("[{}]", stage_label(line.stage));
    format!(
        "  {} {:<5} {:<9} {}",
        line.time_label(),
        level_label(line.level),
        stage,
        line.message
    )
}

fn action_label(name: &str, enabled: bool) -> String {
    if enabled {
        format!("[{name}]")
    } else {
        format!("({name})")
    }
}

fn level_label(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "INFO",
        LogLevel::Error => "ERROR",
        LogLevel::Debug => "DEBUG",
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Login => "Login",
        Stage::Filters => "Filters",
        Stage::Export => "Export",
        Stage::Upload => "Upload",
        Stage::Done => "Done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use leads_core::{update, AppState, Msg, RawFilters, RunId, StatusEvent};

    fn started() -> (AppState, u64) {
        let (state, _) = update(
            AppState::new(),
            Msg::RunRequested {
                raw: RawFilters::default(),
                run_id: RunId::new(1_714_555_800_000, 7),
            },
        );
        let generation = state.generation();
        (state, generation)
    }

    #[test]
    fn first_visit_shows_placeholders() {
        let lines = render(&AppState::new().view());

        assert!(lines.contains(&"  Waiting for activity...".to_string()));
        assert!(lines.contains(&"Ready to Generate Ottawa Leads".to_string()));
        assert!(lines.contains(&"  (No CSV Available)".to_string()));
        assert!(lines.contains(&"  Actions: [run]  (stop)  [reset]".to_string()));
    }

    #[test]
    fn running_feed_lists_events_in_order() {
        let (state, generation) = started();
        let (state, _) = update(
            state,
            Msg::StatusReceived {
                generation,
                event: StatusEvent::info(
                    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 1).unwrap(),
                    Stage::Login,
                    "Logging into Clay platform...",
                ),
            },
        );
        let lines = render(&state.view());

        assert!(lines.contains(&"[Live Status] * Active".to_string()));
        assert!(lines.contains(
            &"  09:30:01 INFO  [Login]   Logging into Clay platform...".to_string()
        ));
        assert!(lines.contains(&"  Run ID: run-1714555800000-000000007".to_string()));
        assert!(lines.contains(&"  (CSV Not Ready)".to_string()));
        assert!(!lines.iter().any(|line| line.contains("Ready to Generate")));
    }

    #[test]
    fn error_panel_offers_retry() {
        let (state, generation) = started();
        let (state, _) = update(
            state,
            Msg::RunFailed {
                generation,
                message: "Login rejected".to_string(),
            },
        );
        let lines = render(&state.view());

        assert!(lines.contains(&"!! Something went wrong".to_string()));
        assert!(lines.contains(&"   Login rejected".to_string()));
    }
}
