use engine_logging::{engine_info, engine_warn};

use crate::{validate_filters, AppState, Effect, Msg, DEFAULT_LIMIT};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RunRequested { raw, run_id } => {
            // A start while another run is pending supersedes it.
            match validate_filters(&raw) {
                Ok(filters) => {
                    let (generation, superseded) = state.start_run(run_id.clone(), filters.clone());
                    state.set_notice(format!(
                        "Lead generation started: run {run_id} has been initiated"
                    ));
                    let mut effects = Vec::with_capacity(2);
                    if let Some(generation) = superseded {
                        effects.push(Effect::CancelRun { generation });
                    }
                    effects.push(Effect::StartRun {
                        generation,
                        run_id,
                        filters,
                    });
                    effects
                }
                Err(errors) => {
                    engine_info!("Rejected filter form with {} field errors", errors.iter().count());
                    state.set_form_errors(errors);
                    Vec::new()
                }
            }
        }
        Msg::StopClicked => match state.stop_run() {
            Some(generation) => {
                state.set_notice("Run stopped");
                vec![Effect::CancelRun { generation }]
            }
            None => Vec::new(),
        },
        Msg::ResetClicked => {
            let generation = state.reset_run();
            state.set_notice("Reset complete: ready for a new lead generation run");
            vec![Effect::CancelRun { generation }]
        }
        Msg::DownloadClicked => {
            let run = state.run();
            match (&run.run_id, run.csv_ready) {
                (Some(run_id), true) => {
                    let row_limit = state.filters().map_or(DEFAULT_LIMIT, |f| f.limit());
                    vec![Effect::SaveCsv {
                        run_id: run_id.clone(),
                        row_limit,
                    }]
                }
                _ => Vec::new(),
            }
        }
        Msg::ErrorDismissed => {
            state.dismiss_error();
            Vec::new()
        }
        Msg::StatusReceived { generation, event } => {
            state.append_event(generation, event);
            Vec::new()
        }
        Msg::RunCompleted {
            generation,
            total_rows,
        } => {
            state.record_total_rows(generation, total_rows);
            Vec::new()
        }
        Msg::RunFailed {
            generation,
            message,
        } => {
            if state.fail_run(generation, message) {
                state.set_notice("Something went wrong");
            }
            Vec::new()
        }
        Msg::DownloadSaved { filename } => {
            state.set_notice(format!("Download started: {filename}"));
            Vec::new()
        }
        Msg::DownloadFailed { message } => {
            engine_warn!("Download failed: {}", message);
            state.set_notice(format!("Download failed: {message}"));
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
