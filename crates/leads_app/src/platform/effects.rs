use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_info, engine_warn};
use leads_core::{Effect, Filters, LogLevel, Msg, Stage, StatusEvent};
use leads_engine::{
    save_csv_download, DownloadSettings, EngineEvent, EngineEvents, EngineHandle, LeadSource,
    Level, RunPlan, RunRequest, SampleLeadSource, ScheduleSettings,
};

use super::app::AppEvent;

pub struct EffectRunner {
    engine: EngineHandle,
    schedule: ScheduleSettings,
    downloads: DownloadSettings,
    source: Arc<dyn LeadSource>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(
        schedule: ScheduleSettings,
        downloads: DownloadSettings,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> std::io::Result<Self> {
        let (engine, events) = EngineHandle::new()?;
        spawn_event_loop(events, event_tx.clone())?;
        Ok(Self {
            engine,
            schedule,
            downloads,
            source: Arc::new(SampleLeadSource),
            event_tx,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun {
                    generation,
                    run_id,
                    filters,
                } => {
                    let request = run_request(&filters);
                    let plan = RunPlan::standard(&request, &self.schedule, &mut rand::thread_rng());
                    engine_info!(
                        "StartRun run_id={} generation={} keywords={} limit={}",
                        run_id,
                        generation,
                        request.keyword_count,
                        request.limit
                    );
                    self.engine.start(generation, plan);
                }
                Effect::CancelRun { generation } => {
                    self.engine.cancel(generation);
                }
                Effect::SaveCsv { run_id, row_limit } => {
                    let msg = match save_csv_download(
                        &self.downloads,
                        self.source.as_ref(),
                        run_id.as_str(),
                        row_limit,
                    ) {
                        Ok(saved) => Msg::DownloadSaved {
                            filename: saved.path.display().to_string(),
                        },
                        Err(err) => {
                            engine_warn!("Saving CSV for {} failed: {}", run_id, err);
                            Msg::DownloadFailed {
                                message: err.to_string(),
                            }
                        }
                    };
                    let _ = self.event_tx.send(AppEvent::Msg(msg));
                }
            }
        }
    }
}

fn run_request(filters: &Filters) -> RunRequest {
    RunRequest {
        keyword_count: filters.keywords().len(),
        size_label: filters.size().map(|size| size.to_string()),
        limit: filters.limit(),
    }
}

fn spawn_event_loop(events: EngineEvents, event_tx: mpsc::Sender<AppEvent>) -> std::io::Result<()> {
    thread::Builder::new()
        .name("leads-engine-events".to_string())
        .spawn(move || {
            while let Some(event) = events.recv() {
                if event_tx.send(AppEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Status(status) => Msg::StatusReceived {
            generation: status.generation,
            event: StatusEvent {
                timestamp: status.timestamp,
                level: map_level(status.level),
                stage: map_stage(status.stage),
                message: status.message,
            },
        },
        EngineEvent::RunCompleted { generation, result } => match result {
            Ok(summary) => Msg::RunCompleted {
                generation,
                total_rows: summary.total_rows,
            },
            Err(failure) => {
                engine_warn!("Run generation={} failed: {}", generation, failure);
                Msg::RunFailed {
                    generation,
                    message: failure.to_string(),
                }
            }
        },
    }
}

fn map_stage(stage: leads_engine::Stage) -> Stage {
    match stage {
        leads_engine::Stage::Login => Stage::Login,
        leads_engine::Stage::Filters => Stage::Filters,
        leads_engine::Stage::Export => Stage::Export,
        leads_engine::Stage::Upload => Stage::Upload,
        leads_engine::Stage::Done => Stage::Done,
    }
}

fn map_level(level: Level) -> LogLevel {
    match level {
        Level::Info => LogLevel::Info,
        Level::Error => LogLevel::Error,
        Level::Debug => LogLevel::Debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    use chrono::Utc;
    use leads_core::{update, AppState, RawFilters, RunId};
    use leads_engine::{FailureInjection, FailureKind, RunSummary, StatusUpdate};
    use tempfile::TempDir;

    fn fast_runner(
        failure: Option<FailureInjection>,
        dir: &Path,
    ) -> (EffectRunner, mpsc::Receiver<AppEvent>) {
        let schedule = ScheduleSettings::from_offsets_ms(&[5, 10, 15, 20, 25, 30, 35, 40])
            .unwrap()
            .with_failure(failure);
        let downloads = DownloadSettings {
            dir: dir.to_path_buf(),
            ..DownloadSettings::default()
        };
        let (tx, rx) = mpsc::channel();
        (EffectRunner::new(schedule, downloads, tx).unwrap(), rx)
    }

    /// Feed bridged messages through `update` until `last` matches one.
    fn pump(
        mut state: AppState,
        runner: &EffectRunner,
        rx: &mpsc::Receiver<AppEvent>,
        last: impl Fn(&Msg) -> bool,
    ) -> AppState {
        loop {
            let event = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("engine went quiet");
            let AppEvent::Msg(msg) = event else {
                continue;
            };
            let finished = last(&msg);
            let (next, effects) = update(state, msg);
            runner.enqueue(effects);
            state = next;
            if finished {
                return state;
            }
        }
    }

    fn start_run(runner: &EffectRunner) -> AppState {
        let raw = RawFilters {
            keywords: vec!["tech".to_string()],
            limit: Some("50".to_string()),
            ..RawFilters::default()
        };
        let (state, effects) = update(
            AppState::new(),
            Msg::RunRequested {
                raw,
                run_id: RunId::new(1, 1),
            },
        );
        runner.enqueue(effects);
        state
    }

    fn run_finished(msg: &Msg) -> bool {
        matches!(msg, Msg::RunCompleted { .. } | Msg::RunFailed { .. })
    }

    #[test]
    fn engine_run_reaches_csv_ready_and_saves_download() {
        let temp = TempDir::new().unwrap();
        let (runner, rx) = fast_runner(None, temp.path());

        let state = pump(start_run(&runner), &runner, &rx, run_finished);
        let run = state.run();
        assert_eq!(run.logs.len(), 8);
        assert_eq!(run.logs.last().map(|event| event.stage), Some(Stage::Done));
        assert!(run.csv_ready);
        assert!(!run.is_running);
        assert!(run.total_rows.is_some_and(|rows| rows <= 50));

        let (state, effects) = update(state, Msg::DownloadClicked);
        runner.enqueue(effects);
        let state = pump(state, &runner, &rx, |msg| {
            matches!(msg, Msg::DownloadSaved { .. } | Msg::DownloadFailed { .. })
        });
        assert!(temp.path().join("ottawa-leads-run-1-000000001.csv").is_file());
        assert!(state
            .notice()
            .is_some_and(|notice| notice.starts_with("Download started")));
    }

    #[test]
    fn failure_injected_at_done_surfaces_as_error() {
        let temp = TempDir::new().unwrap();
        let failure = FailureInjection {
            stage: leads_engine::Stage::Done,
            message: "Upload rejected".to_string(),
        };
        let (runner, rx) = fast_runner(Some(failure), temp.path());

        let state = pump(start_run(&runner), &runner, &rx, run_finished);
        let run = state.run();
        assert_eq!(run.logs.len(), 8);
        assert_eq!(run.logs.last().map(|event| event.level), Some(LogLevel::Error));
        assert!(!run.csv_ready);
        assert!(!run.is_running);
        assert_eq!(run.error.as_deref(), Some("Upload rejected (stage done)"));

        let (_, effects) = update(state, Msg::DownloadClicked);
        assert!(effects.is_empty());
    }

    #[test]
    fn status_updates_keep_their_generation() {
        let msg = map_event(EngineEvent::Status(StatusUpdate {
            generation: 9,
            timestamp: Utc::now(),
            level: Level::Info,
            stage: leads_engine::Stage::Upload,
            message: "Processing export data...".to_string(),
        }));

        match msg {
            Msg::StatusReceived { generation, event } => {
                assert_eq!(generation, 9);
                assert_eq!(event.stage, Stage::Upload);
                assert_eq!(event.level, LogLevel::Info);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn completions_map_to_rows_or_failure() {
        let ok = map_event(EngineEvent::RunCompleted {
            generation: 2,
            result: Ok(RunSummary { total_rows: 321 }),
        });
        assert_eq!(
            ok,
            Msg::RunCompleted {
                generation: 2,
                total_rows: 321
            }
        );

        let failed = map_event(EngineEvent::RunCompleted {
            generation: 3,
            result: Err(FailureKind::Injected {
                stage: leads_engine::Stage::Login,
                message: "Login rejected".to_string(),
            }),
        });
        assert_eq!(
            failed,
            Msg::RunFailed {
                generation: 3,
                message: "Login rejected (stage login)".to_string(),
            }
        );
    }
}
