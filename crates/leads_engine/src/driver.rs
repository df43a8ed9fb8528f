use std::sync::mpsc;

use chrono::Utc;
use engine_logging::{engine_debug, engine_info};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    EngineEvent, FailureKind, Generation, Level, RunPlan, RunSummary, ScheduledStep, StatusUpdate,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Walk a plan step by step, emitting each status line once its offset is
/// reached. Steps are awaited in sequence, so a step can never be delivered
/// before the one preceding it. Cancellation wins over any pending step.
pub async fn drive_run(
    generation: Generation,
    plan: RunPlan,
    sink: &dyn ProgressSink,
    cancel: CancellationToken,
) -> Result<RunSummary, FailureKind> {
    let started = Instant::now();
    let step_count = plan.steps.len();

    for (index, step) in plan.steps.into_iter().enumerate() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                engine_debug!(
                    "Run generation={} cancelled before step {}/{}",
                    generation,
                    index + 1,
                    step_count
                );
                return Err(FailureKind::Cancelled);
            }
            _ = sleep_until(started + step.at) => {}
        }

        if let Some(failure) = plan.failure.as_ref().filter(|f| f.stage == step.stage) {
            engine_info!(
                "Injecting failure into generation={} at stage {}",
                generation,
                failure.stage
            );
            sink.emit(EngineEvent::Status(StatusUpdate {
                generation,
                timestamp: Utc::now(),
                level: Level::Error,
                stage: step.stage,
                message: failure.message.clone(),
            }));
            let failure = FailureKind::Injected {
                stage: failure.stage,
                message: failure.message.clone(),
            };
            sink.emit(EngineEvent::RunCompleted {
                generation,
                result: Err(failure.clone()),
            });
            return Err(failure);
        }

        sink.emit(EngineEvent::Status(status_update(generation, step)));
    }

    let summary = RunSummary {
        total_rows: plan.total_rows,
    };
    engine_info!(
        "Run generation={} finished with {} leads",
        generation,
        summary.total_rows
    );
    sink.emit(EngineEvent::RunCompleted {
        generation,
        result: Ok(summary.clone()),
    });
    Ok(summary)
}

fn status_update(generation: Generation, step: ScheduledStep) -> StatusUpdate {
    StatusUpdate {
        generation,
        timestamp: Utc::now(),
        level: step.level,
        stage: step.stage,
        message: step.message,
    }
}
