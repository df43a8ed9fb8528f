use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use tokio_util::sync::CancellationToken;

use crate::driver::{drive_run, ChannelProgressSink};
use crate::{EngineEvent, Generation, RunPlan};

enum EngineCommand {
    Start { generation: Generation, plan: RunPlan },
    Cancel { generation: Generation },
}

/// Cloneable handle for sending commands to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receiving end of the engine's event stream.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl EngineHandle {
    /// Spawn the engine thread with its own tokio runtime.
    pub fn new() -> std::io::Result<(Self, EngineEvents)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .thread_name("leads-engine")
            .build()?;

        thread::Builder::new()
            .name("leads-engine-commands".to_string())
            .spawn(move || command_loop(runtime, cmd_rx, event_tx))?;

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    /// Schedule a run. Any run still in flight is cancelled first. Returns
    /// false when the engine thread is gone.
    pub fn start(&self, generation: Generation, plan: RunPlan) -> bool {
        self.send(EngineCommand::Start { generation, plan }, "start", generation)
    }

    /// Cancel the run scheduled under `generation`, if it is still the active
    /// one. Returns false when the engine thread is gone.
    pub fn cancel(&self, generation: Generation) -> bool {
        self.send(EngineCommand::Cancel { generation }, "cancel", generation)
    }

    fn send(&self, command: EngineCommand, kind: &str, generation: Generation) -> bool {
        let delivered = self.cmd_tx.send(command).is_ok();
        if !delivered {
            engine_error!(
                "Engine thread gone; dropping {} for generation {}",
                kind,
                generation
            );
        }
        delivered
    }
}

struct ActiveRun {
    generation: Generation,
    cancel: CancellationToken,
}

fn command_loop(
    runtime: tokio::runtime::Runtime,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut active: Option<ActiveRun> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Start { generation, plan } => {
                if let Some(previous) = active.take() {
                    engine_debug!(
                        "Superseding generation {} with {}",
                        previous.generation,
                        generation
                    );
                    previous.cancel.cancel();
                }
                let cancel = CancellationToken::new();
                let sink = ChannelProgressSink::new(event_tx.clone());
                let token = cancel.clone();
                engine_info!(
                    "Scheduling generation {} with {} steps",
                    generation,
                    plan.steps.len()
                );
                runtime.spawn(async move {
                    let _ = drive_run(generation, plan, &sink, token).await;
                });
                active = Some(ActiveRun { generation, cancel });
            }
            EngineCommand::Cancel { generation } => match active.take() {
                Some(run) if run.generation == generation => {
                    engine_info!("Cancelling generation {}", generation);
                    run.cancel.cancel();
                }
                other => {
                    engine_debug!("Cancel for generation {} ignored; nothing pending", generation);
                    active = other;
                }
            },
        }
    }

    if let Some(run) = active {
        run.cancel.cancel();
    }
    runtime.shutdown_background();
}
