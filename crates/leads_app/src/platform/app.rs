use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use leads_core::{update, AppState, AppViewModel, Msg, RunId};

use super::config::{self, AppConfig, CONFIG_FILENAME};
use super::effects::EffectRunner;
use super::logging;
use super::ui::input::{self, UserCommand};
use super::ui::render;

/// Everything the dispatch loop reacts to.
pub enum AppEvent {
    /// A parsed line of terminal input.
    Command(UserCommand),
    /// Terminal input that did not parse.
    InputRejected(String),
    /// Stdin closed.
    InputClosed,
    /// A message produced by the engine or an effect.
    Msg(Msg),
    /// Render tick to coalesce frames.
    Tick,
}

pub fn run_app() -> anyhow::Result<()> {
    let loaded = config::load_config(Path::new(CONFIG_FILENAME));
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };
    logging::initialize(config.log_destination, config.log_level());
    if let Err(err) = &loaded {
        engine_warn!("Ignoring {}: {}", CONFIG_FILENAME, err);
    }

    let schedule = config
        .schedule_settings()
        .context("invalid run schedule")?;
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(schedule, config.download_settings(), event_tx.clone())
        .context("failed to start the run engine")?;

    spawn_input_reader(event_tx.clone())?;
    spawn_ticker(event_tx)?;

    engine_info!("Leads agent started; downloads go to {:?}", config.download_dir);
    let mut app = App::new(runner);
    app.present(&[input::HELP.to_string()])?;
    app.render()?;

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Command(UserCommand::Quit) | AppEvent::InputClosed => break,
            AppEvent::Command(UserCommand::Help) => app.present(&[input::HELP.to_string()])?,
            AppEvent::Command(command) => app.handle_command(command)?,
            AppEvent::InputRejected(message) => app.present(&[format!("! {message}")])?,
            AppEvent::Msg(msg) => app.dispatch(msg),
            AppEvent::Tick => {
                if app.take_pending_frame() {
                    app.render()?;
                }
            }
        }
    }

    engine_info!("Leads agent shutting down");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    frame_pending: bool,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            frame_pending: false,
        }
    }

    fn handle_command(&mut self, command: UserCommand) -> io::Result<()> {
        if let Some(reason) = refusal(&command, &self.state.view()) {
            engine_info!("Refused disabled command: {}", reason);
            return self.present(&[format!("! {reason}")]);
        }
        self.dispatch(command_to_msg(command));
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.frame_pending = true;
        }
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn take_pending_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }

    fn render(&self) -> io::Result<()> {
        self.present(&render::render(&self.state.view()))
    }

    fn present(&self, lines: &[String]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out)?;
        for line in lines {
            writeln!(out, "{line}")?;
        }
        write!(out, "> ")?;
        out.flush()
    }
}

/// Commands the dashboard renders as disabled never reach `update`.
fn refusal(command: &UserCommand, view: &AppViewModel) -> Option<&'static str> {
    let controls = &view.controls;
    match command {
        UserCommand::Run(_) if !controls.can_start => {
            Some("a run is in progress; stop it before starting another")
        }
        UserCommand::Stop if !controls.can_stop => Some("no run is in progress"),
        UserCommand::Reset if !controls.can_reset => {
            Some("reset is only available when no run is in progress")
        }
        UserCommand::Download if !view.download.enabled => Some("no CSV is available yet"),
        _ => None,
    }
}

fn command_to_msg(command: UserCommand) -> Msg {
    match command {
        UserCommand::Run(raw) => Msg::RunRequested {
            raw,
            run_id: mint_run_id(),
        },
        UserCommand::Stop => Msg::StopClicked,
        UserCommand::Reset => Msg::ResetClicked,
        UserCommand::Download => Msg::DownloadClicked,
        UserCommand::Dismiss => Msg::ErrorDismissed,
        UserCommand::Help | UserCommand::Quit => Msg::NoOp,
    }
}

/// Millisecond clock plus 64 random bits; collisions within one process
/// would need the same millisecond and the same draw.
fn mint_run_id() -> RunId {
    RunId::new(Utc::now().timestamp_millis(), rand::random())
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("leads-input".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let event = match line {
                    Ok(line) => match input::parse_command(&line) {
                        Ok(Some(command)) => AppEvent::Command(command),
                        Ok(None) => continue,
                        Err(err) => AppEvent::InputRejected(err.to_string()),
                    },
                    Err(err) => {
                        engine_warn!("Reading stdin failed: {}", err);
                        break;
                    }
                };
                if event_tx.send(event).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(AppEvent::InputClosed);
        })?;
    Ok(())
}

// Background tick to throttle rendering.
fn spawn_ticker(event_tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("leads-tick".to_string())
        .spawn(move || {
            let interval = Duration::from_millis(75);
            while event_tx.send(AppEvent::Tick).is_ok() {
                thread::sleep(interval);
            }
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leads_core::{RawFilters, Stage, StatusEvent};

    fn running() -> AppState {
        let (state, _) = update(
            AppState::new(),
            Msg::RunRequested {
                raw: RawFilters::default(),
                run_id: RunId::new(1, 1),
            },
        );
        state
    }

    #[test]
    fn idle_dashboard_refuses_stop_and_download() {
        let view = AppState::new().view();

        assert_eq!(refusal(&UserCommand::Run(RawFilters::default()), &view), None);
        assert_eq!(refusal(&UserCommand::Reset, &view), None);
        assert!(refusal(&UserCommand::Stop, &view).is_some());
        assert!(refusal(&UserCommand::Download, &view).is_some());
    }

    #[test]
    fn running_dashboard_refuses_start_and_reset() {
        let view = running().view();

        assert!(refusal(&UserCommand::Run(RawFilters::default()), &view).is_some());
        assert!(refusal(&UserCommand::Reset, &view).is_some());
        assert_eq!(refusal(&UserCommand::Stop, &view), None);
        assert_eq!(refusal(&UserCommand::Dismiss, &view), None);
    }

    #[test]
    fn finished_run_unlocks_download() {
        let state = running();
        let generation = state.generation();
        let (state, _) = update(
            state,
            Msg::StatusReceived {
                generation,
                event: StatusEvent::info(Utc::now(), Stage::Login, "Logging into Clay platform..."),
            },
        );
        let view = state.view();
        assert!(refusal(&UserCommand::Download, &view).is_some());

        let mut state = state;
        for stage in [Stage::Filters, Stage::Export, Stage::Upload, Stage::Done] {
            let (next, _) = update(
                state,
                Msg::StatusReceived {
                    generation,
                    event: StatusEvent::info(Utc::now(), stage, "step"),
                },
            );
            state = next;
        }
        let view = state.view();
        assert_eq!(refusal(&UserCommand::Download, &view), None);
        assert_eq!(refusal(&UserCommand::Reset, &view), None);
    }
}
