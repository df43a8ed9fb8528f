use crate::{Generation, RawFilters, RunId, StatusEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the filter form. The caller mints the id so that
    /// `update` stays free of clocks and randomness.
    RunRequested { raw: RawFilters, run_id: RunId },
    /// User clicked Stop.
    StopClicked,
    /// User clicked Reset.
    ResetClicked,
    /// User clicked Download.
    DownloadClicked,
    /// User dismissed the error panel (the retry button).
    ErrorDismissed,
    /// Engine emitted a scheduled status line.
    StatusReceived {
        generation: Generation,
        event: StatusEvent,
    },
    /// Engine reported the lead count of a finished run.
    RunCompleted {
        generation: Generation,
        total_rows: u32,
    },
    /// Engine reported a failed run.
    RunFailed {
        generation: Generation,
        message: String,
    },
    /// Result of a download save.
    DownloadSaved { filename: String },
    DownloadFailed { message: String },
    /// Render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
