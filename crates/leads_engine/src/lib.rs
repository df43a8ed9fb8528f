//! Leads engine: simulated run scheduling, cancellation and CSV export.
mod csv;
mod download;
mod driver;
mod engine;
mod filename;
mod persist;
mod schedule;
mod types;

pub use csv::{render_csv, LeadRow, LeadSource, SampleLeadSource, CSV_HEADER, CSV_MIME_TYPE};
pub use download::{save_csv_download, DownloadSettings, SavedDownload};
pub use driver::{drive_run, ChannelProgressSink, ProgressSink};
pub use engine::{EngineEvents, EngineHandle};
pub use filename::{download_filename, DEFAULT_DOWNLOAD_PREFIX};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use schedule::{
    FailureInjection, RunPlan, RunRequest, ScheduleError, ScheduleSettings, ScheduledStep,
    STEP_COUNT,
};
pub use types::{
    EngineEvent, FailureKind, Generation, Level, RunSummary, Stage, StatusUpdate, UnknownStage,
};
