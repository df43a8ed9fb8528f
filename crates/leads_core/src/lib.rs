//! Leads core: pure run-state machine, filter validation and view-model helpers.
mod effect;
mod filters;
mod msg;
mod stage;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use filters::{
    parse_keywords, validate_filters, CompanySize, FilterErrors, FilterField, Filters,
    RawFilters, ValidationError, DEFAULT_LIMIT, LOCATION, MAX_LIMIT, MIN_LIMIT,
};
pub use msg::Msg;
pub use stage::{LogLevel, Stage};
pub use state::{AppState, Generation, RunId, RunState, StatusEvent};
pub use update::update;
pub use view_model::{
    AppViewModel, ControlsView, DownloadStatus, DownloadView, FeedView, FieldErrorView, FormView,
    LogLineView,
};
