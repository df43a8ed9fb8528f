use crate::{Filters, Generation, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRun {
        generation: Generation,
        run_id: RunId,
        filters: Filters,
    },
    CancelRun { generation: Generation },
    SaveCsv { run_id: RunId, row_limit: u32 },
}
