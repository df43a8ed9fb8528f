use std::fmt;

/// Pipeline stages in the order a run walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Login,
    Filters,
    Export,
    Upload,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Login,
        Stage::Filters,
        Stage::Export,
        Stage::Upload,
        Stage::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Login => "login",
            Stage::Filters => "filters",
            Stage::Export => "export",
            Stage::Upload => "upload",
            Stage::Done => "done",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Done
    }

    /// The stage that follows this one, `None` once the run is done.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Login => Some(Stage::Filters),
            Stage::Filters => Some(Stage::Export),
            Stage::Export => Some(Stage::Upload),
            Stage::Upload => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    /// Whether an event tagged `next` may follow the feed's latest stage.
    ///
    /// A feed opens at `Login`. After that an event stays in the current
    /// stage or moves exactly one step forward; nothing follows `Done`.
    pub fn permits(current: Option<Stage>, next: Stage) -> bool {
        match current {
            None => next == Stage::Login,
            Some(Stage::Done) => false,
            Some(stage) => next == stage || stage.next() == Some(next),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Error,
    Debug,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
