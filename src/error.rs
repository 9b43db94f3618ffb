use serde::Serialize;
use thiserror::Error;

/// A team label that no entry in the alias table accepts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown team label: {raw:?}")]
pub struct UnknownTeamError {
    pub raw: String,
}

impl UnknownTeamError {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResultParseError {
    /// No table in the document carries the date/opponent/line/result/diff headers.
    /// Usually means the upstream page layout changed.
    #[error("ATS results table not found (looked at {tables_seen} tables)")]
    TableNotFound { tables_seen: usize },

    #[error(transparent)]
    UnknownTeam(#[from] UnknownTeamError),
}

#[derive(Debug, Error)]
pub enum ScheduleParseError {
    #[error("no games found on {date}, but games were expected")]
    NoGames { date: chrono::NaiveDate },

    #[error("spreads for {away} at {home} are not inverses ({away_spread:+} vs {home_spread:+})")]
    SpreadMismatch {
        away: String,
        home: String,
        away_spread: f64,
        home_spread: f64,
    },

    #[error("malformed scoreboard payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    UnknownTeam(#[from] UnknownTeamError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Everything that can stop one team's refresh. The orchestrator isolates these per team.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ResultParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The table was there but every row was rejected. Usually row-level layout drift.
    #[error("all {skipped} results rows were rejected (first: {first_reason})")]
    NoUsableRows { skipped: usize, first_reason: String },
}

/// Failures that stop a daily run before any team is refreshed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("scoreboard fetch failed: {0}")]
    ScoreboardFetch(#[source] FetchError),

    #[error("schedule parse failed: {0}")]
    Schedule(#[from] ScheduleParseError),
}

/// Coarse failure category carried in the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Transport,
    TableNotFound,
    UnknownTeam,
    NoUsableRows,
    Storage,
}

impl RefreshError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RefreshError::Fetch(FetchError::Timeout { .. }) => FailureKind::Timeout,
            RefreshError::Fetch(_) => FailureKind::Transport,
            RefreshError::Parse(ResultParseError::TableNotFound { .. }) => {
                FailureKind::TableNotFound
            }
            RefreshError::Parse(ResultParseError::UnknownTeam(_)) => FailureKind::UnknownTeam,
            RefreshError::Store(_) => FailureKind::Storage,
            RefreshError::NoUsableRows { .. } => FailureKind::NoUsableRows,
        }
    }
}
