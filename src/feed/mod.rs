pub mod http;
pub mod results;
pub mod schedule;
pub mod types;

use crate::engine::matcher::Team;
use crate::error::FetchError;
use async_trait::async_trait;
use scraper::Selector;

/// Where raw documents come from. The pipeline never talks to the network directly.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Today's scoreboard JSON.
    async fn scoreboard(&self) -> Result<String, FetchError>;
    /// HTML page carrying today's spread lines.
    async fn spread_board(&self) -> Result<String, FetchError>;
    /// A team's season ATS results page.
    async fn team_results(&self, team: Team) -> Result<String, FetchError>;
}

/// Parse a selector literal. Only called with constants, so a failure is a programming error.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}
