use crate::feed::schedule::DisplayZone;
use crate::feed::types::{DayExpectation, Season};
use anyhow::{ensure, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Absent means every empty schedule is ambiguous.
    pub season: Option<SeasonConfig>,
    #[serde(default)]
    pub display: DisplayZone,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub scoreboard_url: String,
    pub spread_board_url: String,
    /// Must contain `{slug}`.
    pub team_results_url: String,
    pub user_agent: String,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    /// Pause between consecutive team fetches.
    pub request_pause_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            scoreboard_url:
                "https://cdn.nba.com/static/json/liveData/scoreboard/todaysScoreboard_00.json"
                    .to_string(),
            spread_board_url: "https://www.teamrankings.com/nba/".to_string(),
            team_results_url: "https://www.teamrankings.com/nba/team/{slug}/ats-results"
                .to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            request_timeout_ms: 15_000,
            max_retries: 2,
            request_pause_ms: 1_500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub report_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            report_path: PathBuf::from("data/run_report.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeasonConfig {
    /// First day of the regular season.
    pub start: NaiveDate,
    /// Last day of the postseason.
    pub end: NaiveDate,
    /// In-season days with no games (All-Star break, holidays).
    #[serde(default)]
    pub off_days: Vec<NaiveDate>,
}

impl SeasonConfig {
    pub fn expectation(&self, date: NaiveDate) -> DayExpectation {
        if date < self.start || date > self.end || self.off_days.contains(&date) {
            DayExpectation::OffDay
        } else {
            DayExpectation::GamesExpected
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.sources.team_results_url.contains("{slug}"),
            "sources.team_results_url must contain {{slug}}"
        );
        if let Some(season) = &self.season {
            ensure!(
                season.start <= season.end,
                "season.start {} is after season.end {}",
                season.start,
                season.end
            );
        }
        Ok(())
    }

    pub fn day_expectation(&self, date: NaiveDate) -> DayExpectation {
        self.season
            .as_ref()
            .map_or(DayExpectation::Unknown, |s| s.expectation(date))
    }

    /// Season used to place partial source dates. Uses `[season]` when `today` falls inside
    /// it, otherwise the season `today` falls in by calendar (August onward starts a new one).
    pub fn season_for(&self, today: NaiveDate) -> Season {
        let by_calendar = if today.month() >= 8 {
            today.year()
        } else {
            today.year() - 1
        };
        let start_year = match &self.season {
            Some(s) if today >= s.start && today <= s.end => s.start.year(),
            Some(s) => {
                tracing::warn!(
                    %today,
                    start = %s.start,
                    end = %s.end,
                    season = by_calendar,
                    "date is outside the configured season, placing dates by calendar"
                );
                by_calendar
            }
            None => by_calendar,
        };
        Season { start_year }
    }
}
