//! Daily run and full backfill.
//!
//! Refreshes are strictly sequential with a pause between teams: one outbound request at a
//! time toward the results site. A team's failure is recorded and never stops its siblings.

use crate::config::Config;
use crate::engine::matcher::Team;
use crate::engine::metrics::compute_metrics;
use crate::error::{RefreshError, RunError};
use crate::feed::results::{parse_historical_results, ParsedResults};
use crate::feed::schedule::{parse_spread_board, parse_todays_matchups, ScheduleDocuments};
use crate::feed::types::{Matchup, Season};
use crate::feed::DocumentSource;
use crate::report::{
    BackfillEntry, BackfillReport, FailureEntry, RunReport, SnapshotStatus, TeamReport,
};
use crate::store::SnapshotStore;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use std::time::Duration;

pub struct Pipeline<S: DocumentSource> {
    source: S,
    store: SnapshotStore,
    config: Config,
}

/// Distinct teams in schedule order.
fn teams_playing(matchups: &[Matchup]) -> Vec<Team> {
    let mut teams = Vec::new();
    for team in matchups.iter().flat_map(Matchup::teams) {
        if !teams.contains(&team) {
            teams.push(team);
        }
    }
    teams
}

fn failure(team: Team, err: &RefreshError) -> FailureEntry {
    FailureEntry {
        team,
        kind: err.kind(),
        message: err.to_string(),
    }
}

impl<S: DocumentSource> Pipeline<S> {
    pub fn new(source: S, config: Config) -> Self {
        let store = SnapshotStore::new(config.storage.data_dir.clone());
        Self {
            source,
            store,
            config,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Configured pause plus up to 25% jitter.
    async fn pause(&self) {
        let base = self.config.sources.request_pause_ms;
        if base == 0 {
            return;
        }
        let jitter = rand::thread_rng().gen_range(0..=base / 4);
        tokio::time::sleep(Duration::from_millis(base + jitter)).await;
    }

    /// Fetch, parse and replace one team's snapshot. Nothing is written unless all three succeed.
    /// A page whose every row was rejected counts as a failed parse.
    async fn refresh_team(&self, team: Team, season: Season) -> Result<ParsedResults, RefreshError> {
        let html = self.source.team_results(team).await?;
        let parsed = parse_historical_results(&html, team, season)?;
        if parsed.records.is_empty() && parsed.skipped > 0 {
            return Err(RefreshError::NoUsableRows {
                skipped: parsed.skipped,
                first_reason: parsed
                    .skip_samples
                    .first()
                    .map(|s| s.reason.clone())
                    .unwrap_or_default(),
            });
        }
        self.store.replace(team, &parsed.records)?;
        if parsed.skipped > 0 {
            tracing::warn!(team = %team, skipped = parsed.skipped, "rows skipped during refresh");
        }
        tracing::info!(team = %team, games = parsed.records.len(), "refreshed");
        Ok(parsed)
    }

    /// Today's matchups, plus the reason the spread board was dropped if it was unreadable.
    /// Only the scoreboard can fail the run; a bad board is treated like a missing one.
    async fn load_schedule(
        &self,
        today: NaiveDate,
    ) -> Result<(Vec<Matchup>, Option<String>), RunError> {
        let scoreboard = self
            .source
            .scoreboard()
            .await
            .map_err(RunError::ScoreboardFetch)?;
        let mut board_error = None;
        let spread_board = match self.source.spread_board().await {
            Ok(html) => match parse_spread_board(&html) {
                Ok(_) => Some(html),
                Err(e) => {
                    tracing::warn!(error = %e, "spread board unreadable, continuing without lines");
                    board_error = Some(e.to_string());
                    None
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "spread board unavailable, continuing without lines");
                None
            }
        };
        let docs = ScheduleDocuments {
            scoreboard,
            spread_board,
        };
        let matchups = parse_todays_matchups(
            &docs,
            self.config.day_expectation(today),
            today,
            self.config.display,
        )?;
        Ok((matchups, board_error))
    }

    /// Refresh the teams playing `today`, then report every team: fresh or fallback metrics
    /// for today's teams, last stored metrics (possibly stale) for the rest.
    ///
    /// Fails only when the schedule itself cannot be obtained; per-team problems end up in
    /// the report's failure list.
    pub async fn run_daily(&self, today: NaiveDate) -> Result<RunReport, RunError> {
        let (matchups, spread_board_error) = self.load_schedule(today).await?;
        let teams = teams_playing(&matchups);
        tracing::info!(%today, games = matchups.len(), teams = teams.len(), "schedule loaded");

        let season = self.config.season_for(today);
        let mut reports = BTreeMap::new();
        let mut failures = Vec::new();

        for (i, &team) in teams.iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            let report = match self.refresh_team(team, season).await {
                Ok(parsed) => TeamReport {
                    status: SnapshotStatus::Fresh,
                    metrics: Some(compute_metrics(&parsed.records)),
                    reason: None,
                    skipped_rows: parsed.skipped,
                    skip_samples: parsed.skip_samples,
                },
                Err(e) => {
                    tracing::warn!(team = %team, error = %e, "refresh failed");
                    failures.push(failure(team, &e));
                    self.fallback_report(team, &e)
                }
            };
            reports.insert(team, report);
        }

        for (team, records) in self.store.load_all() {
            reports.entry(team).or_insert_with(|| TeamReport {
                status: SnapshotStatus::Snapshot,
                metrics: Some(compute_metrics(&records)),
                reason: None,
                skipped_rows: 0,
                skip_samples: Vec::new(),
            });
        }

        Ok(RunReport {
            date: today,
            generated_at: Utc::now(),
            matchups,
            spread_board_error,
            teams: reports,
            failures,
        })
    }

    /// Metrics from the last snapshot after a failed refresh.
    fn fallback_report(&self, team: Team, err: &RefreshError) -> TeamReport {
        let (status, metrics, reason) = match self.store.load(team) {
            Ok(Some(records)) => (
                SnapshotStatus::Stale,
                Some(compute_metrics(&records)),
                err.to_string(),
            ),
            Ok(None) => (SnapshotStatus::NoData, None, err.to_string()),
            Err(load_err) => {
                tracing::warn!(team = %team, error = %load_err, "previous snapshot unreadable");
                (
                    SnapshotStatus::NoData,
                    None,
                    format!("{err}; previous snapshot unreadable: {load_err}"),
                )
            }
        };
        TeamReport {
            status,
            metrics,
            reason: Some(reason),
            skipped_rows: 0,
            skip_samples: Vec::new(),
        }
    }

    /// Refresh every team, whether or not it plays today.
    pub async fn backfill_all(&self, today: NaiveDate) -> BackfillReport {
        let season = self.config.season_for(today);
        let mut report = BackfillReport::default();

        for (i, &team) in Team::ALL.iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            match self.refresh_team(team, season).await {
                Ok(parsed) => report.refreshed.push(BackfillEntry {
                    team,
                    games: parsed.records.len(),
                    skipped_rows: parsed.skipped,
                }),
                Err(e) => {
                    tracing::warn!(team = %team, error = %e, "backfill failed");
                    report.failures.push(failure(team, &e));
                }
            }
        }

        tracing::info!(
            refreshed = report.refreshed.len(),
            failed = report.failures.len(),
            "backfill complete"
        );
        report
    }
}
