// Integration tests for per-team failure isolation in the daily run and backfill

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ats_board::config::{Config, SourcesConfig, StorageConfig};
    use ats_board::engine::matcher::Team;
    use ats_board::error::{FailureKind, FetchError, RunError};
    use ats_board::feed::results::parse_historical_results;
    use ats_board::feed::schedule::DisplayZone;
    use ats_board::feed::types::Season;
    use ats_board::feed::DocumentSource;
    use ats_board::pipeline::Pipeline;
    use ats_board::report::SnapshotStatus;
    use ats_board::store::SnapshotStore;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::path::Path;

    #[derive(Clone)]
    enum Page {
        Html(String),
        Timeout,
    }

    struct FakeSource {
        scoreboard: Page,
        spread_board: Page,
        results: HashMap<Team, Page>,
    }

    fn serve(page: &Page, url: &str) -> Result<String, FetchError> {
        match page {
            Page::Html(body) => Ok(body.clone()),
            Page::Timeout => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    #[async_trait]
    impl DocumentSource for FakeSource {
        async fn scoreboard(&self) -> Result<String, FetchError> {
            serve(&self.scoreboard, "fake://scoreboard")
        }

        async fn spread_board(&self) -> Result<String, FetchError> {
            serve(&self.spread_board, "fake://spreads")
        }

        async fn team_results(&self, team: Team) -> Result<String, FetchError> {
            let page = self.results.get(&team).cloned().unwrap_or(Page::Timeout);
            serve(&page, &format!("fake://{}", team.slug()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
    }

    fn config(dir: &Path) -> Config {
        Config {
            sources: SourcesConfig {
                request_pause_ms: 0,
                ..SourcesConfig::default()
            },
            storage: StorageConfig {
                data_dir: dir.to_path_buf(),
                report_path: dir.join("run_report.json"),
            },
            season: None,
            display: DisplayZone::default(),
        }
    }

    const SCOREBOARD: &str = r#"{"scoreboard": {"gameDate": "2025-11-28", "games": [{
        "gameId": "0022500310",
        "gameTimeUTC": "2025-11-29T00:30:00Z",
        "homeTeam": {"teamCity": "Miami", "teamName": "Heat"},
        "awayTeam": {"teamCity": "Boston", "teamName": "Celtics"}
    }]}}"#;

    const SPREADS: &str = r#"<aside class="right-sidebar"><table class="tr-table">
        <tr><td><a href="/g">Boston (-4.5) at Miami</a></td></tr></table></aside>"#;

    fn results_page(opponent: &str) -> String {
        format!(
            r#"<html><body><table>
            <thead><tr><th>Date</th><th>H/A/N</th><th>Opponent</th><th>Opp Rank</th>
              <th>Line</th><th>Result</th><th>Diff</th></tr></thead>
            <tbody>
              <tr><td>11/01/25</td><td>Home</td><td>{opponent}</td><td>4</td><td>-4.0</td><td>W by 10</td><td>+6.0</td></tr>
              <tr><td>11/03/25</td><td>Away</td><td>{opponent}</td><td>4</td><td>+6.0</td><td>W by 3</td><td>+9.0</td></tr>
              <tr><td>11/05/25</td><td>Home</td><td>{opponent}</td><td>4</td><td>-4.0</td><td>L by 2</td><td>-6.0</td></tr>
            </tbody></table></body></html>"#
        )
    }

    /// Right table and headers, but no row survives parsing.
    fn rejected_rows_page() -> String {
        results_page("Boston")
            .replace("<td>-4.0</td>", "<td>abc</td>")
            .replace("<td>+6.0</td><td>W", "<td>abc</td><td>W")
    }

    fn source(results: HashMap<Team, Page>) -> FakeSource {
        FakeSource {
            scoreboard: Page::Html(SCOREBOARD.to_string()),
            spread_board: Page::Html(SPREADS.to_string()),
            results,
        }
    }

    #[tokio::test]
    async fn test_timeout_isolated_without_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Timeout);
        let pipeline = Pipeline::new(source(results), config(dir.path()));

        let report = pipeline.run_daily(today()).await.unwrap();

        assert_eq!(report.matchups.len(), 1);
        assert_eq!(report.matchups[0].away.spread, Some(-4.5));
        assert_eq!(report.matchups[0].home.spread, Some(4.5));

        let miami = &report.teams[&Team::MiamiHeat];
        assert_eq!(miami.status, SnapshotStatus::Fresh);
        let metrics = miami.metrics.as_ref().unwrap();
        assert_eq!(metrics.total.games, 3);
        assert_eq!(metrics.favorite.games, 2);
        assert_eq!(metrics.underdog.games, 1);

        let boston = &report.teams[&Team::BostonCeltics];
        assert_eq!(boston.status, SnapshotStatus::NoData);
        assert!(boston.metrics.is_none());
        assert!(boston.reason.is_some());

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].team, Team::BostonCeltics);
        assert_eq!(report.failures[0].kind, FailureKind::Timeout);
        assert!(!report.is_total_failure());

        assert!(pipeline.store().load(Team::MiamiHeat).unwrap().is_some());
        assert!(pipeline.store().load(Team::BostonCeltics).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_timeout_serves_stale_snapshot() {
        let dir = tempfile::tempdir().unwrap();

        // First run: both teams refresh.
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Miami")));
        let first = Pipeline::new(source(results), config(dir.path()));
        let report = first.run_daily(today()).await.unwrap();
        assert_eq!(report.fresh_count(), 2);
        let before = first.store().load(Team::BostonCeltics).unwrap().unwrap();

        // Second run: Boston times out.
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Timeout);
        let second = Pipeline::new(source(results), config(dir.path()));
        let report = second.run_daily(today()).await.unwrap();

        let boston = &report.teams[&Team::BostonCeltics];
        assert_eq!(boston.status, SnapshotStatus::Stale);
        assert_eq!(boston.metrics.as_ref().unwrap().total.games, 3);
        assert_eq!(report.teams[&Team::MiamiHeat].status, SnapshotStatus::Fresh);
        assert_eq!(report.failures.len(), 1);

        let after = second.store().load(Team::BostonCeltics).unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_missing_table_keeps_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Miami")));
        Pipeline::new(source(results), config(dir.path()))
            .run_daily(today())
            .await
            .unwrap();

        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(
            Team::BostonCeltics,
            Page::Html("<html><body><p>Page moved</p></body></html>".to_string()),
        );
        let pipeline = Pipeline::new(source(results), config(dir.path()));
        let report = pipeline.run_daily(today()).await.unwrap();

        assert_eq!(report.failures[0].kind, FailureKind::TableNotFound);
        assert_eq!(report.teams[&Team::BostonCeltics].status, SnapshotStatus::Stale);
        assert_eq!(
            pipeline.store().load(Team::BostonCeltics).unwrap().unwrap().len(),
            3
        );
    }

    #[tokio::test]
    async fn test_unknown_opponent_fails_only_that_team() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Seattle")));
        let pipeline = Pipeline::new(source(results), config(dir.path()));
        let report = pipeline.run_daily(today()).await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::UnknownTeam);
        assert_eq!(report.teams[&Team::MiamiHeat].status, SnapshotStatus::Fresh);
    }

    #[tokio::test]
    async fn test_every_refresh_failing_is_total_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(source(HashMap::new()), config(dir.path()));
        let report = pipeline.run_daily(today()).await.unwrap();
        assert_eq!(report.failures.len(), 2);
        assert!(report.is_total_failure());
    }

    #[tokio::test]
    async fn test_scoreboard_failure_aborts_and_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        let mut fake = source(results);
        fake.scoreboard = Page::Timeout;
        let pipeline = Pipeline::new(fake, config(dir.path()));

        let err = pipeline.run_daily(today()).await.unwrap_err();
        assert!(matches!(err, RunError::ScoreboardFetch(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_spread_board_outage_keeps_matchups() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Miami")));
        let mut fake = source(results);
        fake.spread_board = Page::Timeout;
        let pipeline = Pipeline::new(fake, config(dir.path()));

        let report = pipeline.run_daily(today()).await.unwrap();
        assert_eq!(report.matchups.len(), 1);
        assert_eq!(report.matchups[0].away.spread, None);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_backfill_reports_each_team() {
        let dir = tempfile::tempdir().unwrap();
        let results: HashMap<Team, Page> = Team::ALL
            .iter()
            .filter(|&&t| t != Team::UtahJazz)
            .map(|&t| {
                let opponent = if t == Team::BostonCeltics { "Miami" } else { "Boston" };
                (t, Page::Html(results_page(opponent)))
            })
            .collect();
        let pipeline = Pipeline::new(source(results), config(dir.path()));

        let report = pipeline.backfill_all(today()).await;
        assert_eq!(report.refreshed.len(), 29);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].team, Team::UtahJazz);
        assert!(!report.all_succeeded());
        assert_eq!(pipeline.store().load_all().len(), 29);
    }

    #[tokio::test]
    async fn test_unreadable_spread_board_keeps_matchups_without_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Miami")));
        let mut fake = source(results);
        fake.spread_board = Page::Html(
            r#"<aside class="right-sidebar"><table class="tr-table">
              <tr><td><a href="/g">Boston (-4.5) at Miami</a></td></tr>
              <tr><td><a href="/ncaab">Duke at North Carolina (-3.5)</a></td></tr>
            </table></aside>"#
                .to_string(),
        );
        let pipeline = Pipeline::new(fake, config(dir.path()));

        let report = pipeline.run_daily(today()).await.unwrap();
        assert_eq!(report.matchups.len(), 1);
        assert_eq!(report.matchups[0].away.spread, None);
        assert_eq!(report.matchups[0].home.spread, None);
        assert!(report.spread_board_error.as_deref().unwrap().contains("Duke"));
        assert!(report.failures.is_empty());
        assert_eq!(report.fresh_count(), 2);
    }

    #[tokio::test]
    async fn test_links_outside_spread_table_do_not_affect_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Miami")));
        let mut fake = source(results);
        fake.spread_board = Page::Html(format!(
            r#"<html><body><main><a href="/ncaab">Duke at North Carolina (-3.5)</a></main>
            {SPREADS}</body></html>"#
        ));
        let pipeline = Pipeline::new(fake, config(dir.path()));

        let report = pipeline.run_daily(today()).await.unwrap();
        assert_eq!(report.matchups[0].away.spread, Some(-4.5));
        assert!(report.spread_board_error.is_none());
    }

    #[tokio::test]
    async fn test_all_rows_rejected_keeps_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Miami")));
        Pipeline::new(source(results), config(dir.path()))
            .run_daily(today())
            .await
            .unwrap();

        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(rejected_rows_page()));
        let pipeline = Pipeline::new(source(results), config(dir.path()));
        let report = pipeline.run_daily(today()).await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].team, Team::BostonCeltics);
        assert_eq!(report.failures[0].kind, FailureKind::NoUsableRows);
        let boston = &report.teams[&Team::BostonCeltics];
        assert_eq!(boston.status, SnapshotStatus::Stale);
        assert_eq!(boston.metrics.as_ref().unwrap().total.games, 3);
        assert_eq!(
            pipeline.store().load(Team::BostonCeltics).unwrap().unwrap().len(),
            3
        );
    }

    #[tokio::test]
    async fn test_idle_teams_reported_from_stored_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let utah = parse_historical_results(
            &results_page("Denver"),
            Team::UtahJazz,
            Season { start_year: 2025 },
        )
        .unwrap();
        store.replace(Team::UtahJazz, &utah.records).unwrap();

        let mut results = HashMap::new();
        results.insert(Team::MiamiHeat, Page::Html(results_page("Boston")));
        results.insert(Team::BostonCeltics, Page::Html(results_page("Miami")));
        let pipeline = Pipeline::new(source(results), config(dir.path()));
        let report = pipeline.run_daily(today()).await.unwrap();

        assert_eq!(report.teams.len(), 3);
        let jazz = &report.teams[&Team::UtahJazz];
        assert_eq!(jazz.status, SnapshotStatus::Snapshot);
        assert_eq!(jazz.metrics.as_ref().unwrap().total.games, 3);
        assert!(jazz.reason.is_none());
        assert!(!report.teams.contains_key(&Team::DenverNuggets));
        assert_eq!(report.fresh_count(), 2);
        assert!(report.failures.is_empty());
    }
}
