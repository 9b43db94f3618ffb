// Integration tests: results page -> snapshot -> metrics -> rankings

#[cfg(test)]
mod tests {
    use ats_board::engine::matcher::Team;
    use ats_board::engine::metrics::compute_metrics;
    use ats_board::engine::rankings::rank_teams;
    use ats_board::feed::results::parse_historical_results;
    use ats_board::feed::types::Season;
    use ats_board::store::SnapshotStore;

    const SEASON: Season = Season { start_year: 2025 };

    /// Results page with extra navigation tables around the one we want, as the live page has.
    fn page(rows: &[(&str, &str, &str, &str, &str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(date, loc, opp, line, result, diff)| {
                format!(
                    "<tr><td>{date}</td><td>{loc}</td><td>{opp}</td><td>--</td>\
                     <td>{line}</td><td>{result}</td><td>{diff}</td></tr>"
                )
            })
            .collect();
        format!(
            r#"<html><body>
            <table class="tr-table"><tr><th>Split</th><th>ATS Record</th><th>Cover %</th></tr>
              <tr><td>All Games</td><td>2-1-0</td><td>66.7%</td></tr></table>
            <table class="tr-table datatable scrollable">
              <thead><tr><th>Date</th><th>H/A/N</th><th>Opponent</th><th>Opp Rank</th>
                <th>Team Line</th><th>Result</th><th>Diff</th></tr></thead>
              <tbody>{body}</tbody>
            </table></body></html>"#
        )
    }

    #[test]
    fn test_parse_store_reload_gives_same_metrics() {
        let html = page(&[
            ("10/22/25", "Away", "Houston", "+2.5", "W by 7", "+9.5"),
            ("10/24/25", "Home", "Golden State", "-1.5", "L by 4", "-5.5"),
            ("10/26/25", "Home", "Memphis", "-3.0", "W by 3", "0.0"),
            ("10/28/25", "Neutral", "LA Lakers", "PK", "W by 1", "+1.0"),
        ]);
        let parsed = parse_historical_results(&html, Team::DallasMavericks, SEASON).unwrap();
        assert_eq!(parsed.records.len(), 4);
        assert_eq!(parsed.skipped, 0);

        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.replace(Team::DallasMavericks, &parsed.records).unwrap();
        let reloaded = store.load(Team::DallasMavericks).unwrap().unwrap();
        assert_eq!(reloaded, parsed.records);

        let m = compute_metrics(&reloaded);
        assert_eq!(m, compute_metrics(&parsed.records));
        assert_eq!(m.pushes, 1);
        assert_eq!(m.covers, 2);
        assert_eq!(m.non_covers, 1);
        assert_eq!(m.pickem_games, 1);
        assert_eq!(m.favorite.games, 2);
        assert_eq!(m.underdog.games, 1);
        assert!((m.cover_rate.unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.ats_record(), "2-1-1");
    }

    #[test]
    fn test_rankings_from_stored_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let covers = page(&[
            ("11/01/25", "Home", "Utah", "-5.0", "W by 12", "+7.0"),
            ("11/03/25", "Away", "Utah", "+1.0", "W by 2", "+3.0"),
        ]);
        let misses = page(&[
            ("11/01/25", "Away", "Boston", "+5.0", "L by 12", "-7.0"),
            ("11/03/25", "Home", "Boston", "-1.0", "L by 2", "-3.0"),
        ]);
        for (team, html) in [(Team::BostonCeltics, &covers), (Team::UtahJazz, &misses)] {
            let parsed = parse_historical_results(html, team, SEASON).unwrap();
            store.replace(team, &parsed.records).unwrap();
        }

        let teams: Vec<_> = store
            .load_all()
            .into_iter()
            .map(|(team, records)| (team, compute_metrics(&records)))
            .collect();
        let rankings = rank_teams(&teams, 10);

        assert_eq!(rankings.best_cover_rate[0].team, Team::BostonCeltics);
        assert_eq!(rankings.best_cover_rate[0].value, 100.0);
        assert_eq!(rankings.most_undervalued[0].team, Team::UtahJazz);
        assert_eq!(rankings.most_undervalued[0].value, 5.0);
    }
}
