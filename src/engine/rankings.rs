//! League-wide ordering of teams by stored ATS metrics.

use super::matcher::Team;
use super::metrics::TeamMetrics;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTeam {
    pub team: Team,
    pub value: f64,
    pub metrics: TeamMetrics,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Rankings {
    /// Highest value index first (market undervalues).
    pub most_undervalued: Vec<RankedTeam>,
    /// Lowest value index first (market overvalues).
    pub most_overvalued: Vec<RankedTeam>,
    /// Highest cover rate first.
    pub best_cover_rate: Vec<RankedTeam>,
    /// Lowest cover rate first.
    pub worst_cover_rate: Vec<RankedTeam>,
}

/// Descending by value, ties broken by slug so the order is stable.
fn ranked_desc<F>(teams: &[(Team, TeamMetrics)], key: F) -> Vec<RankedTeam>
where
    F: Fn(&TeamMetrics) -> Option<f64>,
{
    let mut ranked: Vec<RankedTeam> = teams
        .iter()
        .filter_map(|(team, metrics)| {
            key(metrics).map(|value| RankedTeam {
                team: *team,
                value,
                metrics: metrics.clone(),
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.team.slug().cmp(b.team.slug()))
    });
    ranked
}

/// Top and bottom `limit` teams by value index and by cover rate.
/// Teams with no usable data are left out rather than ranked as zero.
pub fn rank_teams(teams: &[(Team, TeamMetrics)], limit: usize) -> Rankings {
    let by_value = ranked_desc(teams, TeamMetrics::value_index);
    let by_cover = ranked_desc(teams, |m| m.cover_rate);

    let bottom = |ranked: &[RankedTeam]| -> Vec<RankedTeam> {
        ranked.iter().rev().take(limit).cloned().collect()
    };

    Rankings {
        most_overvalued: bottom(&by_value),
        most_undervalued: by_value.into_iter().take(limit).collect(),
        worst_cover_rate: bottom(&by_cover),
        best_cover_rate: by_cover.into_iter().take(limit).collect(),
    }
}
