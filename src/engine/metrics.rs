//! Role-conditioned ATS aggregates for one team.

use crate::feed::types::{GameRecord, Outcome};
use serde::Serialize;

/// Mean spread-adjusted differential over one view of a team's games.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoleSummary {
    pub games: usize,
    /// `None` when `games == 0`. Zero is a real value and never stands in for "no data".
    pub mean_ats_diff: Option<f64>,
}

impl RoleSummary {
    fn from_diffs(diffs: &[f64]) -> Self {
        let mean_ats_diff = if diffs.is_empty() {
            None
        } else {
            Some(diffs.iter().sum::<f64>() / diffs.len() as f64)
        };
        Self {
            games: diffs.len(),
            mean_ats_diff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMetrics {
    /// Every record, with or without a line.
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    /// Games with a usable line.
    pub total: RoleSummary,
    /// Line below zero.
    pub favorite: RoleSummary,
    /// Line above zero.
    pub underdog: RoleSummary,
    /// Line of exactly zero: counted in `total` only.
    pub pickem_games: usize,
    pub covers: usize,
    pub non_covers: usize,
    pub pushes: usize,
    /// Percent of decided games covered, pushes excluded. `None` with no decided games.
    pub cover_rate: Option<f64>,
}

impl TeamMetrics {
    /// Negated mean differential. Positive means the market undervalues the team.
    pub fn value_index(&self) -> Option<f64> {
        self.total.mean_ats_diff.map(|m| -m)
    }

    /// ATS record as `covers-non_covers-pushes`.
    pub fn ats_record(&self) -> String {
        format!("{}-{}-{}", self.covers, self.non_covers, self.pushes)
    }
}

/// Compute metrics from a team's records. Pure: same input, same output.
pub fn compute_metrics(records: &[GameRecord]) -> TeamMetrics {
    let mut total = Vec::new();
    let mut favorite = Vec::new();
    let mut underdog = Vec::new();
    let mut pickem_games = 0;
    let mut covers = 0;
    let mut non_covers = 0;
    let mut pushes = 0;

    for (spread, diff) in records.iter().filter_map(GameRecord::ats) {
        total.push(diff);
        if spread < 0.0 {
            favorite.push(diff);
        } else if spread > 0.0 {
            underdog.push(diff);
        } else {
            pickem_games += 1;
        }

        if diff > 0.0 {
            covers += 1;
        } else if diff < 0.0 {
            non_covers += 1;
        } else {
            pushes += 1;
        }
    }

    let decided = covers + non_covers;
    let cover_rate = if decided == 0 {
        None
    } else {
        Some(covers as f64 / decided as f64 * 100.0)
    };

    let wins = records.iter().filter(|r| r.result == Outcome::Win).count();

    TeamMetrics {
        games: records.len(),
        wins,
        losses: records.len() - wins,
        total: RoleSummary::from_diffs(&total),
        favorite: RoleSummary::from_diffs(&favorite),
        underdog: RoleSummary::from_diffs(&underdog),
        pickem_games,
        covers,
        non_covers,
        pushes,
        cover_rate,
    }
}
