use crate::engine::matcher::Team;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

// Normalized internal types shared by the parsers, the store and the metric engine.

/// Straight-up outcome of a completed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

/// One completed game from one team's point of view.
///
/// Field order is the persisted column order:
/// `date,is_home,opponent,opponent_rank,spread,result,margin,ats_diff`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub is_home: bool,
    pub opponent: Team,
    pub opponent_rank: Option<u16>,
    /// Closing line for this team. Negative = favorite, positive = underdog, 0 = pick'em.
    pub spread: Option<f64>,
    pub result: Outcome,
    /// Team score minus opponent score.
    pub margin: i32,
    /// `margin - expected_margin(spread)`; positive = covered. `None` when there was no line.
    pub ats_diff: Option<f64>,
}

/// Points the line asks the team to win by. A -6.5 favorite is expected to win by 6.5.
pub fn expected_margin(spread: f64) -> f64 {
    -spread
}

/// Spread-adjusted differential for a final margin against a line.
pub fn ats_diff_for(margin: i32, spread: f64) -> f64 {
    f64::from(margin) - expected_margin(spread)
}

impl GameRecord {
    /// Usable spread and differential, if the game had a line.
    pub fn ats(&self) -> Option<(f64, f64)> {
        match (self.spread, self.ats_diff) {
            (Some(s), Some(d)) => Some((s, d)),
            _ => None,
        }
    }
}

/// One side of today's game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupSide {
    pub team: Team,
    /// Current line for this side; `None` when no line has been published.
    pub spread: Option<f64>,
}

/// A game scheduled for today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub game_id: String,
    /// Scheduled tip-off in the display time zone.
    pub start: DateTime<FixedOffset>,
    pub away: MatchupSide,
    pub home: MatchupSide,
}

impl Matchup {
    pub fn teams(&self) -> [Team; 2] {
        [self.away.team, self.home.team]
    }
}

/// Season context used to place partial ("11/28") source dates into a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Season {
    /// Calendar year in which the season tips off (2025 for 2025-26).
    pub start_year: i32,
}

impl Season {
    /// August through December belong to the starting year, January through July to the next.
    pub fn date_for(&self, month: u32, day: u32) -> Option<NaiveDate> {
        let year = if month >= 8 {
            self.start_year
        } else {
            self.start_year + 1
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// What the caller knows about whether games should exist on the day being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayExpectation {
    /// In-season game day: an empty schedule means the parser broke.
    GamesExpected,
    /// Known off day (offseason, All-Star break): an empty schedule is normal.
    OffDay,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ats_diff_favorite_cover() {
        // -6 favorite winning by 10 covers by 4
        assert!((ats_diff_for(10, -6.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_ats_diff_underdog_cover_in_loss() {
        // +7.5 underdog losing by 3 covers by 4.5
        assert!((ats_diff_for(-3, 7.5) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_ats_diff_pickem_is_margin() {
        assert!((ats_diff_for(-2, 0.0) - (-2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_season_date_for() {
        let season = Season { start_year: 2025 };
        assert_eq!(season.date_for(10, 22), NaiveDate::from_ymd_opt(2025, 10, 22));
        assert_eq!(season.date_for(1, 5), NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(season.date_for(2, 30), None);
    }

    #[test]
    fn test_outcome_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Outcome::Win).unwrap(), "\"W\"");
        assert_eq!(serde_json::to_string(&Outcome::Loss).unwrap(), "\"L\"");
    }
}
