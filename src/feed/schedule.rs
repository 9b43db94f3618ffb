use super::selector;
use super::types::{DayExpectation, Matchup, MatchupSide};
use crate::engine::matcher::{self, Team};
use crate::error::ScheduleParseError;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use scraper::Html;
use serde::Deserialize;

/// Largest tolerated disagreement between the two published sides of one line.
const SPREAD_TOLERANCE: f64 = 0.01;

/// Raw inputs for today's schedule.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDocuments {
    /// Scoreboard JSON (games, team names, tip-off times).
    pub scoreboard: String,
    /// Sidebar HTML listing today's lines. `None` when it could not be fetched.
    pub spread_board: Option<String>,
}

// ── Display time zone ────────────────────────────────────────────────

/// IANA zone that tip-off times and "today" are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DisplayZone {
    pub timezone: Tz,
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self {
            timezone: Tz::America__Los_Angeles,
        }
    }
}

impl DisplayZone {
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        self.timezone
            .offset_from_utc_datetime(&instant.naive_utc())
            .fix()
    }

    /// Same instant, expressed in this zone.
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset_at(instant))
    }
}

// ── Scoreboard JSON ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct NbaScoreboard {
    scoreboard: NbaScoreboardInner,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NbaScoreboardInner {
    #[serde(default)]
    game_date: Option<NaiveDate>,
    #[serde(default)]
    games: Vec<NbaGame>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NbaGame {
    game_id: String,
    #[serde(rename = "gameTimeUTC")]
    game_time_utc: DateTime<Utc>,
    home_team: NbaTeam,
    away_team: NbaTeam,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NbaTeam {
    team_city: String,
    team_name: String,
}

impl NbaTeam {
    fn resolve(&self) -> Result<Team, ScheduleParseError> {
        Ok(matcher::resolve(&format!(
            "{} {}",
            self.team_city, self.team_name
        ))?)
    }
}

// ── Spread board ─────────────────────────────────────────────────────

/// One line from the spread board. Labels are raw, spreads are as published.
#[derive(Debug, Clone, PartialEq)]
struct BoardLine {
    away: String,
    home: String,
    away_spread: Option<f64>,
    home_spread: Option<f64>,
}

fn negate(spread: f64) -> f64 {
    if spread == 0.0 {
        0.0
    } else {
        -spread
    }
}

/// Split "Minnesota (-11.5)" into label and line. No parenthetical gives `(label, None)`;
/// a parenthetical that is not a line gives `None`.
fn split_label(text: &str) -> Option<(String, Option<f64>)> {
    let text = text.trim();
    let Some((label, rest)) = text.split_once('(') else {
        return Some((text.to_string(), None));
    };
    let inner = rest.split_once(')')?.0.trim().replace('\u{2212}', "-");
    let spread = if inner.eq_ignore_ascii_case("pk") || inner.eq_ignore_ascii_case("even") {
        0.0
    } else {
        inner
            .trim_start_matches('+')
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())?
    };
    Some((label.trim().to_string(), Some(spread)))
}

/// Parse "Washington at Philadelphia (-13.5)" or "Minnesota (-11.5) at New Orleans".
/// Text that is not shaped like a line gives `None`.
fn parse_board_line(text: &str) -> Option<BoardLine> {
    let text = text.replace('\u{a0}', " ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let (away, home) = text.split_once(" at ").or_else(|| text.split_once(" @ "))?;
    let (away, away_spread) = split_label(away)?;
    let (home, home_spread) = split_label(home)?;
    if away.is_empty() || home.is_empty() || (away_spread.is_none() && home_spread.is_none()) {
        return None;
    }
    Some(BoardLine {
        away,
        home,
        away_spread,
        home_spread,
    })
}

/// Resolved line for one pairing: (away, home, away_spread).
pub type ResolvedLine = (Team, Team, f64);

fn resolve_board_line(line: &BoardLine) -> Result<ResolvedLine, ScheduleParseError> {
    let away = matcher::resolve(&line.away)?;
    let home = matcher::resolve(&line.home)?;
    let away_spread = match (line.away_spread, line.home_spread) {
        (Some(a), Some(h)) => {
            if (a + h).abs() > SPREAD_TOLERANCE {
                return Err(ScheduleParseError::SpreadMismatch {
                    away: away.slug().to_string(),
                    home: home.slug().to_string(),
                    away_spread: a,
                    home_spread: h,
                });
            }
            a
        }
        (Some(a), None) => a,
        (None, Some(h)) => negate(h),
        (None, None) => 0.0,
    };
    Ok((away, home, away_spread))
}

/// Lines published in the sidebar table. Links elsewhere on the page are never read.
pub fn parse_spread_board(html: &str) -> Result<Vec<ResolvedLine>, ScheduleParseError> {
    let document = Html::parse_document(html);
    let links = selector("aside.right-sidebar table.tr-table a");

    document
        .select(&links)
        .filter_map(|a| parse_board_line(&a.text().collect::<String>()))
        .map(|line| resolve_board_line(&line))
        .collect()
}

// ── Matchups ─────────────────────────────────────────────────────────

/// Build today's matchups from the scoreboard, attaching lines from the spread board.
///
/// Zero games is an error only when `expectation` says games should exist.
pub fn parse_todays_matchups(
    docs: &ScheduleDocuments,
    expectation: DayExpectation,
    today: NaiveDate,
    zone: DisplayZone,
) -> Result<Vec<Matchup>, ScheduleParseError> {
    let board: NbaScoreboard = serde_json::from_str(&docs.scoreboard)
        .map_err(|e| ScheduleParseError::MalformedPayload(e.to_string()))?;

    if let Some(date) = board.scoreboard.game_date {
        if date != today {
            tracing::warn!(%date, %today, "scoreboard is for a different day");
        }
    }

    let lines = match &docs.spread_board {
        Some(html) => parse_spread_board(&html)?,
        None => Vec::new(),
    };

    let mut matchups = Vec::with_capacity(board.scoreboard.games.len());
    for game in board.scoreboard.games {
        let away = game.away_team.resolve()?;
        let home = game.home_team.resolve()?;
        let away_spread = lines
            .iter()
            .find(|(a, h, _)| *a == away && *h == home)
            .map(|(_, _, s)| *s);
        if away_spread.is_none() && docs.spread_board.is_some() {
            tracing::debug!(away = %away, home = %home, "no line published");
        }
        matchups.push(Matchup {
            game_id: game.game_id,
            start: zone.to_local(game.game_time_utc),
            away: MatchupSide {
                team: away,
                spread: away_spread,
            },
            home: MatchupSide {
                team: home,
                spread: away_spread.map(negate),
            },
        });
    }

    if matchups.is_empty() {
        match expectation {
            DayExpectation::GamesExpected => {
                return Err(ScheduleParseError::NoGames { date: today })
            }
            DayExpectation::OffDay => tracing::info!(%today, "off day, no games scheduled"),
            DayExpectation::Unknown => {
                tracing::warn!(%today, "no games found and no season signal for this date")
            }
        }
    }

    matchups.sort_by_key(|m| m.start);
    Ok(matchups)
}
