//! Team ATS results page parser.
//!
//! The page carries one "detailed ATS performance" table among several others. We find it
//! by what its header cells say, not by where it sits, and map each column by role so that
//! reordered or reworded headers keep working.

use super::selector;
use super::types::{ats_diff_for, expected_margin, GameRecord, Outcome, Season};
use crate::engine::matcher::{self, Team};
use crate::error::ResultParseError;
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use serde::Serialize;

/// Largest tolerated gap between the published diff and margin-vs-line.
const DIFF_TOLERANCE: f64 = 0.05;
const MAX_SKIP_SAMPLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Location,
    Opponent,
    OpponentRank,
    Line,
    Result,
    Diff,
}

/// Guess a header cell's role from its text ("Date", "H/A/N", "LAC Line", "ATS Diff", ...).
fn classify_header(text: &str) -> Option<Column> {
    let h = clean_text(text).to_lowercase();
    if h.is_empty() {
        return None;
    }
    // Rank before opponent: "Opp Rank" would otherwise read as the opponent column.
    if h.contains("rank") || h == "rk" || h == "opp rk" {
        return Some(Column::OpponentRank);
    }
    if h.contains("date") {
        return Some(Column::Date);
    }
    if matches!(h.as_str(), "h/a/n" | "h/a" | "loc" | "site" | "home/away") || h.contains("location") {
        return Some(Column::Location);
    }
    if h.contains("opp") {
        return Some(Column::Opponent);
    }
    if h.contains("line") || h.contains("spread") {
        return Some(Column::Line);
    }
    if h.contains("result") || h == "w/l" {
        return Some(Column::Result);
    }
    if h.contains("diff") || h.contains("cover margin") {
        return Some(Column::Diff);
    }
    None
}

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    opponent: usize,
    line: usize,
    result: usize,
    diff: usize,
    location: Option<usize>,
    opponent_rank: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Option<Self> {
        let mut date = None;
        let mut opponent = None;
        let mut line = None;
        let mut result = None;
        let mut diff = None;
        let mut location = None;
        let mut opponent_rank = None;

        for (idx, text) in headers.iter().enumerate() {
            let slot = match classify_header(text) {
                Some(Column::Date) => &mut date,
                Some(Column::Opponent) => &mut opponent,
                Some(Column::Line) => &mut line,
                Some(Column::Result) => &mut result,
                Some(Column::Diff) => &mut diff,
                Some(Column::Location) => &mut location,
                Some(Column::OpponentRank) => &mut opponent_rank,
                None => continue,
            };
            slot.get_or_insert(idx);
        }

        Some(Self {
            date: date?,
            opponent: opponent?,
            line: line?,
            result: result?,
            diff: diff?,
            location,
            opponent_rank,
        })
    }

    fn min_cells(&self) -> usize {
        [
            Some(self.date),
            Some(self.opponent),
            Some(self.line),
            Some(self.result),
            Some(self.diff),
            self.location,
            self.opponent_rank,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// A data row we could not turn into a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// 1-based position among the table's data rows.
    pub row: usize,
    pub reason: String,
}

/// Output of one results page: the records plus an account of what was dropped.
#[derive(Debug, Clone, Default)]
pub struct ParsedResults {
    pub records: Vec<GameRecord>,
    /// Rows that looked like games but failed to parse.
    pub skipped: usize,
    /// First few skipped rows, for logs and reports.
    pub skip_samples: Vec<SkippedRow>,
    /// Scheduled games with no result yet. Not an error.
    pub unplayed: usize,
}

impl ParsedResults {
    fn record_skip(&mut self, team: Team, row: usize, reason: String) {
        tracing::warn!(team = %team, row, reason = reason.as_str(), "skipping results row");
        self.skipped += 1;
        if self.skip_samples.len() < MAX_SKIP_SAMPLES {
            self.skip_samples.push(SkippedRow { row, reason });
        }
    }
}

enum RowOutcome {
    Record(GameRecord),
    Unplayed,
    /// Spacer, footnote or repeated header: not a game row at all.
    Ignored,
    Skip(String),
}

/// Clean text by replacing non-breaking spaces, unicode minus signs and trimming.
fn clean_text(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .replace('\u{2212}', "-")
        .trim()
        .to_string()
}

fn cell_text(cell: &ElementRef) -> String {
    clean_text(&cell.text().collect::<String>())
}

/// Header texts of a table: the first `thead` row, else the first row made only of `th`.
fn header_texts(table: &ElementRef) -> Vec<String> {
    let thead_row = selector("thead tr");
    let tr = selector("tr");
    let th = selector("th");
    let td = selector("td");

    let header_row = table.select(&thead_row).next().or_else(|| {
        table
            .select(&tr)
            .find(|row| row.select(&th).next().is_some() && row.select(&td).next().is_none())
    });

    header_row
        .map(|row| row.select(&th).map(|c| cell_text(&c)).collect())
        .unwrap_or_default()
}

/// Parse a signed number such as "-6.5", "+3", "−2.0". `PK`/`pick` mean zero.
/// Returns `Ok(None)` for placeholders that mean "no value" and `Err` for anything else,
/// including `NaN` and infinities, which `f64::from_str` would otherwise accept.
fn parse_signed(text: &str, allow_pickem: bool) -> Result<Option<f64>, ()> {
    let t = clean_text(text);
    let lower = t.to_lowercase();
    if t.is_empty() || matches!(lower.as_str(), "-" | "--" | "\u{2014}" | "n/a" | "na" | "off") {
        return Ok(None);
    }
    if allow_pickem && matches!(lower.as_str(), "pk" | "pick" | "pickem" | "pick'em" | "even") {
        return Ok(Some(0.0));
    }
    // Tolerate a leading team label ("LAC -6.5") by taking the last token.
    let token = t.split_whitespace().last().unwrap_or("");
    token
        .trim_start_matches('+')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or(())
}

/// Parse "W by 12", "L by 5", "W 112-104", "W" or "Lost" into an outcome and optional margin.
fn parse_result(text: &str) -> Option<(Outcome, Option<u32>)> {
    let t = clean_text(text);
    let mut tokens = t.split_whitespace();
    let head = tokens.next()?.to_uppercase();
    let outcome = match head.as_str() {
        "W" | "WON" | "WIN" => Outcome::Win,
        "L" | "LOST" | "LOSS" => Outcome::Loss,
        _ => return None,
    };
    let rest: Vec<&str> = tokens.collect();
    let margin = match rest.as_slice() {
        [] => None,
        [by, n] if by.eq_ignore_ascii_case("by") => Some(n.parse::<u32>().ok()?),
        [score] => {
            let (a, b) = score.split_once('-')?;
            let a: u32 = a.trim().parse().ok()?;
            let b: u32 = b.trim().parse().ok()?;
            Some(a.abs_diff(b))
        }
        _ => return None,
    };
    Some((outcome, margin))
}

fn month_number(token: &str) -> Option<u32> {
    let upper = token.to_uppercase();
    let m = match upper.get(0..3)? {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    Some(m)
}

/// Accepts `2025-11-28`, `11/28/2025`, `11/28/25`, `11/28` and `Nov 28` (optionally with a
/// weekday or year). Dates without a year are placed by season.
fn parse_date(text: &str, season: Season) -> Option<NaiveDate> {
    let t = clean_text(text);
    if let Ok(d) = NaiveDate::parse_from_str(&t, "%Y-%m-%d") {
        return Some(d);
    }

    let parts: Vec<&str> = t.split('/').map(str::trim).collect();
    match parts.as_slice() {
        [m, d] => return season.date_for(m.parse().ok()?, d.parse().ok()?),
        [m, d, y] => {
            let year: i32 = match y.len() {
                2 => 2000 + y.parse::<i32>().ok()?,
                4 => y.parse().ok()?,
                _ => return None,
            };
            return NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?);
        }
        _ => {}
    }

    let tokens: Vec<&str> = t
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .collect();
    let pos = tokens.iter().position(|tok| month_number(tok).is_some())?;
    let month = month_number(tokens[pos])?;
    let day: u32 = tokens.get(pos + 1)?.parse().ok()?;
    match tokens.get(pos + 2).and_then(|y| y.parse::<i32>().ok()) {
        Some(year) if year > 1900 => NaiveDate::from_ymd_opt(year, month, day),
        _ => season.date_for(month, day),
    }
}

/// Strip away markers from an opponent cell. Returns the bare label and whether it was marked away.
fn split_opponent(text: &str) -> (String, bool) {
    let t = clean_text(text);
    if let Some(rest) = t.strip_prefix('@') {
        return (rest.trim().to_string(), true);
    }
    let lower = t.to_lowercase();
    if lower.starts_with("at ") {
        return (t[3..].trim().to_string(), true);
    }
    if lower.starts_with("vs. ") {
        return (t[4..].trim().to_string(), false);
    }
    if lower.starts_with("vs ") {
        return (t[3..].trim().to_string(), false);
    }
    (t, false)
}

fn parse_location(text: &str) -> Option<bool> {
    match clean_text(text).to_lowercase().as_str() {
        "home" | "h" => Some(true),
        "away" | "a" | "@" | "road" => Some(false),
        "neutral" | "n" => Some(false),
        _ => None,
    }
}

fn parse_rank(text: &str) -> Option<u16> {
    clean_text(text).trim_start_matches('#').parse::<u16>().ok().filter(|r| *r > 0)
}

fn parse_row(
    cells: &[String],
    columns: &ColumnMap,
    season: Season,
) -> Result<RowOutcome, ResultParseError> {
    let non_empty = cells.iter().filter(|c| !c.is_empty()).count();
    if non_empty <= 1 {
        return Ok(RowOutcome::Ignored);
    }
    if cells.len() < columns.min_cells() {
        return Ok(RowOutcome::Skip(format!(
            "row has {} cells, expected at least {}",
            cells.len(),
            columns.min_cells()
        )));
    }

    let date_text = &cells[columns.date];
    if date_text.eq_ignore_ascii_case("date") {
        return Ok(RowOutcome::Ignored);
    }

    let result_text = &cells[columns.result];
    if result_text.is_empty() || matches!(result_text.as_str(), "-" | "--" | "\u{2014}") {
        return Ok(RowOutcome::Unplayed);
    }

    let Some(date) = parse_date(date_text, season) else {
        return Ok(RowOutcome::Skip(format!("unparseable date {date_text:?}")));
    };

    let (opponent_label, marked_away) = split_opponent(&cells[columns.opponent]);
    let opponent = matcher::resolve(&opponent_label)?;

    let is_home = match columns.location {
        Some(idx) => match parse_location(&cells[idx]) {
            Some(home) => home,
            None => {
                return Ok(RowOutcome::Skip(format!(
                    "unrecognized location {:?}",
                    cells[idx]
                )))
            }
        },
        None => !marked_away,
    };

    let opponent_rank = columns.opponent_rank.and_then(|idx| parse_rank(&cells[idx]));

    let Ok(spread) = parse_signed(&cells[columns.line], true) else {
        return Ok(RowOutcome::Skip(format!(
            "non-numeric spread {:?}",
            cells[columns.line]
        )));
    };
    let Ok(diff) = parse_signed(&cells[columns.diff], false) else {
        return Ok(RowOutcome::Skip(format!(
            "non-numeric diff {:?}",
            cells[columns.diff]
        )));
    };
    let Some((result, stated_margin)) = parse_result(result_text) else {
        return Ok(RowOutcome::Skip(format!("unrecognized result {result_text:?}")));
    };

    let margin: i32 = match (stated_margin, spread, diff) {
        (Some(m), _, _) => {
            let m = m as i32;
            if result == Outcome::Win {
                m
            } else {
                -m
            }
        }
        // Result without a margin: recover it from the differential and the line.
        (None, Some(s), Some(d)) => {
            let derived = d + expected_margin(s);
            if (derived - derived.round()).abs() > DIFF_TOLERANCE {
                return Ok(RowOutcome::Skip(format!(
                    "derived margin {derived} is not a whole number"
                )));
            }
            derived.round() as i32
        }
        (None, _, _) => {
            return Ok(RowOutcome::Skip("no margin in result and no line to derive it".into()))
        }
    };

    let consistent = match result {
        Outcome::Win => margin > 0,
        Outcome::Loss => margin < 0,
    };
    if !consistent {
        return Ok(RowOutcome::Skip(format!(
            "result {result_text:?} contradicts margin {margin}"
        )));
    }

    let ats_diff = match spread {
        Some(s) => {
            let computed = ats_diff_for(margin, s);
            if let Some(d) = diff {
                if (d - computed).abs() > DIFF_TOLERANCE {
                    return Ok(RowOutcome::Skip(format!(
                        "diff {d:+} contradicts margin {margin} against line {s:+}"
                    )));
                }
            }
            Some(computed)
        }
        None => None,
    };

    Ok(RowOutcome::Record(GameRecord {
        date,
        is_home,
        opponent,
        opponent_rank,
        spread,
        result,
        margin,
        ats_diff,
    }))
}

/// Extract `team`'s game-by-game ATS record from a results page.
///
/// Per-row problems are skipped and counted. A missing table or an opponent that does not
/// resolve to a known team fails the whole page.
pub fn parse_historical_results(
    html: &str,
    team: Team,
    season: Season,
) -> Result<ParsedResults, ResultParseError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table");
    let tr = selector("tr");
    let td = selector("td");

    let mut tables_seen = 0;
    let mut found = None;
    for table in document.select(&table_sel) {
        tables_seen += 1;
        if let Some(columns) = ColumnMap::from_headers(&header_texts(&table)) {
            found = Some((table, columns));
            break;
        }
    }
    let Some((table, columns)) = found else {
        return Err(ResultParseError::TableNotFound { tables_seen });
    };

    let mut parsed = ParsedResults::default();
    let mut data_row = 0;
    for row in table.select(&tr) {
        let cells: Vec<String> = row.select(&td).map(|c| cell_text(&c)).collect();
        if cells.is_empty() {
            continue;
        }
        data_row += 1;
        match parse_row(&cells, &columns, season)? {
            RowOutcome::Record(record) => parsed.records.push(record),
            RowOutcome::Unplayed => parsed.unplayed += 1,
            RowOutcome::Ignored => {}
            RowOutcome::Skip(reason) => parsed.record_skip(team, data_row, reason),
        }
    }

    parsed.records.sort_by_key(|r| r.date);
    tracing::debug!(
        team = %team,
        games = parsed.records.len(),
        skipped = parsed.skipped,
        unplayed = parsed.unplayed,
        "parsed ATS results"
    );
    Ok(parsed)
}
