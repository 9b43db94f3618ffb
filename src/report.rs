//! Structured run output handed to the renderer.

use crate::engine::matcher::Team;
use crate::engine::metrics::TeamMetrics;
use crate::error::FailureKind;
use crate::feed::results::SkippedRow;
use crate::feed::types::Matchup;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// Refreshed in this run.
    Fresh,
    /// Refresh failed; metrics come from the previous snapshot.
    Stale,
    /// Refresh failed and there is no previous snapshot.
    NoData,
    /// Not playing today, so not refreshed; metrics come from the stored snapshot.
    Snapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub status: SnapshotStatus,
    /// Absent for `no_data`. Never zero-filled.
    pub metrics: Option<TeamMetrics>,
    /// Why the team is not fresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub skipped_rows: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_samples: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    pub team: Team,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub matchups: Vec<Matchup>,
    /// Set when the spread board was fetched but could not be read; matchups carry no lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread_board_error: Option<String>,
    pub teams: BTreeMap<Team, TeamReport>,
    pub failures: Vec<FailureEntry>,
}

impl RunReport {
    pub fn fresh_count(&self) -> usize {
        self.teams
            .values()
            .filter(|t| t.status == SnapshotStatus::Fresh)
            .count()
    }

    /// Something was attempted and nothing was refreshed.
    pub fn is_total_failure(&self) -> bool {
        !self.failures.is_empty() && self.fresh_count() == 0
    }

    /// Write as pretty JSON, replacing any previous report.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// Outcome of one full refresh of every team.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    pub refreshed: Vec<BackfillEntry>,
    pub failures: Vec<FailureEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackfillEntry {
    pub team: Team,
    pub games: usize,
    pub skipped_rows: usize,
}

impl BackfillReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}
