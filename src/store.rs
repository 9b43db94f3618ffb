//! Per-team CSV snapshots.
//!
//! One file per team, `ats_results_<slug>.csv`. A refresh replaces the whole file; there is
//! no merge. Writes go to a sibling temp file that is renamed over the old snapshot, so a
//! reader sees either the previous set or the new one.

use crate::engine::matcher::Team;
use crate::error::StoreError;
use crate::feed::types::GameRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 8] = [
    "date",
    "is_home",
    "opponent",
    "opponent_rank",
    "spread",
    "result",
    "margin",
    "ats_diff",
];

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.display().to_string(),
        source,
    }
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, team: Team) -> PathBuf {
        self.data_dir.join(format!("ats_results_{}.csv", team.slug()))
    }

    /// Replace `team`'s snapshot with `records`.
    pub fn replace(&self, team: Team, records: &[GameRecord]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| io_err(&self.data_dir, e))?;

        let path = self.path_for(team);
        let tmp = path.with_extension("csv.tmp");

        let written = Self::write_csv(&tmp, records);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;

        tracing::debug!(team = %team, games = records.len(), path = %path.display(), "snapshot replaced");
        Ok(())
    }

    fn write_csv(path: &Path, records: &[GameRecord]) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| csv_err(path, e))?;
        writer.write_record(HEADER).map_err(|e| csv_err(path, e))?;
        for record in records {
            writer.serialize(record).map_err(|e| csv_err(path, e))?;
        }
        writer.flush().map_err(|e| io_err(path, e))?;
        Ok(())
    }

    /// Last snapshot for `team`, or `None` if it was never stored.
    pub fn load(&self, team: Team) -> Result<Option<Vec<GameRecord>>, StoreError> {
        let path = self.path_for(team);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&path).map_err(|e| csv_err(&path, e))?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<GameRecord>, _>>()
            .map_err(|e| csv_err(&path, e))?;
        Ok(Some(records))
    }

    /// Every team that has a snapshot. Unreadable snapshots are logged and left out.
    pub fn load_all(&self) -> Vec<(Team, Vec<GameRecord>)> {
        Team::ALL
            .iter()
            .filter_map(|&team| match self.load(team) {
                Ok(Some(records)) => Some((team, records)),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(team = %team, error = %e, "unreadable snapshot");
                    None
                }
            })
            .collect()
    }
}
