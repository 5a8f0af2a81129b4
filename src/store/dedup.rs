// store/dedup.rs
use crate::config::StorePolicy;
use crate::domain::property::PropertyRecord;
use crate::errors::StoreError;
use crate::spreadsheets::export_records_xlsx;
use crate::store::table::{read_records, timestamped_path, write_records};
use chrono::{Local, NaiveDateTime};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// What happened to a batch handed to `merge_and_persist`.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    /// Primary file rewritten with `total` records; `backup` is the snapshot.
    Saved {
        total: usize,
        backup: Option<PathBuf>,
    },
    /// The primary write failed; only the batch went to `temp`.
    FellBack { temp: PathBuf, error: String },
    /// Neither the primary nor the fallback write worked.
    Lost { error: String },
}

impl PersistOutcome {
    /// True when the batch reached disk somewhere.
    pub fn is_flushed(&self) -> bool {
        !matches!(self, PersistOutcome::Lost { .. })
    }
}

/// The durable, deduplicated property table plus its backup snapshots.
pub struct DedupStore {
    policy: StorePolicy,
}

impl DedupStore {
    pub fn new(policy: StorePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StorePolicy {
        &self.policy
    }

    /// Ids already in the primary file. A missing file is an empty store;
    /// an unreadable one is logged and also treated as empty.
    pub fn load(&self) -> HashSet<String> {
        let path = self.policy.primary_path();
        if !path.exists() {
            return HashSet::new();
        }

        match read_records(&path) {
            Ok(records) => {
                let ids: HashSet<String> = records.into_iter().map(|r| r.zpid).collect();
                info!(count = ids.len(), "Loaded existing ZPIDs");
                ids
            }
            Err(e) => {
                warn!("Error loading existing data: {e}");
                HashSet::new()
            }
        }
    }

    /// Current contents of the primary file.
    pub fn persisted(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        let path = self.policy.primary_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_records(&path)
    }

    /// Merges `new_records` into the store and rewrites the primary file,
    /// a backup snapshot and (optionally) the workbook mirror. Never fails:
    /// on error the batch alone is written to a temp file.
    pub fn merge_and_persist(&self, new_records: &[PropertyRecord]) -> PersistOutcome {
        let now = Local::now().naive_local();

        match self.try_persist(new_records, now) {
            Ok((total, backup)) => {
                info!(
                    saved = new_records.len(),
                    total,
                    path = %self.policy.primary_path().display(),
                    "Saved properties"
                );
                if let Some(backup) = &backup {
                    info!(path = %backup.display(), "Created backup");
                }
                PersistOutcome::Saved { total, backup }
            }
            Err(e) => {
                error!("Error saving data: {e}");
                self.write_fallback(new_records, now, e)
            }
        }
    }

    fn try_persist(
        &self,
        new_records: &[PropertyRecord],
        now: NaiveDateTime,
    ) -> Result<(usize, Option<PathBuf>), StoreError> {
        std::fs::create_dir_all(&self.policy.data_dir)
            .map_err(|e| StoreError::io(&self.policy.data_dir, e))?;

        let merged = merge_records(self.persisted()?, new_records);

        write_records(&self.policy.primary_path(), &merged)?;

        if self.policy.write_xlsx {
            export_records_xlsx(&merged, &self.policy.xlsx_path())?;
        }

        let backup = if self.policy.write_backups {
            let path = timestamped_path(
                &self.policy.data_dir,
                &self.policy.file_stem,
                "backup",
                now,
            );
            write_records(&path, &merged)?;
            Some(path)
        } else {
            None
        };

        Ok((merged.len(), backup))
    }

    fn write_fallback(
        &self,
        new_records: &[PropertyRecord],
        now: NaiveDateTime,
        cause: StoreError,
    ) -> PersistOutcome {
        let temp = timestamped_path(&self.policy.data_dir, &self.policy.file_stem, "temp", now);

        match write_records(&temp, new_records) {
            Ok(()) => {
                info!(path = %temp.display(), "Saved data to temporary file");
                PersistOutcome::FellBack {
                    temp,
                    error: cause.to_string(),
                }
            }
            Err(e) => {
                error!("Failed to save to temporary file: {e}");
                PersistOutcome::Lost {
                    error: format!("{cause}; fallback: {e}"),
                }
            }
        }
    }
}

/// One record per zpid, keeping the latest `fetch_date`. On equal dates the
/// record merged last wins, so new records beat existing ones. Survivors
/// come out ordered by `fetch_date`.
pub fn merge_records(
    existing: Vec<PropertyRecord>,
    new_records: &[PropertyRecord],
) -> Vec<PropertyRecord> {
    let mut all = existing;
    all.extend(new_records.iter().cloned());

    // Stable, so equal dates keep merge order.
    all.sort_by(|a, b| a.fetch_date.cmp(&b.fetch_date));

    let mut seen = HashSet::new();
    let mut kept: Vec<PropertyRecord> = all
        .into_iter()
        .rev()
        .filter(|r| seen.insert(r.zpid.clone()))
        .collect();
    kept.reverse();
    kept
}
