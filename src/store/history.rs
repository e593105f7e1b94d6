//! History of past runs, one JSON record per execution.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::OutcomeSink;
use crate::{config::Config, execution::ExecutionOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub script_id: String,
    pub finished_at: DateTime<Utc>,
    pub outcome: ExecutionOutcome,
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    length: usize,
    history_path: PathBuf,
}

impl HistoryLog {
    pub fn new(history_path: impl Into<PathBuf>, length: usize) -> Self {
        Self {
            length,
            history_path: history_path.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.history_path(), cfg.history_length())
    }

    /// All readable records, oldest first.
    pub fn list(&self) -> Result<Vec<HistoryRecord>> {
        if !self.history_path.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for path in self.entries()? {
            match read_record(&path) {
                Ok(r) => records.push(r),
                Err(e) => warn!("skipping history entry {}: {:#}", path.display(), e),
            }
        }
        records.sort_by_key(|r| r.finished_at);
        Ok(records)
    }

    fn entries(&self) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.history_path)
            .with_context(|| format!("reading history: {}", self.history_path.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        // Names start with a zero-padded timestamp, so name order is age order
        paths.sort();
        Ok(paths)
    }

    fn prune(&self) -> Result<()> {
        let entries = self.entries()?;
        if entries.len() > self.length {
            let to_delete = entries.len() - self.length;
            for p in &entries[..to_delete] {
                if let Err(e) = fs::remove_file(p) {
                    warn!("failed to prune history entry {}: {}", p.display(), e);
                }
            }
            debug!("pruned {} history entries", to_delete);
        }
        Ok(())
    }
}

impl OutcomeSink for HistoryLog {
    fn persist_outcome(&self, id: &str, outcome: &ExecutionOutcome) -> Result<()> {
        fs::create_dir_all(&self.history_path)
            .with_context(|| format!("creating history dir: {}", self.history_path.display()))?;

        let record = HistoryRecord {
            script_id: id.to_string(),
            finished_at: Utc::now(),
            outcome: outcome.clone(),
        };
        let name = format!(
            "{:020}-{}.json",
            record.finished_at.timestamp_nanos_opt().unwrap_or_default(),
            id.replace(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_', "_")
        );
        let p = self.history_path.join(name);
        fs::write(&p, serde_json::to_string_pretty(&record)?)
            .with_context(|| format!("writing history entry: {}", p.display()))?;
        self.prune()
    }
}

fn read_record(path: &Path) -> Result<HistoryRecord> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionStatus;

    fn outcome(stdout: &str) -> ExecutionOutcome {
        ExecutionOutcome {
            status: ExecutionStatus::Success,
            stdout: stdout.into(),
            stderr: String::new(),
            elapsed_millis: 5,
            exit_code: Some(0),
        }
    }

    #[test]
    fn persisted_outcomes_are_listed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history"), 10);
        log.persist_outcome("first", &outcome("1")).unwrap();
        log.persist_outcome("second", &outcome("2")).unwrap();

        let records = log.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].script_id, "first");
        assert_eq!(records[1].outcome.stdout, "2");
    }

    #[test]
    fn keeps_at_most_length_records() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path(), 2);
        for i in 0..5 {
            log.persist_outcome(&format!("run{}", i), &outcome(&i.to_string()))
                .unwrap();
        }
        let ids: Vec<_> = log.list().unwrap().into_iter().map(|r| r.script_id).collect();
        assert_eq!(ids, vec!["run3", "run4"]);
    }

    #[test]
    fn corrupt_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path(), 10);
        log.persist_outcome("ok", &outcome("x")).unwrap();
        fs::write(dir.path().join("00000000000000000000-bad.json"), "{").unwrap();
        assert_eq!(log.list().unwrap().len(), 1);
    }

    #[test]
    fn empty_when_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("none"), 10);
        assert!(log.list().unwrap().is_empty());
    }
}
