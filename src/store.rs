//! Review report persistence
//!
//! Keeps past reports in a single JSON file under the platform data dir,
//! newest first. Writes go through a temp file + rename so an interrupted
//! write can't truncate history. Best-effort storage for a CLI - callers
//! that can't open the store still get their review printed.

use crate::review::AnalysisResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const STORE_FILE: &str = "reviews.json";

/// A persisted review report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub filename: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

impl ReviewRecord {
    pub fn new(filename: String, language: String, result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            language,
            created_at: Utc::now(),
            result,
        }
    }
}

/// File-backed review store
pub struct ReviewStore {
    path: PathBuf,
}

impl ReviewStore {
    /// Open the store in the platform data dir, creating it if needed
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("Could not determine data directory")?
            .join("critic");
        Self::open(&dir)
    }

    /// Open the store in a specific directory
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self {
            path: dir.join(STORE_FILE),
        })
    }

    fn read_all(&self) -> Result<Vec<ReviewRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Review store {} is corrupted", self.path.display()))
    }

    fn write_all(&self, records: &[ReviewRecord]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err).with_context(|| format!("Failed to replace {}", self.path.display()));
        }
        Ok(())
    }

    /// Persist a new record, newest first
    pub fn add(&self, record: ReviewRecord) -> Result<()> {
        let mut records = self.read_all()?;
        records.insert(0, record);
        self.write_all(&records)
    }

    /// Most recent records, up to `limit`
    pub fn list(&self, limit: usize) -> Result<Vec<ReviewRecord>> {
        let mut records = self.read_all()?;
        records.truncate(limit);
        Ok(records)
    }

    /// Look up a record by id
    pub fn get(&self, id: Uuid) -> Result<Option<ReviewRecord>> {
        Ok(self.read_all()?.into_iter().find(|r| r.id == id))
    }

    /// Delete a record by id; returns whether anything was removed
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.read_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records)?;
        Ok(true)
    }
}
