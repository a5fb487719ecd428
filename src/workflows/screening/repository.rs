use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{Case, CaseSnapshot, RawTender};

/// Ingestion collaborator: yields the raw tenders for a lookback window.
pub trait TenderSource: Send + Sync {
    fn fetch_tenders(&self, days_back: u32) -> Result<Vec<RawTender>, SourceError>;
}

/// Persistence collaborator: replaces the stored ranked case list.
pub trait CaseStore: Send + Sync {
    fn store(&self, cases: &[Case]) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read tender feed: {0}")]
    Io(#[from] std::io::Error),
    #[error("tender feed is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("tender feed unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write case file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode cases: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("case store unavailable: {0}")]
    Unavailable(String),
}

/// Reads a JSON array of raw tenders from disk. The lookback window is the
/// upstream collector's concern; a file feed is already windowed.
#[derive(Debug, Clone)]
pub struct JsonFileTenderSource {
    path: PathBuf,
}

impl JsonFileTenderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TenderSource for JsonFileTenderSource {
    fn fetch_tenders(&self, _days_back: u32) -> Result<Vec<RawTender>, SourceError> {
        let payload = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

/// Fixed in-memory feed for demos and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticTenderSource {
    tenders: Vec<RawTender>,
}

impl StaticTenderSource {
    pub fn new(tenders: Vec<RawTender>) -> Self {
        Self { tenders }
    }
}

impl TenderSource for StaticTenderSource {
    fn fetch_tenders(&self, _days_back: u32) -> Result<Vec<RawTender>, SourceError> {
        Ok(self.tenders.clone())
    }
}

/// Writes the ranked case list as pretty JSON, replacing the previous output
/// wholesale.
#[derive(Debug, Clone)]
pub struct JsonFileCaseStore {
    path: PathBuf,
}

impl JsonFileCaseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back the persisted case list, e.g. for a reporting surface that
    /// outlives the batch process.
    pub fn load(&self) -> Result<Vec<Case>, StoreError> {
        let payload = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

impl CaseStore for JsonFileCaseStore {
    fn store(&self, cases: &[Case]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_vec_pretty(cases)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// Keeps the latest snapshot in memory for the HTTP reporting surface.
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    snapshot: Mutex<Option<CaseSnapshot>>,
}

impl InMemoryCaseStore {
    pub fn snapshot(&self) -> Option<CaseSnapshot> {
        self.snapshot
            .lock()
            .expect("snapshot mutex poisoned")
            .clone()
    }
}

impl CaseStore for InMemoryCaseStore {
    fn store(&self, cases: &[Case]) -> Result<(), StoreError> {
        let mut guard = self.snapshot.lock().expect("snapshot mutex poisoned");
        *guard = Some(CaseSnapshot {
            cases: cases.to_vec(),
            total_count: cases.len(),
            generated_at: Utc::now(),
        });
        Ok(())
    }
}
