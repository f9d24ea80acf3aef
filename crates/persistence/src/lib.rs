#![deny(warnings)]

//! Save snapshots: a career session as JSON or compact binary.
//!
//! Jobs are stored whole but re-attached from the live catalog on restore,
//! so a save only survives catalog edits that keep its job ids.

use career_core::{CatalogError, Job, JobCatalog, PlayerStats};
use career_runtime::{EventDeck, PendingState, ScheduledEvent, SessionParts};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Current snapshot layout.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary: {0}")]
    Binary(#[from] bincode::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("save version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Encoding picked from the file extension: `.json` or anything else as binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Binary,
}

impl SaveFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            _ => SaveFormat::Binary,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub version: u32,
    pub stats: PlayerStats,
    pub pending: PendingState,
    pub deck: EventDeck,
    pub tick: u64,
    pub scheduled: Option<ScheduledEvent>,
}

impl SaveSnapshot {
    pub fn capture(parts: SessionParts) -> Self {
        Self {
            version: SAVE_VERSION,
            stats: parts.stats,
            pending: parts.pending,
            deck: parts.deck,
            tick: parts.tick,
            scheduled: parts.scheduled,
        }
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SaveError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Check the version and swap every stored job for the catalog's copy.
    pub fn restore(self, catalog: &JobCatalog) -> Result<SessionParts, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::Version {
                found: self.version,
                expected: SAVE_VERSION,
            });
        }
        let mut stats = self.stats;
        stats.current_job = reattach(catalog, &stats.current_job)?;
        let pending = match self.pending {
            PendingState::None => PendingState::None,
            PendingState::Interview { job } => PendingState::Interview {
                job: reattach(catalog, &job)?,
            },
            PendingState::Selection { jobs } => PendingState::Selection {
                jobs: jobs
                    .iter()
                    .map(|j| reattach(catalog, j))
                    .collect::<Result<_, _>>()?,
            },
        };
        Ok(SessionParts {
            stats,
            pending,
            deck: self.deck,
            tick: self.tick,
            scheduled: self.scheduled,
        })
    }
}

fn reattach(catalog: &JobCatalog, job: &Job) -> Result<Job, SaveError> {
    Ok(catalog.require(job.id.as_str())?.clone())
}

/// Write a snapshot, creating parent directories as needed.
pub fn write_save(path: &Path, snapshot: &SaveSnapshot) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match SaveFormat::for_path(path) {
        SaveFormat::Json => std::fs::write(path, snapshot.to_json()?)?,
        SaveFormat::Binary => std::fs::write(path, snapshot.to_bytes()?)?,
    }
    info!(path = %path.display(), tick = snapshot.tick, "saved");
    Ok(())
}

pub fn read_save(path: &Path) -> Result<SaveSnapshot, SaveError> {
    match SaveFormat::for_path(path) {
        SaveFormat::Json => SaveSnapshot::from_json(&std::fs::read_to_string(path)?),
        SaveFormat::Binary => SaveSnapshot::from_bytes(&std::fs::read(path)?),
    }
}
