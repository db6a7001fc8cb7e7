// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-table task store.
//!
//! One JSON file holds every row. Each write replaces the file through a
//! temp file and rename, so a crash leaves either the old or the new table.
//! An exclusive lock on a sibling `.lock` file is held while the store is open.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use nt_core::kind::{GROUP, VERSION};
use nt_core::JobKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current store file schema version
pub const CURRENT_STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store {} is locked by another process", .path.display())]
    Locked { path: PathBuf },
    #[error("unsupported store version {found}")]
    Version { found: u32 },
    #[error("invalid resource key: {0}")]
    Key(#[from] nt_core::KeyError),
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    /// Job name.
    pub name: String,
    pub gvr: String,
    /// Task body as received.
    pub value: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(rename = "v")]
    version: u32,
    updated_at: DateTime<Utc>,
    rows: Vec<Row>,
}

/// `{group}/{version}/{plural}` for a kind.
pub fn gvr(kind: JobKind) -> String {
    format!("{GROUP}/{VERSION}/{}", kind.plural())
}

/// Row key for one node of one job.
pub fn task_key(kind: JobKind, job_name: &str, node_name: &str) -> String {
    format!("/{}/{job_name}/nodes/{node_name}", gvr(kind))
}

/// Inverse of [`task_key`].
pub fn parse_task_key(key: &str) -> Option<(JobKind, String, String)> {
    let mut parts = key.strip_prefix('/')?.split('/');
    let (group, version, plural) = (parts.next()?, parts.next()?, parts.next()?);
    if group != GROUP || version != VERSION {
        return None;
    }
    let kind = JobKind::ALL.into_iter().find(|k| k.plural() == plural)?;
    let job = parts.next().filter(|s| !s.is_empty())?;
    if parts.next()? != "nodes" {
        return None;
    }
    let node = parts.next().filter(|s| !s.is_empty())?;
    if parts.next().is_some() {
        return None;
    }
    Some((kind, job.to_string(), node.to_string()))
}

pub struct TaskStore {
    path: PathBuf,
    rows: Vec<Row>,
    _lock: File,
}

impl TaskStore {
    /// Open or create the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new().create(true).truncate(false).write(true).open(&lock_path)?;
        lock.try_lock_exclusive().map_err(|_| StoreError::Locked { path: path.clone() })?;

        let rows = if path.exists() { Self::load(&path)? } else { Vec::new() };
        tracing::debug!(path = %path.display(), rows = rows.len(), "task store opened");
        Ok(Self { path, rows, _lock: lock })
    }

    fn load(path: &Path) -> Result<Vec<Row>, StoreError> {
        let bytes = fs::read(path)?;
        let file: StoreFile = serde_json::from_slice(&bytes)?;
        if file.version != CURRENT_STORE_VERSION {
            return Err(StoreError::Version { found: file.version });
        }
        Ok(file.rows)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Store a task for `kind`, replacing whatever row the kind held.
    pub fn save(
        &mut self,
        kind: JobKind,
        job_name: &str,
        node_name: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let gvr = gvr(kind);
        let mut rows: Vec<Row> = self.rows.iter().filter(|r| r.gvr != gvr).cloned().collect();
        rows.push(Row {
            key: task_key(kind, job_name, node_name),
            name: job_name.to_string(),
            gvr,
            value,
        });
        self.persist(&rows)?;
        self.rows = rows;
        Ok(())
    }

    /// The row held for `kind`, if any.
    pub fn get(&self, kind: JobKind) -> Option<&Row> {
        let gvr = gvr(kind);
        self.rows.iter().find(|r| r.gvr == gvr)
    }

    /// Delete the row held for `kind`. Returns whether one existed.
    pub fn delete(&mut self, kind: JobKind) -> Result<bool, StoreError> {
        let gvr = gvr(kind);
        if !self.rows.iter().any(|r| r.gvr == gvr) {
            return Ok(false);
        }
        let rows: Vec<Row> = self.rows.iter().filter(|r| r.gvr != gvr).cloned().collect();
        self.persist(&rows)?;
        self.rows = rows;
        Ok(true)
    }

    fn persist(&self, rows: &[Row]) -> Result<(), StoreError> {
        let file = StoreFile { version: CURRENT_STORE_VERSION, updated_at: Utc::now(), rows: rows.to_vec() };
        let tmp = self.path.with_extension("tmp");
        let mut out = File::create(&tmp)?;
        serde_json::to_writer(&mut out, &file)?;
        out.flush()?;
        out.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
