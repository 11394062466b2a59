//! JSON snapshot of the flat record lists.
//!
//! ```text
//! { "trials": [...], "results": [...], "varieties": [...] }
//! ```
//!
//! Writes go through a temp file and a rename so a crash never leaves a
//! half-written snapshot behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use vts_model::{ResultRecord, Trial, VarietyMetadata};

use crate::catalog::SiteCatalog;
use crate::error::{Result, StoreError};
use crate::memory::MemoryStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub trials: Vec<Trial>,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
    #[serde(default)]
    pub varieties: Vec<VarietyMetadata>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = fs::read(path).map_err(|e| StoreError::io("read", path, e))?;
    let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(
        path = %path.display(),
        sha256 = %sha256_hex(&bytes),
        trials = snapshot.trials.len(),
        results = snapshot.results.len(),
        varieties = snapshot.varieties.len(),
        "loaded store snapshot"
    );
    Ok(snapshot)
}

/// Loads a snapshot file into a [`MemoryStore`] with the given site catalog.
pub fn open_store(path: &Path, sites: SiteCatalog) -> Result<MemoryStore> {
    MemoryStore::from_snapshot(load_snapshot(path)?, sites)
}

pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot).map_err(StoreError::Serialize)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| StoreError::io("create", &temp_path, e))?;
    file.write_all(&bytes)
        .map_err(|e| StoreError::io("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| StoreError::io("sync", &temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| StoreError::io("rename", path, e))?;

    info!(path = %path.display(), sha256 = %sha256_hex(&bytes), "saved store snapshot");
    Ok(())
}

pub fn save_store(store: &MemoryStore, path: &Path) -> Result<()> {
    save_snapshot(&store.to_snapshot(), path)
}
