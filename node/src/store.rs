//! Snapshot persistence.
//!
//! A deployment is stored as pretty JSON. Writes go to a sibling temporary
//! file first and are renamed into place, so a crash never leaves a
//! half-written snapshot.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use levy_contracts::{Deployment, LedgerConfig};

pub fn load(path: &Path) -> Result<Deployment> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

pub fn save(path: &Path, deployment: &Deployment) -> Result<()> {
    let json = serde_json::to_string_pretty(deployment).context("failed to encode snapshot")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move snapshot into {}", path.display()))?;
    Ok(())
}

/// Writes a new snapshot, refusing to clobber an existing one unless `force`.
pub fn create(path: &Path, deployment: &Deployment, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "snapshot {} already exists (pass --force to replace it)",
            path.display()
        );
    }
    save(path, deployment)
}

/// Reads a deployment config, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    let Some(path) = path else {
        return Ok(LedgerConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}
