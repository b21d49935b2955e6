//! File-backed host: plan and record JSON files on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::lifecycle::{Lifecycle, Operation, Outcome};
use crate::model::Record;

/// What a host request did to the record file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// The record file was removed.
    pub removed: bool,
    /// Desired attributes that changed without being applied remotely.
    pub unapplied: Vec<&'static str>,
}

/// Run one host request against the record at `state`.
///
/// Lifecycle failures come back as a [`crate::Diagnostic`] inside the
/// returned error.
pub async fn run<L>(
    lifecycle: &L,
    operation: Operation,
    state: &Path,
    plan: Option<&Path>,
) -> Result<Report>
where
    L: Lifecycle,
    L::Desired: Serialize + DeserializeOwned,
{
    let title = lifecycle.error_title(operation);
    let mut report = Report::default();

    match operation {
        Operation::Create => {
            let desired: L::Desired = read_json(require_plan(plan)?).await?;
            let record = lifecycle
                .create(desired)
                .await
                .map_err(|e| e.diagnostic(title))?;
            write_json(state, &record).await?;
        }
        Operation::Read => {
            let record: Record<L::Desired> = read_json(state).await?;
            match lifecycle
                .read(record)
                .await
                .map_err(|e| e.diagnostic(title))?
            {
                Outcome::Persist(record) => write_json(state, &record).await?,
                Outcome::Remove => {
                    info!(path = %state.display(), "Resource is gone, removing record");
                    remove(state).await?;
                    report.removed = true;
                }
            }
        }
        Operation::Update => {
            let desired: L::Desired = read_json(require_plan(plan)?).await?;
            let prior: Record<L::Desired> = read_json(state).await?;
            let outcome = lifecycle
                .update(prior, desired)
                .await
                .map_err(|e| e.diagnostic(title))?;
            write_json(state, &outcome.record).await?;
            report.unapplied = outcome.unapplied;
        }
        Operation::Delete => {
            let record: Record<L::Desired> = read_json(state).await?;
            lifecycle
                .delete(record)
                .await
                .map_err(|e| e.diagnostic(title))?;
            remove(state).await?;
            report.removed = true;
        }
    }

    Ok(report)
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Write `value` to a sibling file and rename it over `path`.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut contents = serde_json::to_vec_pretty(value)?;
    contents.push(b'\n');
    let tmp = sibling_tmp(path);
    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("failed to replace {}", path.display()));
    }
    debug!(path = %path.display(), "Record written");
    Ok(())
}

fn sibling_tmp(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Remove a record file. A file that is already gone is fine.
pub async fn remove(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}

fn require_plan(plan: Option<&Path>) -> Result<&Path> {
    plan.context("this operation needs --plan")
}
