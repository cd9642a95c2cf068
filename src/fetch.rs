//! Fetching a remote repository into a temporary working copy.
//!
//! Analysis itself only ever reads a materialized tree; this is the glue
//! that materializes one from a URL. The clone is shallow and lives in a
//! temporary directory that is removed when the returned guard drops.

use anyhow::Context;
use std::path::PathBuf;
use tempfile::TempDir;

/// Clone `url` and return the tempdir guard plus the checkout path.
///
/// The guard must be kept alive for as long as the checkout is read.
pub async fn fetch_repository(url: &str) -> anyhow::Result<(TempDir, PathBuf)> {
    let temp = TempDir::new().context("failed to create temporary directory")?;
    let target = temp.path().join("repo");

    eprintln!("Cloning {}...", url);
    let status = tokio::process::Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(url)
        .arg(&target)
        .status()
        .await
        .context("failed to run git; is it installed?")?;

    if !status.success() {
        anyhow::bail!("git clone failed for {}", url);
    }

    Ok((temp, target))
}
