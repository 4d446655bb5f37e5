//! Diff acquisition from the backup repository.
//!
//! The backup directory is a git work tree with one file per device; each
//! daily snapshot is a commit. [`GitDiffSource`] runs the configured diff
//! command for one file and hands the raw text to the normalizer.

use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{CfgDiffError, Result};
use crate::hostname::{HostnameMatcher, UNKNOWN_HOSTNAME};
use crate::settings::FILE_PLACEHOLDER;

/// Injectable producer of per-device diff text.
///
/// Implement this to plug in other version-control layouts or test stubs.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Raw diff for `file`, or `None` when the diff is empty.
    async fn fetch_diff(&self, file: &str) -> Result<Option<String>>;

    /// Hostname of the device stored in `file`.
    async fn hostname(&self, file: &str, matcher: &HostnameMatcher) -> String;
}

/// Runs a shell diff command template inside the backup work tree.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    workdir: PathBuf,
    command_template: String,
}

impl GitDiffSource {
    pub fn new(workdir: impl Into<PathBuf>, command_template: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            command_template: command_template.into(),
        }
    }

    pub fn command_for(&self, file: &str) -> String {
        self.command_template.replace(FILE_PLACEHOLDER, file)
    }

    /// Full-context diff of `file`, so every line of the current config is
    /// present for hostname discovery.
    async fn full_context_diff(&self, file: &str) -> Result<String> {
        let content = tokio::fs::read_to_string(self.workdir.join(file)).await?;
        let context = content.lines().count().max(1);
        let output = Command::new("git")
            .args(["--no-pager", "diff", "HEAD^", "HEAD"])
            .arg(format!("-U{context}"))
            .arg("--")
            .arg(file)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(CfgDiffError::DiffCommand {
                file: file.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl DiffSource for GitDiffSource {
    async fn fetch_diff(&self, file: &str) -> Result<Option<String>> {
        let command = self.command_for(file);
        debug!(command = %command, "running diff command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(CfgDiffError::DiffCommand {
                file: file.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if stdout.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(stdout))
    }

    async fn hostname(&self, file: &str, matcher: &HostnameMatcher) -> String {
        match self.full_context_diff(file).await {
            Ok(text) => matcher.find_or_unknown(&text),
            Err(e) => {
                warn!(file = %file, error = %e, "hostname lookup failed");
                UNKNOWN_HOSTNAME.to_string()
            }
        }
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    StdCommand::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Regular, non-hidden files directly inside `dir`, sorted by name.
pub fn list_config_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        files.push(name);
    }
    files.sort();
    Ok(files)
}
