//! Git plumbing for the target program's repository: enumerating the commits
//! to analyze and checking each one out before its harness run.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use log::info;
use tokio::process::Command;

use crate::core::harness::executor::forward_lines;
use crate::types::{AppError, AppResult};

const LOG_TIMEOUT: Duration = Duration::from_secs(10);
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// One commit selected for analysis.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,
    pub timestamp: DateTime<FixedOffset>,
}

/// Lists the commits to analyze by running
/// `git log --format=%H-%cD <git_args>` in the target repository. The caller
/// controls selection and ordering entirely through `git_args` (for example
/// `--reverse --date-order faults ^master`).
pub async fn list_commits(work_dir: &Path, git_args: &str) -> AppResult<Vec<CommitInfo>> {
    let mut command = Command::new("git");
    command
        .arg("log")
        .arg("--format=%H-%cD")
        .args(git_args.split_whitespace())
        .current_dir(work_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    info!("Running `git log --format=%H-%cD {git_args}` to find commits...");

    let output = tokio::time::timeout(LOG_TIMEOUT, command.output())
        .await
        .map_err(|_| AppError::Git("timed out while listing commits".to_string()))?
        .map_err(|e| AppError::Git(format!("could not run git log: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Git(format!(
            "git log exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_commit_line(line.trim()))
        .collect()
}

/// Splits one `%H-%cD` line into a hash and its RFC 2822 committer date.
fn parse_commit_line(line: &str) -> AppResult<CommitInfo> {
    let (hash, date) = line
        .split_once('-')
        .ok_or_else(|| AppError::Git(format!("malformed git log line {line:?}")))?;

    let timestamp = DateTime::parse_from_rfc2822(date.trim())
        .map_err(|e| AppError::Git(format!("bad commit date in {line:?}: {e}")))?;

    Ok(CommitInfo {
        hash: hash.to_string(),
        timestamp,
    })
}

/// Checks out the given commit in the target repository, streaming git's
/// stderr to the log. The git process is killed if it exceeds the timeout.
pub async fn checkout(work_dir: &Path, commit_hash: &str) -> AppResult<()> {
    let mut child = Command::new("git")
        .arg("checkout")
        .arg(commit_hash)
        .current_dir(work_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AppError::Git(format!("could not run git checkout: {e}")))?;

    info!("Running `git checkout {commit_hash}`...");

    let stdout = child.stdout.take().map(|s| forward_lines(s, "git"));
    let stderr = child.stderr.take().map(|s| forward_lines(s, "git"));

    let waited = tokio::time::timeout(CHECKOUT_TIMEOUT, child.wait()).await;
    if waited.is_err() {
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
    if let Some(task) = stdout {
        let _ = task.await;
    }
    if let Some(task) = stderr {
        let _ = task.await;
    }

    match waited {
        Ok(status) => {
            let status = status.map_err(|e| AppError::Git(format!("git checkout failed: {e}")))?;
            if status.success() {
                Ok(())
            } else {
                Err(AppError::Git(format!(
                    "git checkout {commit_hash} exited with {status}"
                )))
            }
        }
        Err(_) => Err(AppError::Git(format!(
            "timed out while checking out commit {commit_hash}"
        ))),
    }
}
