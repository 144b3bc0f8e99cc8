//! Runs the external test harness for one commit and parses what it wrote.

use std::process::Stdio;

use log::{error, info};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::core::harness::parser::parse_spectrum_file;
use crate::core::repo::CommitInfo;
use crate::types::config::HarnessSettings;
use crate::types::{AppError, AppResult, ExecutionSpectrum};

/// The harness script and the settings it is invoked with. Each
/// [`execute`](TestHarness::execute) call spawns a fresh process:
///
/// ```text
/// <harness> --work-directory=<repo> --commit-hash=<hash>
///           --commit-timestamp=<rfc2822> --output-file=<path>
/// ```
///
/// The harness must write its spectrum file to the given output path rather
/// than to stdout; whatever it does print on stdout or stderr is forwarded to
/// the log so the operator can watch it.
pub struct TestHarness {
    settings: HarnessSettings,
}

impl TestHarness {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    /// Runs the harness for one commit, enforcing the configured timeout, and
    /// parses the output file it produced. The child is killed on timeout.
    pub async fn execute(
        &self,
        work_dir: &std::path::Path,
        commit: &CommitInfo,
    ) -> AppResult<ExecutionSpectrum> {
        let mut child = Command::new(&self.settings.path)
            .arg(format!("--work-directory={}", work_dir.display()))
            .arg(format!("--commit-hash={}", commit.hash))
            .arg(format!("--commit-timestamp={}", commit.timestamp.to_rfc2822()))
            .arg(format!(
                "--output-file={}",
                self.settings.output_file.display()
            ))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AppError::Harness(format!(
                    "could not start {}: {e}",
                    self.settings.path.display()
                ))
            })?;

        // Both streams must be drained while we wait, or a chatty harness
        // fills the pipe buffer and deadlocks before the timeout fires.
        let stdout = child.stdout.take().map(|s| forward_lines(s, "harness"));
        let stderr = child.stderr.take().map(|s| forward_lines(s, "harness"));

        let waited = tokio::time::timeout(self.settings.timeout, child.wait()).await;

        // On timeout the child is still running and holding its pipes open,
        // so it has to die before the forwarding tasks can finish.
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
                let status = status?;
                if !status.success() {
                    return Err(AppError::Harness(format!(
                        "test harness exited with {status} on commit {}",
                        commit.hash
                    )));
                }
                parse_spectrum_file(&self.settings.output_file)
            }
            Err(_) => Err(AppError::Harness(format!(
                "test harness timed out after {}s on commit {}",
                self.settings.timeout.as_secs(),
                commit.hash
            ))),
        }
    }
}

/// Forwards each line of a child stream to the log until the stream closes.
pub(crate) fn forward_lines(
    stream: impl AsyncRead + Unpin + Send + 'static,
    label: &'static str,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => info!("{label}: {line}"),
                Ok(None) => break,
                Err(e) => {
                    error!("{label}: error reading output: {e}");
                    break;
                }
            }
        }
    })
}
