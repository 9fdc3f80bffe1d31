use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use tokio::process::Command;
use tracing::{error, info};

/// Wall-clock limit for one `git clone` invocation.
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(300);

/// Why a single clone attempt failed. One attempt per entry, no retries;
/// these are recorded in the run summary, never propagated as faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneError {
    /// The subprocess outlived the timeout and was killed.
    Timeout,
    /// git exited non-zero; carries its captured stderr in full.
    Process { stderr: String },
    /// Spawning or waiting on the subprocess failed (e.g. git not installed).
    Invocation(String),
}

impl CloneError {
    /// User-facing failure text, untruncated.
    pub fn detail(&self) -> &str {
        match self {
            CloneError::Timeout => "Timeout after 5 minutes",
            CloneError::Process { stderr } => stderr,
            CloneError::Invocation(msg) => msg,
        }
    }
}

impl fmt::Display for CloneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.detail())
    }
}

impl std::error::Error for CloneError {}

/// Trait for performing one shallow clone. Implemented by [`GitCloner`] in
/// production and by a generated mock in orchestrator tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Cloner: Send + Sync {
    /// Clone `url` into `dest` at depth 1. `dest` must not already exist.
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneError>;
}

/// Clones via the installed `git` binary.
pub struct GitCloner {
    timeout: Duration,
}

impl GitCloner {
    pub fn new() -> Self {
        Self {
            timeout: CLONE_TIMEOUT,
        }
    }

    /// Overrides the per-clone timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cloner for GitCloner {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CloneError> {
        // `git clone --depth 1 <url> <dest>`; kill_on_drop guarantees the
        // child does not outlive the timeout path below.
        let child = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(url)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                error!(error = ?e, url = url, "Failed to launch git process");
                return Err(CloneError::Invocation(e.to_string()));
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(error = ?e, url = url, "Failed waiting on git process");
                return Err(CloneError::Invocation(e.to_string()));
            }
            Err(_elapsed) => {
                error!(
                    url = url,
                    timeout_secs = self.timeout.as_secs(),
                    "git clone timed out, killing subprocess"
                );
                return Err(CloneError::Timeout);
            }
        };

        if output.status.success() {
            info!(
                url = url,
                path = %dest.display(),
                "Successfully cloned git repository"
            );
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            error!(
                url = url,
                path = %dest.display(),
                status = ?output.status,
                "git clone exited with non-zero code"
            );
            Err(CloneError::Process { stderr })
        }
    }
}
