use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Removes the `.git` bookkeeping directory from a cloned working tree.
///
/// Returns `false` only when the directory exists and removal fails; that
/// is logged as a warning and never reclassifies the clone itself, so the
/// caller still counts the entry as a success.
pub fn scrub_metadata(repo_path: &Path) -> bool {
    let git_dir = repo_path.join(".git");
    if !git_dir.exists() {
        return true;
    }
    match fs::remove_dir_all(&git_dir) {
        Ok(()) => {
            debug!(path = %git_dir.display(), "Removed .git directory");
            true
        }
        Err(e) => {
            warn!(
                error = ?e,
                path = %repo_path.display(),
                "Could not remove .git directory"
            );
            false
        }
    }
}
