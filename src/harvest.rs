//! Top-level run driver: orchestrates parse → clone → scrub per manifest entry.
//!
//! This module implements the sequential loop over manifest entries:
//!   - Parses the manifest into an ordered entry list (fatal on read error)
//!   - Skips entries whose destination directory already exists
//!   - Invokes the [`Cloner`] for the rest, then scrubs `.git` from each clone
//!   - Accumulates a [`RunSummary`] and prints progress and summary to stdout
//!
//! # Error Handling
//! Only the manifest read failure propagates out as `Err`; every per-entry
//! failure is caught at the entry boundary and recorded in the summary. Scrub
//! failures are warnings and never change an entry's classification.
//!
//! # Main entrypoint: [`harvest`]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::clone::{CloneError, Cloner};
use crate::manifest::{parse_manifest, ManifestEntry};
use crate::scrub::scrub_metadata;

/// Failure details longer than this are truncated in the printed summary.
/// Internal records keep the full text.
pub const ERROR_DETAIL_MAX_LEN: usize = 100;

/// One harvest run: which manifest to read and where clones land.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
}

/// An entry that failed to clone, with its full untruncated failure text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailedEntry {
    pub name: String,
    pub detail: String,
}

/// Aggregate outcome of one run. `succeeded` includes skip-as-existing
/// entries, so `succeeded + failed.len() == total` always holds after a
/// completed run.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedEntry>,
}

impl RunSummary {
    /// Prints the human-readable summary block. Not a stable contract.
    pub fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("SUMMARY");
        println!("{}", "=".repeat(70));
        println!("Total repositories: {}", self.total);
        println!("Successfully cloned: {}", self.succeeded);
        println!("Failed: {}", self.failed.len());

        if !self.failed.is_empty() {
            println!("\nFailed repositories:");
            for entry in &self.failed {
                let truncated: String =
                    entry.detail.chars().take(ERROR_DETAIL_MAX_LEN).collect();
                println!("  - {}: {}", entry.name, truncated);
            }
        }
    }
}

/// Runs the full harvest: manifest → sequential clone+scrub → summary.
///
/// Returns the summary for the caller to derive the exit code from; the
/// summary block has already been printed by the time this returns.
pub async fn harvest<C>(config: &HarvestConfig, cloner: &C) -> Result<RunSummary>
where
    C: Cloner,
{
    info!(
        manifest_path = %config.manifest_path.display(),
        output_dir = %config.output_dir.display(),
        "Starting harvest run"
    );

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {:?}",
            config.output_dir
        )
    })?;

    println!(
        "Reading repositories from {}...",
        config.manifest_path.display()
    );
    let entries = parse_manifest(&config.manifest_path)?;
    println!("Found {} repositories to clone.", entries.len());

    let total = entries.len();
    let mut summary = RunSummary {
        total,
        ..RunSummary::default()
    };

    // Strictly sequential, in manifest order.
    for (i, entry) in entries.iter().enumerate() {
        let i = i + 1;
        let dest_path = config.output_dir.join(&entry.name);

        // Pre-existing destinations are never touched or re-cloned.
        if dest_path.exists() {
            println!("[{i}/{total}] Skipping {} (already exists)", entry.name);
            info!(name = %entry.name, "Destination exists, skipping clone");
            summary.succeeded += 1;
            continue;
        }

        println!("[{i}/{total}] Processing {}...", entry.name);
        match cloner.clone_repo(&entry.url, &dest_path).await {
            Ok(()) => {
                if scrub_metadata(&dest_path) {
                    println!("  ✓ Successfully cloned and cleaned {}", entry.name);
                } else {
                    // Scrub failure is non-fatal; the clone still counts.
                    println!(
                        "  ⚠ Cloned {} but failed to remove .git directory",
                        entry.name
                    );
                    warn!(name = %entry.name, "Clone succeeded but scrub failed");
                }
                summary.succeeded += 1;
            }
            Err(e) => {
                println!("  ✗ Failed to clone {}: {}", entry.name, e.detail());
                record_failure(&mut summary, entry, e);
            }
        }
    }

    summary.print();
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed.len(),
        "Harvest run complete"
    );
    Ok(summary)
}

fn record_failure(summary: &mut RunSummary, entry: &ManifestEntry, error: CloneError) {
    error!(
        name = %entry.name,
        url = %entry.url,
        error = %error,
        "Failed to clone repository"
    );
    summary.failed.push(FailedEntry {
        name: entry.name.clone(),
        detail: error.detail().to_string(),
    });
}
