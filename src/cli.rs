use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::clone::GitCloner;
use crate::harvest::{harvest, HarvestConfig};

/// CLI for repo-harvest: materialise manifest-listed repositories as plain
/// source trees.
#[derive(Parser)]
#[clap(
    name = "repo-harvest",
    version,
    about = "Shallow-clone repositories from a tab-separated manifest and strip their .git metadata"
)]
pub struct Cli {
    /// Path to the tab-separated manifest (URL, name columns)
    #[clap(default_value = "llnl2do.tsv")]
    pub manifest: PathBuf,

    /// Directory the cloned working trees are placed under
    #[clap(default_value = "cloned_repos")]
    pub output_dir: PathBuf,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = HarvestConfig {
        manifest_path: cli.manifest,
        output_dir: cli.output_dir,
    };
    let cloner = GitCloner::new();
    let summary = harvest(&config, &cloner).await?;

    if summary.failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} repositories failed to clone", summary.failed.len())
    }
}
