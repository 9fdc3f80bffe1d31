#![doc = "repo-harvest: batch shallow-cloning of manifest-listed repositories."]

//! Reads a tab-separated manifest of (URL, name) pairs, shallow-clones each
//! repository into an output directory, strips the `.git` metadata from each
//! clone, and reports aggregate success/failure. Strictly sequential; the
//! external `git` binary does the actual cloning.
//!
//! Entry points: [`cli::run`] for programmatic use, the `repo-harvest` binary
//! for the command line.

pub mod cli;
pub mod clone;
pub mod harvest;
pub mod manifest;
pub mod scrub;

pub use cli::{run, Cli};
