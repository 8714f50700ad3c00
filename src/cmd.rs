//! Command-line entry points, one per production service client

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde_json::Value;

pub mod copy_db;
pub mod copy_report;
pub mod datacheck;
pub mod dbcopy;
pub mod event;
pub mod genome_metadata;
pub mod gifts;
pub mod handover;
pub mod metadata;
pub mod vertannot;

/// Write a response as pretty-printed JSON, used by the `-o/--output-file`
/// flag of the listing actions.
pub(crate) fn write_json(path: &Path, value: &Value) -> Result<()> {
    info!("Writing output to {}", path.display());
    let json = serde_json::to_string_pretty(value).context("Serialising output")?;
    fs::write(path, json).with_context(|| format!("Can't write {}", path.display()))
}
