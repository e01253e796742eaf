//! JSON exports of collected records

use crate::output::traits::{OutputError, OutputResult};
use crate::process::ProcessBasicInfo;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializes records as a pretty-printed JSON array
pub fn basic_info_to_json(infos: &[ProcessBasicInfo]) -> OutputResult<String> {
    serde_json::to_string_pretty(infos).map_err(|e| OutputError::Format(e.to_string()))
}

/// Writes collected records to `path` as a JSON array
///
/// # Arguments
///
/// * `path` - Destination file, replaced when it exists
/// * `infos` - Records in the order they should appear
pub fn write_basic_info_json(path: &Path, infos: &[ProcessBasicInfo]) -> OutputResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, infos)
        .map_err(|e| OutputError::Format(e.to_string()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Wrote {} records to {}", infos.len(), path.display());
    Ok(())
}
