//! The persisted mapping of provider record ids to IPs.
//!
//! This file is the only durable state the tool owns. It must always name
//! records that really exist remotely, so saves replace the whole file
//! atomically: the new content goes to a temp file in the same directory,
//! is synced, then renamed over the old file. A crash mid-write leaves the
//! previous state intact.

use crate::core::record::RecordRef;
use crate::error::Error;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 2] = ["Record ID", "IP"];

/// Loads the known record list. A missing file is the first-run case and
/// yields an empty list; anything unparsable is fatal, since a store that
/// cannot be trusted must abort the pass before any remote change.
pub fn load(path: &Path) -> Result<Vec<RecordRef>, Error> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::StoreCorrupt(e.to_string()))?;

    let mut records = Vec::new();
    for record in reader.deserialize() {
        let record: RecordRef = record.map_err(|e| Error::StoreCorrupt(e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Writes the complete replacement list, header first, atomically.
pub fn save(path: &Path, records: &[RecordRef]) -> Result<(), Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| Error::StoreCorrupt(e.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| Error::StoreCorrupt(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::StoreCorrupt(e.to_string()))?;

    // Temp file in the target directory so the rename stays on one filesystem.
    let parent = path.parent().unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "store".to_string());
    let temp_path = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    result.map_err(|e| {
        fs::remove_file(&temp_path).ok();
        Error::StoreCorrupt(format!("Failed to write {}: {e}", path.display()))
    })
}
