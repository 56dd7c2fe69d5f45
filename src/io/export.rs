//! Writing a history result as JSON.
//!
//! The JSON is the same `{regions, sortOrder}` shape a presentation layer
//! consumes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::HistoryResult;
use crate::error::AppError;

/// Serialize `result` to `writer`.
pub fn write_history_json<W: Write>(writer: W, result: &HistoryResult, pretty: bool) -> Result<(), AppError> {
    let res = if pretty {
        serde_json::to_writer_pretty(writer, result)
    } else {
        serde_json::to_writer(writer, result)
    };
    res.map_err(|e| AppError::new(2, format!("Failed to write history JSON: {e}")))
}

/// Write `result` to a JSON file at `path`.
pub fn write_history_file(path: &Path, result: &HistoryResult, pretty: bool) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    write_history_json(&mut writer, result, pretty)?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))
}
