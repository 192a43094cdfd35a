//! JSON I/O handling for CLI
//!
//! - Results: one JSON document on stdout
//! - Failures: one JSON object on stderr

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON document from a file
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::invalid_argument(format!("{} is not valid JSON: {}", path.display(), e)))
}

/// Write a result document to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Error report: code, message and, for validation failures, the
/// per-field detail list.
pub fn error_report(err: &CliError) -> Value {
    let mut report = json!({
        "status": "error",
        "code": err.code(),
        "message": err.to_string(),
    });
    if let Some(detail) = err.detail() {
        report["detail"] = detail;
    }
    report
}

/// Write an error report to stderr
pub fn write_error(err: &CliError) {
    let mut stderr = io::stderr();
    // Nothing left to report to if stderr itself fails.
    let _ = serde_json::to_writer(&mut stderr, &error_report(err));
    let _ = writeln!(stderr);
}
