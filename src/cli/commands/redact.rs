//! Redact command implementation.
//!
//! A filter: reads text from stdin and writes the redacted text to stdout.
//! With `--json` the text is wrapped together with the list of findings.

use std::io::{self, Read, Write};

use crate::error::Result;
use crate::transcript::{PathRewriter, scan};

/// Execute the redact command.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub fn execute(base_path: Option<&str>, json: bool) -> Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let rewriter = base_path.map_or_else(PathRewriter::disabled, PathRewriter::new);
    let redaction = scan(&rewriter.rewrite_text(&input));

    if json {
        let payload = serde_json::json!({
            "text": redaction.text,
            "findings": redaction.findings,
        });
        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(redaction.text.as_bytes())?;
    stdout.flush()?;
    tracing::info!(findings = redaction.findings.len(), "redacted input");
    Ok(())
}
