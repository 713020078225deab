//! Export command implementation.
//!
//! Sanitizes a transcript and either publishes it to the share store or,
//! with `--output`, writes it (plus its metadata sidecar) to a file.

use std::path::Path;

use colored::Colorize;

use crate::cli::ExportArgs;
use crate::config::resolve_store_dir;
use crate::error::Result;
use crate::store::DirectoryStore;
use crate::transcript::{ExportStats, Exporter};

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the source cannot be read, holds no usable messages,
/// or the result cannot be written.
pub fn execute(args: &ExportArgs, store: Option<&Path>, json: bool) -> Result<()> {
    let exporter = match &args.base_path {
        Some(base) => Exporter::with_base_path(base.clone()),
        None => Exporter::new(),
    };
    let exported = exporter.export_file(&args.source)?;

    if let Some(output) = &args.output {
        let sidecar = exported.write_to(output)?;
        if json {
            let payload = serde_json::json!({
                "success": true,
                "output": output.display().to_string(),
                "metadata": sidecar.display().to_string(),
                "stats": exported.stats,
            });
            println!("{}", serde_json::to_string(&payload)?);
        } else {
            println!("{} {}", "Exported".green().bold(), output.display());
            print_stats(&exported.stats);
        }
        return Ok(());
    }

    let store_dir = resolve_store_dir(store)?;
    let store = DirectoryStore::new(&store_dir);
    let name = args
        .name
        .clone()
        .or_else(|| {
            args.source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "transcript".to_string());
    let id = exported.publish(&store, &name)?;

    if json {
        let payload = serde_json::json!({
            "success": true,
            "id": id,
            "name": name,
            "store": store_dir.display().to_string(),
            "stats": exported.stats,
        });
        println!("{}", serde_json::to_string(&payload)?);
    } else {
        println!("{} {}", "Shared".green().bold(), id.bold());
        print_stats(&exported.stats);
        println!();
        println!("  Import with: tshare import {id}");
    }
    Ok(())
}

fn print_stats(stats: &ExportStats) {
    println!();
    println!("  Messages:          {}", stats.messages);
    if stats.skipped_lines > 0 {
        println!(
            "  Skipped lines:     {}",
            stats.skipped_lines.to_string().yellow()
        );
    }
    let reasoning = stats.sanitized.reasoning_cleared + stats.sanitized.reasoning_blocks_removed;
    if reasoning > 0 {
        println!("  Reasoning removed: {reasoning}");
    }
    if stats.sanitized.secrets_redacted > 0 {
        println!("  Secrets redacted:  {}", stats.sanitized.secrets_redacted);
    }
    println!("  Content hash:      {}", stats.content_hash.dimmed());
}
