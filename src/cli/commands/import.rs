//! Import command implementation.
//!
//! Imports a shared transcript (by share id, or from a file with `--file`)
//! into the local projects directory under fresh identifiers. The target
//! project defaults to the current working directory.

use std::path::Path;

use colored::Colorize;

use crate::cli::ImportArgs;
use crate::config::{current_dir_string, resolve_projects_dir, resolve_store_dir};
use crate::error::{Error, Result};
use crate::store::{DirectoryStore, ProjectsLayout};
use crate::transcript::Importer;

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the share cannot be found or read, holds no usable
/// messages, or cannot be written.
pub fn execute(args: &ImportArgs, store: Option<&Path>, json: bool) -> Result<()> {
    let target_dir = match &args.target_dir {
        Some(dir) => dir.clone(),
        None => current_dir_string()?,
    };
    let layout = ProjectsLayout::new(resolve_projects_dir(args.projects_dir.as_deref())?);
    let importer = Importer::new(&layout, target_dir.clone());

    let stats = match (&args.id, &args.file) {
        (_, Some(file)) => importer.import_file(file)?,
        (Some(id), None) => {
            let store = DirectoryStore::new(resolve_store_dir(store)?);
            importer.import_share(&store, id)?
        }
        (None, None) => {
            return Err(Error::InvalidArgument(
                "pass a share id or --file".to_string(),
            ));
        }
    };

    if json {
        let payload = serde_json::json!({
            "success": true,
            "target": target_dir,
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    println!("{} {}", "Imported".green().bold(), stats.stream_id.bold());
    println!();
    println!("  Messages:      {}", stats.messages);
    if stats.skipped_lines > 0 {
        println!("  Skipped lines: {}", stats.skipped_lines.to_string().yellow());
    }
    match stats.hash_verified {
        Some(true) => println!("  Content hash:  {}", "verified".green()),
        Some(false) => println!("  Content hash:  {}", "MISMATCH".red().bold()),
        None => println!("  Content hash:  {}", "no metadata".dimmed()),
    }
    println!("  Project:       {target_dir}");
    println!("  Location:      {}", stats.path.display());
    Ok(())
}
