use anyhow::{Context, Result};
use diag_signal::{Diagnostic, InternalDatabase};
use serde::Serialize;
use std::path::Path;

use crate::load_database;

#[derive(Serialize)]
struct Export<'a> {
    source: String,
    database: &'a InternalDatabase,
    diagnostics: &'a [Diagnostic],
}

pub fn run_export(input: &Path, output: Option<&Path>, verbose: bool) -> Result<()> {
    let parsed = load_database(input, verbose)?;

    let export = Export {
        source: input.display().to_string(),
        database: &parsed.database,
        diagnostics: &parsed.diagnostics,
    };
    let json = serde_json::to_string_pretty(&export).context("serializing database to JSON")?;

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            log::info!("Written: {}", path.display());
            println!("Exported {} -> {}", input.display(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
