use anyhow::{Result, bail};
use std::path::Path;

use crate::load_database;

pub fn run_validate(input: &Path, quiet: bool, summary: bool) -> Result<()> {
    let parsed = load_database(input, false)?;

    let all_errors: Vec<String> = match diag_signal::validate_database(&parsed.database) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };

    if all_errors.is_empty() {
        if !quiet {
            println!("{}: valid", input.display());
        }
        return Ok(());
    }

    if !quiet && !summary {
        for e in &all_errors {
            eprintln!("{}: {e}", input.display());
        }
    }

    if summary || !quiet {
        println!(
            "{}: {} validation error{}",
            input.display(),
            all_errors.len(),
            if all_errors.len() == 1 { "" } else { "s" }
        );
    }

    bail!(
        "{} validation error{} in {}",
        all_errors.len(),
        if all_errors.len() == 1 { "" } else { "s" },
        input.display()
    );
}
