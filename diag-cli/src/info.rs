use anyhow::Result;
use std::path::Path;

use crate::load_database;

pub fn run_info(input: &Path) -> Result<()> {
    let parsed = load_database(input, false)?;
    let db = &parsed.database;

    println!("File:        {}", input.display());
    println!("DIDs:        {}", db.dids.len());
    println!("Diagnostics: {}", parsed.diagnostics.len());

    for did in &db.dids {
        println!(
            "  0x{:04X} {} ({} byte{}, {} data)",
            did.identifier,
            did.name,
            did.length,
            if did.length == 1 { "" } else { "s" },
            did.datas.len()
        );
        for data in &did.datas {
            let kind = if data.choices().is_some() {
                "choices"
            } else if data.is_piecewise() {
                "piecewise"
            } else {
                "linear"
            };
            println!(
                "    {:<24} start={:<3} len={:<3} {} {}",
                data.name(),
                data.start(),
                data.length(),
                data.byte_order(),
                kind
            );
        }
    }

    Ok(())
}
