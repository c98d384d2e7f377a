//! Info command implementation.

use anyhow::{Context, Result};
use tickbars_lib::prelude::*;

/// Show the instrument, month and contract derived from a file name.
pub(crate) fn show_info(file_name: &str) -> Result<()> {
    let input = RunInput::from_file_name(file_name)
        .with_context(|| format!("Unrecognized file name: {file_name}"))?;
    let contract = input.contract()?;

    println!("Root:     {}", input.root);
    println!("Year:     {}", input.year);
    println!("Month:    {:02}", input.month);
    println!("Contract: {contract}");
    Ok(())
}
