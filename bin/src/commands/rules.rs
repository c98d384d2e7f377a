//! Rules command implementation.
//!
//! Lists the timeframe menu with each label's window length.

use crate::display::load_timeframes;
use anyhow::Result;
use std::path::Path;

/// List the timeframe menu, or a custom one loaded from JSON.
pub(crate) fn list_rules(timeframes_json: Option<&Path>) -> Result<()> {
    let timeframes = load_timeframes(timeframes_json)?;

    println!("{:<10} {:<10} {:>10}", "LABEL", "RULE", "SECONDS");
    println!("{}", "-".repeat(32));

    for (label, rule) in timeframes.iter() {
        println!(
            "{:<10} {:<10} {:>10}",
            label,
            rule.to_string(),
            rule.seconds()
        );
    }

    println!("\nTotal: {} timeframes", timeframes.len());
    Ok(())
}
