use std::path::Path;

use colored::Colorize;
use litm_core::SessionSnapshot;

use super::{build_session, load_config, load_session, state_label};

pub fn run(session: &Path, config: Option<&Path>, json: bool) -> Result<(), String> {
    let file = load_session(session)?;
    let config = load_config(config)?;
    let snapshot = build_session(file, config).snapshot();

    if json {
        let out = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    print_snapshot(&snapshot);
    Ok(())
}

/// Print the engaged tags, the breakdown, and the total.
pub fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("  {}", "Engaged Tags".bold().underline());
    if snapshot.engaged.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for tag in &snapshot.engaged {
        println!("  {:<24} {}", tag.to_string(), state_label(tag.state).dimmed());
    }
    println!();

    println!("  {}", "Breakdown".bold().underline());
    if snapshot.breakdown.tooltip.is_empty() {
        println!("  {}", "(no modifiers)".dimmed());
    }
    for line in snapshot.breakdown.tooltip_text().lines() {
        println!("  {line}");
    }
    println!();

    let total = format!("{:+}", snapshot.total_power);
    let total = if snapshot.total_power < 0 {
        total.red().bold()
    } else {
        total.green().bold()
    };
    println!("  {} {total}  ({})", "Total Power".bold(), snapshot.might);
}
