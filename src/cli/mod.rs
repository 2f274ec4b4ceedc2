//! CLI adapters - thin formatting layers over the services

pub mod cycle;
pub mod init;
pub mod learn;
pub mod phase;
pub mod status;

use crate::models::PhaseName;
use crate::Result;
use serde::Serialize;

/// Text progress bar, e.g. `███████░░░` at 70%.
pub fn progress_bar(progress: u32, width: usize) -> String {
    let filled = (progress as usize * width) / 100;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

pub fn phase_icon(phase: PhaseName) -> &'static str {
    match phase {
        PhaseName::Focus => "🎯",
        PhaseName::Orchestrate => "📝",
        PhaseName::Refine => "🔨",
        PhaseName::Generate => "🚀",
        PhaseName::Evaluate => "📊",
    }
}

/// Emit a report as pretty-printed JSON.
pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
