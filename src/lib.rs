// Forge - Phase-gated Development Cycle Tracker
// Tracks development cycles as markdown documents with embedded phase state

pub mod cli;
pub mod error;
pub mod models;
pub mod parser;
pub mod services;
pub mod store;
pub mod workflow;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use error::ForgeError;
pub use models::{Cycle, Phase, PhaseName, PhaseState, Task};
pub use workflow::Patch;
