pub mod config;
pub mod cycle;
pub mod report;

pub use config::{ForgeConfig, ForgeSettings};
pub use cycle::{Cycle, Metadata, Phase, PhaseName, PhaseState, Task};
pub use report::{CycleReport, PhaseReport, ValidationReport};
