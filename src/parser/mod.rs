pub mod cycle;
pub mod grammar;

pub use cycle::parse_cycle;
pub use grammar::{HeaderToken, LineToken, MetadataKey, TaskToken};
