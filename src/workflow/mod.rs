pub mod gates;
pub mod ledger;
pub mod patch;

pub use gates::{can_advance, validate_current, validate_phase, GateOptions, GatePolicy};
pub use ledger::TaskSelector;
pub use patch::{Edit, Patch};
