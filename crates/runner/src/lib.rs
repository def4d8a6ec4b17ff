//! Run sequencing: extract, look up the reference, compare, record.

pub mod context;
pub mod orchestrator;

pub use context::RunContext;
pub use orchestrator::{add_reference, base_name, Orchestrator};
