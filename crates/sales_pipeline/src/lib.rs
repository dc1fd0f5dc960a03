//! Core digest pipeline: exchange-rate anchoring, three-way sales
//! aggregation, comparative formatting and run sequencing. All I/O goes
//! through the collaborator traits in [`sources`].

pub mod aggregator;
pub mod coordinator;
pub mod formatter;
pub mod rates;
pub mod sources;

pub use aggregator::SalesAggregator;
pub use coordinator::{DigestRun, RunOutcome};
pub use formatter::build_message;
