//! Baseline subtraction over parsed rulesets.

pub mod engine;
pub mod result;

pub use engine::{delta, summarize};
pub use result::{ChainContent, ChainDelta, DeltaSummary, TableDelta};
