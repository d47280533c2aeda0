//! CLI library components for tablesift.

pub mod logging;
pub mod pipeline;
