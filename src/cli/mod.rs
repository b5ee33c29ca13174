//! CLI command implementations.

pub mod collect_cmd;
pub mod doctor;
pub mod export_cmd;
pub mod stats_cmd;
