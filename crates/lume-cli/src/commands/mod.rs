//! CLI subcommand implementations.

pub mod config;
pub mod extension;
pub mod generate;
pub mod report;
pub mod util;
