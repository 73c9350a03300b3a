//! Lume CLI library.
//!
//! This crate provides the `lume` command line: configuration, markdown
//! rendering and the timewarrior extension front end.

mod cli;
pub mod commands;
mod config;
pub mod render;

pub use cli::{Cli, Commands, ReportArgs, ReportPeriod};
pub use config::{Config, default_config_file, expand_tilde};
