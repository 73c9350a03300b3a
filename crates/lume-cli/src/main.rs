use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lume_cli::commands::config::PathOverrides;
use lume_cli::commands::{config, extension, generate, report};
use lume_cli::{Cli, Commands, Config};

/// Applies command-line path overrides and resolves the observer time zone.
fn apply_overrides(settings: &mut Config, overrides: &PathOverrides) -> Result<Tz> {
    overrides.apply(settings);
    let tz = settings.resolve_timezone()?;
    tracing::debug!(timezone = tz.name(), "resolved observer timezone");
    Ok(tz)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries the reports
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut settings =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(config = ?settings, "loaded configuration");

    let overrides = PathOverrides {
        timewarrior: cli.timewarrior.clone(),
        output: cli.output.clone(),
    };

    match &cli.command {
        Some(Commands::Config) => {
            let stored = Config::load_files(cli.config.as_deref())
                .context("failed to load configuration")?;
            config::run(&settings, &stored, &overrides, cli.config.as_deref())?;
        }
        Some(Commands::Generate { year }) => {
            let tz = apply_overrides(&mut settings, &overrides)?;
            generate::run(&settings, &tz, *year)?;
        }
        Some(Commands::Report(args)) => {
            let tz = apply_overrides(&mut settings, &overrides)?;
            report::run(args, &settings, &tz)?;
        }
        Some(Commands::Extension) => {
            let tz = apply_overrides(&mut settings, &overrides)?;
            extension::run(&settings, &tz)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
