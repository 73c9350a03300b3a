//! Config command: show or persist default directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{Config, default_config_file, expand_tilde};

/// Path overrides given on the command line.
#[derive(Debug, Default, Clone)]
pub struct PathOverrides {
    pub timewarrior: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl PathOverrides {
    pub const fn is_empty(&self) -> bool {
        self.timewarrior.is_none() && self.output.is_none()
    }

    /// Applies the overrides on top of `config`, expanding `~`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.timewarrior {
            config.timewarrior_dir = expand_tilde(dir);
        }
        if let Some(dir) = &self.output {
            config.output_dir = expand_tilde(dir);
        }
    }
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("{what} directory does not exist: {}", path.display()))?;
    if !metadata.is_dir() {
        anyhow::bail!("{what} path is not a directory: {}", path.display());
    }
    Ok(())
}

/// Runs the config command.
///
/// Without overrides, prints the `effective` configuration. With
/// `--timewarrior` and/or `--output`, checks the directories exist and saves
/// them on top of `stored` (the file-backed settings) to `target` (the
/// `--config` file, or the default location).
pub fn run(
    effective: &Config,
    stored: &Config,
    overrides: &PathOverrides,
    target: Option<&Path>,
) -> Result<()> {
    let target = match target {
        Some(path) => path.to_path_buf(),
        None => default_config_file().context("could not determine config directory")?,
    };

    if overrides.is_empty() {
        println!("# {}", target.display());
        print!(
            "{}",
            toml::to_string_pretty(effective).context("failed to encode configuration")?
        );
        return Ok(());
    }

    let mut updated = stored.clone();
    overrides.apply(&mut updated);
    if overrides.timewarrior.is_some() {
        require_dir(&updated.timewarrior_dir, "timewarrior data")?;
    }
    if overrides.output.is_some() {
        require_dir(&updated.output_dir, "output")?;
    }

    updated.save_to(&target)?;
    tracing::debug!(?updated, path = %target.display(), "saved configuration");
    println!("Configuration saved to {}", target.display());
    Ok(())
}
