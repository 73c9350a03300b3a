//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding timewarrior's `*.data` files.
    pub timewarrior_dir: PathBuf,

    /// Root directory for generated markdown reports.
    pub output_dir: PathBuf,

    /// IANA zone used for bucketing; the system zone when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("timewarrior_dir", &self.timewarrior_dir)
            .field("output_dir", &self.output_dir)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            timewarrior_dir: home.join(".config").join("timewarrior").join("data"),
            output_dir: home.join("wiki").join("report"),
            timezone: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        // Load from environment variables (LUME_*)
        file_layers(config_path)
            .merge(Env::prefixed("LUME_"))
            .extract()
    }

    /// Loads only the defaults and config files, ignoring `LUME_*`.
    ///
    /// This is the base that `lume config` writes back, so values that only
    /// come from the environment never end up in a saved file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_files(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        file_layers(config_path).extract()
    }

    /// Writes this configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let body = toml::to_string_pretty(self).context("failed to encode configuration")?;
        std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Observer time zone: `timezone` setting, then `TZ`, then the system zone.
    ///
    /// An unknown zone in the configuration is an error; an undetectable
    /// system zone falls back to UTC.
    pub fn resolve_timezone(&self) -> anyhow::Result<Tz> {
        if let Some(name) = &self.timezone {
            return Tz::from_str(name).map_err(|_| {
                anyhow::anyhow!(
                    "invalid timezone '{name}'. Use a name like 'America/New_York', 'Asia/Tokyo', or 'UTC'"
                )
            });
        }
        Ok(local_timezone())
    }
}

fn file_layers(config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    // Load from default config location
    if let Some(path) = default_config_file() {
        figment = figment.merge(Toml::file(path));
    }

    // Load from specified config file
    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }
    figment
}

/// Detects the system's local time zone, falling back to UTC.
fn local_timezone() -> Tz {
    if let Some(tz) = std::env::var("TZ").ok().and_then(|v| Tz::from_str(&v).ok()) {
        tracing::debug!(timezone = tz.name(), "using timezone from TZ");
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => Tz::from_str(&name).unwrap_or_else(|_| {
            tracing::debug!(timezone = %name, "unrecognized system timezone, falling back to UTC");
            Tz::UTC
        }),
        Err(e) => {
            tracing::debug!(error = %e, "could not detect system timezone, falling back to UTC");
            Tz::UTC
        }
    }
}

/// Returns the platform-specific config directory for lume.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lume"))
}

/// Path of the user config file.
///
/// On Linux: `~/.config/lume/config.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs_config_path().map(|p| p.join("config.toml"))
}

/// Expands a leading `~` or `~/` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
