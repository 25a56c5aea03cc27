use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::limits::DEFAULT_DEBOUNCE;

pub(crate) const DEFAULT_PROFILE: &str = "default";

const ENV_DB: &str = "SPENDGUARD_DB";
const ENV_PROFILE: &str = "SPENDGUARD_PROFILE";
const ENV_DEBOUNCE_MS: &str = "SPENDGUARD_DEBOUNCE_MS";

const DB_FILE: &str = "spendguard.db";
const LOG_FILE: &str = "spendguard.log";

/// Runtime settings. Flags win over environment, environment over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) profile: String,
    pub(crate) debounce: Duration,
}

/// Global flags given before the command.
#[derive(Debug, Default, PartialEq, Eq)]
struct Flags {
    db: Option<PathBuf>,
    profile: Option<String>,
}

impl Config {
    /// Builds the config from `std::env::args()` and the process environment.
    /// Returns it together with the remaining command words.
    pub(crate) fn from_args(args: &[String]) -> Result<(Self, Vec<String>)> {
        let (flags, command) = split_flags(args.get(1..).unwrap_or_default())?;
        let config = Self::resolve(flags, |key| std::env::var(key).ok(), default_data_dir)?;
        Ok((config, command))
    }

    fn resolve(
        flags: Flags,
        env: impl Fn(&str) -> Option<String>,
        data_dir: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let db_path = match flags.db.or_else(|| non_empty(env(ENV_DB)).map(PathBuf::from)) {
            Some(path) => path,
            None => data_dir()?.join(DB_FILE),
        };

        let profile = non_empty(flags.profile)
            .or_else(|| non_empty(env(ENV_PROFILE)))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let debounce = match non_empty(env(ENV_DEBOUNCE_MS)) {
            Some(raw) => {
                let ms: u64 = raw.parse().with_context(|| {
                    format!("{ENV_DEBOUNCE_MS} must be a number of milliseconds, got '{raw}'")
                })?;
                Duration::from_millis(ms)
            }
            None => DEFAULT_DEBOUNCE,
        };

        Ok(Self {
            db_path,
            profile,
            debounce,
        })
    }

    /// The TUI log file sits next to the database.
    pub(crate) fn log_path(&self) -> PathBuf {
        match self.db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(LOG_FILE),
            _ => PathBuf::from(LOG_FILE),
        }
    }
}

fn split_flags(args: &[String]) -> Result<(Flags, Vec<String>)> {
    let mut flags = Flags::default();
    let mut command = Vec::new();
    let mut rest = args.iter();

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--db" => {
                let path = rest.next().context("--db needs a path")?;
                flags.db = Some(PathBuf::from(path));
            }
            "--profile" => {
                let login = rest.next().context("--profile needs a login")?;
                flags.profile = Some(login.clone());
            }
            _ => {
                command.push(arg.clone());
                command.extend(rest.by_ref().cloned());
            }
        }
    }

    Ok((flags, command))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "spendguard", "SpendGuard")
        .context("Could not determine data directory")?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
