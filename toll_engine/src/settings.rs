//! Process settings read from the environment.

use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `TOLL_BIND_ADDR`
    pub bind_addr: String,
    /// `TOLL_CONFIG`; the built-in Gothenburg 2013 rules apply when unset.
    pub config_path: Option<PathBuf>,
    /// `TOLL_VEHICLES`; the register starts empty when unset.
    pub vehicles_path: Option<PathBuf>,
    /// `TOLL_LOG`, used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            bind_addr: non_empty("TOLL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            config_path: non_empty("TOLL_CONFIG").map(PathBuf::from),
            vehicles_path: non_empty("TOLL_VEHICLES").map(PathBuf::from),
            log_level: non_empty("TOLL_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
