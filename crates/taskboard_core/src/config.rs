//! Environment-driven configuration.
//!
//! Recognised variables:
//! - `TASKBOARD_API_URL` - REST base URL. Defaults to `http://localhost:3000/api`.
//! - `TASKBOARD_TASKS_PATH` - collection path under the base URL. Defaults to `tasks`.
//! - `TASKBOARD_TIMEOUT_SECS` - optional request timeout in whole seconds.
//! - `TASKBOARD_DISPLAY_OFFSET` - UTC offset for rendered timestamps. Defaults to `+05:30`.
//! - `TASKBOARD_RECONCILE` - `rollback` (default) or `keep` for failed moves.
//! - `TASKBOARD_LOG_LEVEL` - `trace|debug|info|warn|error`. Defaults per build mode.
//! - `TASKBOARD_LOG_DIR` - absolute log directory. File logging is off when unset.

use crate::board::view_model::ReconcilePolicy;
use crate::logging::{default_log_level, normalize_level};
use chrono::{FixedOffset, Offset, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TASKS_PATH: &str = "tasks";
/// India Standard Time (UTC+05:30).
pub const DEFAULT_DISPLAY_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid value for {key}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved configuration for the board and its HTTP store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Base URL without trailing slash.
    pub api_url: String,
    /// Collection path segment without surrounding slashes.
    pub tasks_path: String,
    /// `None` keeps the HTTP client default.
    pub request_timeout: Option<Duration>,
    pub display_offset: FixedOffset,
    pub reconcile: ReconcilePolicy,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            tasks_path: DEFAULT_TASKS_PATH.to_string(),
            request_timeout: None,
            display_offset: default_display_offset(),
            reconcile: ReconcilePolicy::default(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl BoardConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`; unset or blank values use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = read("TASKBOARD_API_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("TASKBOARD_API_URL", format!("`{url}` is not an http(s) URL")));
            }
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(path) = read("TASKBOARD_TASKS_PATH") {
            let path = path.trim_matches('/').to_string();
            if path.is_empty() {
                return Err(invalid("TASKBOARD_TASKS_PATH", "path must not be empty".to_string()));
            }
            config.tasks_path = path;
        }

        if let Some(raw) = read("TASKBOARD_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    invalid("TASKBOARD_TIMEOUT_SECS", format!("`{raw}` is not a positive integer"))
                })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        if let Some(raw) = read("TASKBOARD_DISPLAY_OFFSET") {
            config.display_offset = parse_utc_offset(&raw)
                .ok_or_else(|| invalid("TASKBOARD_DISPLAY_OFFSET", format!("`{raw}` is not ±HH:MM")))?;
        }

        if let Some(raw) = read("TASKBOARD_RECONCILE") {
            config.reconcile = raw
                .parse()
                .map_err(|message| invalid("TASKBOARD_RECONCILE", message))?;
        }

        if let Some(raw) = read("TASKBOARD_LOG_LEVEL") {
            config.log_level =
                normalize_level(&raw).map_err(|message| invalid("TASKBOARD_LOG_LEVEL", message))?;
        }

        if let Some(raw) = read("TASKBOARD_LOG_DIR") {
            let dir = PathBuf::from(&raw);
            if !dir.is_absolute() {
                return Err(invalid("TASKBOARD_LOG_DIR", format!("`{raw}` is not absolute")));
            }
            config.log_dir = Some(dir);
        }

        Ok(config)
    }

    /// Full URL of the task collection.
    pub fn tasks_url(&self) -> String {
        format!("{}/{}", self.api_url, self.tasks_path)
    }

    pub fn logout_url(&self) -> String {
        format!("{}/logout", self.api_url)
    }
}

pub fn default_display_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parses `±HH:MM`, `±HHMM` or `±HH`; `Z` means UTC.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|ch| *ch != ':').collect();
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn invalid(key: &'static str, message: String) -> ConfigError {
    ConfigError::InvalidValue { key, message }
}

#[cfg(test)]
mod tests {
    use super::{parse_utc_offset, BoardConfig, ConfigError, DEFAULT_API_URL};
    use crate::board::view_model::ReconcilePolicy;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = BoardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.tasks_url(), "http://localhost:3000/api/tasks");
        assert_eq!(config.logout_url(), "http://localhost:3000/api/logout");
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.display_offset.local_minus_utc(), 19_800);
        assert_eq!(config.reconcile, ReconcilePolicy::RollBack);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn overrides_are_normalized() {
        let config = BoardConfig::from_lookup(lookup_from(&[
            ("TASKBOARD_API_URL", "https://board.example.com/api/"),
            ("TASKBOARD_TASKS_PATH", "/todos/"),
            ("TASKBOARD_TIMEOUT_SECS", "15"),
            ("TASKBOARD_DISPLAY_OFFSET", "-04:00"),
            ("TASKBOARD_RECONCILE", "keep"),
            ("TASKBOARD_LOG_LEVEL", "WARNING"),
        ]))
        .unwrap();

        assert_eq!(config.tasks_url(), "https://board.example.com/api/todos");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.display_offset.local_minus_utc(), -4 * 3600);
        assert_eq!(config.reconcile, ReconcilePolicy::KeepOptimistic);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = BoardConfig::from_lookup(lookup_from(&[("TASKBOARD_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "TASKBOARD_TIMEOUT_SECS",
                ..
            }
        ));

        let err = BoardConfig::from_lookup(lookup_from(&[("TASKBOARD_LOG_DIR", "logs")]))
            .unwrap_err();
        assert!(err.to_string().contains("TASKBOARD_LOG_DIR"));

        assert!(BoardConfig::from_lookup(lookup_from(&[("TASKBOARD_API_URL", "ftp://x")])).is_err());
    }

    #[test]
    fn utc_offsets_parse_in_common_shapes() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("+0530").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-03").unwrap().local_minus_utc(), -10_800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("05:30").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
    }
}
