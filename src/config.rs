use std::{env, path::PathBuf};

use chrono::Duration;

use crate::error::AppError;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;
const MAX_SESSION_TTL_MINUTES: i64 = 366 * 24 * 60;
const DEFAULT_LOG_FILTER: &str = "info,trips=debug";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: Option<PathBuf>,
    /// `None` keeps sessions alive until they are destroyed explicitly.
    pub session_ttl: Option<Duration>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            session_ttl: Some(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES)),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = lookup("TRIPS_DATA_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let ttl_minutes: i64 = match lookup("TRIPS_SESSION_TTL_MINUTES") {
            Some(raw) => raw.trim().parse().map_err(|err| {
                AppError::Config(format!("invalid TRIPS_SESSION_TTL_MINUTES: {err}"))
            })?,
            None => DEFAULT_SESSION_TTL_MINUTES,
        };
        if !(0..=MAX_SESSION_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(AppError::Config(format!(
                "TRIPS_SESSION_TTL_MINUTES must be between 0 and {MAX_SESSION_TTL_MINUTES}"
            )));
        }
        let session_ttl = match ttl_minutes {
            0 => None,
            minutes => Some(Duration::try_minutes(minutes).ok_or_else(|| {
                AppError::Config("TRIPS_SESSION_TTL_MINUTES is out of range".into())
            })?),
        };

        let log_filter =
            lookup("TRIPS_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_file,
            session_ttl,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.data_file.is_none());
        assert_eq!(config.session_ttl, Some(Duration::minutes(60)));
        assert_eq!(config.log_filter, "info,trips=debug");
    }

    #[test]
    fn zero_ttl_disables_expiry() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("TRIPS_SESSION_TTL_MINUTES", "0")])).unwrap();
        assert!(config.session_ttl.is_none());
    }

    #[test]
    fn reads_data_file_and_filter() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TRIPS_DATA_FILE", "seed/trips.json"),
            ("TRIPS_LOG", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("seed/trips.json")));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn rejects_garbage_ttl() {
        let err = AppConfig::from_lookup(lookup_from(&[("TRIPS_SESSION_TTL_MINUTES", "soon")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("TRIPS_SESSION_TTL_MINUTES", "-5")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn rejects_oversized_ttl() {
        for raw in ["1000000000000", "9223372036854775807", "527041"] {
            let err = AppConfig::from_lookup(lookup_from(&[("TRIPS_SESSION_TTL_MINUTES", raw)]))
                .unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "accepted {raw}");
        }

        let config =
            AppConfig::from_lookup(lookup_from(&[("TRIPS_SESSION_TTL_MINUTES", "527040")]))
                .unwrap();
        assert_eq!(config.session_ttl, Some(Duration::days(366)));
    }
}
