use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use crate::api::err::{CredentialError, Result};

pub const DATA_DIR: &str = "CREDENTIAL_DATA_DIR";
pub const REPORT_DIR: &str = "CREDENTIAL_REPORT_DIR";
pub const LOG_LEVEL: &str = "CREDENTIAL_LOG_LEVEL";
pub const LOG_FILE: &str = "CREDENTIAL_LOG_FILE";
pub const MIN_SCORE: &str = "CREDENTIAL_MIN_SCORE";
pub const RECENT_YEAR: &str = "CREDENTIAL_RECENT_YEAR";
pub const CHANNEL_CAPACITY: &str = "CREDENTIAL_CHANNEL_CAPACITY";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `<Name>_students.csv` rosters.
    pub data_dir: PathBuf,
    pub report_dir: PathBuf,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    /// When set, found records below this score come back invalid.
    pub min_score: Option<f64>,
    /// Graduation year from which a graduate counts as recent.
    pub recent_year: u16,
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            report_dir: PathBuf::from("reports"),
            log_level: LevelFilter::Info,
            log_file: None,
            min_score: None,
            recent_year: 2024,
            channel_capacity: 32,
        }
    }
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            data_dir: get(DATA_DIR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            report_dir: get(REPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.report_dir),
            log_level: parse(LOG_LEVEL, get(LOG_LEVEL))?.unwrap_or(defaults.log_level),
            log_file: get(LOG_FILE).map(PathBuf::from),
            min_score: parse(MIN_SCORE, get(MIN_SCORE))?,
            recent_year: parse(RECENT_YEAR, get(RECENT_YEAR))?.unwrap_or(defaults.recent_year),
            channel_capacity: match parse(CHANNEL_CAPACITY, get(CHANNEL_CAPACITY))? {
                Some(0) => {
                    return Err(CredentialError::ConfigError(format!(
                        "{} must be at least 1",
                        CHANNEL_CAPACITY
                    )))
                }
                Some(n) => n,
                None => defaults.channel_capacity,
            },
        })
    }
}

fn parse<T>(key: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| {
                CredentialError::ConfigError(format!("{}=`{}`: {}", key, v, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reads_all_keys() {
        let config = Config::from_lookup(lookup(&[
            (DATA_DIR, "/srv/rosters"),
            (REPORT_DIR, "out"),
            (LOG_LEVEL, "debug"),
            (LOG_FILE, "validator.log"),
            (MIN_SCORE, "3.0"),
            (RECENT_YEAR, "2025"),
            (CHANNEL_CAPACITY, "8"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/rosters"));
        assert_eq!(config.report_dir, PathBuf::from("out"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("validator.log")));
        assert_eq!(config.min_score, Some(3.0));
        assert_eq!(config.recent_year, 2025);
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[(DATA_DIR, "  "), (MIN_SCORE, "")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.min_score, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[(RECENT_YEAR, "soon")])),
            Err(CredentialError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(LOG_LEVEL, "loud")])),
            Err(CredentialError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(CHANNEL_CAPACITY, "0")])),
            Err(CredentialError::ConfigError(_))
        ));
    }
}
