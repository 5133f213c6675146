//! Runtime settings and constants.
//!
//! Settings come from the environment (a `.env` file is loaded by the
//! binary through `dotenv`), the VPC description from a JSON file.

use crate::provision::VpcArgs;
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest prefix handed out for a subnet. /31 and /32 leave no hosts.
pub const MAX_SUBNET_PREFIX: u8 = 30;

pub const DEFAULT_CONFIG_FILE: &str = "vpc.json";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PLAN_DIR: &str = ".";

pub const ENV_CONFIG: &str = "VPC_CONFIG";
pub const ENV_REGION: &str = "VPC_REGION";
pub const ENV_PLAN_DIR: &str = "VPC_PLAN_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config file {path} at '{json_path}': {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_file: PathBuf,
    pub region: String,
    pub plan_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Settings {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, unset or blank keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Settings {
            config_file: PathBuf::from(get(ENV_CONFIG, DEFAULT_CONFIG_FILE)),
            region: get(ENV_REGION, DEFAULT_REGION),
            plan_dir: PathBuf::from(get(ENV_PLAN_DIR, DEFAULT_PLAN_DIR)),
        }
    }

    pub fn plan_file(&self, date: NaiveDate) -> PathBuf {
        self.plan_dir.join(plan_file_name(date))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_lookup(|_| None)
    }
}

pub fn plan_file_name(date: NaiveDate) -> String {
    format!("vpc_plan_{}.json", date.format("%Y-%m-%d"))
}

/// Read a [`VpcArgs`] JSON file.
pub fn load_vpc_args(path: impl AsRef<Path>) -> Result<VpcArgs, ConfigError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Reading VPC config: {}", path.display());
    parse_vpc_args(&json).map_err(|(json_path, source)| ConfigError::Parse {
        path: path.to_path_buf(),
        json_path,
        source,
    })
}

fn parse_vpc_args(json: &str) -> Result<VpcArgs, (String, serde_json::Error)> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        let json_path = e.path().to_string();
        (json_path, e.into_inner())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.config_file, PathBuf::from("vpc.json"));
        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.plan_dir, PathBuf::from("."));
    }

    #[test]
    fn test_settings_from_lookup() {
        let env = HashMap::from([
            (ENV_REGION, "eu-west-1"),
            (ENV_PLAN_DIR, "plans"),
            (ENV_CONFIG, "  "),
        ]);
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(settings.config_file, PathBuf::from("vpc.json"));
        assert_eq!(
            settings.plan_file(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()),
            PathBuf::from("plans").join("vpc_plan_2026-03-09.json")
        );
    }

    #[test]
    fn test_load_vpc_args() {
        let args = load_vpc_args("src/tests/test_data/vpc_test_config_01.json")
            .expect("Error reading test config");
        assert_eq!(args.base_cidr, "10.0.0.0/16");
        assert_eq!(args.availability_zone_names.len(), 3);
        assert!(args.endpoints.s3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_vpc_args("src/tests/test_data/missing.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_parse_error_reports_path() {
        let err = load_vpc_args("src/tests/test_data/vpc_test_config_bad.json").unwrap_err();
        match err {
            ConfigError::Parse { json_path, .. } => {
                assert_eq!(json_path, "flow_logs.traffic_type")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
