//! Process configuration, built once at startup and passed to every step.

use std::fmt;

use crate::error::{EtlError, Result};

/// Weeks dropped from every table unless `EXCLUDED_WEEKS` says otherwise.
pub const DEFAULT_EXCLUDED_WEEKS: &[&str] = &["REG10"];

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_DEST_TABLE: &str = "drew_ringo";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/bengals_etl.log";

const REQUIRED: &[&str] = &[
    "S3_BUCKET_NAME",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "DB_CONNECTION_STRING",
];

/// Everything the pipeline needs from the environment.
#[derive(Clone)]
pub struct Config {
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub db_connection_string: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub dest_table: String,
    pub excluded_weeks: Vec<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Every required key is checked before returning, so a single
    /// [`EtlError::Configuration`] lists all the missing variables at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|key| get(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EtlError::Configuration(missing));
        }

        let required = |key: &str| get(key).unwrap_or_default();

        let excluded_weeks = match get("EXCLUDED_WEEKS") {
            Some(raw) => parse_week_list(&raw),
            None => DEFAULT_EXCLUDED_WEEKS.iter().map(|w| w.to_string()).collect(),
        };

        Ok(Self {
            bucket: required("S3_BUCKET_NAME"),
            access_key_id: required("AWS_ACCESS_KEY_ID"),
            secret_access_key: required("AWS_SECRET_ACCESS_KEY"),
            db_connection_string: required("DB_CONNECTION_STRING"),
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: get("S3_ENDPOINT_URL"),
            dest_table: get("DEST_TABLE").unwrap_or_else(|| DEFAULT_DEST_TABLE.to_string()),
            excluded_weeks,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bucket", &self.bucket)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("db_connection_string", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("dest_table", &self.dest_table)
            .field("excluded_weeks", &self.excluded_weeks)
            .finish()
    }
}

/// The subset of [`Config`] needed by commands that only touch the database.
#[derive(Clone)]
pub struct DbConfig {
    pub db_connection_string: String,
    pub dest_table: String,
}

impl DbConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Requires only `DB_CONNECTION_STRING`; object store settings are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_connection_string = get("DB_CONNECTION_STRING")
            .ok_or_else(|| EtlError::Configuration(vec!["DB_CONNECTION_STRING".to_string()]))?;

        Ok(Self {
            db_connection_string,
            dest_table: get("DEST_TABLE").unwrap_or_else(|| DEFAULT_DEST_TABLE.to_string()),
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("db_connection_string", &"<redacted>")
            .field("dest_table", &self.dest_table)
            .finish()
    }
}

fn parse_week_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
