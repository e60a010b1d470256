use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::database::{big_result::BigResultOptions, bulk_insert::BulkInsertOptions};

/// Tuning for the helpers, usually loaded from a YAML file by the application.
///
/// ```yaml
/// bulk_insert:
///   batch_size: 500
/// big_result:
///   long_query_time: 3600
///   net_write_timeout: 600
/// ```
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct DbHelperConfig {
    #[serde(default)]
    pub bulk_insert: BulkInsertOptions,

    #[serde(default)]
    pub big_result: BigResultOptions,
}

#[derive(thiserror::Error, Debug)]
pub enum LoadConfigError {
    #[error("Could not read config file: {0}")]
    CouldNotReadFile(#[from] std::io::Error),

    #[error("Could not parse config yaml: {0}")]
    CouldNotParseYaml(#[from] serde_yaml::Error),
}

impl DbHelperConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LoadConfigError> {
        if yaml.trim().is_empty() {
            return Ok(DbHelperConfig::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadConfigError> {
        let contents = fs::read_to_string(path)?;
        DbHelperConfig::from_yaml_str(&contents)
    }
}
