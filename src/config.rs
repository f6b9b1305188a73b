//! Job identity configuration.
//!
//! The graph layer only needs the job name and id, which feed every operator
//! and intermediate stream id. They come from a flat key/value config
//! (`job.name`, `job.id`) or a JSON document with the same keys.

use serde::Deserialize;
use std::collections::HashMap;

/// Config key for the job name.
pub const JOB_NAME: &str = "job.name";
/// Config key for the job id.
pub const JOB_ID: &str = "job.id";

fn default_job_id() -> String {
    "1".to_string()
}

/// Error type for configuration loading.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required key is absent or empty.
    #[error("missing required config {0}")]
    Missing(&'static str),
    /// The config could not be parsed.
    #[error("invalid job config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Identity of the job whose graph is being described.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct JobConfig {
    /// Job name, first component of every operator id.
    #[serde(rename = "job.name")]
    pub job_name: String,
    /// Job id, distinguishes multiple deployments of one job.
    #[serde(rename = "job.id", default = "default_job_id")]
    pub job_id: String,
}

impl JobConfig {
    /// Creates a config from explicit values.
    pub fn new(job_name: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            job_id: job_id.into(),
        }
    }

    /// Reads the job identity from a flat key/value map.
    ///
    /// Unknown keys are ignored; `job.id` defaults to `"1"`.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        if !map.contains_key(JOB_NAME) {
            return Err(ConfigError::Missing(JOB_NAME));
        }
        let config: JobConfig = serde_json::from_value(serde_json::to_value(map)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the job identity from a JSON object.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: JobConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects empty name or id.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.job_name.trim().is_empty() {
            return Err(ConfigError::Missing(JOB_NAME));
        }
        if self.job_id.trim().is_empty() {
            return Err(ConfigError::Missing(JOB_ID));
        }
        Ok(())
    }
}
