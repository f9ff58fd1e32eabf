//! Service configuration, read once at process start.

use std::str::FromStr;

use wesbridge_engine::SnakemakeBatchConfig;

/// Configuration errors, surfaced at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The configured engine name is not one of the supported engines.
  #[error("unknown engine name '{name}'")]
  UnknownEngine { name: String },

  /// A value the selected engine requires is missing.
  #[error("missing required configuration value '{name}'")]
  MissingValue { name: &'static str },

  /// A configuration value could not be interpreted.
  #[error("invalid configuration value '{name}': {message}")]
  InvalidValue { name: &'static str, message: String },
}

/// The supported workflow engines. Adapter selection is a pure function
/// of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineName {
  Nextflow,
  Cromwell,
  Miniwdl,
  Snakemake,
}

impl EngineName {
  pub fn as_str(&self) -> &'static str {
    match self {
      EngineName::Nextflow => "nextflow",
      EngineName::Cromwell => "cromwell",
      EngineName::Miniwdl => "miniwdl",
      EngineName::Snakemake => "snakemake",
    }
  }
}

impl FromStr for EngineName {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "nextflow" => Ok(EngineName::Nextflow),
      "cromwell" => Ok(EngineName::Cromwell),
      "miniwdl" => Ok(EngineName::Miniwdl),
      "snakemake" => Ok(EngineName::Snakemake),
      _ => Err(ConfigError::UnknownEngine {
        name: s.to_string(),
      }),
    }
  }
}

/// Everything the process reads from its environment, gathered into one
/// explicit struct so no module pulls ambient globals.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
  pub engine: EngineName,
  /// Queue head jobs are submitted to.
  pub job_queue: String,
  /// Job definition head jobs are submitted with.
  pub job_definition: String,
  /// Log group the engine head job writes to (log-query discovery).
  pub engine_log_group: Option<String>,
  /// Output directory URI (`s3://bucket/prefix`) for object-store outputs.
  pub output_dir_s3_uri: Option<String>,
  /// Base URL of the remote engine server (remote variants only).
  pub engine_endpoint: Option<String>,
  /// Backend settings rendered into Snakemake commands.
  pub snakemake: SnakemakeBatchConfig,
}

impl ServiceConfig {
  /// Build a configuration for the given engine with empty wiring; callers
  /// fill in what their variant needs.
  pub fn new(engine: EngineName) -> Self {
    Self {
      engine,
      job_queue: String::new(),
      job_definition: String::new(),
      engine_log_group: None,
      output_dir_s3_uri: None,
      engine_endpoint: None,
      snakemake: SnakemakeBatchConfig::default(),
    }
  }

  /// Read the configuration from process environment variables.
  ///
  /// `ENGINE_NAME` is required and must name a supported engine; the
  /// remaining values are validated by the factory against what the
  /// selected variant needs.
  pub fn from_env() -> Result<Self, ConfigError> {
    let engine_name =
      std::env::var("ENGINE_NAME").map_err(|_| ConfigError::MissingValue {
        name: "ENGINE_NAME",
      })?;

    Ok(Self {
      engine: engine_name.parse()?,
      job_queue: env_or_default("JOB_QUEUE"),
      job_definition: env_or_default("JOB_DEFINITION"),
      engine_log_group: env_opt("ENGINE_LOG_GROUP"),
      output_dir_s3_uri: env_opt("OUTPUT_DIR_S3_URI"),
      engine_endpoint: env_opt("ENGINE_ENDPOINT"),
      snakemake: SnakemakeBatchConfig {
        task_queue: env_or_default("TASK_QUEUE"),
        workflow_role: env_or_default("WORKFLOW_ROLE"),
        filesystem_access_point: env_or_default("FSAP_ID"),
      },
    })
  }
}

fn env_opt(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_or_default(name: &str) -> String {
  std::env::var(name).unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn engine_names_parse_case_insensitively() {
    assert_eq!("nextflow".parse::<EngineName>().unwrap(), EngineName::Nextflow);
    assert_eq!("CROMWELL".parse::<EngineName>().unwrap(), EngineName::Cromwell);
    assert_eq!(" miniwdl ".parse::<EngineName>().unwrap(), EngineName::Miniwdl);
    assert_eq!("Snakemake".parse::<EngineName>().unwrap(), EngineName::Snakemake);
  }

  #[test]
  fn unknown_engine_name_is_rejected() {
    let err = "toil".parse::<EngineName>().unwrap_err();
    assert!(matches!(err, ConfigError::UnknownEngine { name } if name == "toil"));
  }
}
