//! Adapter construction.

use std::sync::Arc;

use tracing::info;

use wesbridge_aws::{JobClient, LogQueryClient, ObjectStore, ResourceTagIndex};
use wesbridge_cromwell::CromwellAdapter;
use wesbridge_engine::{
  BatchAdapter, LogQueryDiscovery, MiniwdlEngine, NextflowEngine, OutputLocation,
  SnakemakeBatchWiring, SnakemakeEngine, StoredOutputs, TaggedJobDiscovery, WesAdapter,
};

use crate::config::{ConfigError, EngineName, ServiceConfig};

/// Handles to the backend collaborators, built by the embedding process.
#[derive(Clone)]
pub struct BackendClients {
  pub jobs: Arc<dyn JobClient>,
  pub tags: Arc<dyn ResourceTagIndex>,
  pub logs: Arc<dyn LogQueryClient>,
  pub store: Arc<dyn ObjectStore>,
}

/// Build the adapter the configuration selects.
///
/// One adapter is constructed per process lifetime; an unknown engine
/// name never reaches this point (it fails configuration parsing), and a
/// variant missing its required wiring fails here, at startup.
pub fn create_adapter(
  config: &ServiceConfig,
  clients: BackendClients,
) -> Result<Arc<dyn WesAdapter>, ConfigError> {
  info!(engine = config.engine.as_str(), "selecting engine adapter");

  match config.engine {
    EngineName::Nextflow => {
      let log_group = config
        .engine_log_group
        .clone()
        .ok_or(ConfigError::MissingValue {
          name: "ENGINE_LOG_GROUP",
        })?;
      let engine = NextflowEngine::new(LogQueryDiscovery::new(
        clients.jobs.clone(),
        clients.logs,
        log_group,
      ));
      Ok(Arc::new(BatchAdapter::new(
        engine,
        clients.jobs,
        &config.job_queue,
        &config.job_definition,
      )))
    }

    EngineName::Miniwdl => {
      let location = parse_output_location(config)?.ok_or(ConfigError::MissingValue {
        name: "OUTPUT_DIR_S3_URI",
      })?;
      let engine = MiniwdlEngine::new(
        TaggedJobDiscovery::new(clients.jobs.clone(), clients.tags),
        StoredOutputs::new(clients.store, location),
      );
      Ok(Arc::new(BatchAdapter::new(
        engine,
        clients.jobs,
        &config.job_queue,
        &config.job_definition,
      )))
    }

    EngineName::Snakemake => {
      // With an output location configured the full batch wiring is used;
      // without one child-task discovery and outputs are placeholders.
      let batch = parse_output_location(config)?.map(|location| SnakemakeBatchWiring {
        discovery: TaggedJobDiscovery::new(clients.jobs.clone(), clients.tags),
        outputs: StoredOutputs::new(clients.store, location),
      });
      let engine = SnakemakeEngine::new(config.snakemake.clone(), batch);
      Ok(Arc::new(BatchAdapter::new(
        engine,
        clients.jobs,
        &config.job_queue,
        &config.job_definition,
      )))
    }

    EngineName::Cromwell => {
      let endpoint = config
        .engine_endpoint
        .clone()
        .ok_or(ConfigError::MissingValue {
          name: "ENGINE_ENDPOINT",
        })?;
      Ok(Arc::new(CromwellAdapter::new(&endpoint, clients.store)))
    }
  }
}

fn parse_output_location(config: &ServiceConfig) -> Result<Option<OutputLocation>, ConfigError> {
  config
    .output_dir_s3_uri
    .as_deref()
    .map(|uri| {
      OutputLocation::parse(uri).map_err(|e| ConfigError::InvalidValue {
        name: "OUTPUT_DIR_S3_URI",
        message: e.to_string(),
      })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
  use super::*;
  use wesbridge_aws::mock::{
    MemoryObjectStore, MockJobClient, MockLogQueryClient, MockResourceTagIndex,
  };

  fn clients() -> BackendClients {
    BackendClients {
      jobs: Arc::new(MockJobClient::new()),
      tags: Arc::new(MockResourceTagIndex::new()),
      logs: Arc::new(MockLogQueryClient::new()),
      store: Arc::new(MemoryObjectStore::new()),
    }
  }

  #[test]
  fn nextflow_requires_a_log_group() {
    let config = ServiceConfig::new(EngineName::Nextflow);
    let err = create_adapter(&config, clients()).map(|_| ()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingValue { name: "ENGINE_LOG_GROUP" }));
  }

  #[test]
  fn nextflow_builds_with_a_log_group() {
    let mut config = ServiceConfig::new(EngineName::Nextflow);
    config.engine_log_group = Some("engine-logs".to_string());
    let adapter = create_adapter(&config, clients()).unwrap();
    assert!(adapter.workflow_type_versions().supports("NEXTFLOW", "1.0"));
  }

  #[test]
  fn miniwdl_requires_an_output_location() {
    let config = ServiceConfig::new(EngineName::Miniwdl);
    let err = create_adapter(&config, clients()).map(|_| ()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingValue { name: "OUTPUT_DIR_S3_URI" }));
  }

  #[test]
  fn miniwdl_rejects_a_malformed_output_location() {
    let mut config = ServiceConfig::new(EngineName::Miniwdl);
    config.output_dir_s3_uri = Some("https://not-s3/outputs".to_string());
    let err = create_adapter(&config, clients()).map(|_| ()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { name: "OUTPUT_DIR_S3_URI", .. }));
  }

  #[test]
  fn miniwdl_builds_with_an_output_location() {
    let mut config = ServiceConfig::new(EngineName::Miniwdl);
    config.output_dir_s3_uri = Some("s3://wf-outputs/runs".to_string());
    let adapter = create_adapter(&config, clients()).unwrap();
    assert!(adapter.workflow_type_versions().supports("WDL", "draft-2"));
  }

  #[test]
  fn snakemake_builds_with_or_without_an_output_location() {
    let config = ServiceConfig::new(EngineName::Snakemake);
    let adapter = create_adapter(&config, clients()).unwrap();
    assert!(adapter.workflow_type_versions().supports("SNAKEMAKE", "1.0"));

    let mut config = ServiceConfig::new(EngineName::Snakemake);
    config.output_dir_s3_uri = Some("s3://wf-outputs/runs".to_string());
    assert!(create_adapter(&config, clients()).is_ok());
  }

  #[test]
  fn cromwell_requires_an_endpoint() {
    let config = ServiceConfig::new(EngineName::Cromwell);
    let err = create_adapter(&config, clients()).map(|_| ()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingValue { name: "ENGINE_ENDPOINT" }));
  }

  #[test]
  fn cromwell_builds_with_an_endpoint() {
    let mut config = ServiceConfig::new(EngineName::Cromwell);
    config.engine_endpoint = Some("http://cromwell:8000".to_string());
    let adapter = create_adapter(&config, clients()).unwrap();
    assert!(adapter.workflow_type_versions().supports("WDL", "1.0"));
  }
}
