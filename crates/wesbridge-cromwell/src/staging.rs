//! Workflow source staging for remote submission.
//!
//! A run submission may reference an object-store-hosted workflow. A plain
//! object becomes the workflow source directly; a `workflow.tar` bundle is
//! unpacked and resolved by one of three layouts: a single entry, multiple
//! entries described by a MANIFEST.json, or multiple entries following the
//! `main.<type>` naming convention.

use bytes::Bytes;
use serde::Deserialize;
use url::Url;

use wesbridge_aws::{ClientError, ObjectStore, collect_object};
use wesbridge_engine::WesError;

/// Object basename that marks a multi-file workflow bundle.
const WORKFLOW_ARCHIVE_NAME: &str = "workflow.tar";
const MANIFEST_FILE_NAME: &str = "MANIFEST.json";
const OPTIONS_FILE_NAME: &str = "options.json";

/// One staged file destined for a multipart submission part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
  pub file_name: String,
  pub data: Bytes,
}

impl StagedFile {
  fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
    Self {
      file_name: file_name.into(),
      data: data.into(),
    }
  }
}

/// The resolved pieces of a workflow submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionParts {
  /// Workflow URL passed through verbatim (remote manifest main URL).
  pub workflow_url: Option<String>,
  /// The workflow source file.
  pub source: Option<StagedFile>,
  /// Inputs files, in priority order (later overrides earlier).
  pub inputs: Vec<StagedFile>,
  /// Workflow options file.
  pub options: Option<StagedFile>,
  /// The whole bundle, attached so the engine can resolve imports.
  pub dependencies: Option<StagedFile>,
}

/// Stage a workflow hosted in the object store.
///
/// `s3_uri` names the object; a download failure is a client fault (the
/// caller supplied the reference). `workflow_type` drives the naming
/// convention inside bundles.
pub async fn stage_workflow(
  store: &dyn ObjectStore,
  s3_uri: &str,
  workflow_type: &str,
) -> Result<SubmissionParts, WesError> {
  let (bucket, key) = parse_s3_uri(s3_uri)?;

  let data = fetch_object(store, &bucket, &key)
    .await
    .map_err(|e| WesError::invalid_request(format!("invalid S3 object '{}': {}", s3_uri, e)))?;

  let basename = key.rsplit('/').next().unwrap_or(&key).to_string();
  if basename == WORKFLOW_ARCHIVE_NAME {
    parse_workflow_archive(&data, workflow_type)
      .map_err(|e| WesError::invalid_request(format!("'{}' is not a valid workflow bundle: {}", s3_uri, e)))
  } else {
    Ok(SubmissionParts {
      source: Some(StagedFile::new(basename, data)),
      ..SubmissionParts::default()
    })
  }
}

fn parse_s3_uri(s3_uri: &str) -> Result<(String, String), WesError> {
  let url = Url::parse(s3_uri)
    .map_err(|e| WesError::invalid_request(format!("invalid workflow url '{}': {}", s3_uri, e)))?;
  let bucket = url
    .host_str()
    .ok_or_else(|| WesError::invalid_request(format!("workflow url '{}' has no bucket", s3_uri)))?;
  let key = url.path().trim_start_matches('/');
  if key.is_empty() {
    return Err(WesError::invalid_request("invalid or missing S3 object key"));
  }
  Ok((bucket.to_string(), key.to_string()))
}

async fn fetch_object(
  store: &dyn ObjectStore,
  bucket: &str,
  key: &str,
) -> Result<Bytes, ClientError> {
  let stream = store.get_object(bucket, key).await?;
  collect_object(stream).await
}

/// Unpack a bundle and resolve its layout.
fn parse_workflow_archive(data: &Bytes, workflow_type: &str) -> Result<SubmissionParts, String> {
  let entries = read_archive_entries(data)?;
  if entries.is_empty() {
    return Err("empty workflow bundle".to_string());
  }

  if entries.len() == 1 {
    let (name, data) = entries.into_iter().next().unwrap_or_default();
    return Ok(SubmissionParts {
      source: Some(StagedFile::new(name, data)),
      ..SubmissionParts::default()
    });
  }

  let mut parts = if let Some((_, manifest)) = entries.iter().find(|(n, _)| n == MANIFEST_FILE_NAME)
  {
    parse_workflow_manifest(manifest, &entries)?
  } else {
    parse_by_naming_convention(&entries, workflow_type)?
  };

  // Multi-file bundles travel whole as well, so the engine can resolve
  // imports between entries.
  parts.dependencies = Some(StagedFile::new(WORKFLOW_ARCHIVE_NAME, data.clone()));
  Ok(parts)
}

/// Read all regular entries of a tar bundle into memory, in order.
fn read_archive_entries(data: &Bytes) -> Result<Vec<(String, Bytes)>, String> {
  use std::io::Read;

  let mut archive = tar::Archive::new(&data[..]);
  let mut entries = Vec::new();
  for entry in archive.entries().map_err(|e| e.to_string())? {
    let mut entry = entry.map_err(|e| e.to_string())?;
    if !entry.header().entry_type().is_file() {
      continue;
    }
    let name = entry
      .path()
      .map_err(|e| e.to_string())?
      .to_string_lossy()
      .into_owned();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).map_err(|e| e.to_string())?;
    entries.push((name, Bytes::from(data)));
  }
  Ok(entries)
}

#[derive(Debug, Deserialize)]
struct WorkflowManifest {
  #[serde(rename = "mainWorkflowURL")]
  main_workflow_url: String,
  #[serde(rename = "inputFileURLs", default)]
  input_file_urls: Vec<String>,
  #[serde(rename = "optionsFileURL", default)]
  options_file_url: Option<String>,
}

/// Resolve bundle entries through its MANIFEST.json.
fn parse_workflow_manifest(
  manifest: &Bytes,
  entries: &[(String, Bytes)],
) -> Result<SubmissionParts, String> {
  let manifest: WorkflowManifest =
    serde_json::from_slice(manifest).map_err(|e| format!("invalid {}: {}", MANIFEST_FILE_NAME, e))?;

  let mut parts = SubmissionParts::default();

  match bundle_relative_path(&manifest.main_workflow_url) {
    Some(path) => {
      parts.source = Some(find_entry(entries, &path)?);
    }
    None => {
      parts.workflow_url = Some(manifest.main_workflow_url.clone());
    }
  }

  for url in &manifest.input_file_urls {
    let path = bundle_relative_path(url)
      .ok_or_else(|| format!("unsupported input file url scheme for: '{}'", url))?;
    parts.inputs.push(find_entry(entries, &path)?);
  }

  if let Some(url) = &manifest.options_file_url {
    let path = bundle_relative_path(url)
      .ok_or_else(|| format!("unsupported options file url scheme for: '{}'", url))?;
    parts.options = Some(find_entry(entries, &path)?);
  }

  Ok(parts)
}

/// Resolve bundle entries by the `main.<type>` naming convention.
fn parse_by_naming_convention(
  entries: &[(String, Bytes)],
  workflow_type: &str,
) -> Result<SubmissionParts, String> {
  let main_name = format!("main.{}", workflow_type.to_lowercase());
  let Ok(source) = find_entry(entries, &main_name) else {
    return Err(format!("'{}' file not found", main_name));
  };

  let mut parts = SubmissionParts {
    source: Some(source),
    ..SubmissionParts::default()
  };

  for (name, data) in entries {
    // Root-level inputs files only, in the order they appear.
    if !name.contains('/') && name.starts_with("inputs") {
      parts.inputs.push(StagedFile::new(name.clone(), data.clone()));
    }
  }

  if let Ok(options) = find_entry(entries, OPTIONS_FILE_NAME) {
    parts.options = Some(options);
  }

  Ok(parts)
}

/// A manifest URL with no scheme or a `file` scheme names a bundle entry;
/// any other scheme is remote.
fn bundle_relative_path(url_str: &str) -> Option<String> {
  match Url::parse(url_str) {
    Ok(url) if url.scheme() == "file" => Some(url.path().trim_start_matches('/').to_string()),
    Ok(_) => None,
    Err(_) => Some(url_str.trim_start_matches('/').to_string()),
  }
}

fn find_entry(entries: &[(String, Bytes)], path: &str) -> Result<StagedFile, String> {
  entries
    .iter()
    .find(|(name, _)| name == path)
    .map(|(name, data)| StagedFile::new(name.clone(), data.clone()))
    .ok_or_else(|| format!("'{}' not found in workflow bundle", path))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use wesbridge_aws::mock::MemoryObjectStore;

  fn tar_bundle(entries: &[(&str, &[u8])]) -> Bytes {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
      let mut header = tar::Header::new_gnu();
      header.set_size(data.len() as u64);
      header.set_mode(0o644);
      header.set_cksum();
      builder.append_data(&mut header, name, *data).unwrap();
    }
    Bytes::from(builder.into_inner().unwrap())
  }

  fn store_with(key: &str, data: Bytes) -> Arc<MemoryObjectStore> {
    let store = Arc::new(MemoryObjectStore::new());
    store.put_object("workflows", key, data);
    store
  }

  #[tokio::test]
  async fn plain_object_becomes_the_source() {
    let store = store_with("wf/hello.wdl", Bytes::from_static(b"workflow hello {}"));
    let parts = stage_workflow(store.as_ref(), "s3://workflows/wf/hello.wdl", "WDL")
      .await
      .unwrap();

    let source = parts.source.unwrap();
    assert_eq!(source.file_name, "hello.wdl");
    assert_eq!(&source.data[..], b"workflow hello {}");
    assert!(parts.dependencies.is_none());
    assert!(parts.inputs.is_empty());
  }

  #[tokio::test]
  async fn missing_object_is_a_client_fault() {
    let store = Arc::new(MemoryObjectStore::new());
    let err = stage_workflow(store.as_ref(), "s3://workflows/wf/hello.wdl", "WDL")
      .await
      .unwrap_err();
    assert!(err.is_client_fault());
  }

  #[tokio::test]
  async fn single_entry_bundle_becomes_the_source() {
    let bundle = tar_bundle(&[("hello.wdl", b"workflow hello {}")]);
    let store = store_with("wf/workflow.tar", bundle);

    let parts = stage_workflow(store.as_ref(), "s3://workflows/wf/workflow.tar", "WDL")
      .await
      .unwrap();
    assert_eq!(parts.source.unwrap().file_name, "hello.wdl");
    assert!(parts.dependencies.is_none());
  }

  #[tokio::test]
  async fn manifest_bundle_resolves_named_entries() {
    let manifest = br#"{
      "mainWorkflowURL": "workflows/main.wdl",
      "inputFileURLs": ["inputs/first.json", "inputs/second.json"],
      "optionsFileURL": "options.json"
    }"#;
    let bundle = tar_bundle(&[
      ("MANIFEST.json", manifest),
      ("workflows/main.wdl", b"workflow main {}"),
      ("inputs/first.json", b"{}"),
      ("inputs/second.json", b"{}"),
      ("options.json", b"{}"),
    ]);
    let store = store_with("wf/workflow.tar", bundle);

    let parts = stage_workflow(store.as_ref(), "s3://workflows/wf/workflow.tar", "WDL")
      .await
      .unwrap();
    assert_eq!(parts.source.unwrap().file_name, "workflows/main.wdl");
    assert_eq!(parts.inputs.len(), 2);
    assert_eq!(parts.inputs[0].file_name, "inputs/first.json");
    assert_eq!(parts.options.unwrap().file_name, "options.json");
    assert_eq!(parts.dependencies.unwrap().file_name, "workflow.tar");
  }

  #[tokio::test]
  async fn manifest_with_remote_main_url_passes_it_through() {
    let manifest = br#"{"mainWorkflowURL": "https://example.com/main.wdl"}"#;
    let bundle = tar_bundle(&[("MANIFEST.json", manifest), ("lib.wdl", b"task lib {}")]);
    let store = store_with("wf/workflow.tar", bundle);

    let parts = stage_workflow(store.as_ref(), "s3://workflows/wf/workflow.tar", "WDL")
      .await
      .unwrap();
    assert_eq!(
      parts.workflow_url.as_deref(),
      Some("https://example.com/main.wdl")
    );
    assert!(parts.source.is_none());
  }

  #[tokio::test]
  async fn naming_convention_bundle_finds_main_and_inputs() {
    let bundle = tar_bundle(&[
      ("main.wdl", b"workflow main {}"),
      ("inputs.json", b"{}"),
      ("inputs_extra.json", b"{}"),
      ("options.json", b"{}"),
      ("lib/helpers.wdl", b"task helper {}"),
    ]);
    let store = store_with("wf/workflow.tar", bundle);

    let parts = stage_workflow(store.as_ref(), "s3://workflows/wf/workflow.tar", "WDL")
      .await
      .unwrap();
    assert_eq!(parts.source.unwrap().file_name, "main.wdl");
    assert_eq!(parts.inputs.len(), 2);
    assert_eq!(parts.options.unwrap().file_name, "options.json");
    assert!(parts.dependencies.is_some());
  }

  #[tokio::test]
  async fn naming_convention_without_main_is_a_client_fault() {
    let bundle = tar_bundle(&[("other.wdl", b"workflow other {}"), ("inputs.json", b"{}")]);
    let store = store_with("wf/workflow.tar", bundle);

    let err = stage_workflow(store.as_ref(), "s3://workflows/wf/workflow.tar", "WDL")
      .await
      .unwrap_err();
    assert!(err.is_client_fault());
    assert!(err.to_string().contains("main.wdl"));
  }

  #[tokio::test]
  async fn empty_bundle_is_a_client_fault() {
    let bundle = tar_bundle(&[]);
    let store = store_with("wf/workflow.tar", bundle);
    let err = stage_workflow(store.as_ref(), "s3://workflows/wf/workflow.tar", "WDL")
      .await
      .unwrap_err();
    assert!(err.is_client_fault());
  }
}
