use crate::core::error::ChatError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One entry of the credential file as found on disk. Only the model
/// name is required at parse time; the other fields are checked when a
/// record is actually selected.
#[derive(Debug, Clone, Deserialize)]
struct CredentialRecord {
    model: String,
    key: Option<String>,
    version: Option<String>,
    endpoint: Option<String>,
}

/// Complete credentials for one model.
#[derive(Debug, Clone)]
pub struct ModelCredential {
    pub model: String,
    pub key: String,
    pub api_version: String,
    pub endpoint: String,
}

fn read_records(path: &Path) -> Result<Vec<CredentialRecord>, ChatError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ChatError::CredentialConfig(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        ChatError::CredentialConfig(format!("failed to parse {}: {}", path.display(), e))
    })
}

fn require(
    value: Option<String>,
    field: &str,
    model: &str,
    path: &Path,
) -> Result<String, ChatError> {
    value.ok_or_else(|| {
        ChatError::CredentialConfig(format!(
            "record for model \"{}\" in {} is missing \"{}\"",
            model,
            path.display(),
            field
        ))
    })
}

/// Look up credentials for `model_name` in the JSON array at `path`.
///
/// The scan is linear and the match exact and case-sensitive; when two
/// records share a model name the first wins and later ones are never
/// consulted. Nothing is cached, so callers re-resolve whenever the
/// selection changes.
pub fn resolve_credentials(path: &Path, model_name: &str) -> Result<ModelCredential, ChatError> {
    let records = read_records(path)?;
    let record = records
        .into_iter()
        .find(|record| record.model == model_name)
        .ok_or_else(|| ChatError::CredentialNotFound(model_name.to_string()))?;

    Ok(ModelCredential {
        key: require(record.key, "key", &record.model, path)?,
        api_version: require(record.version, "version", &record.model, path)?,
        endpoint: require(record.endpoint, "endpoint", &record.model, path)?,
        model: record.model,
    })
}

/// Distinct model names in the credential file, in file order. This is
/// the fixed list the model picker offers.
pub fn list_models(path: &Path) -> Result<Vec<String>, ChatError> {
    let records = read_records(path)?;
    let mut models: Vec<String> = Vec::new();
    for record in records {
        if !models.iter().any(|known| known == &record.model) {
            models.push(record.model);
        }
    }
    Ok(models)
}
