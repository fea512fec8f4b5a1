use std::path::Path;

use anyhow::{Context, Result};
use pipeline_sync_core::SchemaExtensionSpec;
use pipeline_sync_storage::DbConfig;

pub(crate) mod migrate;
pub(crate) mod script;
pub(crate) mod validate;
pub(crate) mod verify;

/// Built-in artifact unless `--script` points elsewhere.
pub(crate) fn load_spec(script: Option<&Path>) -> Result<SchemaExtensionSpec> {
    match script {
        Some(path) => SchemaExtensionSpec::from_file(path)
            .with_context(|| format!("failed to load migration script {}", path.display())),
        None => SchemaExtensionSpec::builtin().context("built-in migration script is invalid"),
    }
}

/// Database settings from the environment, with `--schema` taking precedence.
pub(crate) fn load_db_config(schema: Option<&str>) -> Result<DbConfig> {
    let config = DbConfig::from_env().context("database configuration")?;
    match schema {
        Some(schema) => Ok(config.with_schema(schema)?),
        None => Ok(config),
    }
}
