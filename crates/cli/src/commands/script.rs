//! Print the migration artifact rendered for one schema. No database access.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use pipeline_sync_storage::resolve_schema;

pub(crate) fn run(schema: Option<&str>, script: Option<&Path>) -> Result<ExitCode> {
    let spec = super::load_spec(script)?;
    let schema = resolve_schema(schema, |key| std::env::var(key).ok())?;

    print!("{}", spec.render(&schema)?);
    Ok(ExitCode::SUCCESS)
}
