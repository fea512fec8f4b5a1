//! Shared constants for pipeline-sync.
//!
//! Centralizes names and defaults used by the validator, the migrator and the CLI.

/// Schema that holds the `projects` table when `DB_SCHEMA` is not set.
pub const DEFAULT_SCHEMA: &str = "pipeline_dashboard";

/// Table extended by the valuation-column migration.
pub const PROJECTS_TABLE: &str = "projects";

/// Placeholder substituted with the target schema when rendering a script.
pub const SCHEMA_PLACEHOLDER: &str = "{{schema}}";

/// Physical spreadsheet row of the header.
pub const HEADER_ROW: usize = 1;

/// Physical spreadsheet row of the first data record.
pub const FIRST_DATA_ROW: usize = HEADER_ROW + 1;

/// Inclusive bounds of the overall project score.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 5.0;

/// Spreadsheet header texts, matched exactly after trimming.
pub const HEADER_PROJECT_NAME: &str = "Project Name";
pub const HEADER_PROJECT_CODENAME: &str = "Project Codename";
pub const HEADER_CAPACITY_MW: &str = "Legacy Nameplate Capacity (MW)";
pub const HEADER_ISO: &str = "ISO";
pub const HEADER_OVERALL_SCORE: &str = "Overall Project Score";

/// PostgreSQL connection pool: maximum connections.
///
/// A migration holds one connection; the second covers a concurrent verify.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 2;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 30;

/// Default PostgreSQL port when only discrete `DB_*` variables are given.
pub const DEFAULT_PG_PORT: u16 = 5432;

/// Number of whole-run attempts when a migration hits a transient DDL conflict.
pub const MIGRATION_MAX_ATTEMPTS: u32 = 2;
