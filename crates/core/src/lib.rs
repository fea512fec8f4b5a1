//! Core types for pipeline-sync
//!
//! Pure domain logic: spreadsheet record validation, batch reports and the
//! declarative schema-extension artifact. No database access lives here.

pub mod constants;
pub mod env_config;
mod error;
mod iso;
mod migration;
mod record;
mod report;
mod schema_spec;
mod validation;

pub use constants::*;
pub use error::*;
pub use iso::*;
pub use migration::*;
pub use record::*;
pub use report::*;
pub use schema_spec::*;
pub use validation::*;
