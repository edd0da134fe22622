//! Subscriber analytics ETL pipeline.
//!
//! Extracts student, job, and course records from a Cademycode SQLite
//! database, joins them into a denormalized wide relation, diffs that
//! relation against the previously persisted snapshot in the output
//! database, upserts the changed rows, and exports them to CSV.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod extract;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod records;
pub mod snapshot;

pub use config::PipelineConfig;
pub use db::Database;
pub use error::{
    ConfigError, ExportError, ExtractError, LoggingError, PipelineError, Result,
};
pub use pipeline::{Pipeline, PipelineContext, RunSummary};
pub use records::{WideRow, SENTINEL_JOB_ID};
