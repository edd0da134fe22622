use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::db::Database;
use crate::error::{PipelineError, Result};
use crate::{export, extract, loader, snapshot};

use super::context::PipelineContext;

/// Sequences a single batch run: connect to both stores, extract and
/// transform, initialize the output relation, diff and load, export the
/// changes to CSV. The first failing step halts the run; later steps
/// never execute. Connections and file handles are dropped on every
/// exit path.
pub struct Pipeline {
    config: PipelineConfig,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows_extracted: usize,
    pub rows_changed: usize,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs the full pipeline once.
    pub fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        info!("*** NEW RUN STARTED ***");

        let mut ctx = PipelineContext::default();

        let source = self.step_connect(&self.config.source_db, "source")?;
        let output = self.step_connect(&self.config.output_db, "output")?;

        self.step_extract(&source, &mut ctx)?;
        self.step_initialize(&output, &mut ctx)?;
        self.step_diff_load(&output, &mut ctx)?;
        self.step_export(&ctx)?;

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            rows_extracted: ctx.wide.as_ref().map_or(0, Vec::len),
            rows_changed: ctx.changed.as_ref().map_or(0, Vec::len),
        };
        info!(
            "Run complete: {} rows extracted, {} rows changed",
            summary.rows_extracted, summary.rows_changed
        );
        Ok(summary)
    }

    fn step_connect(&self, path: &Path, role: &str) -> Result<Database> {
        Database::open(path).map_err(|e| {
            error!("Connection to {} database failed: {}", role, e);
            PipelineError::Connection(e)
        })
    }

    fn step_extract(&self, source: &Database, ctx: &mut PipelineContext) -> Result<()> {
        let wide = extract::extract_and_transform(source).map_err(|e| {
            error!("Extract/transform failed: {}", e);
            PipelineError::Extract(e)
        })?;
        ctx.wide = Some(wide);
        Ok(())
    }

    fn step_initialize(&self, output: &Database, ctx: &mut PipelineContext) -> Result<()> {
        let snapshot = snapshot::initialize_output(output).map_err(|e| {
            error!("Output initialization failed: {}", e);
            PipelineError::Schema(e)
        })?;
        ctx.snapshot = Some(snapshot);
        Ok(())
    }

    fn step_diff_load(&self, output: &Database, ctx: &mut PipelineContext) -> Result<()> {
        let wide = ctx.wide.as_ref().expect("extract step completed");
        let changed = loader::diff_and_load(wide, output).map_err(|e| {
            error!("Diff/load failed: {}", e);
            PipelineError::Diff(e)
        })?;
        ctx.changed = Some(changed);
        Ok(())
    }

    fn step_export(&self, ctx: &PipelineContext) -> Result<()> {
        let changed = ctx.changed.as_ref().expect("diff/load step completed");
        export::write_csv(changed, &self.config.csv_path).map_err(|e| {
            error!("CSV export failed: {}", e);
            PipelineError::Export(e)
        })
    }
}
