use crate::records::WideRow;

/// Accumulates step results across a single run.
#[derive(Default)]
pub struct PipelineContext {
    // Extract step result — guaranteed Some after step_extract
    pub wide: Option<Vec<WideRow>>,

    // Initialization result — guaranteed Some after step_initialize
    pub snapshot: Option<Vec<WideRow>>,

    // Diff/load result — guaranteed Some after step_diff_load
    pub changed: Option<Vec<WideRow>>,
}
