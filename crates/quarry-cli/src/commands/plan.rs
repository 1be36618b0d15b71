//! Plan command implementation.

use crate::cli::PlanArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use quarry_domain::Job;
use quarry_extractor::{ChunkPlanner, PdfSplitter};
use std::fs;

/// Execute the plan command.
///
/// Needs no API keys: only the planner runs.
pub fn execute_plan(args: PlanArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = fs::read(&args.file)?;
    let planner = ChunkPlanner::new(PdfSplitter::new(), &config.extractor);
    let plan = planner.plan(&Job::new(document, config.settings.instruction.clone()))?;

    println!("{}", formatter.format_plan(&plan)?);
    Ok(())
}
