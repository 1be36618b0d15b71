//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use quarry_domain::Record;
use quarry_extractor::{ChunkPlan, ExtractionMetadata, ProcessingMode};
use serde_json::Value;
use std::collections::BTreeSet;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format extracted records.
    pub fn format_records(&self, records: &[Record]) -> Result<String> {
        match self.format {
            OutputFormat::Json => records_json(records),
            OutputFormat::Table => Ok(self.format_records_table(records)),
            OutputFormat::Quiet => Ok(records.len().to_string()),
        }
    }

    /// Format records as a table, one column per top-level field.
    fn format_records_table(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return self.colorize("No records extracted.", "yellow");
        }

        let columns: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.as_value().as_object())
            .flat_map(|obj| obj.keys().map(String::as_str))
            .collect();

        let mut builder = Builder::default();
        builder.push_record(columns.iter().copied());

        for record in records {
            let row: Vec<String> = columns
                .iter()
                .map(|column| record.field(column).map(cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a chunk plan.
    pub fn format_plan(&self, plan: &ChunkPlan) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let chunks: Vec<Value> = plan
                    .chunks
                    .iter()
                    .map(|chunk| {
                        serde_json::json!({
                            "index": chunk.index,
                            "start_page": chunk.page_range.map(|r| r.start + 1),
                            "end_page": chunk.page_range.map(|r| r.end),
                            "bytes": chunk.byte_len(),
                        })
                    })
                    .collect();
                let plan = serde_json::json!({
                    "mode": mode_name(plan.mode),
                    "page_count": plan.page_count,
                    "chunks": chunks,
                });
                Ok(serde_json::to_string_pretty(&plan)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Chunk", "Pages", "Bytes"]);
                for chunk in &plan.chunks {
                    let pages = chunk
                        .page_range
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "whole document".to_string());
                    builder.push_record([
                        (chunk.index + 1).to_string(),
                        pages,
                        chunk.byte_len().to_string(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let pages = plan
                    .page_count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Ok(format!(
                    "{}\n{}",
                    self.info(&format!(
                        "{} processing, {} pages, {} chunk(s)",
                        mode_name(plan.mode),
                        pages,
                        plan.chunks.len()
                    )),
                    table
                ))
            }
            OutputFormat::Quiet => Ok(plan.chunks.len().to_string()),
        }
    }

    /// One-line run summary.
    pub fn summary(&self, metadata: &ExtractionMetadata, records: usize) -> String {
        self.success(&format!(
            "Extracted {} record(s) from {} chunk(s) in {} call(s), {} key rotation(s), {}ms",
            records, metadata.chunks, metadata.calls, metadata.rotations, metadata.processing_time_ms
        ))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Records as a pretty JSON array, the on-disk output format.
pub fn records_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn mode_name(mode: ProcessingMode) -> &'static str {
    match mode {
        ProcessingMode::Single => "single",
        ProcessingMode::Chunked => "chunked",
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_domain::{Chunk, JobId, PageRange};
    use serde_json::json;

    fn records() -> Vec<Record> {
        vec![
            json!({"folio": "A-1", "ph": 6.8}).into(),
            json!({"folio": "A-2", "analyst": "R. Soto"}).into(),
        ]
    }

    fn plan() -> ChunkPlan {
        ChunkPlan {
            mode: ProcessingMode::Chunked,
            page_count: Some(10),
            chunks: vec![
                Chunk {
                    index: 0,
                    page_range: Some(PageRange { start: 0, end: 8 }),
                    payload: vec![0; 100],
                },
                Chunk {
                    index: 1,
                    page_range: Some(PageRange { start: 8, end: 10 }),
                    payload: vec![0; 40],
                },
            ],
        }
    }

    #[test]
    fn test_json_records() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_records(&records()).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["analyst"], "R. Soto");
    }

    #[test]
    fn test_table_records_union_of_fields() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&records()).unwrap();
        assert!(output.contains("analyst"));
        assert!(output.contains("ph"));
        assert!(output.contains("A-2"));
        assert!(output.contains("6.8"));
    }

    #[test]
    fn test_table_no_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&[]).unwrap();
        assert_eq!(output, "No records extracted.");
    }

    #[test]
    fn test_quiet_records() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_records(&records()).unwrap(), "2");
    }

    #[test]
    fn test_plan_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_plan(&plan()).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["mode"], "chunked");
        assert_eq!(parsed["chunks"][1]["start_page"], 9);
        assert_eq!(parsed["chunks"][1]["end_page"], 10);
    }

    #[test]
    fn test_plan_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_plan(&plan()).unwrap();
        assert!(output.contains("chunked processing, 10 pages, 2 chunk(s)"));
        assert!(output.contains("pages 9-10"));
    }

    #[test]
    fn test_summary_without_color() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let metadata = ExtractionMetadata {
            job_id: JobId::new(),
            mode: ProcessingMode::Chunked,
            page_count: Some(20),
            chunks: 3,
            calls: 5,
            rotations: 2,
            processing_time_ms: 1200,
        };
        assert_eq!(
            formatter.summary(&metadata, 7),
            "✓ Extracted 7 record(s) from 3 chunk(s) in 5 call(s), 2 key rotation(s), 1200ms"
        );
    }
}
