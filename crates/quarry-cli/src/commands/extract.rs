//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{records_json, Formatter};
use quarry_domain::traits::ExtractionClient;
use quarry_domain::Job;
use quarry_extractor::{ExtractionResult, Extractor};
use quarry_llm::GeminiProvider;
use std::fs;
use tracing::info;

/// Execute the extract command against the configured Gemini backend.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.provider.model.clone());
    let mut provider = GeminiProvider::new(config.provider.endpoint.clone(), model)?;
    if let Some(prompt) = &config.provider.system_prompt {
        provider = provider.with_system_prompt(prompt.clone());
    }

    info!("Using model {}", provider.model());
    run_extraction(provider, &args, config, formatter).await?;
    Ok(())
}

/// Read the document, run the extraction and emit the records.
///
/// Records go to `--output` as pretty JSON when given, otherwise to stdout in
/// the selected format. The run summary goes to stderr.
pub async fn run_extraction<C>(
    client: C,
    args: &ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<ExtractionResult>
where
    C: ExtractionClient,
{
    let instruction = args
        .instruction
        .clone()
        .unwrap_or_else(|| config.settings.instruction.clone());
    if instruction.trim().is_empty() {
        return Err(CliError::InvalidInput("Instruction must not be empty".to_string()));
    }

    let document = fs::read(&args.file)?;
    let extractor = Extractor::new(client, config.extractor.clone())?;
    let result = extractor.extract(Job::new(document, instruction)).await?;

    match &args.output {
        Some(path) => {
            fs::write(path, records_json(&result.records)?)?;
            eprintln!(
                "{}",
                formatter.success(&format!(
                    "Wrote {} record(s) to {}",
                    result.records.len(),
                    path.display()
                ))
            );
        }
        None => println!("{}", formatter.format_records(&result.records)?),
    }
    eprintln!("{}", formatter.summary(&result.metadata, result.records.len()));

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use quarry_domain::Record;
    use quarry_llm::{LlmError, ScriptedProvider};
    use serde_json::json;
    use std::path::PathBuf;

    fn config_with_keys(keys: &[&str]) -> Config {
        let mut config = Config::default();
        config.extractor.api_keys = keys.iter().map(|k| k.to_string()).collect();
        config.extractor.progressive_delays_secs = vec![0];
        config
    }

    fn args(file: PathBuf, output: Option<PathBuf>) -> ExtractArgs {
        ExtractArgs {
            file,
            instruction: Some("Extract lab reports".to_string()),
            output,
            model: None,
        }
    }

    #[tokio::test]
    async fn test_writes_records_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        let output = dir.path().join("records.json");
        fs::write(&input, b"%PDF-1.5 not really").unwrap();

        let provider = ScriptedProvider::default();
        provider.push_err(LlmError::RateLimited("quota exceeded".to_string()));
        provider.push_ok(vec![json!({"folio": "A-1"}).into()]);

        let formatter = Formatter::new(OutputFormat::Json, false);
        let result = run_extraction(
            provider.clone(),
            &args(input, Some(output.clone())),
            &config_with_keys(&["k1", "k2"]),
            &formatter,
        )
        .await
        .unwrap();

        assert_eq!(result.metadata.rotations, 1);
        let written: Vec<Record> =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, vec![Record::from(json!({"folio": "A-1"}))]);
        assert_eq!(provider.calls()[0].instruction, "Extract lab reports");
    }

    #[tokio::test]
    async fn test_missing_keys_fail_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        fs::write(&input, b"%PDF").unwrap();

        let provider = ScriptedProvider::default();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = run_extraction(
            provider.clone(),
            &args(input, None),
            &config_with_keys(&[]),
            &formatter,
        )
        .await;

        assert!(matches!(
            result,
            Err(CliError::Extraction(quarry_extractor::ExtractorError::Config(_)))
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_document_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = run_extraction(
            ScriptedProvider::default(),
            &args(dir.path().join("absent.pdf"), None),
            &config_with_keys(&["k1"]),
            &formatter,
        )
        .await;

        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[tokio::test]
    async fn test_blank_instruction_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        fs::write(&input, b"%PDF").unwrap();

        let mut extract_args = args(input, None);
        extract_args.instruction = Some("   ".to_string());
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = run_extraction(
            ScriptedProvider::default(),
            &extract_args,
            &config_with_keys(&["k1"]),
            &formatter,
        )
        .await;

        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
