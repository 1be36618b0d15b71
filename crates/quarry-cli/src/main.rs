//! Quarry CLI - Command-line interface for resilient document extraction.

use anyhow::Context;
use clap::Parser;
use quarry_cli::commands;
use quarry_cli::config::OutputFormat;
use quarry_cli::{logging, Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        // No configuration is loaded for init
        Command::Init(args) => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::path()?,
            };
            let formatter = Formatter::new(OutputFormat::Quiet, !cli.no_color);
            commands::execute_init(args, &path, &formatter)?;
        }
        command => {
            let mut config = Config::load(cli.config.as_deref())
                .context("Failed to load configuration")?;
            config.merge_process_env();

            // Determine output format and color
            let format = cli
                .format
                .map(Into::into)
                .unwrap_or(config.settings.format);
            let color_enabled = !cli.no_color && config.settings.color;
            let formatter = Formatter::new(format, color_enabled);

            match command {
                Command::Extract(args) => {
                    let file = args.file.clone();
                    commands::execute_extract(args, &config, &formatter)
                        .await
                        .with_context(|| format!("Extraction of {} failed", file.display()))?;
                }
                Command::Plan(args) => {
                    commands::execute_plan(args, &config, &formatter)?;
                }
                Command::Init(_) => unreachable!(),
            }
        }
    }

    Ok(())
}
