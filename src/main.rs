mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use doc2epub::batch::{BatchEvent, BatchHandle, Job};
use doc2epub::converter::{self, ConvertOptions};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output can only be used with a single input file; use --output-dir instead");
    }

    if let Some(ref dir) = cli.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let jobs: Vec<Job> = cli
        .inputs
        .iter()
        .map(|input| {
            let job = Job::new(input);
            match (&cli.output, &cli.output_dir) {
                (Some(output), _) => job.with_output(output),
                (None, Some(dir)) => job.with_output(converter::output_in_dir(input, dir)),
                (None, None) => job,
            }
        })
        .collect();

    let options = ConvertOptions {
        language: cli.language.clone(),
        ..Default::default()
    };

    let handle = BatchHandle::spawn(jobs, options);
    for event in handle.events() {
        render(&event);
    }
    let summary = handle.join();

    Ok(if summary.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(event: &BatchEvent) {
    match event {
        BatchEvent::Started { input, .. } => {
            eprintln!("Converting {}", display_name(input));
        }
        BatchEvent::Progress { stage, .. } => {
            eprintln!("  {}", stage);
        }
        BatchEvent::Finished { input, report, .. } => {
            let mut details = format!("{} chapters", report.chapter_count);
            if report.asset_count > 0 {
                details.push_str(&format!(", {} images", report.asset_count));
            }
            if !report.skipped_pages.is_empty() {
                details.push_str(&format!(", {} empty pages skipped", report.skipped_pages.len()));
            }
            if !report.skipped_images.is_empty() {
                details.push_str(&format!(", {} images skipped", report.skipped_images.len()));
            }
            println!(
                "✓ {} -> {} ({})",
                display_name(input),
                report.output.display(),
                details
            );
        }
        BatchEvent::Failed { input, error, .. } => {
            println!("✗ {}: {}", display_name(input), error);
        }
        BatchEvent::Cancelled { input, .. } => {
            println!("- {}: cancelled", display_name(input));
        }
        BatchEvent::Completed(summary) => {
            eprintln!(
                "Done: {} converted, {} failed",
                summary.succeeded(),
                summary.failed()
            );
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
