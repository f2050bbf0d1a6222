use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use parascan_decode::{ImageDecoder, ParagraphWriter};
use parascan_pipeline::{SegmentConfig, SegmentPipeline};

mod cli;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("parascan v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => SegmentConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SegmentConfig::default(),
    };
    let pipeline = SegmentPipeline::build(config)?;
    let decoder = ImageDecoder::new();

    match cli.command {
        Command::Process {
            inputs,
            output_dir,
            format,
            dry_run,
            quality,
        } => {
            let mut failed = 0usize;
            for input in &inputs {
                let writer = if dry_run {
                    None
                } else {
                    let dir = output_dir.clone().unwrap_or_else(|| cli::sibling_dir(input));
                    Some(ParagraphWriter::new(dir).with_quality(quality))
                };
                match cli::segment_file(&pipeline, &decoder, input, writer.as_ref()) {
                    Ok(report) => cli::print_report(&report, &format)?,
                    Err(e) => {
                        failed += 1;
                        tracing::error!(file = %input.display(), error = %e, "failed");
                    }
                }
            }
            if failed > 0 {
                tracing::warn!(failed, total = inputs.len(), "some inputs were not segmented");
            }
        }
        Command::Batch {
            input_dir,
            output_dir,
            workers,
            extension,
            quality,
        } => {
            let files = cli::collect_inputs(&input_dir, &extension)
                .with_context(|| format!("reading {}", input_dir.display()))?;
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("creating {}", output_dir.display()))?;

            let writer = ParagraphWriter::new(&output_dir).with_quality(quality);
            let summary = cli::run_batch(&pipeline, &decoder, &files, &writer, workers);
            tracing::info!(
                processed = summary.processed,
                failed = summary.failed,
                paragraphs = summary.paragraphs,
                "batch complete"
            );
            println!(
                "{} files segmented, {} failed, {} paragraphs written to {}",
                summary.processed,
                summary.failed,
                summary.paragraphs,
                output_dir.display()
            );
        }
    }

    Ok(())
}
