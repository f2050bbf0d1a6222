use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use parascan_core::{PageLayout, Result, SegmentError, TimingInfo};
use parascan_decode::{ImageDecoder, ParagraphWriter};
use parascan_pipeline::{PageScheduler, SegmentPipeline};

#[derive(Parser)]
#[command(
    name = "parascan",
    about = "Cut scanned pages into paragraph images in reading order"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to segmentation config file (TOML/JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Segment one or more page files.
    Process {
        /// Input page images.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory for paragraph crops (default: next to each input).
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Output format.
        #[arg(long, default_value = "text")]
        format: OutputFormat,
        /// Print the layout without writing crops.
        #[arg(long)]
        dry_run: bool,
        /// JPEG quality of the crops (1-100).
        #[arg(long, default_value = "90")]
        quality: u8,
    },
    /// Segment every page image in a directory.
    Batch {
        /// Input directory.
        #[arg(required = true)]
        input_dir: PathBuf,
        /// Output directory for paragraph crops.
        #[arg(required = true)]
        output_dir: PathBuf,
        /// Number of worker threads.
        #[arg(long, default_value = "4")]
        workers: usize,
        /// File extension of the pages to pick up.
        #[arg(long, default_value = "png")]
        extension: String,
        /// JPEG quality of the crops (1-100).
        #[arg(long, default_value = "90")]
        quality: u8,
    },
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What segmenting one file produced.
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub layout: PageLayout,
    pub timing: TimingInfo,
    pub written: Vec<PathBuf>,
}

/// Totals for a batch run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub paragraphs: usize,
}

/// Decode, segment and (unless `writer` is `None`) write the crops of one
/// page file.
pub fn segment_file(
    pipeline: &SegmentPipeline,
    decoder: &ImageDecoder,
    path: &Path,
    writer: Option<&ParagraphWriter>,
) -> Result<FileReport> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| SegmentError::InvalidInput(format!("not a file: {}", path.display())))?;

    let page = decoder.open(path)?;
    let (layout, paragraphs, timing) = pipeline.segment_page_with_layout(&page)?;

    let written = match writer {
        Some(writer) => writer.write_all(&source, &paragraphs)?,
        None => Vec::new(),
    };

    tracing::info!(
        file = %path.display(),
        paragraphs = paragraphs.len(),
        tables = layout.tables.len(),
        total_ms = timing.total_ms,
        "segmented"
    );

    Ok(FileReport {
        source: path.to_path_buf(),
        layout,
        timing,
        written,
    })
}

/// Directory the crops of `input` go to when no output directory is given.
pub fn sibling_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn print_report(report: &FileReport, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let layout = &report.layout;
            println!(
                "{}: {} paragraphs, {} tables removed (threshold {}, {}x{})",
                report.source.display(),
                layout.paragraphs.len(),
                layout.tables.len(),
                layout.threshold,
                layout.width,
                layout.height
            );
            for (i, bbox) in layout.paragraphs.iter().enumerate() {
                let target = report
                    .written
                    .get(i)
                    .map(|p| format!(" -> {}", p.display()))
                    .unwrap_or_default();
                println!(
                    "  #{} at ({}, {}) {}x{}{}",
                    i + 1,
                    bbox.x,
                    bbox.y,
                    bbox.width,
                    bbox.height,
                    target
                );
            }
            eprintln!(
                "[{:.1}ms total | binarize:{:.1}ms tables:{:.1}ms blocks:{:.1}ms order:{:.1}ms crop:{:.1}ms]",
                report.timing.total_ms,
                report.timing.binarize_ms,
                report.timing.tables_ms,
                report.timing.blocks_ms,
                report.timing.order_ms,
                report.timing.crop_ms
            );
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": report.source,
                "layout": report.layout,
                "timing": report.timing,
                "written": report.written,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// Page files in `dir` whose extension matches `extension`, sorted by path.
pub fn collect_inputs(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case(wanted));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Segment `files` on `workers` threads, writing crops through `writer`.
///
/// A file that fails is logged and counted; the rest of the batch carries on.
pub fn run_batch(
    pipeline: &SegmentPipeline,
    decoder: &ImageDecoder,
    files: &[PathBuf],
    writer: &ParagraphWriter,
    workers: usize,
) -> BatchSummary {
    tracing::info!(
        files = files.len(),
        output = %writer.output_dir().display(),
        workers,
        "batch processing"
    );

    let results = PageScheduler::new(workers).run(files.len(), |i| {
        segment_file(pipeline, decoder, &files[i], Some(writer))
    });

    let mut summary = BatchSummary::default();
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(report) => {
                summary.processed += 1;
                summary.paragraphs += report.layout.paragraphs.len();
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(file = %path.display(), error = %e, "failed");
            }
        }
    }
    summary
}
