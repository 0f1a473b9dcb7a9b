use anyhow::{Context, Result};
use book_attribute_stats::{
    format_elapsed, Attribute, CalculationRequest, FileSelector, ReportFormat, Statistics,
    StatisticsCalculator, StatisticsService, DEFAULT_EXTENSION,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};
use std::time::Instant;
use time::macros::format_description;

#[derive(Parser)]
#[command(name = "Book Attribute Statistics")]
#[command(about = "Rank how often each author, genre or publication year occurs across a directory of JSON book files")]
#[command(version = "0.1.0")]
struct Cli {
    #[arg(short, long, help = "Directory containing JSON book files", required = true)]
    input: PathBuf,

    #[arg(short, long, value_enum, help = "Attribute to count")]
    attribute: Attribute,

    #[arg(short, long, help = "Number of worker threads (defaults to the number of CPU cores)")]
    threads: Option<usize>,

    #[arg(short, long, help = "Directory for the statistics report (defaults to the input directory)")]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ReportFormat::Xml, help = "Report format")]
    format: ReportFormat,

    #[arg(short, long, default_value = DEFAULT_EXTENSION, help = "Extension of the input files")]
    extension: String,

    #[arg(short, long, default_value = "INFO", help = "Logging level (DEBUG, INFO, WARN, ERROR)")]
    log_level: String,

    #[arg(long, default_value = "20", help = "Number of top entries to show in the final summary")]
    top: usize,
}

fn setup_logging(log_level_str: &str) -> Result<()> {
    let log_level = match log_level_str.to_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        other => {
            eprintln!("Invalid log level '{}', defaulting to INFO.", other);
            LevelFilter::Info
        }
    };

    SimpleLogger::new()
        .with_level(log_level)
        .with_timestamp_format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .init()?;

    Ok(())
}

fn resolve_thread_count(requested: Option<usize>) -> usize {
    match requested {
        Some(count) => {
            info!("Using specified {} threads.", count);
            count
        }
        None => {
            let cores = num_cpus::get();
            info!("Auto-detected {} CPU cores. Using {} threads.", cores, cores);
            cores
        }
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta} @ {per_sec}) {msg}")
            .context("Failed to create progress bar template")?
            .progress_chars("=> "),
    );
    Ok(progress_bar)
}

fn print_final_summary(start_time: Instant, statistics: &Statistics, report_path: &Path, top: usize) {
    info!("-------------------- FINAL SUMMARY --------------------");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Files processed: {}", statistics.processed_files);
    info!("Records read: {}", statistics.total_records);
    info!("Values counted: {}", statistics.total_values);
    info!("Distinct values by {}: {}", statistics.attribute, statistics.entries.len());

    if statistics.is_empty() {
        warn!("No {} values were found in the input files.", statistics.attribute);
    } else {
        info!("Top {} values:", top.min(statistics.entries.len()));
        for entry in statistics.entries.iter().take(top) {
            info!("  - {}: {}", entry.value, entry.count);
        }
        if statistics.entries.len() > top {
            info!("  ... ({} more values)", statistics.entries.len() - top);
        }
    }

    info!("Report written to: {}", report_path.display());
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    setup_logging(&cli.log_level)?;
    info!("Starting Book Attribute Statistics");

    let worker_count = resolve_thread_count(cli.threads);
    let request = CalculationRequest::new(&cli.input, cli.attribute, worker_count);
    let output_dir = cli.output.clone().unwrap_or_else(|| cli.input.clone());

    let calculator = StatisticsCalculator::new()
        .with_selector(FileSelector::new(&cli.extension))
        .with_progress(progress_bar()?);
    let service = StatisticsService::new(calculator).with_format(cli.format);

    let (statistics, report_path) = service.generate_statistics(&request, &output_dir)?;

    print_final_summary(start_time, &statistics, &report_path, cli.top);
    info!("Statistics calculation finished.");
    info!("-------------------------------------------------------");

    Ok(())
}
