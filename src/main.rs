/*!
 * Command-line interface for BundleFS
 */

use std::fs;
use std::io;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use bundlefs::config::{Args, Config, Mode};
use bundlefs::error::{Result, ResultExt};
use bundlefs::reader::{parse_bundle, Materializer};
use bundlefs::report::{ReportFormat, Reporter, RestoreReport, ScanReport};
use bundlefs::scanner::Scanner;
use bundlefs::utils::count_files;
use bundlefs::writer::BundleWriter;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Generate shell completions and exit
    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "bundlefs", &mut io::stdout());
        return;
    }

    // Create and validate configuration
    let config = Config::from_args(args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let outcome = match config.mode {
        Mode::Forward => run_forward(config),
        Mode::Reverse => run_reverse(config),
    };

    match outcome {
        Ok(failures) if failures > 0 => {
            // Partial success still leaves an incomplete artifact
            process::exit(1);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Run the forward pipeline; returns the number of skipped entries
fn run_forward(config: Config) -> Result<usize> {
    // Create progress bar with advanced Unicode styling
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
            .unwrap(),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📊 Setup");

    progress.set_message(format!("📂 Scanning directory: {}", config.root.display()));

    // Count files for progress tracking
    let total_files = match count_files(&config.root, &config) {
        Ok(count) => {
            progress.set_message(format!("🔎 Found {} files to bundle", count));
            count
        }
        Err(e) => {
            progress.set_message(format!("⚠️ Warning: Failed to count files: {}", e));
            0
        }
    };

    progress.set_length(total_files);
    progress.set_prefix("📊 Bundling");
    progress.set_message("Starting scan...");

    // Create scanner and writer
    let mut scanner = Scanner::new(config.clone(), Arc::new(progress.clone()));
    let writer = BundleWriter::new(config.clone());

    // Time both the scan and the write
    let start_time = Instant::now();

    let root_node = scanner.scan()?;
    writer.write(&root_node)?;

    let total_duration = start_time.elapsed();
    progress.finish_and_clear();

    let stats = scanner.statistics();
    let output_file = config
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let bundle_size = config
        .output
        .as_ref()
        .and_then(|p| fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    let report = ScanReport {
        output_file,
        bundle_size,
        duration: total_duration,
        files_processed: stats.files_processed,
        text_files: stats.text_files,
        binary_files: stats.binary_files,
        total_lines: stats.total_lines,
        total_chars: stats.total_chars,
        file_details: stats.file_details.clone(),
        skipped: stats.skipped.clone(),
    };

    let reporter = Reporter::new(ReportFormat::ConsoleTable);
    reporter.print_scan_report(&report);

    Ok(report.skipped.len())
}

/// Run the reverse pipeline; returns the number of rejected records
fn run_reverse(config: Config) -> Result<usize> {
    let input = config.input.clone().unwrap_or_default();

    let start_time = Instant::now();

    // Parse first; a malformed bundle aborts before any filesystem write
    let bundle_text = fs::read_to_string(&input)
        .with_context(|| format!("reading bundle {}", input.display()))?;
    let records = parse_bundle(&bundle_text)?;

    let materializer = Materializer::new(config.clone());
    let stats = materializer.materialize(&records)?;

    let report = RestoreReport {
        target_dir: config.root.display().to_string(),
        duration: start_time.elapsed(),
        files_restored: stats.files_restored,
        text_files: stats.text_files,
        binary_files: stats.binary_files,
        rejected: stats.rejected,
    };

    let reporter = Reporter::new(ReportFormat::ConsoleTable);
    reporter.print_restore_report(&report);

    Ok(report.rejected.len())
}
