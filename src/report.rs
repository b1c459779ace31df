/*!
 * Reporting functionality for BundleFS
 *
 * Provides functionality for generating formatted reports of forward and
 * reverse runs using the tabled library for clean, consistent table
 * rendering.
 */

use std::collections::HashMap;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::utils::format_file_size;

/// Information about a file in the report
#[derive(Debug, Clone, Default)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

/// Statistics for a forward (bundling) run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Bundle file path
    pub output_file: String,
    /// Bundle file size in bytes
    pub bundle_size: u64,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Number of files bundled
    pub files_processed: usize,
    /// Number of text files
    pub text_files: usize,
    /// Number of binary files
    pub binary_files: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
    /// Entries skipped because they could not be read (path, error)
    pub skipped: Vec<(String, String)>,
}

/// Statistics for a reverse (reconstruction) run
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// Reconstruction target directory
    pub target_dir: String,
    /// Time taken to parse and write
    pub duration: Duration,
    /// Number of files restored
    pub files_restored: usize,
    /// Number of text files restored
    pub text_files: usize,
    /// Number of binary placeholders restored as empty files
    pub binary_files: usize,
    /// Records rejected or failed (path, error)
    pub rejected: Vec<(String, String)>,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    // Other formats could be added in the future
    // JSON, HTML, etc.
}

/// Report generator for run results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string for a forward run
    pub fn generate_scan_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_scan_console_report(report),
        }
    }

    /// Print the forward report to stdout
    pub fn print_scan_report(&self, report: &ScanReport) {
        println!("\n{}", self.generate_scan_report(report));
    }

    /// Generate a report string for a reverse run
    pub fn generate_restore_report(&self, report: &RestoreReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_restore_console_report(report),
        }
    }

    /// Print the reverse report to stdout
    pub fn print_restore_report(&self, report: &RestoreReport) {
        println!("\n{}", self.generate_restore_report(report));
    }

    // Truncate a path for display, keeping the most meaningful tail segments
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.len() <= max_len {
            return path.to_string();
        }

        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() <= 2 {
            return format!("...{}", &path[path.len().saturating_sub(max_len - 3)..]);
        }

        // Keep the last few segments
        let mut current_len = 3; // Start with "..."
        let mut segments = Vec::new();

        for part in parts.iter().rev() {
            let part_len = part.len() + 1; // +1 for '/'
            if current_len + part_len <= max_len {
                segments.push(*part);
                current_len += part_len;
            } else {
                break;
            }
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }

        result
    }

    // Create the forward summary table using the tabled crate
    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = Vec::new();

        rows.push(SummaryRow {
            key: "📂 Bundle File".to_string(),
            value: format!(
                "{} ({})",
                report.output_file,
                format_file_size(report.bundle_size)
            ),
        });

        rows.push(SummaryRow {
            key: "⏱️ Process Time".to_string(),
            value: format!("{:.4?}", report.duration),
        });

        rows.push(SummaryRow {
            key: "📄 Files Bundled".to_string(),
            value: format!(
                "{} ({} text, {} binary)",
                self.format_number(report.files_processed),
                self.format_number(report.text_files),
                self.format_number(report.binary_files)
            ),
        });

        rows.push(SummaryRow {
            key: "📝 Total Lines".to_string(),
            value: self.format_number(report.total_lines),
        });

        rows.push(SummaryRow {
            key: "🔤 Total Characters".to_string(),
            value: self.format_number(report.total_chars),
        });

        if !report.skipped.is_empty() {
            rows.push(SummaryRow {
                key: "⚠️ Skipped Entries".to_string(),
                value: self.format_number(report.skipped.len()),
            });
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create the files table using the tabled crate
    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Characters")]
            chars: String,
        }

        // Sort files by character count
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(_, a), (_, b)| b.chars.cmp(&a.chars));

        // Determine if we show all files or just top 10
        let files_to_show = if report.file_details.len() > 15 {
            &files[0..10]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|(path, info)| FileRow {
                path: self.format_path(path, 60),
                lines: self.format_number(info.lines),
                chars: self.format_number(info.chars),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a table listing per-file failures (skipped or rejected entries)
    fn create_issue_table(&self, issues: &[(String, String)]) -> String {
        #[derive(Tabled)]
        struct IssueRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Error")]
            error: String,
        }

        let rows: Vec<IssueRow> = issues
            .iter()
            .map(|(path, error)| IssueRow {
                path: self.format_path(path, 50),
                error: error.clone(),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Generate the forward console report
    fn generate_scan_console_report(&self, report: &ScanReport) -> String {
        let summary_table = self.create_summary_table(report);
        let files_table = self.create_files_table(report);

        let summary_title = "✅  BUNDLE COMPLETE";
        let files_title = if report.file_details.len() > 15 {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT"
        } else {
            "📋  BUNDLED FILES"
        };

        let mut output = format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        );

        if !report.skipped.is_empty() {
            output.push_str(&format!(
                "\n\n⚠️  SKIPPED ENTRIES\n{}",
                self.create_issue_table(&report.skipped)
            ));
        }

        output
    }

    // Generate the reverse console report
    fn generate_restore_console_report(&self, report: &RestoreReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📂 Target Directory".to_string(),
                value: report.target_dir.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Restored".to_string(),
                value: format!(
                    "{} ({} text, {} binary placeholders)",
                    self.format_number(report.files_restored),
                    self.format_number(report.text_files),
                    self.format_number(report.binary_files)
                ),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        let mut output = format!("✅  RESTORE COMPLETE\n{}", table);

        if !report.rejected.is_empty() {
            output.push_str(&format!(
                "\n\n⚠️  REJECTED RECORDS\n{}",
                self.create_issue_table(&report.rejected)
            ));
        }

        output
    }
}
