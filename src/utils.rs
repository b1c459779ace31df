/*!
 * Utility functions for BundleFS
 */

use std::path::Path;

use ignore::WalkBuilder;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;
use crate::scanner::excluded_by_config;

/// Count total files for progress tracking
///
/// Walks with the same exclusion rules as the scanner, pruning excluded
/// directories so the count matches what the scan will actually process.
pub fn count_files(dir: &Path, config: &Config) -> Result<u64> {
    // Walk the canonical root so entry paths line up with the resolved
    // output path
    let dir = std::fs::canonicalize(dir)?;
    let output_abs = config.resolved_output();
    let mut count = 0;

    if config.respect_gitignore {
        let walker = WalkBuilder::new(&dir)
            .filter_entry({
                let exclusions = config.exclusions.clone();
                let output_abs = output_abs.clone();
                move |entry| {
                    !excluded_by_config(entry.path(), &exclusions, output_abs.as_deref())
                }
            })
            .build();

        for entry in walker.filter_map(std::result::Result::ok) {
            if entry.file_type().map_or(false, |ft| ft.is_file()) {
                count += 1;
            }
        }
    } else {
        for entry in WalkDir::new(&dir)
            .into_iter()
            .filter_entry(|e| {
                !excluded_by_config(e.path(), &config.exclusions, output_abs.as_deref())
            })
            .filter_map(std::result::Result::ok)
        {
            if entry.file_type().is_file() {
                count += 1;
            }
        }
    }

    Ok(count)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
