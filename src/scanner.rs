/*!
 * Directory scanning: traversal, exclusion filtering and text/binary
 * classification for the forward pipeline
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob_match::glob_match;
use ignore::WalkBuilder;
use indicatif::ProgressBar;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;
use crate::report::FileReportInfo;
use crate::transform::transform;
use crate::types::{DirectoryNode, FileKind, FileRecord, Node};

/// Sample size used for text/binary detection
const CLASSIFY_SAMPLE: usize = 8192;

/// Scanner statistics, collected for the end-of-run report
#[derive(Debug, Clone, Default)]
pub struct ScannerStatistics {
    /// Number of files bundled
    pub files_processed: usize,
    /// Number of text files
    pub text_files: usize,
    /// Number of binary files
    pub binary_files: usize,
    /// Total number of lines across text files
    pub total_lines: usize,
    /// Total number of characters across text files
    pub total_chars: usize,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
    /// Entries skipped because they could not be read (path, error)
    pub skipped: Vec<(String, String)>,
}

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Scanner statistics
    statistics: ScannerStatistics,
    /// Absolute path of the output bundle, resolved once per scan
    output_abs: Option<PathBuf>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        let output_abs = config.resolved_output();
        Self {
            config,
            progress,
            statistics: ScannerStatistics::default(),
            output_abs,
        }
    }

    /// Get scanner statistics
    pub fn statistics(&self) -> &ScannerStatistics {
        &self.statistics
    }

    /// Scan the root directory and return the directory tree
    ///
    /// Traversal is single-threaded and sorted so that bundling the same
    /// unchanged tree twice yields byte-identical output.
    pub fn scan(&mut self) -> Result<DirectoryNode> {
        let abs_path = fs::canonicalize(&self.config.root).map_err(|e| {
            crate::error!(
                Traversal,
                "cannot read root {}: {}",
                self.config.root.display(),
                e
            )
        })?;

        // Record paths are relative to the root; the root's own name shows
        // up only in the tree preamble
        self.scan_directory(&abs_path, &PathBuf::new())
    }

    /// Scan a directory and return its node representation
    fn scan_directory(&mut self, abs_path: &Path, rel_path: &Path) -> Result<DirectoryNode> {
        // Collect immediate children, honoring .gitignore when configured
        let mut walk_errors: Vec<String> = Vec::new();
        let mut entries: Vec<PathBuf> = if self.config.respect_gitignore {
            WalkBuilder::new(abs_path)
                .max_depth(Some(1))
                .build()
                .filter_map(|entry| match entry {
                    Ok(e) => Some(e.into_path()),
                    Err(e) => {
                        walk_errors.push(e.to_string());
                        None
                    }
                })
                .filter(|p| p.as_path() != abs_path)
                .collect()
        } else {
            WalkDir::new(abs_path)
                .max_depth(1)
                .min_depth(1)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(e) => Some(e.into_path()),
                    Err(e) => {
                        walk_errors.push(e.to_string());
                        None
                    }
                })
                .collect()
        };

        for error in walk_errors {
            eprintln!("Error reading {}: {}", abs_path.display(), error);
            self.record_skip(rel_path, &error);
        }

        entries.retain(|p| !self.should_exclude(p));
        entries.sort();
        let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|p| p.is_dir());

        let mut contents = Vec::new();

        // Files first, then subdirectories; both already sorted
        for entry_path in files {
            let entry_name = entry_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let new_rel_path = rel_path.join(&entry_name);

            match self.process_file(&entry_path, &new_rel_path) {
                Ok(record) => contents.push(Node::File(record)),
                Err(e) => {
                    eprintln!("Error processing {}: {}", entry_path.display(), e);
                    self.record_skip(&new_rel_path, &e.to_string());
                }
            }
        }

        for entry_path in dirs {
            let entry_name = entry_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let new_rel_path = rel_path.join(&entry_name);

            match self.scan_directory(&entry_path, &new_rel_path) {
                Ok(dir_node) => contents.push(Node::Directory(dir_node)),
                Err(e) => {
                    eprintln!("Error processing directory {}: {}", entry_path.display(), e);
                    self.record_skip(&new_rel_path, &e.to_string());
                }
            }
        }

        Ok(DirectoryNode {
            name: abs_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            path: rel_path.to_path_buf(),
            contents,
        })
    }

    /// Read, classify and transform a single file into a bundle record
    fn process_file(&mut self, abs_path: &Path, rel_path: &Path) -> Result<FileRecord> {
        self.progress.inc(1);

        let file_name = abs_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        // Truncate long names to avoid display issues
        let display_name = if file_name.len() > 40 {
            format!("...{}", &file_name[file_name.len().saturating_sub(37)..])
        } else {
            file_name
        };
        self.progress
            .set_message(format!("Current file: {}", display_name));

        let file_path = rel_path.to_string_lossy().to_string();
        let bytes = fs::read(abs_path)?;

        if classify_bytes(&bytes) == FileKind::Binary {
            return Ok(self.binary_record(rel_path, file_path));
        }

        // Classification samples the head of the file; a later invalid
        // sequence still demotes the file to binary rather than failing
        let raw = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(_) => return Ok(self.binary_record(rel_path, file_path)),
        };

        let extension = rel_path.extension().map(|e| e.to_string_lossy().to_string());
        let content = transform(&raw, extension.as_deref(), &self.config.transform);

        let lines = content.lines().count();
        let chars = content.chars().count();
        self.statistics.files_processed += 1;
        self.statistics.text_files += 1;
        self.statistics.total_lines += lines;
        self.statistics.total_chars += chars;
        self.statistics
            .file_details
            .insert(file_path, FileReportInfo { lines, chars });

        Ok(FileRecord::text(rel_path.to_path_buf(), content))
    }

    fn binary_record(&mut self, rel_path: &Path, file_path: String) -> FileRecord {
        self.statistics.files_processed += 1;
        self.statistics.binary_files += 1;
        self.statistics
            .file_details
            .insert(file_path, FileReportInfo { lines: 0, chars: 0 });

        FileRecord::binary(rel_path.to_path_buf())
    }

    fn record_skip(&mut self, rel_path: &Path, error: &str) {
        self.statistics
            .skipped
            .push((rel_path.to_string_lossy().to_string(), error.to_string()));
    }

    /// Check if a path should be excluded from the scan
    ///
    /// Patterns are matched against the final path segment only, so a
    /// pattern naming a directory prunes that whole subtree.
    pub fn should_exclude(&self, path: &Path) -> bool {
        excluded_by_config(path, &self.config.exclusions, self.output_abs.as_deref())
    }
}

/// Check a path against the exclusion patterns and the output bundle path
///
/// The output comparison is by absolute path, so only the bundle file
/// itself is skipped, not other files that happen to share its name.
pub fn excluded_by_config(path: &Path, exclusions: &[String], output_abs: Option<&Path>) -> bool {
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();

    if should_exclude_name(&file_name, exclusions) {
        return true;
    }

    // Don't bundle the output file itself
    output_abs == Some(path)
}

/// Check a single path segment against the exclusion patterns
///
/// A segment is excluded on a shell-glob match (`*`, `?`, `[...]`) or exact
/// string equality. Patterns that match nothing are not an error.
pub fn should_exclude_name(name: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || pattern.as_str() == name)
}

/// Classify file bytes as text or binary
///
/// Heuristic, not a guarantee, but deterministic for the same input: any NUL
/// byte, invalid UTF-8 or a high ratio of control bytes in the leading sample
/// means binary. An empty file is text.
pub fn classify_bytes(bytes: &[u8]) -> FileKind {
    let sample = &bytes[..bytes.len().min(CLASSIFY_SAMPLE)];

    if sample.is_empty() {
        return FileKind::Text;
    }
    if sample.contains(&0) {
        return FileKind::Binary;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => {}
        // A multi-byte sequence cut off at the sample boundary is fine
        Err(e) if bytes.len() > sample.len() && e.error_len().is_none() => {}
        Err(_) => return FileKind::Binary,
    }

    // Count control characters outside the usual whitespace range
    let control = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    if (control as f32 / sample.len() as f32) >= 0.1 {
        return FileKind::Binary;
    }

    FileKind::Text
}
