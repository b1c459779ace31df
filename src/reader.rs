/*!
 * Bundle parsing and filesystem materialization for the reverse pipeline
 */

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::error::{BundleError, Result};
use crate::types::{FileKind, FileRecord, FILE_FOOTER, FILE_HEADER, MARKER_SUFFIX};

/// A block currently being accumulated by the parser
struct OpenBlock {
    path: PathBuf,
    path_str: String,
    kind: FileKind,
    content: String,
    start_line: usize,
}

/// Parse a bundle into its file records
///
/// Lines outside blocks (the tree preamble, section headers, blank
/// separators) are ignored. Any marker inconsistency aborts the whole parse:
/// a partially parsed bundle cannot be safely reconstructed.
pub fn parse_bundle(bundle: &str) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    let mut open: Option<OpenBlock> = None;

    // Split on '\n' only so content lines keep any '\r' bytes and CRLF
    // files survive the round trip; a final empty segment is the
    // terminator, not a line
    let mut lines: Vec<&str> = bundle.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    for (idx, line) in lines.into_iter().enumerate() {
        let lineno = idx + 1;

        if let Some(header) = parse_marker(line, FILE_HEADER) {
            if let Some(block) = &open {
                return Err(BundleError::malformed(
                    lineno,
                    format!(
                        "start marker nested inside block for '{}' (opened at line {})",
                        block.path_str, block.start_line
                    ),
                ));
            }
            open = Some(parse_start_marker(header, lineno)?);
        } else if let Some(footer) = parse_marker(line, FILE_FOOTER) {
            let block = open.take().ok_or_else(|| {
                BundleError::malformed(lineno, "end marker without a matching start marker")
            })?;
            if footer != block.path_str {
                return Err(BundleError::malformed(
                    lineno,
                    format!(
                        "end marker names '{}' but block started with '{}'",
                        footer, block.path_str
                    ),
                ));
            }
            records.push(close_block(block));
        } else if let Some(block) = open.as_mut() {
            block.content.push_str(line);
            block.content.push('\n');
        }
    }

    if let Some(block) = open {
        return Err(BundleError::malformed(
            block.start_line,
            format!("start marker for '{}' has no matching end marker", block.path_str),
        ));
    }

    Ok(records)
}

/// Extract the marker body if a line is a well-formed marker with the given
/// prefix; content lines that merely resemble a marker are left alone
fn parse_marker<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(MARKER_SUFFIX))
}

/// Parse the `<path> [<kind>]` body of a start marker
fn parse_start_marker(body: &str, lineno: usize) -> Result<OpenBlock> {
    let (path_str, tag) = body
        .rsplit_once(" [")
        .and_then(|(path, rest)| rest.strip_suffix(']').map(|tag| (path, tag)))
        .ok_or_else(|| {
            BundleError::malformed(lineno, format!("start marker missing kind tag: '{}'", body))
        })?;

    let kind = FileKind::from_tag(tag)
        .ok_or_else(|| BundleError::malformed(lineno, format!("unknown kind tag '{}'", tag)))?;

    if path_str.is_empty() {
        return Err(BundleError::malformed(lineno, "start marker has an empty path"));
    }

    Ok(OpenBlock {
        path: PathBuf::from(path_str),
        path_str: path_str.to_string(),
        kind,
        content: String::new(),
        start_line: lineno,
    })
}

fn close_block(block: OpenBlock) -> FileRecord {
    match block.kind {
        FileKind::Text => FileRecord::text(block.path, block.content),
        // The placeholder body is discarded; binary bytes are not recoverable
        FileKind::Binary => FileRecord::binary(block.path),
    }
}

/// Statistics from a reverse run, collected for the end-of-run report
#[derive(Debug, Clone, Default)]
pub struct RestoreStatistics {
    /// Number of files written
    pub files_restored: usize,
    /// Number of text files written
    pub text_files: usize,
    /// Number of binary placeholders written (as empty files)
    pub binary_files: usize,
    /// Records rejected or failed (path, error)
    pub rejected: Vec<(String, String)>,
}

/// Materializes parsed records onto the filesystem
pub struct Materializer {
    /// Reconstruction configuration
    config: Config,
}

impl Materializer {
    /// Create a new materializer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Write all records under the configured root
    ///
    /// A record whose path would escape the root is rejected and reported;
    /// the remaining records are still written. Binary records restore only
    /// the name and location, as explicitly empty files.
    pub fn materialize(&self, records: &[FileRecord]) -> Result<RestoreStatistics> {
        fs::create_dir_all(&self.config.root)?;
        let mut stats = RestoreStatistics::default();

        for record in records {
            let shown = record.path.to_string_lossy().to_string();
            match self.write_record(record) {
                Ok(()) => {
                    stats.files_restored += 1;
                    match record.kind {
                        FileKind::Text => stats.text_files += 1,
                        FileKind::Binary => stats.binary_files += 1,
                    }
                }
                Err(e) => {
                    eprintln!("Error restoring {}: {}", shown, e);
                    stats.rejected.push((shown, e.to_string()));
                }
            }
        }

        Ok(stats)
    }

    fn write_record(&self, record: &FileRecord) -> Result<()> {
        let dest = resolve_path(&self.config.root, &record.path)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        match record.kind {
            FileKind::Text => {
                fs::write(&dest, record.content.as_deref().unwrap_or_default())?;
            }
            FileKind::Binary => {
                File::create(&dest)?;
            }
        }

        Ok(())
    }
}

/// Resolve a record's relative path against the target root
///
/// Rejects absolute paths and any parent-directory or prefix component, so a
/// hostile bundle cannot write outside the root.
pub fn resolve_path(root: &Path, relative: &Path) -> Result<PathBuf> {
    if relative.as_os_str().is_empty() {
        return Err(BundleError::PathEscape("<empty path>".to_string()));
    }

    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(BundleError::PathEscape(
                    relative.to_string_lossy().to_string(),
                ));
            }
        }
    }

    Ok(root.join(relative))
}
