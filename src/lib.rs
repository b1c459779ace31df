/*!
 * BundleFS - Bundle a directory tree into a single text file and back
 *
 * The forward pipeline serializes a directory structure and its file
 * contents into one flat text artifact for text-only consumers (e.g. LLM
 * context windows). The reverse pipeline parses such a bundle and
 * reconstructs the files. Binary files are represented by a placeholder and
 * are not recoverable from a bundle.
 */

pub mod config;
pub mod error;
pub mod reader;
pub mod report;
pub mod scanner;
pub mod transform;
pub mod types;
pub mod utils;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use config::{Args, Config, Mode};
pub use error::{BundleError, Result};
pub use reader::{parse_bundle, Materializer, RestoreStatistics};
pub use report::{FileReportInfo, ReportFormat, Reporter, RestoreReport, ScanReport};
pub use scanner::{classify_bytes, Scanner};
pub use transform::{transform, CommentStyle, TransformOptions};
pub use types::{DirectoryNode, FileKind, FileRecord, Node};
pub use utils::{count_files, format_file_size};
pub use writer::BundleWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
