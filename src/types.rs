/*!
 * Core types and the bundle text format for BundleFS
 */

use std::path::PathBuf;

/// Header line opening the cosmetic tree section of a bundle
pub const TREE_HEADER: &str = "# --- Project Structure ---";

/// Header line opening the file-block section of a bundle
pub const SECTION_HEADER: &str = "# --- Bundled Files ---";

/// Prefix of a file block start marker: `# --- File: <path> [text|binary] ---`
pub const FILE_HEADER: &str = "# --- File: ";

/// Prefix of a file block end marker: `# --- End of File: <path> ---`
pub const FILE_FOOTER: &str = "# --- End of File: ";

/// Suffix closing both marker lines
pub const MARKER_SUFFIX: &str = " ---";

/// Literal written in place of binary file content
pub const BINARY_PLACEHOLDER: &str = "binary file";

/// Classification of a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// UTF-8 decodable content, inlined in the bundle
    Text,
    /// Non-text content, represented by a placeholder only
    Binary,
}

impl FileKind {
    /// Tag written inside the start marker
    pub fn tag(&self) -> &'static str {
        match self {
            FileKind::Text => "text",
            FileKind::Binary => "binary",
        }
    }

    /// Parse a start marker tag back into a kind
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(FileKind::Text),
            "binary" => Some(FileKind::Binary),
            _ => None,
        }
    }
}

/// One file entry in a bundle
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Relative path from the bundle root
    pub path: PathBuf,
    /// Text or binary classification
    pub kind: FileKind,
    /// File content, present only for text records
    pub content: Option<String>,
}

impl FileRecord {
    /// Create a text record with the given content
    pub fn text(path: PathBuf, content: String) -> Self {
        Self {
            path,
            kind: FileKind::Text,
            content: Some(content),
        }
    }

    /// Create a binary record (content is not recoverable)
    pub fn binary(path: PathBuf) -> Self {
        Self {
            path,
            kind: FileKind::Binary,
            content: None,
        }
    }
}

/// Represents a directory in the scanned tree
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    /// Directory name
    pub name: String,
    /// Relative path from scan root
    pub path: PathBuf,
    /// Ordered contents: files first, then subdirectories, each sorted by name
    pub contents: Vec<Node>,
}

/// A generic node in the scanned tree
#[derive(Debug, Clone)]
pub enum Node {
    /// Directory node
    Directory(DirectoryNode),
    /// File node (text or binary)
    File(FileRecord),
}
