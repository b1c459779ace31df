/*!
 * Bundle writer: emits the tree preamble and delimited per-file blocks
 */

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::bail;
use crate::config::Config;
use crate::error::Result;
use crate::types::{
    DirectoryNode, FileKind, FileRecord, Node, BINARY_PLACEHOLDER, FILE_FOOTER, FILE_HEADER,
    MARKER_SUFFIX, SECTION_HEADER, TREE_HEADER,
};

/// Bundle writer for a scanned directory tree
pub struct BundleWriter {
    /// Writer configuration
    config: Config,
}

impl BundleWriter {
    /// Create a new bundle writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Write the directory tree to the configured bundle file
    pub fn write(&self, root: &DirectoryNode) -> Result<()> {
        let Some(output) = &self.config.output else {
            bail!(InvalidArgument, "no output file configured");
        };

        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        self.write_to(root, &mut writer)?;
        writer.flush()?;

        Ok(())
    }

    /// Write the bundle text for a directory tree to any writer
    ///
    /// Output depends only on the tree, never on the clock or the host, so
    /// bundling an unchanged tree twice yields byte-identical bundles.
    pub fn write_to<W: Write>(&self, root: &DirectoryNode, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", TREE_HEADER)?;
        writeln!(writer)?;
        self.write_tree(root, 0, writer)?;
        writeln!(writer)?;
        writeln!(writer, "{}", SECTION_HEADER)?;
        writeln!(writer)?;
        self.write_blocks(root, writer)?;

        Ok(())
    }

    /// Write the indented tree listing (cosmetic, ignored by the parser)
    fn write_tree<W: Write>(
        &self,
        dir: &DirectoryNode,
        depth: usize,
        writer: &mut W,
    ) -> Result<()> {
        let indent = "    ".repeat(depth);
        writeln!(writer, "{}{}/", indent, dir.name)?;

        for node in &dir.contents {
            match node {
                Node::File(record) => {
                    let name = record.path.file_name().unwrap_or_default().to_string_lossy();
                    writeln!(writer, "{}    {}", indent, name)?;
                }
                Node::Directory(sub) => self.write_tree(sub, depth + 1, writer)?,
            }
        }

        Ok(())
    }

    /// Write one block per file record, in traversal order
    fn write_blocks<W: Write>(&self, dir: &DirectoryNode, writer: &mut W) -> Result<()> {
        for node in &dir.contents {
            match node {
                Node::File(record) => self.write_block(record, writer)?,
                Node::Directory(sub) => self.write_blocks(sub, writer)?,
            }
        }

        Ok(())
    }

    /// Write a single self-delimiting file block
    fn write_block<W: Write>(&self, record: &FileRecord, writer: &mut W) -> Result<()> {
        writeln!(
            writer,
            "{}{} [{}]{}",
            FILE_HEADER,
            record.path.display(),
            record.kind.tag(),
            MARKER_SUFFIX
        )?;

        match record.kind {
            FileKind::Text => {
                let content = record.content.as_deref().unwrap_or_default();
                writer.write_all(content.as_bytes())?;
                // Keep the end marker on its own line; a file without a
                // trailing newline gains one (documented normalization)
                if !content.is_empty() && !content.ends_with('\n') {
                    writeln!(writer)?;
                }
            }
            FileKind::Binary => writeln!(writer, "{}", BINARY_PLACEHOLDER)?,
        }

        writeln!(
            writer,
            "{}{}{}",
            FILE_FOOTER,
            record.path.display(),
            MARKER_SUFFIX
        )?;
        writeln!(writer)?;

        Ok(())
    }
}
