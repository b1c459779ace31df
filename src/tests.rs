/*!
 * Tests for BundleFS functionality
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tempfile::tempdir;

use crate::config::{Config, Mode};
use crate::error::BundleError;
use crate::reader::{parse_bundle, resolve_path, Materializer};
use crate::scanner::{classify_bytes, should_exclude_name, Scanner};
use crate::transform::{transform, TransformOptions};
use crate::types::{FileKind, FileRecord, BINARY_PLACEHOLDER};
use crate::writer::BundleWriter;

// Helper function to create a test directory structure
fn setup_test_directory() -> io::Result<tempfile::TempDir> {
    let temp_dir = tempdir()?;

    // Create a simple directory structure
    fs::create_dir(temp_dir.path().join("dir1"))?;
    fs::create_dir(temp_dir.path().join("dir1").join("subdir"))?;

    // Create text files
    fs::write(temp_dir.path().join("a.txt"), "hello\n\nworld\n")?;
    fs::write(
        temp_dir.path().join("dir1").join("file2.txt"),
        "This is another text file\nwith multiple lines\n",
    )?;
    fs::write(
        temp_dir
            .path()
            .join("dir1")
            .join("subdir")
            .join("file3.txt"),
        "Nested file content\n",
    )?;

    // Create a binary file (invalid UTF-8)
    let mut bin_file = File::create(temp_dir.path().join("b.bin"))?;
    bin_file.write_all(&[0u8, 1u8, 0xFFu8, 0xFEu8])?;

    Ok(temp_dir)
}

fn forward_config(root: &Path, output: &Path) -> Config {
    Config {
        mode: Mode::Forward,
        root: root.to_path_buf(),
        output: Some(output.to_path_buf()),
        input: None,
        exclusions: vec![],
        respect_gitignore: false,
        transform: TransformOptions::default(),
    }
}

fn reverse_config(root: &Path, input: &Path) -> Config {
    Config {
        mode: Mode::Reverse,
        root: root.to_path_buf(),
        output: None,
        input: Some(input.to_path_buf()),
        exclusions: vec![],
        respect_gitignore: false,
        transform: TransformOptions::default(),
    }
}

// Run the forward pipeline and return the bundle text
fn bundle(config: Config) -> io::Result<String> {
    let output = config.output.clone().unwrap();
    let mut scanner = Scanner::new(config.clone(), Arc::new(ProgressBar::hidden()));
    let writer = BundleWriter::new(config);

    let root_node = scanner.scan().map_err(io::Error::other)?;
    writer.write(&root_node).map_err(io::Error::other)?;

    fs::read_to_string(output)
}

// Test basic bundle structure
#[test]
fn test_bundle_structure() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = temp_dir.path().join("bundle.txt");

    let content = bundle(forward_config(temp_dir.path(), &output))?;

    assert!(content.contains("# --- Project Structure ---"));
    assert!(content.contains("# --- Bundled Files ---"));
    assert!(content.contains("# --- File: a.txt [text] ---"));
    assert!(content.contains("hello\n\nworld\n"));
    assert!(content.contains("# --- End of File: a.txt ---"));
    assert!(content.contains("# --- File: dir1/file2.txt [text] ---"));
    assert!(content.contains("# --- File: dir1/subdir/file3.txt [text] ---"));

    // Binary files appear as a placeholder block, never as raw content
    assert!(content.contains("# --- File: b.bin [binary] ---"));
    assert!(content.contains(BINARY_PLACEHOLDER));
    assert!(!content.as_bytes().contains(&0u8));

    Ok(())
}

// Test that the tree preamble lists every entry
#[test]
fn test_tree_preamble() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = temp_dir.path().join("bundle.txt");

    let content = bundle(forward_config(temp_dir.path(), &output))?;
    let preamble: String = content
        .split("# --- Bundled Files ---")
        .next()
        .unwrap()
        .to_string();

    assert!(preamble.contains("    a.txt"));
    assert!(preamble.contains("    dir1/"));
    assert!(preamble.contains("        file2.txt"));
    assert!(preamble.contains("        subdir/"));
    assert!(preamble.contains("            file3.txt"));

    Ok(())
}

// Round-trip: text files come back byte-identical, binary files come back
// as empty placeholders
#[test]
fn test_round_trip() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = temp_dir.path().join("bundle.txt");
    bundle(forward_config(temp_dir.path(), &output))?;

    let target = tempdir()?;
    let config = reverse_config(target.path(), &output);
    let records = parse_bundle(&fs::read_to_string(&output)?).map_err(io::Error::other)?;
    let stats = Materializer::new(config)
        .materialize(&records)
        .map_err(io::Error::other)?;

    assert_eq!(stats.files_restored, 4);
    assert!(stats.rejected.is_empty());

    assert_eq!(
        fs::read_to_string(target.path().join("a.txt"))?,
        "hello\n\nworld\n"
    );
    assert_eq!(
        fs::read_to_string(target.path().join("dir1").join("file2.txt"))?,
        "This is another text file\nwith multiple lines\n"
    );
    assert_eq!(
        fs::read_to_string(target.path().join("dir1").join("subdir").join("file3.txt"))?,
        "Nested file content\n"
    );

    // Binary bytes are not recoverable; the name and location are
    let bin = fs::read(target.path().join("b.bin"))?;
    assert!(bin.is_empty());

    Ok(())
}

// CRLF line endings are content bytes and survive the round trip
#[test]
fn test_round_trip_preserves_crlf() -> io::Result<()> {
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join("dos.txt"), "hello\r\nworld\r\n")?;

    let output = temp_dir.path().join("bundle.txt");
    bundle(forward_config(temp_dir.path(), &output))?;

    let target = tempdir()?;
    let records = parse_bundle(&fs::read_to_string(&output)?).map_err(io::Error::other)?;
    Materializer::new(reverse_config(target.path(), &output))
        .materialize(&records)
        .map_err(io::Error::other)?;

    assert_eq!(
        fs::read(target.path().join("dos.txt"))?,
        b"hello\r\nworld\r\n"
    );

    Ok(())
}

// Bundling the same unchanged tree twice yields byte-identical bundles
#[test]
fn test_idempotent_bundles() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;

    let out1 = temp_dir.path().join("bundle1.txt");
    let first = bundle(forward_config(temp_dir.path(), &out1))?;
    fs::remove_file(&out1)?;

    let out2 = temp_dir.path().join("bundle1.txt");
    let second = bundle(forward_config(temp_dir.path(), &out2))?;

    assert_eq!(first, second);

    Ok(())
}

// A pattern matching a directory name prunes the whole subtree
#[test]
fn test_exclusion_prunes_subtree() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = temp_dir.path().join("bundle.txt");

    let mut config = forward_config(temp_dir.path(), &output);
    config.exclusions = vec!["dir1".to_string()];
    let content = bundle(config)?;

    assert!(!content.contains("dir1"));
    assert!(!content.contains("file2.txt"));
    assert!(!content.contains("file3.txt"));
    assert!(content.contains("a.txt"));

    Ok(())
}

// Glob patterns exclude matching file names anywhere in the tree
#[test]
fn test_glob_exclusion() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = temp_dir.path().join("bundle.txt");

    let mut config = forward_config(temp_dir.path(), &output);
    config.exclusions = vec!["*.txt".to_string()];
    let content = bundle(config)?;

    assert!(!content.contains("a.txt ["));
    assert!(!content.contains("file2.txt"));
    assert!(!content.contains("file3.txt"));
    assert!(content.contains("b.bin"));

    Ok(())
}

// The output file itself is never bundled, even on a re-run when it
// already exists, and even when given with a `.` path component
#[test]
fn test_output_file_not_bundled() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = temp_dir.path().join(".").join("bundle.txt");

    bundle(forward_config(temp_dir.path(), &output))?;
    let content = bundle(forward_config(temp_dir.path(), &output))?;
    assert!(!content.contains("# --- File: bundle.txt"));
    assert!(content.contains("# --- File: a.txt [text] ---"));

    Ok(())
}

// Only the bundle file itself is skipped; other files sharing its name
// elsewhere in the tree are still bundled
#[test]
fn test_output_name_elsewhere_still_bundled() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    fs::create_dir(temp_dir.path().join("docs"))?;
    fs::write(temp_dir.path().join("docs").join("bundle.txt"), "nested\n")?;

    let output = temp_dir.path().join("bundle.txt");
    bundle(forward_config(temp_dir.path(), &output))?;
    let content = bundle(forward_config(temp_dir.path(), &output))?;

    assert!(content.contains("# --- File: docs/bundle.txt [text] ---"));
    assert!(!content.contains("# --- File: bundle.txt "));

    Ok(())
}

#[test]
fn test_should_exclude_name() {
    let patterns = vec!["*.pyc".to_string(), "node_modules".to_string()];

    assert!(should_exclude_name("module.pyc", &patterns));
    assert!(should_exclude_name("node_modules", &patterns));
    assert!(!should_exclude_name("main.py", &patterns));
    assert!(!should_exclude_name("node_modules_backup", &patterns));
}

#[test]
fn test_classify_bytes() {
    assert_eq!(classify_bytes(b"plain ascii text\n"), FileKind::Text);
    assert_eq!(classify_bytes("utf-8 text: héllo\n".as_bytes()), FileKind::Text);
    assert_eq!(classify_bytes(b""), FileKind::Text);
    assert_eq!(classify_bytes(b"has a \x00 nul byte"), FileKind::Binary);
    assert_eq!(classify_bytes(&[0xFF, 0xFE, 0x00, 0x01]), FileKind::Binary);
    // High control-byte ratio
    assert_eq!(classify_bytes(&[0x01, 0x02, 0x03, b'a']), FileKind::Binary);
}

#[test]
fn test_strip_blank_lines() {
    let options = TransformOptions {
        strip_comments: false,
        strip_blank_lines: true,
    };

    let result = transform("hello\n\n   \nworld\n", None, &options);
    assert_eq!(result, "hello\nworld\n");

    // CRLF lines keep their '\r'; a bare "\r" line counts as blank
    let result = transform("hello\r\n\r\nworld\r\n", None, &options);
    assert_eq!(result, "hello\r\nworld\r\n");
}

#[test]
fn test_strip_comments_hash() {
    let options = TransformOptions {
        strip_comments: true,
        strip_blank_lines: false,
    };

    let source = "# full line comment\nx = 1  # trailing\ns = \"# not a comment\"\n\ny = 2\n";
    let result = transform(source, Some("py"), &options);
    assert_eq!(result, "x = 1\ns = \"# not a comment\"\n\ny = 2\n");
}

#[test]
fn test_strip_comments_double_slash() {
    let options = TransformOptions {
        strip_comments: true,
        strip_blank_lines: false,
    };

    let source = "// header\nlet x = 1; // trailing\nlet url = \"http://example.com\";\n";
    let result = transform(source, Some("rs"), &options);
    assert_eq!(
        result,
        "let x = 1;\nlet url = \"http://example.com\";\n"
    );
}

// Comment stripping only applies to known languages
#[test]
fn test_strip_comments_unknown_extension() {
    let options = TransformOptions {
        strip_comments: true,
        strip_blank_lines: false,
    };

    let source = "# this is a heading, not a comment\n";
    assert_eq!(transform(source, Some("md"), &options), source);
    assert_eq!(transform(source, None, &options), source);
}

// With blank-line stripping enabled, the reconstructed file has no blank
// lines (lossy by design)
#[test]
fn test_round_trip_with_stripping_is_lossy() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = temp_dir.path().join("bundle.txt");

    let mut config = forward_config(temp_dir.path(), &output);
    config.transform.strip_blank_lines = true;
    bundle(config)?;

    let target = tempdir()?;
    let records = parse_bundle(&fs::read_to_string(&output)?).map_err(io::Error::other)?;
    Materializer::new(reverse_config(target.path(), &output))
        .materialize(&records)
        .map_err(io::Error::other)?;

    let restored = fs::read_to_string(target.path().join("a.txt"))?;
    assert_eq!(restored, "hello\nworld\n");
    assert!(restored.lines().all(|l| !l.trim().is_empty()));

    Ok(())
}

#[test]
fn test_parse_bundle_records() {
    let text = "\
# --- Project Structure ---

proj/
    a.txt
    b.bin

# --- Bundled Files ---

# --- File: a.txt [text] ---
hello

world
# --- End of File: a.txt ---

# --- File: b.bin [binary] ---
binary file
# --- End of File: b.bin ---
";

    let records = parse_bundle(text).unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].path, PathBuf::from("a.txt"));
    assert_eq!(records[0].kind, FileKind::Text);
    assert_eq!(records[0].content.as_deref(), Some("hello\n\nworld\n"));

    assert_eq!(records[1].path, PathBuf::from("b.bin"));
    assert_eq!(records[1].kind, FileKind::Binary);
    assert!(records[1].content.is_none());
}

#[test]
fn test_malformed_missing_end_marker() {
    let text = "# --- File: a.txt [text] ---\nhello\n";

    match parse_bundle(text) {
        Err(BundleError::MalformedBundle { line, .. }) => assert_eq!(line, 1),
        other => panic!("expected MalformedBundle, got {:?}", other),
    }
}

#[test]
fn test_malformed_nested_markers() {
    let text = "\
# --- File: a.txt [text] ---
# --- File: b.txt [text] ---
# --- End of File: b.txt ---
";

    match parse_bundle(text) {
        Err(BundleError::MalformedBundle { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected MalformedBundle, got {:?}", other),
    }
}

#[test]
fn test_malformed_markers() {
    // End marker without a start
    assert!(matches!(
        parse_bundle("# --- End of File: a.txt ---\n"),
        Err(BundleError::MalformedBundle { .. })
    ));

    // Empty path
    assert!(matches!(
        parse_bundle("# --- File:  [text] ---\nx\n# --- End of File:  ---\n"),
        Err(BundleError::MalformedBundle { .. })
    ));

    // Unknown kind tag
    assert!(matches!(
        parse_bundle("# --- File: a.txt [elf] ---\nx\n# --- End of File: a.txt ---\n"),
        Err(BundleError::MalformedBundle { .. })
    ));

    // Mismatched end marker path
    assert!(matches!(
        parse_bundle("# --- File: a.txt [text] ---\nx\n# --- End of File: b.txt ---\n"),
        Err(BundleError::MalformedBundle { .. })
    ));
}

#[test]
fn test_resolve_path_rejects_escapes() {
    let root = Path::new("/tmp/restore");

    assert!(resolve_path(root, Path::new("ok/file.txt")).is_ok());
    assert!(matches!(
        resolve_path(root, Path::new("../evil.txt")),
        Err(BundleError::PathEscape(_))
    ));
    assert!(matches!(
        resolve_path(root, Path::new("ok/../../evil.txt")),
        Err(BundleError::PathEscape(_))
    ));
    assert!(matches!(
        resolve_path(root, Path::new("/etc/passwd")),
        Err(BundleError::PathEscape(_))
    ));
    assert!(matches!(
        resolve_path(root, Path::new("")),
        Err(BundleError::PathEscape(_))
    ));
}

// A hostile record is rejected and reported; the remaining records are
// still materialized
#[test]
fn test_materialize_skips_escaping_records() -> io::Result<()> {
    let target = tempdir()?;
    let config = reverse_config(target.path(), Path::new("unused"));

    let records = vec![
        FileRecord::text(PathBuf::from("../evil.txt"), "pwned\n".to_string()),
        FileRecord::text(PathBuf::from("good.txt"), "fine\n".to_string()),
    ];

    let stats = Materializer::new(config)
        .materialize(&records)
        .map_err(io::Error::other)?;

    assert_eq!(stats.files_restored, 1);
    assert_eq!(stats.rejected.len(), 1);
    assert!(!target.path().parent().unwrap().join("evil.txt").exists());
    assert_eq!(fs::read_to_string(target.path().join("good.txt"))?, "fine\n");

    Ok(())
}

// Respecting .gitignore prunes ignored files from the bundle
#[test]
fn test_respect_gitignore() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;

    // The ignore walker only honors .gitignore inside a repository
    fs::create_dir(temp_dir.path().join(".git"))?;
    fs::write(temp_dir.path().join(".gitignore"), "*.txt\nb.bin\n")?;
    fs::write(temp_dir.path().join("kept.md"), "# kept\n")?;

    let output = temp_dir.path().join("bundle.out");
    let mut config = forward_config(temp_dir.path(), &output);
    config.respect_gitignore = true;
    let content = bundle(config)?;

    assert!(!content.contains("a.txt"));
    assert!(!content.contains("file2.txt"));
    assert!(!content.contains("b.bin"));
    assert!(content.contains("kept.md"));

    Ok(())
}
