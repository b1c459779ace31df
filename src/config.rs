/*!
 * Configuration handling for BundleFS
 */

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use clap_complete::Shell;

use crate::ensure;
use crate::error::Result;
use crate::transform::TransformOptions;

/// Pipeline direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bundle a directory tree into one text file
    Forward,
    /// Recreate a directory tree from a bundle
    Reverse,
}

/// Command-line arguments for BundleFS
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "bundlefs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Bundle a directory tree into a single text file, and back",
    long_about = "Serializes a directory structure and its file contents into one flat text \
                  artifact suitable for a text-only consumer (e.g. an LLM prompt window), and \
                  reverses that artifact back into the original files.",
    group(ArgGroup::new("mode").required(true).args(["forward", "reverse", "generate"]))
)]
pub struct Args {
    /// Generate a single bundle file from the root directory
    #[clap(long)]
    pub forward: bool,

    /// Recreate directories and files from a bundle file
    #[clap(long)]
    pub reverse: bool,

    /// Root directory to scan (forward) or reconstruct into (reverse)
    #[clap(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Output bundle path (forward mode)
    #[clap(short, long, required_if_eq("forward", "true"))]
    pub output: Option<PathBuf>,

    /// Input bundle path (reverse mode)
    #[clap(short, long, required_if_eq("reverse", "true"))]
    pub input: Option<PathBuf>,

    /// Exclusion pattern file: one glob or name per line, `#` comments allowed
    #[clap(short, long, default_value = "bundlefs.config")]
    pub config: PathBuf,

    /// Comma-separated list of extra exclusion patterns
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Strip comments from files in known languages (lossy)
    #[clap(long)]
    pub strip_comments: bool,

    /// Strip empty and whitespace-only lines from text files (lossy)
    #[clap(long)]
    pub strip_blank_lines: bool,

    /// Respect .gitignore files during traversal
    #[clap(long)]
    pub respect_gitignore: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Pipeline direction
    pub mode: Mode,

    /// Base directory for traversal or reconstruction
    pub root: PathBuf,

    /// Bundle destination (forward mode)
    pub output: Option<PathBuf>,

    /// Bundle source (reverse mode)
    pub input: Option<PathBuf>,

    /// Exclusion patterns, matched per path segment
    pub exclusions: Vec<String>,

    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,

    /// Content transformation options
    pub transform: TransformOptions,
}

impl Config {
    /// Create configuration from command-line arguments
    ///
    /// Loads the exclusion pattern file here, once; the scanner receives the
    /// patterns as immutable configuration, never as process-wide state.
    pub fn from_args(args: Args) -> Self {
        let mut exclusions = load_exclusions(&args.config);
        exclusions.extend(args.exclude);

        Self {
            mode: if args.reverse {
                Mode::Reverse
            } else {
                Mode::Forward
            },
            root: args.root,
            output: args.output,
            input: args.input,
            exclusions,
            respect_gitignore: args.respect_gitignore,
            transform: TransformOptions {
                strip_comments: args.strip_comments,
                strip_blank_lines: args.strip_blank_lines,
            },
        }
    }

    /// Absolute form of the output path, for comparing against scanned
    /// entries
    ///
    /// The bundle file may not exist yet when a scan starts, so its parent
    /// directory is canonicalized and the file name re-joined. Returns
    /// `None` when no output is configured or its directory does not exist.
    pub fn resolved_output(&self) -> Option<PathBuf> {
        let output = self.output.as_ref()?;
        let file_name = output.file_name()?;
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        fs::canonicalize(parent).ok().map(|dir| dir.join(file_name))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            Mode::Forward => {
                ensure!(
                    self.root.exists() && self.root.is_dir(),
                    Config,
                    "Root directory not found: {}",
                    self.root.display()
                );

                if let Some(output) = &self.output {
                    if let Some(parent) = output.parent() {
                        ensure!(
                            parent.as_os_str().is_empty() || parent.exists(),
                            Config,
                            "Output directory not found: {}",
                            parent.display()
                        );
                    }
                }
            }
            Mode::Reverse => {
                if let Some(input) = &self.input {
                    ensure!(
                        input.exists() && input.is_file(),
                        Config,
                        "Input bundle not found: {}",
                        input.display()
                    );
                }
            }
        }

        Ok(())
    }
}

/// Load exclusion patterns from a config file
///
/// One pattern per line; blank lines and `#`-prefixed lines are skipped. A
/// missing file simply yields no patterns; an unreadable line is skipped with
/// a warning so the scan can proceed with the patterns parsed so far.
pub fn load_exclusions(path: &Path) -> Vec<String> {
    let mut patterns = Vec::new();

    if !path.exists() {
        return patterns;
    }

    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot read exclusion file {}: {}", path.display(), e);
            return patterns;
        }
    };

    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() && !line.starts_with('#') {
                    patterns.push(line.to_string());
                }
            }
            Err(e) => {
                eprintln!(
                    "Warning: skipping unreadable line in {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    patterns
}
