/*!
 * Content transformation passes applied to text files during bundling
 *
 * Two independent passes, both disabled by default: comment stripping
 * (language-aware, selected per file extension) and blank-line stripping.
 * Both are lossy; reverse mode restores the stripped content, not the
 * original.
 */

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Comment syntax family for a source language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `#` to end of line (Python, shell, TOML, ...)
    Hash,
    /// `//` to end of line (Rust, C, JavaScript, ...)
    DoubleSlash,
}

/// Options controlling the transformation passes
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Remove full-line and trailing comments for known languages
    pub strip_comments: bool,
    /// Remove empty and whitespace-only lines
    pub strip_blank_lines: bool,
}

/// File extension to comment syntax mapping
static COMMENT_STYLES: Lazy<HashMap<&'static str, CommentStyle>> = Lazy::new(|| {
    HashMap::from([
        // Hash-comment languages
        ("py", CommentStyle::Hash),
        ("pyi", CommentStyle::Hash),
        ("sh", CommentStyle::Hash),
        ("bash", CommentStyle::Hash),
        ("zsh", CommentStyle::Hash),
        ("rb", CommentStyle::Hash),
        ("pl", CommentStyle::Hash),
        ("toml", CommentStyle::Hash),
        ("yml", CommentStyle::Hash),
        ("yaml", CommentStyle::Hash),
        ("mk", CommentStyle::Hash),
        // Double-slash languages
        ("rs", CommentStyle::DoubleSlash),
        ("c", CommentStyle::DoubleSlash),
        ("h", CommentStyle::DoubleSlash),
        ("cpp", CommentStyle::DoubleSlash),
        ("hpp", CommentStyle::DoubleSlash),
        ("cc", CommentStyle::DoubleSlash),
        ("js", CommentStyle::DoubleSlash),
        ("jsx", CommentStyle::DoubleSlash),
        ("ts", CommentStyle::DoubleSlash),
        ("tsx", CommentStyle::DoubleSlash),
        ("go", CommentStyle::DoubleSlash),
        ("java", CommentStyle::DoubleSlash),
        ("kt", CommentStyle::DoubleSlash),
        ("swift", CommentStyle::DoubleSlash),
    ])
});

/// Look up the comment syntax for a file extension, if it is a known language
pub fn comment_style_for(extension: &str) -> Option<CommentStyle> {
    COMMENT_STYLES.get(extension).copied()
}

/// Apply the enabled transformation passes to a text file's content
///
/// Comment stripping applies only when the extension maps to a known
/// language; blank-line stripping applies to any text file. With both
/// passes disabled the content passes through byte-exact; when a pass
/// runs, surviving lines keep their bytes (including any `\r` from CRLF
/// endings) and the result is newline-terminated unless it is empty.
pub fn transform(content: &str, extension: Option<&str>, options: &TransformOptions) -> String {
    if !options.strip_comments && !options.strip_blank_lines {
        return content.to_string();
    }

    let style = if options.strip_comments {
        extension.and_then(comment_style_for)
    } else {
        None
    };

    // Split on '\n' only so CRLF content keeps its '\r' bytes; a final
    // empty segment is the terminator, not a line
    let mut lines: Vec<&str> = content.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    let mut out = String::with_capacity(content.len());
    for line in lines {
        let kept = match style {
            Some(style) => match strip_comment(line, style) {
                Some(stripped) => stripped,
                // Stripping emptied the line (full-line comment): drop it
                None => continue,
            },
            None => line.to_string(),
        };

        if options.strip_blank_lines && kept.trim().is_empty() {
            continue;
        }

        out.push_str(&kept);
        out.push('\n');
    }

    out
}

/// Remove a trailing comment from one line, tracking quote state
///
/// Returns `None` when stripping leaves nothing but whitespace (the line was
/// a full-line comment). Quote tracking is per-line and covers single and
/// double quotes with backslash escapes; multi-line string literals that
/// contain a comment marker can be mis-stripped. That limitation is accepted:
/// exact disambiguation needs a full parser.
fn strip_comment(line: &str, style: CommentStyle) -> Option<String> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev_slash = false;
    let mut cut: Option<usize> = None;

    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            prev_slash = false;
            continue;
        }
        match ch {
            '\\' if in_single || in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if style == CommentStyle::Hash && !in_single && !in_double => {
                cut = Some(idx);
                break;
            }
            '/' if style == CommentStyle::DoubleSlash && !in_single && !in_double => {
                if prev_slash {
                    cut = Some(idx - 1);
                    break;
                }
                prev_slash = true;
                continue;
            }
            _ => {}
        }
        prev_slash = false;
    }

    match cut {
        Some(idx) => {
            let kept = line[..idx].trim_end();
            if kept.is_empty() {
                None
            } else {
                Some(kept.to_string())
            }
        }
        None => Some(line.to_string()),
    }
}
