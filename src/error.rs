//! Global error handling for bundlefs
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

/// Global error type for bundlefs operations
#[derive(Error, Debug)]
pub enum BundleError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Traversal errors (unreadable entries during a scan)
    #[error("Traversal error: {0}")]
    Traversal(String),

    /// Corrupt or inconsistent bundle markers during reverse parsing
    #[error("Malformed bundle at line {line}: {reason}")]
    MalformedBundle {
        /// 1-based line number of the offending marker
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A record's path would resolve outside the reconstruction root
    #[error("Path escapes target root: {0}")]
    PathEscape(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl BundleError {
    /// Build a `MalformedBundle` error for the given line
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedBundle {
            line,
            reason: reason.into(),
        }
    }
}

/// Specialized Result type for bundlefs operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Creates a BundleError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::BundleError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            BundleError::Unexpected(format!("{}: {}", context, e))
        })
    }
}
