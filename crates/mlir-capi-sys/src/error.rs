//! Errors raised while attaching to the native MLIR-C library.

use std::path::PathBuf;

use derive_more::{Display, Error};

/// Result type for library loading.
pub type Result<T, E = LoadError> = std::result::Result<T, E>;

/// A single failed attempt to open a candidate library file.
#[derive(Debug, Display)]
#[display("{}: {reason}", path.display())]
pub struct LoadAttempt {
    pub path: PathBuf,
    pub reason: libloading::Error,
}

/// Failures while binding the function table.
///
/// Only the link-time failure is detectable here. Layout mismatches and
/// foreign-side rejections surface at call time, as whatever the native
/// library does.
#[derive(Debug, Display, Error)]
pub enum LoadError {
    /// None of the candidate files could be opened.
    #[display("could not open MLIR C library `{name}` ({})", render_attempts(attempts))]
    LibraryNotFound {
        name: String,
        attempts: Vec<LoadAttempt>,
    },

    /// The library opened, but a bound symbol is absent from it.
    #[display("symbol `{symbol}` is missing from {}", library.display())]
    MissingSymbol {
        symbol: &'static str,
        library: PathBuf,
        source: libloading::Error,
    },
}

fn render_attempts(attempts: &[LoadAttempt]) -> String {
    if attempts.is_empty() {
        return "no candidate paths".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
