//! Error handling for the convenience layer.
//!
//! The raw binding table never produces these: only the wrappers in this crate
//! inspect foreign results and turn null handles into errors.

use derive_more::{Display, Error, From};
use mlir_capi_sys::LoadError;

/// Result type for convenience-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which kind of textual IR failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ParseKind {
    #[display("attribute")]
    Attribute,
    #[display("type")]
    Type,
    #[display("module")]
    Module,
}

/// Errors reported by the convenience layer.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The native library could not be attached.
    #[display("MLIR C library error: {_0}")]
    Load(#[error(source)] LoadError),

    /// The process-wide library failed to load earlier.
    #[from(ignore)]
    #[display("MLIR C library error: {_0}")]
    GlobalLoad(#[error(not(source))] &'static LoadError),

    /// The native parser returned a null handle.
    #[from(ignore)]
    #[display("failed to parse {kind} `{source_text}`")]
    Parse { kind: ParseKind, source_text: String },

    /// No dialect of that name is registered in the context.
    #[from(ignore)]
    #[display("unknown dialect `{_0}`")]
    UnknownDialect(#[error(not(source))] String),

    /// `mlirOperationCreate` returned a null operation.
    #[from(ignore)]
    #[display("failed to create operation `{_0}`")]
    OperationCreation(#[error(not(source))] String),

    /// A built operation did not pass the native verifier.
    #[from(ignore)]
    #[display("operation `{_0}` failed verification")]
    Verification(#[error(not(source))] String),
}

impl From<&'static LoadError> for Error {
    fn from(err: &'static LoadError) -> Self {
        Error::GlobalLoad(err)
    }
}
