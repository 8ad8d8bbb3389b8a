//! Thin convenience layer over the raw MLIR C API bindings.
//!
//! [`mlir_capi_sys`] holds the struct layouts and the function table; this
//! crate adds what a caller needs around it:
//!
//! - [`CArray`] to pack handle records into C array arguments,
//! - [`register_all_upstream_dialects`] and friends,
//! - printing to `String` and null-checked parsing ([`support`]),
//! - optional scope guards ([`owned`]) and an [`OperationBuilder`],
//! - the exercise [`scenarios`] used by the tests and the `mlir-capi` binary.
//!
//! None of it tracks ownership for you beyond what the guards do on drop.

pub mod array;
pub mod builder;
pub mod dialects;
pub mod error;
pub mod owned;
pub mod scenarios;
pub mod support;

pub use array::CArray;
pub use builder::OperationBuilder;
pub use dialects::{UPSTREAM_DIALECTS, load_dialect, register_all_upstream_dialects};
pub use error::{Error, ParseKind, Result};
pub use owned::{OwnedContext, OwnedDialectRegistry, OwnedModule, OwnedPrintingFlags};

pub use mlir_capi_sys as sys;
pub use mlir_capi_sys::{Capi, LibraryConfig, LoadError};

/// The process-wide binding table, loaded from the environment on first use.
pub fn capi() -> Result<&'static Capi> {
    Ok(Capi::global()?)
}
