//! Raw bindings to the MLIR C API.
//!
//! This crate mirrors the public structs of `mlir-c/*.h` as `#[repr(C)]`
//! records and binds a fixed table of exported functions from the `MLIR-C`
//! shared library, resolved at load time:
//!
//! ```no_run
//! use mlir_capi_sys::Capi;
//!
//! let capi = Capi::global().expect("MLIR-C is not installed");
//! unsafe {
//!     let context = capi.mlirContextCreate();
//!     capi.mlirContextDestroy(context);
//! }
//! ```
//!
//! Nothing here validates handles or tracks lifetimes. Every handle is only
//! valid while the context it came from is alive, and every creation call has
//! to be paired with its destroy call by the caller.

pub mod bindings;
pub mod error;
pub mod library;
pub mod types;

pub use bindings::Capi;
pub use error::{LoadAttempt, LoadError};
pub use library::LibraryConfig;
pub use types::*;
