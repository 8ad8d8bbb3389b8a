//! Common test utilities for tests that need the native MLIR-C library.

use mlir_capi::Capi;

/// The process-wide table, or `None` (with a note on stderr) when the native
/// library is not installed. Set `MLIR_C_LIB` / `MLIR_C_LIB_DIR` to point the
/// tests at a build tree.
pub fn capi_or_skip(test: &str) -> Option<&'static Capi> {
    match Capi::global() {
        Ok(capi) => Some(capi),
        Err(err) => {
            eprintln!("skipping {test}: {err}");
            None
        }
    }
}
