//! Bakes the default MLIR-C library name and search directory into the crate.
//!
//! Both can still be overridden at load time through `MLIR_C_LIB` and
//! `MLIR_C_LIB_DIR`; these build-time values only pick the fallback.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=MLIR_C_DEFAULT_LIB");
    println!("cargo:rerun-if-env-changed=MLIR_PREFIX");

    let name = env::var("MLIR_C_DEFAULT_LIB")
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "MLIR-C".to_string());
    println!("cargo:rustc-env=MLIR_CAPI_DEFAULT_LIB={name}");

    // An LLVM/MLIR install prefix keeps its shared libraries under `lib/`.
    let lib_dir = env::var_os("MLIR_PREFIX")
        .filter(|prefix| !prefix.is_empty())
        .map(|prefix| PathBuf::from(prefix).join("lib"))
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    println!("cargo:rustc-env=MLIR_CAPI_DEFAULT_LIB_DIR={lib_dir}");
}
