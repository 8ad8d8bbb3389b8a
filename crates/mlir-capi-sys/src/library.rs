//! Locating the MLIR-C shared library.
//!
//! The library name defaults to `MLIR-C` (or whatever `MLIR_C_DEFAULT_LIB`
//! was at build time) and can be swapped at load time through `MLIR_C_LIB`,
//! which accepts either a bare library name or a path to the file itself.
//! Extra directories to search come from `MLIR_C_LIB_DIR`, a platform path
//! list (`:`-separated on Unix, `;` on Windows).

use std::env;
use std::ffi::OsString;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Environment variable overriding the library name or path.
pub const LIB_ENV: &str = "MLIR_C_LIB";

/// Environment variable listing extra directories to search.
pub const LIB_DIR_ENV: &str = "MLIR_C_LIB_DIR";

/// Library name baked in at build time.
pub const DEFAULT_LIB_NAME: &str = env!("MLIR_CAPI_DEFAULT_LIB");

const DEFAULT_LIB_DIR: &str = env!("MLIR_CAPI_DEFAULT_LIB_DIR");

/// Which shared library to bind against, and where to look for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// A bare library name (`MLIR-C`) or a path to a library file. Kept as an
    /// `OsString` so non-UTF-8 paths reach the loader unchanged.
    pub name: OsString,
    /// Directories tried, in order, before the system loader's own search.
    pub search_dirs: Vec<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        let search_dirs = if DEFAULT_LIB_DIR.is_empty() {
            Vec::new()
        } else {
            vec![PathBuf::from(DEFAULT_LIB_DIR)]
        };
        Self {
            name: OsString::from(DEFAULT_LIB_NAME),
            search_dirs,
        }
    }
}

impl LibraryConfig {
    /// Binds against `name` with no extra search directories.
    pub fn named(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            search_dirs: Vec::new(),
        }
    }

    /// Reads `MLIR_C_LIB` and `MLIR_C_LIB_DIR` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Directories from `MLIR_C_LIB_DIR` are
    /// searched before the build-time default directory.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let mut config = Self::default();
        if let Some(name) = lookup(LIB_ENV).filter(|name| !name.is_empty()) {
            config.name = name;
        }
        if let Some(dirs) = lookup(LIB_DIR_ENV).filter(|dirs| !dirs.is_empty()) {
            let mut search_dirs: Vec<PathBuf> = env::split_paths(&dirs)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect();
            search_dirs.append(&mut config.search_dirs);
            config.search_dirs = search_dirs;
        }
        config
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Whether `name` already points at a file rather than naming a library.
    ///
    /// True for anything with a path separator, and for file names carrying
    /// the platform suffix, versioned or not (`libMLIR-C.so.19`).
    pub fn names_a_path(&self) -> bool {
        let versioned_suffix = format!(".{}.", env::consts::DLL_EXTENSION);
        let name = self.name.to_string_lossy();
        name.contains(MAIN_SEPARATOR)
            || name.contains('/')
            || name.contains(&versioned_suffix)
            || Path::new(&self.name)
                .extension()
                .is_some_and(|ext| ext == env::consts::DLL_EXTENSION)
    }

    /// The platform file name for the configured library, e.g. `libMLIR-C.so`.
    pub fn file_name(&self) -> OsString {
        libloading::library_filename(&self.name)
    }

    /// Every path the loader tries, in order.
    ///
    /// A path-like name is used verbatim. Otherwise the platform file name is
    /// joined onto each search directory, and finally tried bare so that the
    /// system loader (`LD_LIBRARY_PATH`, rpath, ...) gets the last word.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if self.names_a_path() {
            return vec![PathBuf::from(&self.name)];
        }
        let file_name = self.file_name();
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .chain(std::iter::once(PathBuf::from(&file_name)))
            .collect()
    }
}
