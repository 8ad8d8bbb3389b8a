//! Command-line interface for exercising the bindings.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mlir_capi::LibraryConfig;

#[derive(Debug, Parser)]
#[command(name = "mlir-capi")]
#[command(about = "Exercise the MLIR C API bindings against a native library", long_about = None)]
pub struct Cli {
    /// Library name or path to bind against (overrides MLIR_C_LIB)
    #[arg(long, global = true, value_name = "NAME|PATH")]
    pub lib: Option<OsString>,

    /// Extra directory to search for the library, tried before MLIR_C_LIB_DIR
    #[arg(long = "lib-dir", global = true, value_name = "DIR")]
    pub lib_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every bound C API symbol
    Symbols {
        /// Load the library and resolve the whole table
        #[arg(long)]
        check: bool,
    },
    /// Register all upstream dialects and load the given ones by name
    Dialects {
        /// Dialect names; defaults to the dialects the demo relies on
        names: Vec<String>,
    },
    /// Parse attributes and print them back
    #[command(name = "parse-attr")]
    ParseAttr {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Parse types and print them back
    #[command(name = "parse-type")]
    ParseType {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Create and destroy contexts repeatedly
    Churn {
        #[arg(default_value_t = 100)]
        iterations: usize,
    },
    /// Build, verify, and print the `@add` example module
    Demo {
        /// Print operations in generic form
        #[arg(long)]
        generic: bool,
    },
}

impl Cli {
    /// Layers the command-line flags over `base`.
    pub fn library_config(&self, base: LibraryConfig) -> LibraryConfig {
        let mut config = base;
        if let Some(lib) = &self.lib {
            config.name = lib.clone();
        }
        if !self.lib_dirs.is_empty() {
            let mut search_dirs = self.lib_dirs.clone();
            search_dirs.append(&mut config.search_dirs);
            config.search_dirs = search_dirs;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_base_config() {
        let cli = Cli::try_parse_from([
            "mlir-capi",
            "--lib",
            "MLIR-C-19",
            "--lib-dir",
            "/opt/llvm/lib",
            "symbols",
        ])
        .unwrap();
        let base = LibraryConfig::named("MLIR-C").with_search_dir("/usr/lib");
        let config = cli.library_config(base);
        assert_eq!(config.name, "MLIR-C-19");
        assert_eq!(
            config.search_dirs,
            vec![PathBuf::from("/opt/llvm/lib"), PathBuf::from("/usr/lib")]
        );
    }

    #[test]
    fn no_flags_keep_base_config() {
        let cli = Cli::try_parse_from(["mlir-capi", "churn"]).unwrap();
        let base = LibraryConfig::named("MLIR-C");
        assert_eq!(cli.library_config(base.clone()), base);
        assert!(matches!(cli.command, Command::Churn { iterations: 100 }));
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["mlir-capi", "demo", "--generic", "--lib", "custom"]).unwrap();
        assert_eq!(cli.lib.as_deref(), Some(std::ffi::OsStr::new("custom")));
        assert!(matches!(cli.command, Command::Demo { generic: true }));
    }

    #[test]
    fn parse_attr_requires_text() {
        assert!(Cli::try_parse_from(["mlir-capi", "parse-attr"]).is_err());
    }
}
