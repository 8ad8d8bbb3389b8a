//! `mlir-capi` entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use mlir_capi::dialects::{UPSTREAM_DIALECTS, dialect_namespace, load_dialects};
use mlir_capi::scenarios::{build_verified_add_function, context_churn};
use mlir_capi::support::{attribute_to_string, parse_attribute, parse_type, type_to_string};
use mlir_capi::{Capi, LibraryConfig, OwnedContext, OwnedPrintingFlags, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `mlir_capi=debug`.
const LOG_ENV: &str = "MLIR_CAPI_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.library_config(LibraryConfig::from_env());

    if let Command::Symbols { check: false } = cli.command {
        for symbol in Capi::SYMBOLS {
            println!("{symbol}");
        }
        return Ok(());
    }

    let capi = Capi::load(&config)?;
    match cli.command {
        Command::Symbols { .. } => {
            println!(
                "resolved {} symbols from {}",
                Capi::SYMBOLS.len(),
                capi.path().display()
            );
        }
        Command::Dialects { names } => {
            let context = OwnedContext::with_upstream_dialects(&capi);
            let names: Vec<&str> = if names.is_empty() {
                UPSTREAM_DIALECTS.to_vec()
            } else {
                names.iter().map(String::as_str).collect()
            };
            let dialects = unsafe { load_dialects(&capi, context.raw(), names.iter().copied())? };
            for dialect in dialects {
                println!("{}", unsafe { dialect_namespace(&capi, dialect) });
            }
            println!(
                "{} loaded, {} registered",
                context.loaded_dialect_count(),
                context.registered_dialect_count()
            );
        }
        Command::ParseAttr { text } => {
            let context = OwnedContext::with_upstream_dialects(&capi);
            for source in &text {
                let attr = unsafe { parse_attribute(&capi, context.raw(), source)? };
                println!("{}", unsafe { attribute_to_string(&capi, attr) });
            }
        }
        Command::ParseType { text } => {
            let context = OwnedContext::with_upstream_dialects(&capi);
            for source in &text {
                let ty = unsafe { parse_type(&capi, context.raw(), source)? };
                println!("{}", unsafe { type_to_string(&capi, ty) });
            }
        }
        Command::Churn { iterations } => {
            context_churn(&capi, iterations);
            println!("created and destroyed {iterations} contexts");
        }
        Command::Demo { generic } => {
            let context = OwnedContext::with_upstream_dialects(&capi);
            let module = build_verified_add_function(&context)?;
            if generic {
                let flags = OwnedPrintingFlags::new(&capi).generic_form();
                println!("{}", unsafe { flags.print(module.as_operation()) });
            } else {
                println!("{module}");
            }
        }
    }
    Ok(())
}
