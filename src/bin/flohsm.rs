//! Command-line interface for flohsm
//! Compiles a state machine descriptor and prints the validated model.
//!
//! Usage:
//!   flohsm `<path>` [--config `<toml>`] [--format json|yaml|summary] [--strict]
//!
//! Diagnostics go to stderr, the model to stdout. The exit status is 1 whenever the
//! generation gate rejects the descriptor.

use clap::{Arg, ArgAction, ArgMatches, Command};
use flohsm::flohsm::config::{FloHsmConfig, Loader, OutputFormat};
use flohsm::flohsm::error::FloHsmError;
use flohsm::flohsm::formats::render;
use flohsm::flohsm::pipeline::compile_file;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("flohsm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate hierarchical state machine descriptors")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the descriptor file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Model output format: json, yaml or summary"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Treat warnings as blocking")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    handle_compile_command(path, &config);
}

fn load_config(matches: &ArgMatches) -> Result<FloHsmConfig, FloHsmError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        let format: OutputFormat = format.parse()?;
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if matches.get_flag("strict") {
        loader = loader.set_override("generation.block_on_warnings", true)?;
    }
    Ok(loader.build()?)
}

/// Compile, report and print the model when generation may proceed
fn handle_compile_command(path: &str, config: &FloHsmConfig) {
    let compilation = compile_file(path, config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    for diagnostic in &compilation.diagnostics {
        eprintln!("{}: {}", path, diagnostic);
    }

    let model = match &compilation.model {
        Some(model) if compilation.may_generate(&config.generation) => model,
        _ => {
            eprintln!(
                "{}: {} error(s), {} warning(s); no model emitted",
                path,
                compilation.diagnostics.error_count(),
                compilation.diagnostics.warning_count()
            );
            std::process::exit(1);
        }
    };

    match render(model, config.output.format) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
