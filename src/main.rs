//! genny CLI
//!
//! Usage:
//!   genny [OPTIONS] gen "<typesets>"
//!
//! Options:
//!   --in <FILE>        Template file (reads from stdin if not provided)
//!   --out <FILE>       Output file (writes to stdout if not provided)
//!   --pkg <NAME>       Package name for the generated file
//!   -c, --config <FILE> Catalog overriding the built-in tables (TOML format)
//!   --imports <MODE>   prune, goimports or none
//!   -v, --verbose      More log output (repeatable)
//!   -h, --help         Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use genny::{
    generate_with_config, parse_typesets, Catalog, CommandFixer, GenerateConfig, GenerateError,
    ImportFixer, Passthrough, PruneImports,
};

const EXIT_INVALID_ARGS: i32 = 1;
const EXIT_INVALID_TYPESET: i32 = 2;
const EXIT_STDIN_FAILED: i32 = 3;
const EXIT_GENERATE_FAILED: i32 = 4;
const EXIT_INPUT_UNREADABLE: i32 = 6;
const EXIT_OUTPUT_FAILED: i32 = 7;

#[derive(Parser)]
#[command(name = "genny")]
#[command(about = "Generate type-specific Go code from generic templates")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    #[arg(long = "in", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Package name for the generated file
    #[arg(long, value_name = "NAME")]
    pkg: Option<String>,

    /// Catalog file overriding the built-in tables (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How imports of the generated file are normalized
    #[arg(long, value_enum, default_value_t = ImportMode::Prune)]
    imports: ImportMode,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate specific code for every TypeSet in the expression
    Gen {
        /// Typesets, e.g. "KeyType=string,int ValueType=BUILTINS"
        typesets: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ImportMode {
    /// Built-in pruning of unused and adding of well-known imports
    Prune,
    /// Pipe the output through goimports
    Goimports,
    /// Leave imports as merged
    None,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(EXIT_INVALID_ARGS);
        }
    };

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let Command::Gen { typesets: expr } = &cli.command;
    let typesets = match parse_typesets(expr) {
        Ok(t) => t,
        Err(e) => {
            eprint!("{}", e.format(expr));
            if !matches!(e, genny::TypeSetError::Syntax { .. }) {
                eprintln!();
            }
            std::process::exit(EXIT_INVALID_TYPESET);
        }
    };

    // Load catalog
    let catalog = match &cli.config {
        Some(path) => match Catalog::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading catalog '{}': {}", path.display(), e);
                std::process::exit(EXIT_INVALID_ARGS);
            }
        },
        None => Catalog::default(),
    };

    // Read template
    let (filename, source) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (path.display().to_string(), content),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(EXIT_INPUT_UNREADABLE);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => ("stdin".to_string(), buffer),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(EXIT_STDIN_FAILED);
                }
            }
        }
    };

    let fixer: Box<dyn ImportFixer> = match cli.imports {
        ImportMode::Prune => Box::new(PruneImports::new(&catalog)),
        ImportMode::Goimports => Box::new(CommandFixer::goimports()),
        ImportMode::None => Box::new(Passthrough),
    };

    let mut config = GenerateConfig::new().with_catalog(catalog);
    if let Some(pkg) = &cli.pkg {
        config = config.with_package(pkg.as_str());
    }

    log::info!("{}: generating {} variant(s)", filename, typesets.len());
    let output = match generate_with_config(&filename, &source, &typesets, &config, fixer.as_ref()) {
        Ok(out) => out,
        Err(GenerateError::Source(e)) => {
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(EXIT_GENERATE_FAILED);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_GENERATE_FAILED);
        }
    };

    match &cli.out {
        Some(path) => {
            if let Err(e) = write_output(path, &output) {
                eprintln!("Error writing file '{}': {}", path.display(), e);
                std::process::exit(EXIT_OUTPUT_FAILED);
            }
        }
        None => print!("{}", output),
    }
}

fn write_output(path: &Path, output: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, output)
}
