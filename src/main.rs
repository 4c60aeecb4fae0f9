//! distcheck CLI
//!
//! Entry point for the `distcheck` command-line tool.

use clap::{ArgAction, Parser, Subcommand};
use distcheck::config::DEFAULT_CONFIG_FILE;
use distcheck::{logging, ArchiveLoader, Checker, EffectiveConfig, GlobLocator};
use distcheck_render::RendererRegistry;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "distcheck")]
#[command(about = "Check Python distributions before upload", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that long descriptions will render on the package index
    Check {
        /// Fail on warnings
        #[arg(long)]
        strict: bool,

        /// Print a JSON summary after the report lines
        #[arg(long)]
        json: bool,

        /// Path to config file (default: ./distcheck.toml if present)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Increase log verbosity (-v info, -vv debug)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,

        /// Distribution files or glob patterns to check
        #[arg(required = true)]
        dists: Vec<String>,
    },

    /// Print the effective configuration with provenance
    Config {
        /// Path to config file (default: ./distcheck.toml if present)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            strict,
            json,
            config,
            verbose,
            dists,
        } => {
            logging::init(verbose);
            run_check(strict, json, config, &dists);
        }
        Commands::Config { config } => {
            run_config(config);
        }
    }
}

/// Exit code for a locator, metadata, config or output error.
const EXIT_RUN_ERROR: i32 = 2;

fn run_check(strict: bool, json: bool, config_path: Option<PathBuf>, dists: &[String]) {
    let config = match load_config(config_path, strict_override(strict)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(EXIT_RUN_ERROR);
        }
    };
    let settings = config.settings();

    let checker = Checker::new(&GlobLocator, &ArchiveLoader, RendererRegistry::global())
        .with_index_name(settings.index_name.clone())
        .with_skip_signatures(settings.skip_signatures);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = match checker.run(dists, settings.strict, &mut out) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_RUN_ERROR);
        }
    };

    if json {
        match summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_RUN_ERROR);
            }
        }
    }

    process::exit(exit_code(summary.failed));
}

/// `--strict` can only turn strict mode on; without it the file value holds.
fn strict_override(strict: bool) -> Option<serde_json::Value> {
    strict.then(|| serde_json::json!({ "strict": true }))
}

fn exit_code(failed: bool) -> i32 {
    if failed {
        1
    } else {
        0
    }
}

fn run_config(config_path: Option<PathBuf>) {
    let config = match load_config(config_path, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(EXIT_RUN_ERROR);
        }
    };

    match config.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(EXIT_RUN_ERROR);
        }
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(
    config_path: Option<PathBuf>,
    cli_overrides: Option<serde_json::Value>,
) -> Result<EffectiveConfig, distcheck::ConfigError> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let file = match config_path {
        Some(path) => Some(path),
        None if default_path.exists() => Some(default_path.to_path_buf()),
        None => None,
    };
    EffectiveConfig::build(file.as_deref(), cli_overrides)
}
