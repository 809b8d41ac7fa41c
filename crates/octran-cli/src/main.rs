//! The `octran` command-line front end.
//!
//! - `octran get --path <standardized-path> --target <name> --vendor <name>`
//! - `octran print [--root <path>]`
//!
//! Both subcommands take one or more `--config <file>` flags; the named
//! TOML files are parsed and merged (spec.md §6).

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use octran_config::load_files;
use octran_engine::{SampleResolver, TranslationEngine};

#[derive(Parser)]
#[command(name = "octran", version, about = "SNMP-to-OpenConfig telemetry translation engine")]
struct Cli {
    /// Route structured logs to stderr. Without it logging is suppressed,
    /// so `get`'s stdout stays script-friendly.
    #[arg(long, global = true)]
    log_stderr: bool,

    /// Raise the log level: warn -> info -> debug. Repeatable.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a standardized path for a target and vendor.
    Get {
        #[arg(long)]
        path: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        vendor: String,
        /// TOML config file; may be repeated.
        #[arg(long = "config", required = true)]
        config: Vec<PathBuf>,
    },
    /// Pretty-print the path namespace rooted at `--root` (default: root).
    Print {
        #[arg(long, default_value = "root")]
        root: String,
        #[arg(long = "config", required = true)]
        config: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_stderr, cli.verbose);

    let result = match &cli.command {
        Commands::Get { path, target, vendor, config } => run_get(config, path, target, vendor),
        Commands::Print { root, config } => run_print(config, root),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging(log_stderr: bool, verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("octran={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    if log_stderr {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::sink)).init();
    }
}

fn run_get(config: &[PathBuf], path: &str, target: &str, vendor: &str) -> Result<(), String> {
    let loaded = load_files(config).map_err(|e| e.to_string())?;
    let engine = TranslationEngine::new(loaded.tree, loaded.rules, loaded.vendor_filter, SampleResolver);

    match engine.evaluate(path, target, vendor) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn run_print(config: &[PathBuf], root: &str) -> Result<(), String> {
    let loaded = load_files(config).map_err(|e| e.to_string())?;
    let engine = TranslationEngine::new(loaded.tree, loaded.rules, loaded.vendor_filter, SampleResolver);

    let rendered = engine.tree().print(root).map_err(|e| e.to_string())?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_get_with_repeated_config_flags() {
        let cli = Cli::parse_from([
            "octran",
            "get",
            "--path",
            "/system_up_time",
            "--target",
            "box1",
            "--vendor",
            "cisco",
            "--config",
            "paths.toml",
            "--config",
            "rules.toml",
        ]);
        match cli.command {
            Commands::Get { config, .. } => assert_eq!(config.len(), 2),
            _ => panic!("expected Get"),
        }
    }

    #[test]
    fn cli_parses_print_with_default_root() {
        let cli = Cli::parse_from(["octran", "print", "--config", "paths.toml"]);
        match cli.command {
            Commands::Print { root, .. } => assert_eq!(root, "root"),
            _ => panic!("expected Print"),
        }
    }
}
