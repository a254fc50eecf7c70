// SPDX-FileCopyrightText: 2026 kpxarc Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! kpxarc - 7-Zip archives protected by passwords that live in KeePassXC.
//!
//! This is the binary entry point.

mod add;
mod delete;
mod deps;
mod extract;
mod setup;
#[cfg(test)]
mod testutil;
mod version;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use kpxarc_config::KpxarcConfig;
use kpxarc_core::KpxarcError;

/// Create, extract and list 7-Zip archives with passwords generated and
/// stored in KeePassXC. Passwords never appear on a command line.
#[derive(Parser, Debug)]
#[command(name = "kpxarc", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). Logs go to stderr.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an archive protected by a new generated password.
    A(add::AddArgs),
    /// Extract an archive using its stored password.
    X(extract::ExtractArgs),
    /// List the contents of an archive using its stored password.
    L(extract::ListArgs),
    /// Delete the KeePassXC entry of an archive (the archive file is kept).
    D(delete::DeleteArgs),
    /// Print version information.
    Version,
}

impl Commands {
    fn operation(&self) -> &'static str {
        match self {
            Self::A(_) => "archive creation",
            Self::X(_) => "extraction",
            Self::L(_) => "listing",
            Self::D(_) => "entry deletion",
            Self::Version => "version",
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        version::print();
        return;
    }

    let loaded = match cli.config.as_deref() {
        Some(path) => kpxarc_config::load_and_validate_path(path),
        None => kpxarc_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            kpxarc_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&log_level(cli.verbose, &config.general.log_level));

    let operation = cli.command.operation();
    if let Err(err) = run(cli.command, &config).await {
        report_error(operation, &err, &config);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &KpxarcConfig) -> Result<(), KpxarcError> {
    deps::check_dependencies(config)?;

    let injector = setup::pty_injector(config);
    let mut store = setup::open_keepass(config)?;
    store.ensure_unlocked()?;

    match command {
        Commands::A(args) => add::run(config, &store, &injector, &args).await,
        Commands::X(args) => extract::run_extract(config, &store, &injector, &args).await,
        Commands::L(args) => extract::run_list(config, &store, &injector, &args).await,
        Commands::D(args) => {
            let stdin = std::io::stdin();
            delete::run(config, &store, &args, stdin.lock(), std::io::stdout()).await
        }
        Commands::Version => {
            version::print();
            Ok(())
        }
    }
}

/// `-v` flags win over the configured level.
fn log_level(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kpxarc={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn report_error(operation: &str, err: &KpxarcError, config: &KpxarcConfig) {
    let prefix = if std::io::stderr().is_terminal() {
        "kpxarc".red().bold().to_string()
    } else {
        "kpxarc".to_string()
    };
    eprintln!("{prefix}: {operation} failed: {err}");

    match err {
        KpxarcError::SecretNotFound { .. } => eprintln!(
            "hint: is the entry in group '{}'? Check general.default_group in kpxarc.toml.",
            config.general.default_group
        ),
        KpxarcError::MissingDependency(missing) => eprint!("{}", deps::install_hints(missing)),
        _ => {}
    }
}

/// Print a success line, green on a terminal.
pub(crate) fn print_success(message: &str) {
    if std::io::stdout().is_terminal() {
        println!("{}", message.green());
    } else {
        println!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_flags_and_passthrough() {
        let cli = Cli::parse_from([
            "kpxarc", "a", "--fast", "--volume", "100m", "backup", "docs", "-sfx",
        ]);
        match cli.command {
            Commands::A(args) => {
                assert_eq!(args.archive, "backup");
                assert!(args.fast);
                assert_eq!(args.volume.as_deref(), Some("100m"));
                assert_eq!(args.items, vec!["docs", "-sfx"]);
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn add_requires_files() {
        assert!(Cli::try_parse_from(["kpxarc", "a", "backup.7z"]).is_err());
    }

    #[test]
    fn parses_extract_output_dir() {
        let cli = Cli::parse_from(["kpxarc", "x", "backup.7z.001", "-o", "/tmp/out"]);
        match cli.command {
            Commands::X(args) => {
                assert_eq!(args.archive, "backup.7z.001");
                assert_eq!(args.output.as_deref(), Some(std::path::Path::new("/tmp/out")));
            }
            other => panic!("expected extract, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kpxarc", "l", "a.7z", "--config", "/etc/k.toml", "-vv"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/k.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn delete_force_flag() {
        let cli = Cli::parse_from(["kpxarc", "d", "-f", "a.7z"]);
        match cli.command {
            Commands::D(args) => assert!(args.force),
            other => panic!("expected delete, got {other:?}"),
        }
    }

    #[test]
    fn verbose_overrides_configured_level() {
        assert_eq!(log_level(0, "WARN"), "warn");
        assert_eq!(log_level(1, "warn"), "debug");
        assert_eq!(log_level(3, "warn"), "trace");
    }

    #[test]
    fn operations_are_named() {
        let cli = Cli::parse_from(["kpxarc", "x", "a.7z"]);
        assert_eq!(cli.command.operation(), "extraction");
    }
}
