//! tshare CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tshare::cli::commands;
use tshare::cli::{Cli, Commands, OutputFormat};
use tshare::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR --format json OR non-TTY stdout.
    // `redact` is a filter, so it only switches to JSON when asked.
    let explicit_json = cli.json || cli.format == OutputFormat::Json;
    let json = match cli.command {
        Commands::Redact { .. } => explicit_json,
        _ => explicit_json || !std::io::IsTerminal::is_terminal(&std::io::stdout()),
    };

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let store = cli.store.as_deref();
    match &cli.command {
        Commands::Export(args) => commands::export::execute(args, store, json),
        Commands::Import(args) => commands::import::execute(args, store, json),
        Commands::Redact { base_path } => commands::redact::execute(base_path.as_deref(), json),
        Commands::Version => commands::version::execute(json),

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
