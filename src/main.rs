//! scopegrid CLI entry point.

use clap::Parser;
use scopegrid::cli::commands::{self, common::Globals};
use scopegrid::cli::{Cli, Commands, OutputFormat};
use scopegrid::error::Error;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.silent {
        scopegrid::SILENT.store(true, Ordering::Relaxed);
    }
    if cli.quiet {
        scopegrid::QUIET.store(true, Ordering::Relaxed);
    }
    if cli.format == OutputFormat::Csv {
        scopegrid::CSV_OUTPUT.store(true, Ordering::Relaxed);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR --format json OR non-TTY stdout
    let json = cli.json
        || cli.format == OutputFormat::Json
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

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
            2 => EnvFilter::new("debug,rusqlite=info,reqwest=info,hyper_util=info"),
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
    let globals = Globals {
        db: cli.db.clone(),
        config: cli.config.clone(),
        actor: cli.actor.clone(),
        json,
        yes: cli.yes,
    };

    match &cli.command {
        Commands::List(args) => commands::list::execute(args, &globals),
        Commands::Summary { refresh } => commands::list::execute_summary(*refresh, &globals),

        // Rows
        Commands::Add => commands::record::execute_add(&globals),
        Commands::Set { id, field, value } => {
            commands::record::execute_set(id, field, value, &globals)
        }
        Commands::Delete { id } => commands::record::execute_delete(id, &globals),

        // Bulk
        Commands::Import { file } => commands::transfer::execute_import(file, &globals),
        Commands::Export { dir, stdout } => {
            commands::transfer::execute_export(dir.as_deref(), *stdout, &globals)
        }
        Commands::Clear => commands::clear::execute(&globals),
        Commands::Reload => commands::reload::execute(&globals),

        // Info
        Commands::Status => commands::status::execute(&globals),
        Commands::History { limit } => commands::history::execute(*limit, &globals),
        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
