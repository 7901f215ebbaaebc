use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::*;
use helixql_core::logging::init_tracing;
use helixql_core::load_core_config;

mod commands;

use commands::{CliError, GrammarSource};

#[derive(Parser)]
#[command(name = "helixql")]
#[command(about = "HelixQL grammar tooling - inspect the grammar and parse HelixQL files", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "HELIXQL_LOG")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a grammar artifact and report whether it is usable
    Check(CheckArgs),
    /// Print a summary of a grammar's tables
    Info(InfoArgs),
    /// List the node kinds of the compiled parser
    Kinds(KindsArgs),
    /// Parse a HelixQL file and print its syntax tree
    Parse(ParseArgs),
    /// Show version information
    Version,
}

#[derive(Args)]
struct GrammarArgs {
    /// Artifact file or grammar directory (defaults to the embedded grammar)
    #[arg(short, long)]
    grammar: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    grammar: GrammarArgs,
    /// Expected SHA-256 of the artifact, hex encoded
    #[arg(long)]
    sha256: Option<String>,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    grammar: GrammarArgs,
    /// Emit the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args)]
struct KindsArgs {
    /// Only list named node kinds
    #[arg(long, default_value_t = false)]
    named_only: bool,
}

#[derive(Args)]
struct ParseArgs {
    /// HelixQL source file
    file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "✘".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_core_config()?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Err(err) = init_tracing(Some(&config.log_level)) {
        eprintln!("{} {}", "warning:".yellow(), err);
    }

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Check(args) => {
            let source = GrammarSource::resolve(args.grammar.grammar.as_deref(), &config);
            commands::check(&mut stdout, &source, &config, args.sha256.as_deref())
        }
        Commands::Info(args) => {
            let source = GrammarSource::resolve(args.grammar.grammar.as_deref(), &config);
            commands::info(&mut stdout, &source, &config, args.json)
        }
        Commands::Kinds(args) => commands::kinds(&mut stdout, args.named_only),
        Commands::Parse(args) => commands::parse(&mut stdout, &args.file),
        Commands::Version => {
            writeln!(stdout, "helixql v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(stdout, "Grammar: {}", tree_sitter_helixql::NAME)?;
            writeln!(stdout, "Runtime ABI: {}", tree_sitter::LANGUAGE_VERSION)?;
            Ok(())
        }
    }
}
