mod args;
mod commands;
mod printing;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use args::{InitArgs, RunArgs, ValidateArgs};
use commands::{init, run, validate};

/// Phylevo: maximum-likelihood phylogeny search with a genetic algorithm
///
/// Evolves a population of rooted binary trees over an alignment of
/// nucleotide sequences and reports the best-scoring tree in Newick format.
#[derive(Parser, Debug)]
#[command(name = "phylevo")]
#[command(author, version, about = "Searches for maximum-likelihood phylogenies", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    ///
    /// RUST_LOG takes precedence when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a configuration file with default or given parameters.
    ///
    /// The layout follows the extension: JSON for `.json`, the
    /// `key=value,type` properties layout otherwise.
    Init(Box<InitArgs>),

    /// Check an alignment and a configuration without searching.
    Validate(ValidateArgs),

    /// Run the search and print the best tree.
    Run(Box<RunArgs>),
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Init(args) => init::init_config(&args)?,
        Commands::Validate(args) => validate::validate_inputs(&args)?,
        Commands::Run(args) => run::run_search(&args)?,
    }

    Ok(())
}
