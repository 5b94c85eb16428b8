mod corpus_stat;
mod fit_lda;
mod sim_corpus;

use corpus_stat::*;
use fit_lda::*;
use sim_corpus::*;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lentil")]
#[command(about = "Latent Dirichlet Allocation by collapsed Gibbs sampling")]
struct Cli {
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit an LDA topic model to a bag-of-words corpus
    Fit(FitLdaArgs),
    /// Simulate a corpus from the LDA generative model
    Simulate(SimCorpusArgs),
    /// Print corpus summary statistics
    Stat(CorpusStatArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Fit(args) => {
            fit_lda(args)?;
        }
        Commands::Simulate(args) => {
            sim_corpus(args)?;
        }
        Commands::Stat(args) => {
            corpus_stat(args)?;
        }
    }

    Ok(())
}
