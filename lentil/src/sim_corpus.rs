use clap::Parser;
use lentil::simulate::{generate_lda_corpus, SimArgs, SimOut};
use log::info;
use matrix_util::common_io::mkdir;
use matrix_util::dmatrix_io::IoOps;

#[derive(Parser, Debug, Clone)]
pub struct SimCorpusArgs {
    #[arg(
        long,
        short,
        required = true,
        help = "Output corpus file",
        long_help = "Output corpus file (`.gz` for compressed output).\n\
                     The true parameters go to FILE.phi.tsv.gz (V x K)\n\
                     and FILE.theta.tsv.gz (D x K)."
    )]
    out: Box<str>,

    #[arg(long, default_value_t = 100, help = "Number of documents")]
    docs: usize,

    #[arg(long, default_value_t = 200, help = "Vocabulary size")]
    vocab: usize,

    #[arg(short = 'k', long, default_value_t = 5, help = "Number of topics")]
    num_topics: usize,

    #[arg(
        long,
        default_value_t = 100.0,
        help = "Mean document length (Poisson)"
    )]
    doc_length: f64,

    #[arg(long, default_value_t = 0.1, help = "Document-topic Dirichlet parameter")]
    alpha: f64,

    #[arg(long, default_value_t = 0.01, help = "Topic-word Dirichlet parameter")]
    beta: f64,

    #[arg(long, default_value_t = 42, help = "Random seed")]
    seed: u64,
}

pub fn sim_corpus(args: &SimCorpusArgs) -> anyhow::Result<()> {
    mkdir(&args.out)?;

    let SimOut { corpus, phi, theta } = generate_lda_corpus(&SimArgs {
        docs: args.docs,
        vocab: args.vocab,
        topics: args.num_topics,
        doc_length: args.doc_length,
        alpha: args.alpha,
        beta: args.beta,
        rseed: args.seed,
    })?;

    corpus.write(&args.out)?;
    phi.to_tsv(&format!("{}.phi.tsv.gz", args.out))?;
    theta.to_tsv(&format!("{}.theta.tsv.gz", args.out))?;

    info!("wrote {}", args.out);
    Ok(())
}
