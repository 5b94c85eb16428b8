use clap::Parser;
use lentil::estimate::Mat;
use lentil::{Corpus, Deadline, Lda, LdaConfig, NeverStop, RunSummary, StopSignal};
use log::info;
use matrix_util::common_io::{mkdir, write_lines};
use matrix_util::count_table::{CountMatrix, SparseCounts};
use matrix_util::dmatrix_io::IoOps;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
pub struct FitLdaArgs {
    #[arg(
        long,
        required = true,
        help = "Corpus file (`.gz` allowed)",
        long_help = "Corpus file, one document per line:\n\
                     <docId> <wordId>:<count> <wordId>:<count> ...\n\
                     Gzipped input is detected by the `.gz` extension."
    )]
    corpus: Box<str>,

    #[arg(long, short, required = true, help = "Output file prefix")]
    out: Box<str>,

    #[arg(short = 'k', long, default_value_t = 10, help = "Number of topics")]
    num_topics: usize,

    #[arg(
        long,
        default_value_t = 0.1,
        help = "Dirichlet prior of document-topic proportions"
    )]
    alpha: f64,

    #[arg(
        long,
        default_value_t = 0.01,
        help = "Dirichlet prior of topic-word distributions"
    )]
    beta: f64,

    #[arg(long, default_value_t = 1000, help = "Number of Gibbs sweeps")]
    iter: usize,

    #[arg(long, default_value_t = 42, help = "Random seed")]
    seed: u64,

    #[arg(
        long,
        default_value_t = 10,
        help = "Record the log-likelihood every N sweeps (0 = never)"
    )]
    log_every: usize,

    #[arg(
        long,
        help = "Stop sampling after this many seconds",
        long_help = "Wall-clock budget in seconds. Sampling stops at the next\n\
                     document boundary once the budget is spent, and the\n\
                     estimates of the current state are written as usual."
    )]
    max_seconds: Option<f64>,

    #[arg(
        long,
        default_value_t = false,
        help = "Store word-topic counts sparsely",
        long_help = "Keep word-topic counts in hash maps instead of a dense\n\
                     V x K table. Worth it for large vocabularies with many\n\
                     topics; the result is identical for the same seed."
    )]
    sparse: bool,

    #[arg(
        long,
        default_value_t = 10,
        help = "Number of top words reported per topic"
    )]
    top_words: usize,

    #[arg(
        long,
        default_value_t = false,
        help = "Verify count invariants whenever the log-likelihood is recorded"
    )]
    check: bool,

    #[arg(long, default_value_t = false, help = "Show a progress bar")]
    progress: bool,
}

/// Train LDA on a corpus file and write the estimates.
///
/// 1. Load the corpus
/// 2. Initialize and run the Gibbs sampler
/// 3. Write Phi, Theta, document ids, log-likelihood trace and top words
pub fn fit_lda(args: &FitLdaArgs) -> anyhow::Result<()> {
    let corpus = Corpus::load(&args.corpus)?;
    mkdir(&args.out)?;

    let config = LdaConfig {
        num_topics: args.num_topics,
        alpha: args.alpha,
        beta: args.beta,
        seed: args.seed,
        log_every: args.log_every,
        check_invariants: args.check,
        show_progress: args.progress,
    };

    let stop = time_budget(args.max_seconds)?;

    if args.sparse {
        let lda = Lda::<SparseCounts>::with_storage(corpus, config)?;
        train_and_write(lda, &*stop, args)
    } else {
        let lda = Lda::new(corpus, config)?;
        train_and_write(lda, &*stop, args)
    }
}

/// Stop signal for `--max-seconds`; budgets too long for a `Duration` never expire
fn time_budget(max_seconds: Option<f64>) -> anyhow::Result<Box<dyn StopSignal>> {
    let Some(secs) = max_seconds else {
        return Ok(Box::new(NeverStop));
    };
    anyhow::ensure!(
        secs >= 0.0 && !secs.is_nan(),
        "--max-seconds must be a non-negative number, got {}",
        secs
    );
    match Duration::try_from_secs_f64(secs) {
        Ok(budget) => Ok(Box::new(Deadline::after(budget))),
        Err(_) => {
            info!("time budget of {} seconds is unbounded", secs);
            Ok(Box::new(NeverStop))
        }
    }
}

fn train_and_write<W: CountMatrix>(
    mut lda: Lda<W>,
    stop: &dyn StopSignal,
    args: &FitLdaArgs,
) -> anyhow::Result<()> {
    let RunSummary {
        sweeps,
        moved,
        interrupted,
    } = lda.run_with_stop(args.iter, stop);

    info!(
        "{} sweeps, {} topic moves{}",
        sweeps,
        moved,
        if interrupted { " (time budget spent)" } else { "" }
    );
    info!("final log-likelihood {:.4}", lda.likelihood());
    info!("perplexity {:.4}", lda.perplexity());

    write_estimates(&lda, args)?;
    Ok(())
}

fn write_estimates<W: CountMatrix>(lda: &Lda<W>, args: &FitLdaArgs) -> anyhow::Result<()> {
    let prefix = &args.out;

    let phi: Mat = lda.phi();
    phi.to_tsv(&format!("{}.phi.tsv.gz", prefix))?;

    let theta: Mat = lda.theta();
    theta.to_tsv(&format!("{}.theta.tsv.gz", prefix))?;

    let doc_ids: Vec<Box<str>> = lda
        .corpus()
        .doc_ids()
        .into_iter()
        .map(|id| id.to_string().into_boxed_str())
        .collect();
    write_lines(&doc_ids, &format!("{}.docs.gz", prefix))?;

    let trace: Vec<Box<str>> = lda
        .likelihood_trace()
        .iter()
        .map(|(iter, llik)| format!("{}\t{}", iter, llik).into_boxed_str())
        .collect();
    write_lines(&trace, &format!("{}.loglik.tsv", prefix))?;

    let mut top: Vec<Box<str>> = vec![];
    for (k, words) in lda.top_words(args.top_words).iter().enumerate() {
        for (rank, (word, prob)) in words.iter().enumerate() {
            top.push(format!("{}\t{}\t{}\t{}", k, rank + 1, word, prob).into_boxed_str());
        }
    }
    write_lines(&top, &format!("{}.top_words.tsv", prefix))?;

    info!("wrote the estimates to {}.*", prefix);
    Ok(())
}
