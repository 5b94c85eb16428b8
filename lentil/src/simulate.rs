//! Synthetic corpora drawn from the LDA generative model.
//!
//! ```text
//! phi[,k]   ~ Dirichlet(beta)         k = 1..K
//! theta[d,] ~ Dirichlet(alpha)        d = 1..D
//! N_d       ~ Poisson(doc_length)
//! z         ~ Categorical(theta[d,])  for each of the N_d tokens
//! w         ~ Categorical(phi[,z])
//! ```

use crate::corpus::{Corpus, WordCount};
use crate::estimate::Mat;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{weighted::WeightedIndex, Distribution, Gamma, Poisson};

/// Sizes and priors of a simulated corpus
#[derive(Debug, Clone)]
pub struct SimArgs {
    /// Number of documents
    pub docs: usize,
    /// Vocabulary size
    pub vocab: usize,
    /// Number of topics
    pub topics: usize,
    /// Mean document length
    pub doc_length: f64,
    /// Document-topic Dirichlet parameter
    pub alpha: f64,
    /// Topic-word Dirichlet parameter
    pub beta: f64,
    /// Random seed
    pub rseed: u64,
}

/// A simulated corpus with the parameters that generated it
pub struct SimOut {
    /// Documents with ids `0..docs`
    pub corpus: Corpus,
    /// True V×K word-topic distribution
    pub phi: Mat,
    /// True D×K document-topic distribution
    pub theta: Mat,
}

/// Draw a corpus from the LDA generative model
pub fn generate_lda_corpus(args: &SimArgs) -> anyhow::Result<SimOut> {
    anyhow::ensure!(args.docs > 0, "need at least one document");
    anyhow::ensure!(args.vocab > 0, "need at least one word");
    anyhow::ensure!(args.topics > 0, "need at least one topic");
    anyhow::ensure!(args.doc_length > 0.0, "mean document length must be > 0");

    let mut rng = SmallRng::seed_from_u64(args.rseed);

    // 1. topic-word distributions, one column per topic
    let rgamma_beta = Gamma::new(args.beta, 1.0)?;
    let mut phi = Mat::from_fn(args.vocab, args.topics, |_, _| {
        rgamma_beta.sample(&mut rng).max(f64::MIN_POSITIVE)
    });
    for mut col in phi.column_iter_mut() {
        let denom = col.sum();
        col /= denom;
    }

    // 2. document-topic proportions, one row per document
    let rgamma_alpha = Gamma::new(args.alpha, 1.0)?;
    let mut theta = Mat::from_fn(args.docs, args.topics, |_, _| {
        rgamma_alpha.sample(&mut rng).max(f64::MIN_POSITIVE)
    });
    for mut row in theta.row_iter_mut() {
        let denom = row.sum();
        row /= denom;
    }

    // 3. tokens
    let word_dists = phi
        .column_iter()
        .map(|col| WeightedIndex::new(col.iter().copied()))
        .collect::<Result<Vec<_>, _>>()?;

    let rpois = Poisson::new(args.doc_length)?;

    let mut corpus = Corpus::new();
    corpus.reserve_vocab(args.vocab);

    let mut counts = vec![0_u32; args.vocab];

    for d in 0..args.docs {
        let topic_dist = WeightedIndex::new(theta.row(d).iter().copied())?;
        let len = (rpois.sample(&mut rng) as usize).max(1);

        counts.fill(0);
        for _ in 0..len {
            let z = topic_dist.sample(&mut rng);
            let w = word_dists[z].sample(&mut rng);
            counts[w] += 1;
        }

        let word_counts = counts
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(word, &count)| WordCount { word, count })
            .collect();

        corpus.add_doc(d as u32, word_counts);
    }

    info!(
        "simulated {} documents, {} tokens over {} words and {} topics",
        corpus.num_docs(),
        corpus.num_tokens(),
        corpus.vocab_size(),
        args.topics
    );

    Ok(SimOut { corpus, phi, theta })
}
