//! Collapsed Gibbs sampler for LDA topic assignments.
//!
//! For each token instance, removes the token from the sufficient
//! statistics, evaluates the unnormalized conditional over all K topics
//!
//! ```text
//! p(z = t | rest) ∝ (alpha + n[d,t]) * (beta + n[w,t]) / (n[t] + V * beta)
//! ```
//!
//! draws a new topic by inverting the cumulative sum, and adds the token
//! back under the drawn topic.
//!
//! Documents are visited in ascending id order and tokens in position
//! order, so a fixed seed reproduces the same chain.

use crate::corpus::Corpus;
use crate::stop::StopSignal;
use crate::sufficient_stats::SufficientStats;
use matrix_util::count_table::CountMatrix;
use rand::rngs::SmallRng;
use rand::Rng;

/// Dirichlet smoothing of the document-topic (alpha) and topic-word (beta) distributions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    /// Document-topic prior
    pub alpha: f64,
    /// Topic-word prior
    pub beta: f64,
}

/// What happened during one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Tokens whose topic changed
    pub moved: usize,
    /// False if a stop signal cut the sweep short between documents
    pub completed: bool,
}

/// Collapsed Gibbs sampler for LDA.
pub struct GibbsSampler {
    rng: SmallRng,
    /// Scratch space for the cumulative conditional weights
    cumsum: Vec<f64>,
}

impl GibbsSampler {
    /// Create a new Gibbs sampler with the given RNG.
    pub fn new(rng: SmallRng) -> Self {
        GibbsSampler {
            rng,
            cumsum: Vec::new(),
        }
    }

    /// Assign every token a topic drawn uniformly from `0..k`.
    ///
    /// `stats` must be freshly allocated (no assignment yet).
    pub fn initialize<W: CountMatrix>(&mut self, corpus: &Corpus, stats: &mut SufficientStats<W>) {
        assert_eq!(
            stats.num_assigned(),
            0,
            "initializing statistics that already hold assignments"
        );
        let k = stats.k;
        for (d, doc) in corpus.documents().iter().enumerate() {
            for &w in doc.tokens() {
                let t = self.rng.random_range(0..k);
                stats.push_token(d, w, t);
            }
        }
    }

    /// One full pass over every token instance.
    ///
    /// The stop signal is polled before each document. A document is
    /// always processed to the end, so the statistics stay consistent
    /// when the sweep is cut short.
    ///
    /// * `corpus` - the documents (same as used for initialization)
    /// * `stats` - sufficient statistics (modified in place)
    /// * `prior` - alpha and beta
    /// * `stop` - external stop signal
    pub fn sweep<W, S>(
        &mut self,
        corpus: &Corpus,
        stats: &mut SufficientStats<W>,
        prior: &Hyperparameters,
        stop: &S,
    ) -> SweepOutcome
    where
        W: CountMatrix,
        S: StopSignal + ?Sized,
    {
        self.cumsum.resize(stats.k, 0.0);
        let vb = stats.v as f64 * prior.beta;

        let mut moved = 0;

        for (d, doc) in corpus.documents().iter().enumerate() {
            if stop.should_stop() {
                return SweepOutcome {
                    moved,
                    completed: false,
                };
            }

            for (pos, &w) in doc.tokens().iter().enumerate() {
                let old_t = stats.take_token(d, pos, w);

                conditional_cumsum(stats, d, w, prior, vb, &mut self.cumsum);
                let new_t = sample_cumulative(&self.cumsum, &mut self.rng);

                stats.put_token(d, pos, w, new_t);

                if new_t != old_t {
                    moved += 1;
                }
            }
        }

        SweepOutcome {
            moved,
            completed: true,
        }
    }
}

/// Cumulative unnormalized conditional of a token with `word` in `doc`,
/// whose own contribution has already been removed from `stats`.
///
/// `cumsum[t] = Σ_{t' <= t} (alpha + n[d,t']) * (beta + n[w,t']) / (n[t'] + V*beta)`
#[inline]
fn conditional_cumsum<W: CountMatrix>(
    stats: &SufficientStats<W>,
    doc: usize,
    word: usize,
    prior: &Hyperparameters,
    vb: f64,
    cumsum: &mut [f64],
) {
    let mut acc = 0.0;
    for (t, c) in cumsum.iter_mut().enumerate() {
        let doc_part = prior.alpha + stats.doc_topic(doc, t) as f64;
        let word_part =
            (prior.beta + stats.word_topic(word, t) as f64) / (stats.topic_total(t) as f64 + vb);
        acc += doc_part * word_part;
        *c = acc;
    }
}

/// Draw `u ~ U[0, cumsum[K-1])` and return the first index with `u < cumsum[t]`.
///
/// With alpha, beta > 0 the total is strictly positive. The last index is
/// only returned by fallthrough when round-off puts `u` on the total.
#[inline]
fn sample_cumulative(cumsum: &[f64], rng: &mut SmallRng) -> usize {
    let last = cumsum.len() - 1;
    let u = rng.random::<f64>() * cumsum[last];
    cumsum.iter().position(|&c| u < c).unwrap_or(last)
}
