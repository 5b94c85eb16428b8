//! LDA model: configuration, the sampler state machine and queries.

use crate::corpus::Corpus;
use crate::errors::{config_error, Result};
use crate::estimate::{self, Mat};
use crate::gibbs::{GibbsSampler, Hyperparameters};
use crate::stop::{NeverStop, StopSignal};
use crate::sufficient_stats::SufficientStats;

use indicatif::{ProgressBar, ProgressDrawTarget};
use log::info;
use matrix_util::count_table::{CountMatrix, DenseCounts};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Training configuration
#[derive(Debug, Clone)]
pub struct LdaConfig {
    /// Number of topics (K > 0)
    pub num_topics: usize,
    /// Document-topic Dirichlet prior (> 0)
    pub alpha: f64,
    /// Topic-word Dirichlet prior (> 0)
    pub beta: f64,
    /// Seed of the one random generator used for the whole run
    pub seed: u64,
    /// Record the log-likelihood every this many sweeps (0 = never)
    pub log_every: usize,
    /// Verify every count invariant whenever the log-likelihood is recorded
    pub check_invariants: bool,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for LdaConfig {
    fn default() -> Self {
        LdaConfig {
            num_topics: 10,
            alpha: 0.1,
            beta: 0.01,
            seed: 42,
            log_every: 10,
            check_invariants: false,
            show_progress: false,
        }
    }
}

/// Life cycle of the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Counts allocated and zeroed
    Uninitialized,
    /// Every token holds a uniformly drawn topic
    Initialized,
    /// Inside [`Lda::run`]
    Sampling,
    /// The last run ended; another run continues from here
    Stopped,
}

/// Result of one call to [`Lda::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Complete sweeps performed
    pub sweeps: usize,
    /// Token moves across all sweeps, including a partial last sweep
    pub moved: usize,
    /// True if a stop signal ended the run before its budget
    pub interrupted: bool,
}

/// Latent Dirichlet Allocation trained by collapsed Gibbs sampling.
///
/// `W` selects the word-topic count storage.
pub struct Lda<W: CountMatrix = DenseCounts> {
    corpus: Corpus,
    config: LdaConfig,
    prior: Hyperparameters,
    stats: SufficientStats<W>,
    sampler: GibbsSampler,
    state: SamplerState,
    sweeps_done: usize,
    llik_trace: Vec<(usize, f64)>,
    /// The last trace entry describes the current assignments
    trace_current: bool,
}

impl Lda {
    /// A model with dense word-topic counts
    pub fn new(corpus: Corpus, config: LdaConfig) -> Result<Self> {
        Self::with_storage(corpus, config)
    }
}

impl<W: CountMatrix> Lda<W> {
    /// A model with word-topic counts stored as `W`
    ///
    /// Fails if K = 0, alpha or beta is not a positive finite number, or
    /// the corpus has no word, no document or no token.
    pub fn with_storage(corpus: Corpus, config: LdaConfig) -> Result<Self> {
        if config.num_topics == 0 {
            return Err(config_error("number of topics must be > 0"));
        }
        if !(config.alpha.is_finite() && config.alpha > 0.0) {
            return Err(config_error(format!("alpha must be > 0, got {}", config.alpha)));
        }
        if !(config.beta.is_finite() && config.beta > 0.0) {
            return Err(config_error(format!("beta must be > 0, got {}", config.beta)));
        }
        if corpus.vocab_size() == 0 {
            return Err(config_error("empty vocabulary"));
        }
        if corpus.num_docs() == 0 {
            return Err(config_error("no documents"));
        }
        if corpus.num_tokens() == 0 {
            return Err(config_error("the corpus has no word occurrence"));
        }

        let stats = SufficientStats::new(config.num_topics, corpus.vocab_size(), corpus.num_docs());
        let sampler = GibbsSampler::new(SmallRng::seed_from_u64(config.seed));
        let prior = Hyperparameters {
            alpha: config.alpha,
            beta: config.beta,
        };

        Ok(Lda {
            corpus,
            config,
            prior,
            stats,
            sampler,
            state: SamplerState::Uninitialized,
            sweeps_done: 0,
            llik_trace: vec![],
            trace_current: false,
        })
    }

    /// Draw the initial random topic of every token; no-op once done
    pub fn initialize(&mut self) {
        if self.state != SamplerState::Uninitialized {
            return;
        }
        self.sampler.initialize(&self.corpus, &mut self.stats);
        self.trace_current = false;
        self.state = SamplerState::Initialized;
        info!(
            "initialized {} tokens in {} documents over {} topics",
            self.stats.num_assigned(),
            self.stats.d,
            self.stats.k
        );
    }

    /// Initialize if needed, then run `iterations` sweeps
    pub fn run(&mut self, iterations: usize) -> RunSummary {
        self.run_with_stop(iterations, &NeverStop)
    }

    /// Like [`Self::run`], polling `stop` between documents and sweeps
    pub fn run_with_stop<S>(&mut self, iterations: usize, stop: &S) -> RunSummary
    where
        S: StopSignal + ?Sized,
    {
        self.initialize();
        self.state = SamplerState::Sampling;

        let pb = ProgressBar::new(iterations as u64);
        if !self.config.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        let mut summary = RunSummary::default();

        for _ in 0..iterations {
            if stop.should_stop() {
                summary.interrupted = true;
                break;
            }

            if self.config.log_every > 0 && self.sweeps_done % self.config.log_every == 0 {
                self.record_likelihood();
            }

            let out = self
                .sampler
                .sweep(&self.corpus, &mut self.stats, &self.prior, stop);
            summary.moved += out.moved;
            if out.moved > 0 {
                self.trace_current = false;
            }

            if !out.completed {
                summary.interrupted = true;
                break;
            }

            self.sweeps_done += 1;
            self.trace_current = false;
            summary.sweeps += 1;
            pb.inc(1);
        }
        pb.finish_and_clear();

        if self.config.log_every > 0 {
            self.record_likelihood();
        }

        if summary.interrupted {
            info!(
                "stopped early after {} of {} sweeps",
                summary.sweeps, iterations
            );
        }

        self.state = SamplerState::Stopped;
        summary
    }

    fn record_likelihood(&mut self) {
        if self.trace_current {
            return;
        }
        let llik = self.likelihood();
        info!("iter {:5}, likelihood {:.4}", self.sweeps_done, llik);
        self.llik_trace.push((self.sweeps_done, llik));
        self.trace_current = true;

        if self.config.check_invariants {
            if let Err(e) = self.stats.check_invariants(&self.corpus) {
                panic!(
                    "invariant violation after {} sweeps: {:#}",
                    self.sweeps_done, e
                );
            }
        }
    }

    /// Word-topic distribution, V×K
    pub fn phi(&self) -> Mat {
        estimate::phi(&self.stats, self.prior.beta)
    }

    /// Document-topic distribution, D×K, rows in [`Corpus::doc_ids`] order
    pub fn theta(&self) -> Mat {
        estimate::theta(&self.stats, self.prior.alpha)
    }

    /// Joint log-likelihood of the corpus under the current estimates
    pub fn likelihood(&self) -> f64 {
        estimate::log_likelihood(&self.corpus, &self.phi(), &self.theta())
    }

    /// Per-token perplexity under the current estimates
    pub fn perplexity(&self) -> f64 {
        estimate::perplexity(self.likelihood(), self.corpus.num_tokens())
    }

    /// The `n` most probable words of every topic
    pub fn top_words(&self, n: usize) -> Vec<Vec<(usize, f64)>> {
        estimate::top_words(&self.phi(), n)
    }

    /// `(sweeps done, log-likelihood)` recorded so far
    ///
    /// A sweep cut short by a stop signal leaves the sweep count as is,
    /// so the same count may appear twice with different values.
    pub fn likelihood_trace(&self) -> &[(usize, f64)] {
        &self.llik_trace
    }

    /// Topic of every token, per document
    pub fn assignments(&self) -> &[Vec<usize>] {
        self.stats.assignments()
    }

    /// The sufficient statistics
    pub fn stats(&self) -> &SufficientStats<W> {
        &self.stats
    }

    /// The training corpus
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The configuration the model was built with
    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    /// Current life-cycle state
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Complete sweeps over all runs
    pub fn sweeps_done(&self) -> usize {
        self.sweeps_done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::WordCount;

    fn corpus() -> Corpus {
        let mut corpus = Corpus::new();
        corpus.add_doc(0, vec![WordCount { word: 0, count: 2 }]);
        corpus.add_doc(1, vec![WordCount { word: 1, count: 3 }]);
        corpus
    }

    #[test]
    fn test_config_rejected() {
        let bad = [
            LdaConfig {
                num_topics: 0,
                ..Default::default()
            },
            LdaConfig {
                alpha: 0.0,
                ..Default::default()
            },
            LdaConfig {
                beta: -1.0,
                ..Default::default()
            },
            LdaConfig {
                alpha: f64::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                Lda::new(corpus(), config),
                Err(crate::errors::LdaError::Config(_))
            ));
        }
    }

    #[test]
    fn test_empty_corpus_rejected() {
        assert!(Lda::new(Corpus::new(), LdaConfig::default()).is_err());

        let mut no_tokens = Corpus::new();
        no_tokens.add_doc(3, vec![WordCount { word: 2, count: 0 }]);
        assert!(Lda::new(no_tokens, LdaConfig::default()).is_err());
    }

    #[test]
    fn test_state_machine() {
        let mut lda = Lda::new(corpus(), LdaConfig::default()).unwrap();
        assert_eq!(lda.state(), SamplerState::Uninitialized);
        lda.initialize();
        assert_eq!(lda.state(), SamplerState::Initialized);
        lda.initialize();
        assert_eq!(lda.stats().num_assigned(), 5);

        let summary = lda.run(3);
        assert_eq!(summary.sweeps, 3);
        assert!(!summary.interrupted);
        assert_eq!(lda.state(), SamplerState::Stopped);

        lda.run(2);
        assert_eq!(lda.sweeps_done(), 5);
        assert_eq!(lda.state(), SamplerState::Stopped);
    }

    #[test]
    fn test_likelihood_trace() {
        let config = LdaConfig {
            num_topics: 2,
            log_every: 2,
            check_invariants: true,
            ..Default::default()
        };
        let mut lda = Lda::new(corpus(), config).unwrap();
        lda.run(5);
        let iters: Vec<usize> = lda.likelihood_trace().iter().map(|&(i, _)| i).collect();
        assert_eq!(iters, vec![0, 2, 4, 5]);
        assert!(lda.likelihood_trace().iter().all(|&(_, l)| l.is_finite()));
    }
}
