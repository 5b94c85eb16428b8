use approx::assert_abs_diff_eq;
use lentil::simulate::{generate_lda_corpus, SimArgs};
use lentil::{Corpus, Deadline, Lda, LdaConfig, SamplerState, StopSignal, WordCount};
use matrix_util::count_table::SparseCounts;
use std::cell::Cell;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

fn config(num_topics: usize, seed: u64) -> LdaConfig {
    LdaConfig {
        num_topics,
        alpha: 0.5,
        beta: 0.1,
        seed,
        log_every: 0,
        ..Default::default()
    }
}

fn small_corpus() -> Corpus {
    let mut corpus = Corpus::new();
    corpus.add_doc(
        0,
        vec![
            WordCount { word: 0, count: 3 },
            WordCount { word: 1, count: 1 },
        ],
    );
    corpus.add_doc(
        1,
        vec![
            WordCount { word: 2, count: 4 },
            WordCount { word: 1, count: 2 },
        ],
    );
    corpus
}

#[test]
fn single_topic_single_word() -> anyhow::Result<()> {
    let mut corpus = Corpus::new();
    corpus.add_doc(4, vec![WordCount { word: 0, count: 17 }]);

    let mut lda = Lda::new(corpus, config(1, 5))?;
    for iters in [0, 1, 10] {
        lda.run(iters);
        let phi = lda.phi();
        let theta = lda.theta();
        assert_eq!(phi.shape(), (1, 1));
        assert_eq!(theta.shape(), (1, 1));
        assert_abs_diff_eq!(phi[(0, 0)], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(theta[(0, 0)], 1.0, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn two_documents_three_words() -> anyhow::Result<()> {
    let mut lda = Lda::new(small_corpus(), config(2, 1))?;
    lda.initialize();

    let assigned: usize = lda.assignments().iter().map(|z| z.len()).sum();
    assert_eq!(assigned, 10);
    assert_eq!(assigned, lda.corpus().num_tokens());

    let llik = lda.likelihood();
    assert!(llik.is_finite());
    assert!(llik < 0.0);
    Ok(())
}

#[test]
fn estimates_are_normalized() -> anyhow::Result<()> {
    let mut lda = Lda::new(small_corpus(), config(3, 2))?;
    lda.run(25);
    lda.stats().check_invariants(lda.corpus())?;

    let phi = lda.phi();
    for k in 0..3 {
        assert_abs_diff_eq!(phi.column(k).sum(), 1.0, epsilon = 1e-6);
    }
    let theta = lda.theta();
    for d in 0..2 {
        assert_abs_diff_eq!(theta.row(d).sum(), 1.0, epsilon = 1e-6);
    }

    let ppl = lda.perplexity();
    assert!(ppl.is_finite() && ppl > 0.0);

    for words in lda.top_words(3) {
        assert_eq!(words.len(), 3);
        assert!(words.windows(2).all(|w| w[0].1 >= w[1].1));
    }
    Ok(())
}

#[test]
fn same_seed_same_chain() -> anyhow::Result<()> {
    let sim = generate_lda_corpus(&SimArgs {
        docs: 15,
        vocab: 25,
        topics: 3,
        doc_length: 20.0,
        alpha: 0.5,
        beta: 0.1,
        rseed: 3,
    })?;

    let mut a = Lda::new(sim.corpus.clone(), config(3, 99))?;
    let mut b = Lda::new(sim.corpus.clone(), config(3, 99))?;

    a.initialize();
    b.initialize();
    assert_eq!(a.assignments(), b.assignments());

    for _ in 0..5 {
        a.run(3);
        b.run(3);
        assert_eq!(a.assignments(), b.assignments());
    }
    assert_eq!(a.phi(), b.phi());
    assert_eq!(a.theta(), b.theta());

    // splitting the run does not change the chain
    let mut c = Lda::new(sim.corpus, config(3, 99))?;
    c.run(15);
    assert_eq!(a.assignments(), c.assignments());
    Ok(())
}

#[test]
fn dense_and_sparse_agree() -> anyhow::Result<()> {
    let sim = generate_lda_corpus(&SimArgs {
        docs: 10,
        vocab: 40,
        topics: 4,
        doc_length: 30.0,
        alpha: 0.2,
        beta: 0.05,
        rseed: 8,
    })?;

    let mut dense = Lda::new(sim.corpus.clone(), config(4, 17))?;
    let mut sparse = Lda::<SparseCounts>::with_storage(sim.corpus, config(4, 17))?;

    let a = dense.run(30);
    let b = sparse.run(30);
    assert_eq!(a, b);
    assert_eq!(dense.assignments(), sparse.assignments());
    assert_eq!(dense.phi(), sparse.phi());
    assert_eq!(dense.theta(), sparse.theta());
    sparse.stats().check_invariants(sparse.corpus())?;
    Ok(())
}

#[test]
fn stop_signals() -> anyhow::Result<()> {
    let mut lda = Lda::new(small_corpus(), config(2, 4))?;

    let summary = lda.run_with_stop(100, &AtomicBool::new(true));
    assert!(summary.interrupted);
    assert_eq!(summary.sweeps, 0);
    assert_eq!(lda.state(), SamplerState::Stopped);
    assert_eq!(lda.stats().num_assigned(), 10);
    lda.stats().check_invariants(lda.corpus())?;

    let summary = lda.run_with_stop(100, &Deadline::after(Duration::ZERO));
    assert!(summary.interrupted);
    assert_eq!(summary.sweeps, 0);

    // sampling continues after a stop
    let summary = lda.run(4);
    assert!(!summary.interrupted);
    assert_eq!(summary.sweeps, 4);
    assert_eq!(lda.sweeps_done(), 4);
    lda.stats().check_invariants(lda.corpus())?;
    Ok(())
}

/// Allows `limit` polls, then asks to stop
struct StopAfter {
    polls: Cell<usize>,
    limit: usize,
}

impl StopAfter {
    fn new(limit: usize) -> Self {
        StopAfter {
            polls: Cell::new(0),
            limit,
        }
    }
}

impl StopSignal for StopAfter {
    fn should_stop(&self) -> bool {
        let n = self.polls.get() + 1;
        self.polls.set(n);
        n > self.limit
    }
}

#[test]
fn stop_in_the_middle_of_a_sweep() -> anyhow::Result<()> {
    let sim = generate_lda_corpus(&SimArgs {
        docs: 6,
        vocab: 20,
        topics: 3,
        doc_length: 30.0,
        alpha: 0.5,
        beta: 0.1,
        rseed: 5,
    })?;

    let mut lda = Lda::new(
        sim.corpus,
        LdaConfig {
            num_topics: 3,
            alpha: 0.5,
            beta: 0.1,
            seed: 2,
            log_every: 10,
            ..Default::default()
        },
    )?;
    lda.initialize();
    let before = lda.assignments().to_vec();

    // one poll before the sweep, then one per document: documents 0 and 1 are resampled
    let summary = lda.run_with_stop(5, &StopAfter::new(3));
    assert!(summary.interrupted);
    assert_eq!(summary.sweeps, 0);
    assert!(summary.moved > 0);
    assert_eq!(lda.sweeps_done(), 0);
    assert_eq!(&lda.assignments()[2..], &before[2..]);
    lda.stats().check_invariants(lda.corpus())?;

    // the state before the sweep and the state after the cut
    let trace = lda.likelihood_trace().to_vec();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[0].0, 0);
    assert_eq!(trace[1].0, 0);
    assert_abs_diff_eq!(trace[1].1, lda.likelihood(), epsilon = 1e-12);

    // the next run does not record the unchanged state again
    lda.run(1);
    let iters: Vec<usize> = lda.likelihood_trace().iter().map(|&(i, _)| i).collect();
    assert_eq!(iters, vec![0, 0, 1]);
    assert_abs_diff_eq!(
        lda.likelihood_trace()[2].1,
        lda.likelihood(),
        epsilon = 1e-12
    );
    Ok(())
}

#[test]
fn likelihood_improves_on_simulated_data() -> anyhow::Result<()> {
    let sim = generate_lda_corpus(&SimArgs {
        docs: 60,
        vocab: 50,
        topics: 4,
        doc_length: 60.0,
        alpha: 0.2,
        beta: 0.05,
        rseed: 21,
    })?;

    let mut lda = Lda::new(
        sim.corpus,
        LdaConfig {
            num_topics: 4,
            alpha: 0.2,
            beta: 0.05,
            seed: 13,
            log_every: 1,
            ..Default::default()
        },
    )?;
    lda.run(200);

    let trace: Vec<f64> = lda.likelihood_trace().iter().map(|&(_, l)| l).collect();
    assert_eq!(trace.len(), 201);

    let window = 20;
    let smoothed: Vec<f64> = trace
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect();

    let first = smoothed[0];
    let last = smoothed[smoothed.len() - 1];
    assert!(
        last > first,
        "smoothed log-likelihood went from {} to {}",
        first,
        last
    );
    Ok(())
}
