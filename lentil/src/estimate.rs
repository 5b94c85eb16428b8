//! Posterior point estimates read off the sufficient statistics.
//!
//! ```text
//! phi[v,k]   = (n[v,k] + beta)  / (Σ_v' n[v',k] + V * beta)
//! theta[d,k] = (n[d,k] + alpha) / (Σ_k' n[d,k'] + K * alpha)
//! loglik     = Σ_d Σ_{w in d} ln Σ_k phi[w,k] * theta[d,k]
//! ```

use crate::corpus::Corpus;
use crate::sufficient_stats::SufficientStats;
use matrix_util::count_table::CountMatrix;
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Dense estimate matrix
pub type Mat = DMatrix<f64>;

/// Word-topic distribution, V×K; each column sums to one
pub fn phi<W: CountMatrix>(stats: &SufficientStats<W>, beta: f64) -> Mat {
    let counts = stats.word_topic_counts();
    let col_sums = counts.col_sums();
    let vb = stats.v as f64 * beta;

    let mut phi = Mat::zeros(stats.v, stats.k);
    for (k, &sum) in col_sums.iter().enumerate() {
        let denom = sum as f64 + vb;
        for v in 0..stats.v {
            phi[(v, k)] = (counts.get(v, k) as f64 + beta) / denom;
        }
    }
    phi
}

/// Document-topic distribution, D×K; each row sums to one
///
/// Rows follow the corpus document order (ascending id).
pub fn theta<W: CountMatrix>(stats: &SufficientStats<W>, alpha: f64) -> Mat {
    let counts = stats.doc_topic_counts();
    let ka = stats.k as f64 * alpha;

    let mut theta = Mat::zeros(stats.d, stats.k);
    for d in 0..stats.d {
        let denom = counts.row_sum(d) as f64 + ka;
        for k in 0..stats.k {
            theta[(d, k)] = (counts.get(d, k) as f64 + alpha) / denom;
        }
    }
    theta
}

/// Joint log-likelihood of every token instance under `phi` and `theta`
///
/// * `corpus` - documents in the same order as the rows of `theta`
/// * `phi` - V×K word-topic distribution
/// * `theta` - D×K document-topic distribution
pub fn log_likelihood(corpus: &Corpus, phi: &Mat, theta: &Mat) -> f64 {
    debug_assert_eq!(theta.nrows(), corpus.num_docs());
    debug_assert_eq!(phi.ncols(), theta.ncols());

    // per-document partial sums are added up in document order
    let per_doc: Vec<f64> = corpus
        .documents()
        .par_iter()
        .enumerate()
        .map(|(d, doc)| {
            let theta_d = theta.row(d);
            doc.tokens()
                .iter()
                .map(|&w| phi.row(w).dot(&theta_d).ln())
                .sum::<f64>()
        })
        .collect();
    per_doc.iter().sum()
}

/// `exp(-loglik / N)` where `N` is the number of token instances
pub fn perplexity(loglik: f64, num_tokens: usize) -> f64 {
    (-loglik / num_tokens.max(1) as f64).exp()
}

/// For each topic, the `n` most probable words as `(word, phi)`,
/// in descending probability and ascending word id among ties
pub fn top_words(phi: &Mat, n: usize) -> Vec<Vec<(usize, f64)>> {
    (0..phi.ncols())
        .map(|k| {
            let mut pairs: Vec<(usize, f64)> =
                phi.column(k).iter().copied().enumerate().collect();
            pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            pairs.truncate(n);
            pairs
        })
        .collect()
}
