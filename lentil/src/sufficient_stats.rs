//! Sufficient statistics for collapsed Gibbs sampling of LDA.
//!
//! Tracks the V×K word-topic counts, the D×K document-topic counts, the
//! length-K topic totals and the topic of every token instance. A token
//! moves between topics by [`SufficientStats::take_token`] followed by
//! [`SufficientStats::put_token`]; nothing else mutates the counts.

use crate::corpus::Corpus;
use matrix_util::count_table::{CountMatrix, DenseCounts};

/// Sufficient statistics for LDA.
///
/// `W` is the storage for word-topic counts: [`DenseCounts`] by default,
/// or [`matrix_util::count_table::SparseCounts`] for large vocabularies.
#[derive(Debug, Clone)]
pub struct SufficientStats<W: CountMatrix = DenseCounts> {
    /// Number of topics
    pub k: usize,
    /// Vocabulary size
    pub v: usize,
    /// Number of documents
    pub d: usize,
    word_topic: W,
    doc_topic: DenseCounts,
    topic_total: Vec<u32>,
    assignments: Vec<Vec<usize>>,
}

impl<W: CountMatrix> SufficientStats<W> {
    /// Zeroed statistics with an empty assignment table
    pub fn new(k: usize, v: usize, d: usize) -> Self {
        SufficientStats {
            k,
            v,
            d,
            word_topic: W::zeros(v, k),
            doc_topic: DenseCounts::zeros(d, k),
            topic_total: vec![0; k],
            assignments: vec![Vec::new(); d],
        }
    }

    /// Build statistics from a complete assignment table.
    ///
    /// * `corpus` - the documents the assignments refer to
    /// * `k` - number of topics
    /// * `assignments` - `assignments[d][i]` is the topic of token `i` of document `d`
    pub fn from_assignments(corpus: &Corpus, k: usize, assignments: &[Vec<usize>]) -> Self {
        assert_eq!(assignments.len(), corpus.num_docs());
        let mut stats = Self::new(k, corpus.vocab_size(), corpus.num_docs());
        for (d, (doc, z)) in corpus.documents().iter().zip(assignments).enumerate() {
            assert_eq!(z.len(), doc.len(), "document {} length mismatch", doc.id());
            for (&w, &t) in doc.tokens().iter().zip(z) {
                stats.push_token(d, w, t);
            }
        }
        stats
    }

    /// Append a new token with topic `topic` to document `doc`.
    #[inline]
    pub fn push_token(&mut self, doc: usize, word: usize, topic: usize) {
        assert!(topic < self.k, "topic {} out of range (K = {})", topic, self.k);
        self.add_counts(doc, word, topic);
        self.assignments[doc].push(topic);
    }

    /// Remove token `pos` of document `doc` from the counts and return its topic.
    ///
    /// The token keeps its stale assignment until [`Self::put_token`] is
    /// called; the two calls must be paired.
    #[inline]
    pub fn take_token(&mut self, doc: usize, pos: usize, word: usize) -> usize {
        let topic = self.assignment(doc, pos);
        self.word_topic.decr(word, topic, 1);
        self.doc_topic.decr(doc, topic, 1);
        match self.topic_total[topic].checked_sub(1) {
            Some(x) => self.topic_total[topic] = x,
            None => panic!("topic total underflow at topic {}", topic),
        }
        topic
    }

    /// Add token `pos` of document `doc` back to the counts under `topic`.
    #[inline]
    pub fn put_token(&mut self, doc: usize, pos: usize, word: usize, topic: usize) {
        debug_assert!(topic < self.k);
        self.add_counts(doc, word, topic);
        self.assignments[doc][pos] = topic;
    }

    #[inline]
    fn add_counts(&mut self, doc: usize, word: usize, topic: usize) {
        self.word_topic.incr(word, topic, 1);
        self.doc_topic.incr(doc, topic, 1);
        self.topic_total[topic] += 1;
    }

    /// Topic of token `pos` in document `doc`.
    ///
    /// Panics if the token was never assigned.
    #[inline]
    pub fn assignment(&self, doc: usize, pos: usize) -> usize {
        match self.assignments.get(doc).and_then(|z| z.get(pos)) {
            Some(&t) => t,
            None => panic!(
                "missing topic assignment for token {} of document {} ({} assigned)",
                pos,
                doc,
                self.assignments.get(doc).map(|z| z.len()).unwrap_or(0)
            ),
        }
    }

    /// `assignments[d][i]` is the topic of token `i` in document `d`
    pub fn assignments(&self) -> &[Vec<usize>] {
        &self.assignments
    }

    /// Total number of assigned tokens
    pub fn num_assigned(&self) -> usize {
        self.assignments.iter().map(|z| z.len()).sum()
    }

    /// Count of `word` assigned to `topic`
    #[inline]
    pub fn word_topic(&self, word: usize, topic: usize) -> u32 {
        self.word_topic.get(word, topic)
    }

    /// Count of tokens in `doc` assigned to `topic`
    #[inline]
    pub fn doc_topic(&self, doc: usize, topic: usize) -> u32 {
        self.doc_topic.get(doc, topic)
    }

    /// Tokens assigned to `topic` over the whole corpus
    #[inline]
    pub fn topic_total(&self, topic: usize) -> u32 {
        self.topic_total[topic]
    }

    /// The word-topic table
    pub fn word_topic_counts(&self) -> &W {
        &self.word_topic
    }

    /// The document-topic table
    pub fn doc_topic_counts(&self) -> &DenseCounts {
        &self.doc_topic
    }

    /// The topic totals
    pub fn topic_totals(&self) -> &[u32] {
        &self.topic_total
    }

    /// Rebuild every count from the assignment table.
    pub fn recompute(&mut self, corpus: &Corpus) {
        let assignments = std::mem::take(&mut self.assignments);
        *self = Self::from_assignments(corpus, self.k, &assignments);
    }

    /// Verify that the counts agree with each other and with the corpus.
    ///
    /// * column sums of word-topic counts equal the topic totals
    /// * column sums of document-topic counts equal the topic totals
    /// * each document-topic row sums to the document length
    /// * every assignment lies in `0..k` and the counts match a recount
    pub fn check_invariants(&self, corpus: &Corpus) -> anyhow::Result<()> {
        let word_sums = self.word_topic.col_sums();
        let doc_sums = self.doc_topic.col_sums();
        for t in 0..self.k {
            let total = self.topic_total[t] as u64;
            anyhow::ensure!(
                word_sums[t] == total && doc_sums[t] == total,
                "topic {}: word-topic sum {}, doc-topic sum {}, total {}",
                t,
                word_sums[t],
                doc_sums[t],
                total
            );
        }

        anyhow::ensure!(
            self.assignments.len() == corpus.num_docs(),
            "{} assignment rows for {} documents",
            self.assignments.len(),
            corpus.num_docs()
        );

        for (d, doc) in corpus.documents().iter().enumerate() {
            let z = &self.assignments[d];
            anyhow::ensure!(
                z.len() == doc.len(),
                "document {}: {} assignments for {} tokens",
                doc.id(),
                z.len(),
                doc.len()
            );
            anyhow::ensure!(
                self.doc_topic.row_sum(d) == doc.len() as u64,
                "document {}: doc-topic row sums to {}, expected {}",
                doc.id(),
                self.doc_topic.row_sum(d),
                doc.len()
            );
            if let Some(&t) = z.iter().find(|&&t| t >= self.k) {
                anyhow::bail!("document {}: topic {} out of range", doc.id(), t);
            }
        }

        let fresh = Self::from_assignments(corpus, self.k, &self.assignments);
        anyhow::ensure!(
            fresh.doc_topic == self.doc_topic && fresh.topic_total == self.topic_total,
            "counts drifted from the assignment table"
        );
        for w in 0..self.v {
            for t in 0..self.k {
                anyhow::ensure!(
                    fresh.word_topic(w, t) == self.word_topic(w, t),
                    "word-topic [{}, {}] is {}, recount gives {}",
                    w,
                    t,
                    self.word_topic(w, t),
                    fresh.word_topic(w, t)
                );
            }
        }
        Ok(())
    }
}
