//! Latent Dirichlet Allocation (LDA) by collapsed Gibbs sampling.
//!
//! Documents are bags of words. Each token instance carries a latent
//! topic; the sampler redraws every topic from its full conditional given
//! all other assignments, keeping word-topic, document-topic and
//! topic-total counts in sync. Point estimates of the topic-word (Phi)
//! and document-topic (Theta) distributions and the corpus
//! log-likelihood are read off the counts at any time.
//!
//! # Model
//!
//! ```text
//! phi[,k]   ~ Dirichlet(beta)
//! theta[d,] ~ Dirichlet(alpha)
//! z[d,i]    ~ Categorical(theta[d,])
//! w[d,i]    ~ Categorical(phi[,z[d,i]])
//! ```
//!
//! # References
//!
//! Griffiths & Steyvers (2004). "Finding scientific topics." PNAS 101.

#![deny(missing_docs)]

/// Bag-of-words corpus and its text format
pub mod corpus;

/// Error types
pub mod errors;

/// Phi, Theta, log-likelihood, perplexity and top words
pub mod estimate;

/// Collapsed Gibbs sampler
pub mod gibbs;

/// Model configuration, life cycle and queries
pub mod model;

/// Synthetic corpora from the generative model
pub mod simulate;

/// Conditions that end sampling early
pub mod stop;

/// Word-topic, document-topic and topic-total counts
pub mod sufficient_stats;

pub use corpus::{Corpus, Document, WordCount};
pub use errors::LdaError;
pub use model::{Lda, LdaConfig, RunSummary, SamplerState};
pub use stop::{Deadline, NeverStop, StopSignal};
