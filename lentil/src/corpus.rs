//! Bag-of-words corpus and its line-oriented text format.
//!
//! ```text
//! <docId> <wordId>:<count> <wordId>:<count> ...
//! ```
//!
//! Documents are kept sorted by id. The position of a document in that
//! order is its dense index `d`, which is what the sampler and the
//! estimated Theta rows use.

use crate::errors::{LdaError, Result};
use log::{info, warn};
use matrix_util::common_io::{open_buf_reader, write_lines};
use std::io::BufRead;

/// One `wordId:count` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCount {
    /// Vocabulary index
    pub word: usize,
    /// Number of occurrences
    pub count: u32,
}

/// A document: its original id, its word counts, and the expanded tokens
#[derive(Debug, Clone)]
pub struct Document {
    id: u32,
    word_counts: Vec<WordCount>,
    tokens: Vec<usize>,
}

impl Document {
    fn new(id: u32, word_counts: Vec<WordCount>) -> Self {
        let tokens = Corpus::expand_words(&word_counts);
        Document {
            id,
            word_counts,
            tokens,
        }
    }

    /// Original document id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// `(word, count)` pairs in input order
    pub fn word_counts(&self) -> &[WordCount] {
        &self.word_counts
    }

    /// Word id of every token instance; position `i` is token `i`
    pub fn tokens(&self) -> &[usize] {
        &self.tokens
    }

    /// Number of token instances
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the document has no token instance
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A collection of documents over a vocabulary `0..vocab_size`
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    vocab_size: usize,
    docs: Vec<Document>,
}

impl Corpus {
    /// An empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand `(word, count)` pairs into one word id per occurrence
    pub fn expand_words(word_counts: &[WordCount]) -> Vec<usize> {
        let mut words = Vec::with_capacity(word_counts.iter().map(|wc| wc.count as usize).sum());
        for wc in word_counts {
            words.extend(std::iter::repeat(wc.word).take(wc.count as usize));
        }
        words
    }

    /// Load a corpus file (gzipped or not)
    ///
    /// Malformed lines and malformed `word:count` tokens are skipped with
    /// a warning. A field that is not a non-negative integer fails the
    /// whole load.
    pub fn load(file: &str) -> Result<Self> {
        let buf = open_buf_reader(file).map_err(|e| match e.downcast::<std::io::Error>() {
            Ok(io) => LdaError::Io(io),
            Err(e) => LdaError::Io(std::io::Error::other(e)),
        })?;
        let corpus = Self::from_reader(buf)?;
        info!("number of documents {}", corpus.num_docs());
        info!("vocabulary size {}", corpus.vocab_size());
        Ok(corpus)
    }

    /// Parse a corpus from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut corpus = Corpus::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some((doc_id, word_counts)) = parse_line(&line, i + 1)? {
                corpus.append_doc(doc_id, word_counts);
            }
        }
        Ok(corpus)
    }

    /// Insert a document, replacing any previous document with the same id
    pub fn add_doc(&mut self, id: u32, word_counts: Vec<WordCount>) {
        self.grow_vocab(&word_counts);
        match self.docs.binary_search_by_key(&id, |d| d.id) {
            Ok(pos) => {
                warn!("document {} already exists, it will be overwritten", id);
                self.docs[pos] = Document::new(id, word_counts);
            }
            Err(pos) => self.docs.insert(pos, Document::new(id, word_counts)),
        }
    }

    /// Append word counts to a document, creating it if needed
    fn append_doc(&mut self, id: u32, word_counts: Vec<WordCount>) {
        self.grow_vocab(&word_counts);
        match self.docs.binary_search_by_key(&id, |d| d.id) {
            Ok(pos) => {
                warn!("document {} appears more than once, merging its words", id);
                let mut merged = std::mem::take(&mut self.docs[pos].word_counts);
                merged.extend(word_counts);
                self.docs[pos] = Document::new(id, merged);
            }
            Err(pos) => self.docs.insert(pos, Document::new(id, word_counts)),
        }
    }

    fn grow_vocab(&mut self, word_counts: &[WordCount]) {
        if let Some(max_word) = word_counts.iter().map(|wc| wc.word).max() {
            self.vocab_size = self.vocab_size.max(max_word + 1);
        }
    }

    /// Make the vocabulary at least `vocab_size` words long
    ///
    /// Useful when trailing vocabulary words never occur in the data.
    pub fn reserve_vocab(&mut self, vocab_size: usize) {
        self.vocab_size = self.vocab_size.max(vocab_size);
    }

    /// `V`: one past the largest word id
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// `D`: number of distinct documents
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// Total number of token instances
    pub fn num_tokens(&self) -> usize {
        self.docs.iter().map(|d| d.len()).sum()
    }

    /// Documents in ascending id order
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    /// Document at dense index `d`
    pub fn document(&self, d: usize) -> &Document {
        &self.docs[d]
    }

    /// Original ids in dense-index order
    pub fn doc_ids(&self) -> Vec<u32> {
        self.docs.iter().map(|d| d.id).collect()
    }

    /// Write the corpus back in its text format
    pub fn write(&self, file: &str) -> anyhow::Result<()> {
        let lines: Vec<Box<str>> = self
            .docs
            .iter()
            .map(|doc| {
                let mut line = doc.id.to_string();
                for wc in &doc.word_counts {
                    line.push_str(&format!(" {}:{}", wc.word, wc.count));
                }
                line.into_boxed_str()
            })
            .collect();
        write_lines(&lines, file)
    }
}

fn parse_u32(field: &str, line: usize) -> Result<u32> {
    field.parse::<u32>().map_err(|source| LdaError::Parse {
        line,
        field: field.to_string(),
        source,
    })
}

/// `None` if the line is skipped
///
/// Fields are separated by single spaces, so a double space yields an
/// empty `word:count` unit that is reported and skipped.
fn parse_line(line: &str, line_no: usize) -> Result<Option<(u32, Vec<WordCount>)>> {
    let line = line.trim_end_matches('\r');
    let vals: Vec<&str> = line.split(' ').collect();
    if vals.len() < 2 {
        warn!("bad document at line {}: {}", line_no, line);
        return Ok(None);
    }

    let doc_id = parse_u32(vals[0], line_no)?;

    let mut word_counts = Vec::with_capacity(vals.len() - 1);
    for kv in &vals[1..] {
        let wc: Vec<&str> = kv.split(':').collect();
        if wc.len() != 2 {
            warn!("bad word count at line {}: {}", line_no, kv);
            continue;
        }
        let word = parse_u32(wc[0], line_no)? as usize;
        let count = parse_u32(wc[1], line_no)?;
        word_counts.push(WordCount { word, count });
    }

    Ok(Some((doc_id, word_counts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wc(word: usize, count: u32) -> WordCount {
        WordCount { word, count }
    }

    #[test]
    fn test_expand_words() {
        let words = Corpus::expand_words(&[wc(3, 2), wc(0, 1), wc(5, 0)]);
        assert_eq!(words, vec![3, 3, 0]);
    }

    #[test]
    fn test_parse_basic() -> anyhow::Result<()> {
        let text = "2 0:1 4:2\n0 1:3\n";
        let corpus = Corpus::from_reader(text.as_bytes())?;
        assert_eq!(corpus.num_docs(), 2);
        assert_eq!(corpus.vocab_size(), 5);
        assert_eq!(corpus.num_tokens(), 6);
        // sorted by id
        assert_eq!(corpus.doc_ids(), vec![0, 2]);
        assert_eq!(corpus.document(1).tokens(), &[0, 4, 4]);
        Ok(())
    }

    #[test]
    fn test_bad_units_are_skipped() -> anyhow::Result<()> {
        let text = "7\n1 2:1 oops 3:1:1 1:2\n";
        let corpus = Corpus::from_reader(text.as_bytes())?;
        assert_eq!(corpus.num_docs(), 1);
        assert_eq!(corpus.document(0).word_counts(), &[wc(2, 1), wc(1, 2)]);
        assert_eq!(corpus.vocab_size(), 3);
        Ok(())
    }

    #[test]
    fn test_space_separated_fields() -> anyhow::Result<()> {
        // a tab is not a separator, a double space leaves an empty unit
        let text = "3\t0:1\n5 0:2  1:1\r\n";
        let corpus = Corpus::from_reader(text.as_bytes())?;
        assert_eq!(corpus.doc_ids(), vec![5]);
        assert_eq!(corpus.document(0).word_counts(), &[wc(0, 2), wc(1, 1)]);
        Ok(())
    }

    #[test]
    fn test_non_numeric_is_fatal() {
        for text in ["x 1:1", "1 a:1", "1 1:b", "1 1:-2"] {
            let res = Corpus::from_reader(text.as_bytes());
            assert!(
                matches!(res, Err(LdaError::Parse { line: 1, .. })),
                "{:?} should fail",
                text
            );
        }
    }

    #[test]
    fn test_repeated_id_merges() -> anyhow::Result<()> {
        let text = "1 0:1\n1 2:2\n";
        let corpus = Corpus::from_reader(text.as_bytes())?;
        assert_eq!(corpus.num_docs(), 1);
        assert_eq!(corpus.document(0).tokens(), &[0, 2, 2]);
        Ok(())
    }

    #[test]
    fn test_add_doc_overwrites() {
        let mut corpus = Corpus::new();
        corpus.add_doc(4, vec![wc(1, 1)]);
        corpus.add_doc(2, vec![wc(9, 1)]);
        corpus.add_doc(4, vec![wc(0, 3)]);
        assert_eq!(corpus.doc_ids(), vec![2, 4]);
        assert_eq!(corpus.document(1).tokens(), &[0, 0, 0]);
        // vocabulary never shrinks
        assert_eq!(corpus.vocab_size(), 10);
    }
}
