//! Lexical passage index
//!
//! BM25 over normalized tokens. Scores depend only on the corpus and the
//! query, so ranking is reproducible across runs; ties are broken by the
//! passage's position in the source document.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::corpus::{Passage, PolicyCorpus};
use crate::retriever::ScoredPassage;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Lowercases and strips non-alphanumeric characters from each
/// whitespace-separated token
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(|c| c.to_lowercase())
                .collect::<String>()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

struct IndexedPassage {
    passage: Passage,
    tokens: Vec<String>,
}

/// Immutable BM25 index over the policy corpus
pub struct PassageIndex {
    passages: Vec<IndexedPassage>,
    doc_freq: HashMap<String, usize>,
    avg_doc_len: f64,
}

impl PassageIndex {
    /// Builds the index once from an ingested corpus
    pub fn build(corpus: &PolicyCorpus) -> Self {
        let mut passages = Vec::with_capacity(corpus.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for passage in corpus.passages() {
            let tokens = tokenize(&passage.text);
            total_len += tokens.len();

            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                *doc_freq.entry(token.clone()).or_insert(0) += 1;
            }

            passages.push(IndexedPassage {
                passage: passage.clone(),
                tokens,
            });
        }

        let avg_doc_len = if passages.is_empty() {
            0.0
        } else {
            total_len as f64 / passages.len() as f64
        };

        debug!(
            passages = passages.len(),
            vocabulary = doc_freq.len(),
            avg_doc_len,
            "Built policy passage index"
        );

        Self {
            passages,
            doc_freq,
            avg_doc_len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Scores every passage against the query and returns the top `k` with
    /// positive scores, ranked by score then source position
    pub fn top_k(&self, query: &str, k: usize) -> Vec<ScoredPassage> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredPassage> = self
            .passages
            .iter()
            .filter_map(|indexed| {
                let score = self.bm25(&query_tokens, &indexed.tokens);
                (score > 0.0).then(|| ScoredPassage {
                    passage: indexed.passage.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.passage.seq.cmp(&b.passage.seq))
        });
        scored.truncate(k);
        scored
    }

    fn bm25(&self, query_tokens: &[String], doc_tokens: &[String]) -> f64 {
        if doc_tokens.is_empty() || self.avg_doc_len <= f64::EPSILON {
            return 0.0;
        }

        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for token in doc_tokens {
            *term_freq.entry(token.as_str()).or_insert(0) += 1;
        }

        let total_docs = self.passages.len() as f64;
        let doc_len = doc_tokens.len() as f64;
        let mut score = 0.0;

        for token in query_tokens {
            let tf = term_freq.get(token.as_str()).copied().unwrap_or(0) as f64;
            if tf <= 0.0 {
                continue;
            }

            let df = self.doc_freq.get(token).copied().unwrap_or(0) as f64;
            let idf = ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln();
            let norm = tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * doc_len / self.avg_doc_len));
            score += idf * norm;
        }

        score
    }
}
