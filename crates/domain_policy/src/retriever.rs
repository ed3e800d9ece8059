//! Passage retrieval port

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::corpus::Passage;
use crate::index::PassageIndex;

/// A passage with its retrieval score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f64,
}

/// Why a retrieval produced no context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalWarning {
    /// No policy corpus was ingested
    EmptyCorpus,
    /// The corpus exists but nothing matched the query
    NoMatches,
}

impl std::fmt::Display for RetrievalWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalWarning::EmptyCorpus => f.write_str("no policy corpus available"),
            RetrievalWarning::NoMatches => f.write_str("no policy passages matched the claim"),
        }
    }
}

/// Context retrieved for one claim
///
/// An empty result never aborts the pipeline; the warning travels with the
/// claim so downstream verdicts can be marked accordingly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub passages: Vec<ScoredPassage>,
    pub warning: Option<RetrievalWarning>,
}

impl RetrievedContext {
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Passages joined for prompt inclusion
    pub fn joined_text(&self) -> String {
        self.passages
            .iter()
            .map(|p| p.passage.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

/// Retrieval capability consumed by the pipeline
///
/// A trait so tests can script retrieval without building a corpus.
pub trait PassageRetriever: Send + Sync {
    fn retrieve(&self, query: &str, top_k: usize) -> RetrievedContext;
}

/// Retriever backed by the lexical passage index
pub struct IndexRetriever {
    index: PassageIndex,
}

impl IndexRetriever {
    pub fn new(index: PassageIndex) -> Self {
        Self { index }
    }
}

impl PassageRetriever for IndexRetriever {
    fn retrieve(&self, query: &str, top_k: usize) -> RetrievedContext {
        if self.index.is_empty() {
            warn!("Policy retrieval requested but no corpus is indexed");
            return RetrievedContext {
                passages: Vec::new(),
                warning: Some(RetrievalWarning::EmptyCorpus),
            };
        }

        let passages = self.index.top_k(query, top_k);
        let warning = passages.is_empty().then_some(RetrievalWarning::NoMatches);

        RetrievedContext { passages, warning }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::PassageSplitter;
    use crate::corpus::PolicyCorpus;

    #[test]
    fn empty_corpus_warns_and_returns_no_passages() {
        let retriever = IndexRetriever::new(PassageIndex::build(&PolicyCorpus::empty()));
        let context = retriever.retrieve("engine coverage", 4);

        assert!(context.is_empty());
        assert_eq!(context.warning, Some(RetrievalWarning::EmptyCorpus));
    }

    #[test]
    fn unmatched_query_warns_no_matches() {
        let corpus =
            PolicyCorpus::from_text("Engine components covered.", &PassageSplitter::default());
        let retriever = IndexRetriever::new(PassageIndex::build(&corpus));
        let context = retriever.retrieve("zeppelin mooring", 4);

        assert!(context.is_empty());
        assert_eq!(context.warning, Some(RetrievalWarning::NoMatches));
    }

    #[test]
    fn matched_query_has_no_warning() {
        let corpus =
            PolicyCorpus::from_text("Engine components covered.", &PassageSplitter::default());
        let retriever = IndexRetriever::new(PassageIndex::build(&corpus));
        let context = retriever.retrieve("engine", 4);

        assert!(!context.is_empty());
        assert!(context.warning.is_none());
    }

    #[test]
    fn joined_text_separates_passages() {
        let corpus = PolicyCorpus::from_text(
            "Engine covered for 60 months.\n\nBattery covered for 24 months.",
            &PassageSplitter::new(40, 0),
        );
        let retriever = IndexRetriever::new(PassageIndex::build(&corpus));
        let context = retriever.retrieve("covered months", 4);

        assert!(context.passages.len() >= 2);
        assert!(context.joined_text().contains("\n\n---\n\n"));
    }
}
