//! Policy corpus and passages

use serde::{Deserialize, Serialize};

use core_kernel::PassageId;

use crate::chunker::PassageSplitter;

/// One indexed span of the policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: PassageId,
    /// Position of this passage within the source document; retrieval uses
    /// it as the stable tie-breaker
    pub seq: usize,
    pub text: String,
}

/// The ingested policy document, immutable after construction
#[derive(Debug, Clone, Default)]
pub struct PolicyCorpus {
    passages: Vec<Passage>,
}

impl PolicyCorpus {
    /// An empty corpus; retrieval over it produces the empty-context warning
    pub fn empty() -> Self {
        Self::default()
    }

    /// Ingests a policy document, splitting it into passages
    pub fn from_text(text: &str, splitter: &PassageSplitter) -> Self {
        let passages = splitter
            .split(text)
            .into_iter()
            .enumerate()
            .map(|(seq, text)| Passage {
                id: PassageId::new_v7(),
                seq,
                text,
            })
            .collect();
        Self { passages }
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestion_assigns_sequential_positions() {
        let text = "Section 1.\n\nSection 2.\n\nSection 3.";
        let corpus = PolicyCorpus::from_text(text, &PassageSplitter::new(12, 0));

        assert!(!corpus.is_empty());
        for (i, passage) in corpus.passages().iter().enumerate() {
            assert_eq!(passage.seq, i);
        }
    }

    #[test]
    fn blank_document_yields_empty_corpus() {
        let corpus = PolicyCorpus::from_text("   \n\n  ", &PassageSplitter::default());
        assert!(corpus.is_empty());
    }
}
