//! Policy Corpus Domain
//!
//! The warranty policy document is ingested once: split into overlapping
//! passages, tokenized, and indexed for lexical retrieval. The corpus is
//! immutable after ingestion and retrieval is fully deterministic, so an
//! unchanged document always yields identical passages for a query.

pub mod corpus;
pub mod chunker;
pub mod index;
pub mod retriever;

pub use corpus::{Passage, PolicyCorpus};
pub use chunker::PassageSplitter;
pub use index::PassageIndex;
pub use retriever::{
    IndexRetriever, PassageRetriever, RetrievalWarning, RetrievedContext, ScoredPassage,
};
