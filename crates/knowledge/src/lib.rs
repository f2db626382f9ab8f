//! Retrieval-augmented generation over two local corpora.
//!
//! Ingestion chunks a best-practices document and a code tree, embeds each
//! chunk and stores the vectors in a flat inner-product index per corpus.
//! Asking embeds the question, retrieves the best matches from each corpus
//! and sends a grounding prompt to the generation client.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod rag;
pub mod retriever;
pub mod session;
pub mod sources;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunker::ChunkerConfig;
pub use embeddings::{Embedder, EmbeddingConfig, EmbeddingProvider};
pub use rag::{RagAnswer, SourceRef};
pub use session::{Session, SessionOptions};
pub use sources::ExtensionSet;
pub use store::CorpusIndex;
pub use types::{Chunk, Corpus, CorpusStats, IngestStats, Retrieval, ScoredChunk};
pub use vector_index::VectorIndex;
