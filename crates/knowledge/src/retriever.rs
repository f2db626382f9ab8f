//! Two-corpus retrieval.
//!
//! The query is embedded once and searched against each corpus on its own.
//! Rankings are never merged: scores from different corpora are not
//! comparable.

use crate::embeddings::Embedder;
use crate::store::CorpusIndex;
use crate::types::{Retrieval, ScoredChunk};
use ragpilot_core::{AppError, AppResult};

/// Retrieve the top chunks from both corpora for `query`.
///
/// An empty corpus contributes no results; it is not an error.
pub async fn retrieve(
    embedder: &Embedder,
    best_practices: &CorpusIndex,
    code: &CorpusIndex,
    query: &str,
    k_best: usize,
    k_code: usize,
) -> AppResult<Retrieval> {
    if best_practices.is_empty() && code.is_empty() {
        tracing::info!("Both corpora are empty; skipping query embedding");
        return Ok(Retrieval::default());
    }

    let query_vector = embedder.embed_query(query).await?;

    let retrieval = Retrieval {
        best_practices: search_or_empty(best_practices, &query_vector, k_best)?,
        code: search_or_empty(code, &query_vector, k_code)?,
    };

    tracing::info!(
        "Retrieved {} best-practice and {} code chunks (top scores: {:.3} / {:.3})",
        retrieval.best_practices.len(),
        retrieval.code.len(),
        retrieval.best_practices.first().map_or(0.0, |c| c.score),
        retrieval.code.first().map_or(0.0, |c| c.score)
    );

    Ok(retrieval)
}

fn search_or_empty(corpus: &CorpusIndex, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>> {
    if k == 0 {
        return Ok(Vec::new());
    }
    match corpus.search(query, k) {
        Err(AppError::EmptyIndex) => {
            tracing::debug!("Corpus '{}' is empty", corpus.corpus());
            Ok(Vec::new())
        }
        other => other,
    }
}
