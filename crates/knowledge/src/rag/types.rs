//! RAG answer types.

use crate::types::{Corpus, Retrieval, ScoredChunk};
use serde::{Deserialize, Serialize};

/// A source chunk as shown to the user alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// `best-practices` or `code`
    pub corpus: String,

    /// 1-based rank within its corpus
    pub rank: usize,

    /// Originating file for code chunks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    pub score: f32,

    /// Chunk text
    pub text: String,
}

impl SourceRef {
    fn from_scored(corpus: Corpus, rank: usize, scored: &ScoredChunk) -> Self {
        Self {
            corpus: corpus.to_string(),
            rank,
            origin: scored.chunk.origin.clone(),
            score: scored.score,
            text: scored.chunk.text.clone(),
        }
    }
}

/// Answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub question: String,

    /// Generated text, or the fallback when the model returned nothing
    pub answer: String,

    /// Everything retrieved, best-practices first
    pub sources: Vec<SourceRef>,
}

impl RagAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, retrieval: &Retrieval) -> Self {
        let sources = retrieval
            .best_practices
            .iter()
            .enumerate()
            .map(|(i, c)| SourceRef::from_scored(Corpus::BestPractices, i + 1, c))
            .chain(
                retrieval
                    .code
                    .iter()
                    .enumerate()
                    .map(|(i, c)| SourceRef::from_scored(Corpus::Code, i + 1, c)),
            )
            .collect();

        Self {
            question: question.into(),
            answer: answer.into(),
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    #[test]
    fn test_sources_ranked_per_corpus() {
        let retrieval = Retrieval {
            best_practices: vec![ScoredChunk {
                chunk: Chunk::new("rule", 0),
                score: 0.9,
            }],
            code: vec![
                ScoredChunk {
                    chunk: Chunk::from_file("a.py", "x = 1", 0),
                    score: 0.8,
                },
                ScoredChunk {
                    chunk: Chunk::from_file("b.py", "y = 2", 0),
                    score: 0.7,
                },
            ],
        };

        let answer = RagAnswer::new("q", "a", &retrieval);
        assert_eq!(answer.sources.len(), 3);
        assert_eq!(answer.sources[0].corpus, "best-practices");
        assert_eq!(answer.sources[0].rank, 1);
        assert_eq!(answer.sources[2].rank, 2);
        assert_eq!(answer.sources[2].origin.as_deref(), Some("b.py"));
    }

    #[test]
    fn test_json_omits_missing_origin() {
        let retrieval = Retrieval {
            best_practices: vec![ScoredChunk {
                chunk: Chunk::new("rule", 0),
                score: 0.5,
            }],
            code: vec![],
        };
        let json = serde_json::to_value(RagAnswer::new("q", "a", &retrieval)).unwrap();
        assert!(json["sources"][0].get("origin").is_none());
        assert_eq!(json["answer"], "a");
    }
}
