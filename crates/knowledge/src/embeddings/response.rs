//! Recognized embedding response shapes.
//!
//! Embedding services answer with one of a handful of JSON layouts. Each is
//! a variant here with its own extraction; anything else is rejected as
//! `MalformedEmbeddingResponse` rather than coerced.

use ragpilot_core::{AppError, AppResult};
use serde::Deserialize;

/// A single vector as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireVector {
    /// `{"values": [..]}`
    Values { values: Vec<f32> },
    /// `[..]`
    Bare(Vec<f32>),
}

impl WireVector {
    fn into_values(self) -> Vec<f32> {
        match self {
            WireVector::Values { values } => values,
            WireVector::Bare(values) => values,
        }
    }
}

/// Embedding response shapes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingResponse {
    /// `{"embeddings": [<vector>, ...]}` (batch endpoints)
    Batch { embeddings: Vec<WireVector> },
    /// `{"embedding": <vector>}` (single-text endpoints)
    Single { embedding: WireVector },
}

impl EmbeddingResponse {
    /// Parse a raw JSON body into a recognized shape.
    pub fn from_json(value: serde_json::Value) -> AppResult<Self> {
        let keys: Vec<String> = value
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();

        serde_json::from_value(value).map_err(|_| {
            AppError::MalformedEmbeddingResponse(format!(
                "unrecognized response shape (top-level keys: [{}])",
                keys.join(", ")
            ))
        })
    }

    /// Extract exactly `expected` vectors, validating each.
    pub fn into_vectors(self, expected: usize) -> AppResult<Vec<Vec<f32>>> {
        let vectors: Vec<Vec<f32>> = match self {
            EmbeddingResponse::Batch { embeddings } => {
                embeddings.into_iter().map(WireVector::into_values).collect()
            }
            EmbeddingResponse::Single { embedding } => vec![embedding.into_values()],
        };

        if vectors.len() != expected {
            return Err(AppError::MalformedEmbeddingResponse(format!(
                "expected {} vectors, got {}",
                expected,
                vectors.len()
            )));
        }

        for (i, vector) in vectors.iter().enumerate() {
            if vector.is_empty() {
                return Err(AppError::MalformedEmbeddingResponse(format!(
                    "vector {} is empty",
                    i
                )));
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(AppError::MalformedEmbeddingResponse(format!(
                    "vector {} contains non-finite values",
                    i
                )));
            }
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_of_value_objects() {
        let response = EmbeddingResponse::from_json(json!({
            "embeddings": [{"values": [1.0, 0.0]}, {"values": [0.0, 1.0]}]
        }))
        .unwrap();
        assert_eq!(
            response.into_vectors(2).unwrap(),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]]
        );
    }

    #[test]
    fn test_batch_of_bare_lists() {
        let response = EmbeddingResponse::from_json(json!({"embeddings": [[0.5, 0.5]]})).unwrap();
        assert_eq!(response.into_vectors(1).unwrap(), vec![vec![0.5, 0.5]]);
    }

    #[test]
    fn test_single_value_object() {
        let response =
            EmbeddingResponse::from_json(json!({"embedding": {"values": [0.1, 0.2, 0.3]}}))
                .unwrap();
        assert!(matches!(response, EmbeddingResponse::Single { .. }));
        assert_eq!(response.into_vectors(1).unwrap(), vec![vec![0.1, 0.2, 0.3]]);
    }

    #[test]
    fn test_single_bare_list() {
        let response = EmbeddingResponse::from_json(json!({"embedding": [3.0, 4.0]})).unwrap();
        assert_eq!(response.into_vectors(1).unwrap(), vec![vec![3.0, 4.0]]);
    }

    #[test]
    fn test_unrecognized_shapes_rejected() {
        for body in [
            json!({"data": [{"embedding": [1.0]}]}),
            json!({"embedding": "nope"}),
            json!({"embeddings": [{"vector": [1.0]}]}),
            json!([1.0, 2.0]),
            json!(null),
        ] {
            let err = EmbeddingResponse::from_json(body).unwrap_err();
            assert!(matches!(err, AppError::MalformedEmbeddingResponse(_)));
        }
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let response = EmbeddingResponse::from_json(json!({"embedding": [1.0]})).unwrap();
        assert!(matches!(
            response.into_vectors(2),
            Err(AppError::MalformedEmbeddingResponse(_))
        ));
    }

    #[test]
    fn test_empty_vector_rejected() {
        let response = EmbeddingResponse::from_json(json!({"embeddings": [[]]})).unwrap();
        assert!(matches!(
            response.into_vectors(1),
            Err(AppError::MalformedEmbeddingResponse(_))
        ));
    }
}
