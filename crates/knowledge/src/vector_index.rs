//! Flat inner-product vector index.
//!
//! Rows are unit vectors, so inner product equals cosine similarity. The
//! dimension is fixed by the first add (or by a loaded header) and cleared
//! only by [`VectorIndex::reset`].
//!
//! On-disk layout (all integers little-endian):
//!
//! ```text
//! magic   [u8; 4]  "RPVI"
//! version u32      1
//! dim     u32      0 when the index has never held a row
//! rows    u64
//! data    rows * dim * f32
//! ```

use ragpilot_core::{AppError, AppResult};

const MAGIC: &[u8; 4] = b"RPVI";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Ordered store of fixed-dimension vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    dimension: Option<usize>,
    data: Vec<f32>,
    rows: usize,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Stored rows in insertion order.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dimension.unwrap_or(1))
    }

    /// Check `vectors` against the current (or implied) dimension without
    /// mutating anything. Returns the dimension they share.
    pub fn check_dimensions(&self, vectors: &[Vec<f32>]) -> AppResult<Option<usize>> {
        let expected = match (self.dimension, vectors.first()) {
            (Some(dim), _) => dim,
            (None, Some(first)) => first.len(),
            (None, None) => return Ok(None),
        };

        if expected == 0 {
            return Err(AppError::Knowledge(
                "Cannot index zero-length vectors".to_string(),
            ));
        }

        for vector in vectors {
            if vector.len() != expected {
                return Err(AppError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        Ok(Some(expected))
    }

    /// Append vectors. Either every vector is added or none is.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> AppResult<()> {
        let Some(dim) = self.check_dimensions(vectors)? else {
            return Ok(());
        };

        self.data.reserve(vectors.len() * dim);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        self.dimension = Some(dim);
        self.rows += vectors.len();
        Ok(())
    }

    /// Top `k` rows by inner product with `query`, best first.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>> {
        let dim = match self.dimension {
            Some(dim) if self.rows > 0 => dim,
            _ => return Err(AppError::EmptyIndex),
        };

        if query.len() != dim {
            return Err(AppError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .rows()
            .enumerate()
            .map(|(i, row)| (i, row.iter().zip(query).map(|(a, b)| a * b).sum()))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }

    /// Drop all rows and forget the dimension.
    pub fn reset(&mut self) {
        self.data.clear();
        self.rows = 0;
        self.dimension = None;
    }

    pub fn to_bytes(&self) -> AppResult<Vec<u8>> {
        let dim = u32::try_from(self.dimension.unwrap_or(0)).map_err(|_| {
            AppError::Knowledge("Vector dimension does not fit the file header".to_string())
        })?;
        let rows = u64::try_from(self.rows).map_err(|_| {
            AppError::Knowledge("Row count does not fit the file header".to_string())
        })?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&dim.to_le_bytes());
        bytes.extend_from_slice(&rows.to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
            return Err(AppError::Knowledge(
                "Vector file is not a ragpilot index".to_string(),
            ));
        }

        let version = u32::from_le_bytes(read_array(&bytes[4..8]));
        if version != FORMAT_VERSION {
            return Err(AppError::Knowledge(format!(
                "Unsupported vector file version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let overflow = |_: std::num::TryFromIntError| {
            AppError::Knowledge("Vector file header overflows".to_string())
        };
        let dim =
            usize::try_from(u32::from_le_bytes(read_array(&bytes[8..12]))).map_err(overflow)?;
        let rows =
            usize::try_from(u64::from_le_bytes(read_array(&bytes[12..20]))).map_err(overflow)?;
        let payload = &bytes[HEADER_LEN..];

        let expected_len = rows
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| AppError::Knowledge("Vector file header overflows".to_string()))?;
        if payload.len() != expected_len || (rows > 0 && dim == 0) {
            return Err(AppError::Knowledge(format!(
                "Vector file truncated: header declares {} rows of dimension {}, payload is {} bytes",
                rows,
                dim,
                payload.len()
            )));
        }

        let data = payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(read_array(b)))
            .collect();

        Ok(Self {
            dimension: (dim > 0).then_some(dim),
            data,
            rows,
        })
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(values: &[f32]) -> Vec<f32> {
        let norm = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        values.iter().map(|v| v / norm).collect()
    }

    #[test]
    fn test_first_add_fixes_dimension() {
        let mut index = VectorIndex::new();
        assert_eq!(index.dimension(), None);

        index.add(&[vec![1.0, 0.0, 0.0]]).unwrap();
        assert_eq!(index.dimension(), Some(3));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_dimension_guard_leaves_index_unchanged() {
        let mut index = VectorIndex::new();
        index.add(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let before = index.clone();

        let err = index
            .add(&[vec![1.0, 0.0], vec![0.0, 0.0, 1.0]])
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(index, before);
    }

    #[test]
    fn test_mixed_first_batch_rejected() {
        let mut index = VectorIndex::new();
        assert!(index.add(&[vec![1.0], vec![1.0, 0.0]]).is_err());
        assert!(index.is_empty());
        assert_eq!(index.dimension(), None);
    }

    #[test]
    fn test_search_orders_by_score() {
        let mut index = VectorIndex::new();
        index
            .add(&[unit(&[1.0, 0.0]), unit(&[0.0, 1.0]), unit(&[1.0, 1.0])])
            .unwrap();

        let hits = index.search(&unit(&[1.0, 0.2]), 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 2);
        assert!(hits[0].1 >= hits[1].1);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let mut index = VectorIndex::new();
        index
            .add(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]])
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        let rows: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[test]
    fn test_search_returns_fewer_when_small() {
        let mut index = VectorIndex::new();
        index.add(&[vec![1.0, 0.0]]).unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 1);
    }

    #[test]
    fn test_search_errors() {
        let mut index = VectorIndex::new();
        assert!(matches!(
            index.search(&[1.0], 1),
            Err(AppError::EmptyIndex)
        ));

        index.add(&[vec![1.0, 0.0]]).unwrap();
        assert!(matches!(
            index.search(&[1.0, 0.0, 0.0], 1),
            Err(AppError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_search_is_deterministic() {
        let mut index = VectorIndex::new();
        index
            .add(&[unit(&[0.3, 0.7]), unit(&[0.7, 0.3]), unit(&[0.5, 0.5])])
            .unwrap();
        let query = unit(&[0.6, 0.4]);
        assert_eq!(
            index.search(&query, 3).unwrap(),
            index.search(&query, 3).unwrap()
        );
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut index = VectorIndex::new();
        index.add(&[vec![1.0, 0.0]]).unwrap();
        index.reset();
        index.reset();
        assert!(index.is_empty());
        assert_eq!(index.dimension(), None);

        index.add(&[vec![1.0, 0.0, 0.0]]).unwrap();
        assert_eq!(index.dimension(), Some(3));
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut index = VectorIndex::new();
        index
            .add(&[unit(&[1.0, 2.0, 3.0]), unit(&[-1.0, 0.5, 0.0])])
            .unwrap();

        let restored = VectorIndex::from_bytes(&index.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, index);
        assert!(restored.rows().eq(index.rows()));
        assert_eq!(restored.rows().count(), 2);

        let empty = VectorIndex::from_bytes(&VectorIndex::new().to_bytes().unwrap()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.dimension(), None);
    }

    #[test]
    fn test_from_bytes_rejects_bad_input() {
        assert!(VectorIndex::from_bytes(b"nope").is_err());

        let mut index = VectorIndex::new();
        index.add(&[vec![1.0, 0.0]]).unwrap();
        let mut bytes = index.to_bytes().unwrap();
        bytes.pop();
        assert!(VectorIndex::from_bytes(&bytes).is_err());

        let mut bytes = index.to_bytes().unwrap();
        bytes[4] = 9;
        assert!(VectorIndex::from_bytes(&bytes).is_err());
    }
}
