//! Exact (brute-force) vector index read from a prebuilt file.
//!
//! The on-disk layout is the flat-index serialization written by FAISS
//! (`IndexFlatL2` → fourcc `IxF2`, `IndexFlatIP` → `IxFI`), little-endian:
//!
//! ```text
//! fourcc[4] d:i32 ntotal:i64 dummy:i64 dummy:i64 is_trained:u8 metric:i32
//! [metric_arg:f32 if metric > 1] n_floats:u64 floats[n_floats]
//! ```
//!
//! Positions returned by [`FlatIndex::search`] are insertion order, i.e. the
//! row order the index was built from. Nothing here can check that this
//! order matches the dataset file; the two artifacts must be produced from
//! the same row ordering.

use std::{
    cmp::Ordering,
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, info};

use crate::errors::RagError;

/// Floats decoded per read while loading the payload.
const READ_CHUNK: usize = 1 << 16;

const METRIC_INNER_PRODUCT: i32 = 0;
const METRIC_L2: i32 = 1;

/// Similarity measure of the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    /// Dot product; larger is closer.
    InnerProduct,
    /// Squared Euclidean distance; smaller is closer.
    L2,
}

/// Raw search output: up to `k` scores and positions, best first.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub distances: Vec<f32>,
    pub labels: Vec<i64>,
}

/// In-memory flat index.
#[derive(Clone, Debug)]
pub struct FlatIndex {
    dim: usize,
    metric: MetricKind,
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Builds an index from row-major vectors.
    ///
    /// # Errors
    /// `RagError::IndexFormat` if `dim` is zero or `vectors.len()` is not a
    /// multiple of `dim`.
    pub fn from_vectors(dim: usize, metric: MetricKind, vectors: Vec<f32>) -> Result<Self, RagError> {
        if dim == 0 {
            return Err(RagError::IndexFormat("dimension must be > 0".into()));
        }
        if vectors.len() % dim != 0 {
            return Err(RagError::IndexFormat(format!(
                "{} floats do not split into vectors of dimension {dim}",
                vectors.len()
            )));
        }
        Ok(Self { dim, metric, vectors })
    }

    /// Reads an index file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RagError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            RagError::IndexFormat(format!("cannot open index {}: {e}", path.display()))
        })?;
        let index = Self::read_from(BufReader::new(file))?;
        info!(
            path = %path.display(),
            vectors = index.len(),
            dim = index.dim,
            metric = ?index.metric,
            "vector index loaded"
        );
        Ok(index)
    }

    /// Decodes the flat-index layout from any reader.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self, RagError> {
        let mut fourcc = [0u8; 4];
        r.read_exact(&mut fourcc).map_err(truncated)?;
        let declared = match &fourcc {
            b"IxF2" => MetricKind::L2,
            b"IxFI" => MetricKind::InnerProduct,
            other => {
                return Err(RagError::IndexFormat(format!(
                    "unsupported index type {:?}; only flat L2/IP indices are supported",
                    String::from_utf8_lossy(other)
                )));
            }
        };

        let d = r.read_i32::<LittleEndian>().map_err(truncated)?;
        let ntotal = r.read_i64::<LittleEndian>().map_err(truncated)?;
        r.read_i64::<LittleEndian>().map_err(truncated)?;
        r.read_i64::<LittleEndian>().map_err(truncated)?;
        let _is_trained = r.read_u8().map_err(truncated)?;
        let metric_type = r.read_i32::<LittleEndian>().map_err(truncated)?;
        if metric_type > METRIC_L2 {
            r.read_f32::<LittleEndian>().map_err(truncated)?;
        }

        let metric = match metric_type {
            METRIC_INNER_PRODUCT => MetricKind::InnerProduct,
            METRIC_L2 => MetricKind::L2,
            other => {
                return Err(RagError::IndexFormat(format!("unsupported metric type {other}")));
            }
        };
        if metric != declared {
            return Err(RagError::IndexFormat(format!(
                "header metric {metric:?} contradicts index type {declared:?}"
            )));
        }
        if d <= 0 {
            return Err(RagError::IndexFormat(format!("invalid dimension {d}")));
        }
        if ntotal < 0 {
            return Err(RagError::IndexFormat(format!("invalid vector count {ntotal}")));
        }

        let n_floats = r.read_u64::<LittleEndian>().map_err(truncated)?;
        let expected = (ntotal as u64).checked_mul(d as u64).ok_or_else(|| {
            RagError::IndexFormat("vector count overflows".into())
        })?;
        if n_floats != expected {
            return Err(RagError::IndexFormat(format!(
                "payload holds {n_floats} floats, header implies {expected}"
            )));
        }

        let n_floats = usize::try_from(n_floats)
            .map_err(|_| RagError::IndexFormat("index too large for this platform".into()))?;
        // Capacity follows the floats actually read, not the header count.
        let mut vectors = Vec::with_capacity(n_floats.min(READ_CHUNK));
        let mut buf = vec![0f32; n_floats.min(READ_CHUNK)];
        let mut remaining = n_floats;
        while remaining > 0 {
            let take = remaining.min(READ_CHUNK);
            r.read_f32_into::<LittleEndian>(&mut buf[..take])
                .map_err(truncated)?;
            vectors.extend_from_slice(&buf[..take]);
            remaining -= take;
        }

        Self::from_vectors(d as usize, metric, vectors)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Exact k-nearest-neighbour search.
    ///
    /// Returns `min(k, len)` entries, best first; ties keep the lower
    /// position first. A `k` above the index size is not an error.
    ///
    /// # Errors
    /// - `RagError::InvalidTopK` if `k == 0`
    /// - `RagError::VectorSizeMismatch` if `query.len() != dim`
    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchResult, RagError> {
        if k == 0 {
            return Err(RagError::InvalidTopK(0));
        }
        if query.len() != self.dim {
            return Err(RagError::VectorSizeMismatch {
                got: query.len(),
                want: self.dim,
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, v)| (self.score(query, v), i))
            .collect();

        let metric = self.metric;
        let order = |a: &(f32, usize), b: &(f32, usize)| -> Ordering {
            let by_score = match metric {
                MetricKind::L2 => a.0.total_cmp(&b.0),
                MetricKind::InnerProduct => b.0.total_cmp(&a.0),
            };
            by_score.then(a.1.cmp(&b.1))
        };

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(order);

        let (distances, labels): (Vec<f32>, Vec<i64>) =
            scored.into_iter().map(|(score, i)| (score, i as i64)).unzip();

        debug!(k, hits = labels.len(), "flat index search");
        Ok(SearchResult { distances, labels })
    }

    fn score(&self, q: &[f32], v: &[f32]) -> f32 {
        match self.metric {
            MetricKind::L2 => q.iter().zip(v).map(|(a, b)| (a - b) * (a - b)).sum(),
            MetricKind::InnerProduct => q.iter().zip(v).map(|(a, b)| a * b).sum(),
        }
    }
}

fn truncated(e: io::Error) -> RagError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        RagError::IndexFormat("truncated index file".into())
    } else {
        RagError::Io(e)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    /// Serializes vectors in the flat-index layout.
    pub(crate) fn encode(fourcc: &[u8; 4], metric: i32, dim: i32, vectors: &[f32]) -> Vec<u8> {
        let ntotal = vectors.len() as i64 / dim as i64;
        encode_raw(fourcc, metric, dim, ntotal, vectors)
    }

    /// Like [`encode`] but with a caller-chosen vector count in the header.
    fn encode_raw(
        fourcc: &[u8; 4],
        metric: i32,
        dim: i32,
        ntotal: i64,
        vectors: &[f32],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(fourcc);
        out.write_i32::<LittleEndian>(dim).unwrap();
        out.write_i64::<LittleEndian>(ntotal).unwrap();
        out.write_i64::<LittleEndian>(1 << 20).unwrap();
        out.write_i64::<LittleEndian>(1 << 20).unwrap();
        out.write_u8(1).unwrap();
        out.write_i32::<LittleEndian>(metric).unwrap();
        out.write_u64::<LittleEndian>(ntotal as u64 * dim as u64).unwrap();
        for v in vectors {
            out.write_f32::<LittleEndian>(*v).unwrap();
        }
        out
    }

    fn line_index() -> FlatIndex {
        // Points on a line: 0, 1, 2, 3 (dim 2).
        let bytes = encode(b"IxF2", 1, 2, &[0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        FlatIndex::read_from(bytes.as_slice()).unwrap()
    }

    #[test]
    fn reads_header_and_vectors() {
        let idx = line_index();
        assert_eq!(idx.dim(), 2);
        assert_eq!(idx.len(), 4);
        assert_eq!(idx.metric(), MetricKind::L2);
    }

    #[test]
    fn l2_results_are_ordered_by_distance() {
        let idx = line_index();
        let res = idx.search(&[2.2, 0.0], 3).unwrap();
        assert_eq!(res.labels, vec![2, 3, 1]);
        assert!(res.distances[0] < res.distances[1]);
    }

    #[test]
    fn ties_keep_lower_position_first() {
        let idx = line_index();
        let res = idx.search(&[1.5, 0.0], 2).unwrap();
        assert_eq!(res.labels, vec![1, 2]);
    }

    #[test]
    fn k_larger_than_index_returns_every_vector() {
        let idx = line_index();
        let res = idx.search(&[0.0, 0.0], 6).unwrap();
        assert_eq!(res.labels, vec![0, 1, 2, 3]);
        assert_eq!(res.distances.len(), 4);
    }

    #[test]
    fn huge_k_does_not_allocate_k_entries() {
        let idx = line_index();
        let res = idx.search(&[3.0, 0.0], 1 << 62).unwrap();
        assert_eq!(res.labels, vec![3, 2, 1, 0]);
    }

    #[test]
    fn inner_product_prefers_larger_scores() {
        let bytes = encode(b"IxFI", 0, 2, &[1.0, 0.0, 0.0, 1.0, 0.7, 0.7]);
        let idx = FlatIndex::read_from(bytes.as_slice()).unwrap();
        let res = idx.search(&[0.0, 1.0], 2).unwrap();
        assert_eq!(res.labels, vec![1, 2]);
    }

    #[test]
    fn zero_k_and_wrong_dimension_fail() {
        let idx = line_index();
        assert!(matches!(idx.search(&[0.0, 0.0], 0), Err(RagError::InvalidTopK(0))));
        assert!(matches!(
            idx.search(&[0.0, 0.0, 0.0], 1),
            Err(RagError::VectorSizeMismatch { got: 3, want: 2 })
        ));
    }

    #[test]
    fn rejects_unknown_index_type() {
        let bytes = encode(b"IHNf", 1, 2, &[0.0, 0.0]);
        let err = FlatIndex::read_from(bytes.as_slice()).unwrap_err();
        assert!(err.to_string().contains("unsupported index type"));
    }

    #[test]
    fn rejects_metric_contradicting_fourcc() {
        let bytes = encode(b"IxF2", 0, 2, &[0.0, 0.0]);
        assert!(FlatIndex::read_from(bytes.as_slice()).is_err());
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut bytes = encode(b"IxF2", 1, 2, &[0.0, 0.0, 1.0, 1.0]);
        bytes.truncate(bytes.len() - 3);
        let err = FlatIndex::read_from(bytes.as_slice()).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn empty_index_returns_nothing() {
        let idx = FlatIndex::from_vectors(3, MetricKind::L2, Vec::new()).unwrap();
        let res = idx.search(&[0.0, 0.0, 0.0], 2).unwrap();
        assert!(res.labels.is_empty());
        assert!(res.distances.is_empty());
    }

    #[test]
    fn oversized_header_with_short_payload_is_truncated() {
        // Header claims 2^40 vectors; only two floats follow.
        let bytes = encode_raw(b"IxF2", 1, 2, 1 << 40, &[0.0, 1.0]);
        let err = FlatIndex::read_from(bytes.as_slice()).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn payload_spanning_several_chunks_is_read_whole() {
        let floats: Vec<f32> = (0..READ_CHUNK + 10).map(|i| i as f32).collect();
        let bytes = encode(b"IxF2", 1, 1, &floats);
        let idx = FlatIndex::read_from(bytes.as_slice()).unwrap();
        assert_eq!(idx.len(), READ_CHUNK + 10);
        let res = idx.search(&[(READ_CHUNK + 9) as f32], 1).unwrap();
        assert_eq!(res.labels, vec![(READ_CHUNK + 9) as i64]);
    }
}
