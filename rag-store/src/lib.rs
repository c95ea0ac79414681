//! Data layer of the hotel insights backend.
//!
//! This crate provides:
//! - The booking dataset loaded once from a delimited file
//! - Descriptive analytics over that dataset
//! - An exact flat vector index read from a prebuilt file
//! - Retrieval of the top-K rows most similar to a textual query
//!
//! Row order is the contract between the two artifacts: index position `i`
//! refers to dataset row `i`. Both must be built from the same ordering.

mod analytics;
mod config;
mod dataset;
mod embed;
mod errors;
mod flat_index;
mod record;
mod retrieve;

pub use analytics::{AnalyticsReport, NOT_AVAILABLE, Stat, build_report};
pub use config::RagConfig;
pub use dataset::BookingStore;
pub use embed::{EmbeddingsProvider, llm_embedder::LlmEmbedder};
pub use errors::RagError;
pub use flat_index::{FlatIndex, MetricKind, SearchResult};
pub use record::{BookingRecord, RagHit, RagQuery};

use tracing::{trace, warn};

/// Read-only facade over the dataset and the vector index.
///
/// Built once at startup and shared by all requests.
pub struct RagStore {
    dataset: Option<BookingStore>,
    index: FlatIndex,
}

impl RagStore {
    /// Loads both artifacts described by `cfg`.
    ///
    /// A missing or empty dataset file is not an error: the store starts
    /// without data and every data operation reports `DatasetUnavailable`.
    ///
    /// # Errors
    /// Returns `RagError::IndexFormat` if the index cannot be read, and
    /// I/O or CSV errors for a dataset file that exists but is malformed.
    pub fn open(cfg: &RagConfig) -> Result<Self, RagError> {
        trace!(
            dataset = %cfg.dataset_path.display(),
            index = %cfg.index_path.display(),
            "RagStore::open"
        );
        let dataset = BookingStore::load(&cfg.dataset_path, cfg.delimiter)?;
        if dataset.is_none() {
            warn!(path = %cfg.dataset_path.display(), "dataset not loaded; data endpoints will fail");
        }
        let index = FlatIndex::open(&cfg.index_path)?;
        Ok(Self::from_parts(dataset, index))
    }

    /// Wires already loaded artifacts.
    pub fn from_parts(dataset: Option<BookingStore>, index: FlatIndex) -> Self {
        if let Some(ds) = &dataset {
            if ds.len() != index.len() {
                warn!(
                    rows = ds.len(),
                    vectors = index.len(),
                    "dataset and index sizes differ; positions may not line up"
                );
            }
        }
        Self { dataset, index }
    }

    /// The loaded dataset.
    ///
    /// # Errors
    /// `RagError::DatasetUnavailable` when nothing was loaded at startup.
    pub fn dataset(&self) -> Result<&BookingStore, RagError> {
        self.dataset.as_ref().ok_or(RagError::DatasetUnavailable)
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Builds the analytics report over the whole dataset.
    pub fn report(&self) -> Result<AnalyticsReport, RagError> {
        build_report(self.dataset()?)
    }

    /// Builds RAG context for a textual query using the provided embedding provider.
    ///
    /// # Errors
    /// Returns `DatasetUnavailable`, `InvalidTopK`, embedding errors or a
    /// dimension mismatch between the query vector and the index.
    pub async fn rag_context(
        &self,
        query: RagQuery<'_>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<Vec<RagHit>, RagError> {
        trace!(top_k = query.top_k, "RagStore::rag_context");
        let dataset = self.dataset()?;
        retrieve::rag_context(dataset, &self.index, query, provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("rag-store-{nanos}-{name}"))
    }

    #[test]
    fn open_without_dataset_reports_unavailable() {
        let index_path = temp_path("index.bin");
        let bytes = flat_index::tests::encode(b"IxF2", 1, 2, &[0.0, 0.0]);
        std::fs::File::create(&index_path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();

        let cfg = RagConfig::new(temp_path("missing.csv"), &index_path);
        let store = RagStore::open(&cfg).unwrap();
        assert!(matches!(store.report(), Err(RagError::DatasetUnavailable)));
        assert_eq!(store.report().unwrap_err().to_string(), "Dataset not loaded.");
        assert_eq!(store.index().len(), 1);

        std::fs::remove_file(index_path).ok();
    }

    #[test]
    fn open_fails_when_index_is_missing() {
        let cfg = RagConfig::new(temp_path("a.csv"), temp_path("missing.bin"));
        assert!(matches!(RagStore::open(&cfg), Err(RagError::IndexFormat(_))));
    }

    #[test]
    fn report_over_loaded_dataset() {
        let ds = BookingStore::from_reader("hotel,price\nA,1\nA,3\n".as_bytes(), b',')
            .unwrap();
        let index = FlatIndex::from_vectors(1, MetricKind::L2, vec![0.0, 1.0]).unwrap();
        let store = RagStore::from_parts(ds, index);
        let report = store.report().unwrap();
        assert_eq!(report.total_bookings, 2);
        assert_eq!(report.average_price, Stat::Value(Some(2.0)));
    }
}
