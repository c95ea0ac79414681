//! Runtime configuration for the dataset and the vector index.

use std::path::PathBuf;

use crate::errors::RagError;

/// Locations and parsing options of the two artifacts loaded at startup.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Delimited dataset file, e.g. `hotel_bookings.csv`.
    pub dataset_path: PathBuf,
    /// Single-byte field delimiter of the dataset file.
    pub delimiter: u8,
    /// Flat vector index file, e.g. `faiss_index.bin`.
    pub index_path: PathBuf,
}

impl RagConfig {
    /// Creates a config with the default delimiter (`,`).
    pub fn new(dataset_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            delimiter: b',',
            index_path: index_path.into(),
        }
    }

    /// Reads `BOOKINGS_CSV`, `CSV_DELIMITER` and `VECTOR_INDEX_PATH`.
    ///
    /// # Errors
    /// Returns `RagError::Config` for a delimiter that is not a single ASCII byte.
    pub fn from_env() -> Result<Self, RagError> {
        let dataset_path = env("BOOKINGS_CSV", "hotel_bookings.csv");
        let index_path = env("VECTOR_INDEX_PATH", "faiss_index.bin");
        let delimiter = parse_delimiter(&env("CSV_DELIMITER", ","))?;

        let cfg = Self {
            dataset_path: dataset_path.into(),
            delimiter,
            index_path: index_path.into(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.dataset_path.as_os_str().is_empty() {
            return Err(RagError::Config("dataset path is empty".into()));
        }
        if self.index_path.as_os_str().is_empty() {
            return Err(RagError::Config("index path is empty".into()));
        }
        if self.delimiter == b'"' || self.delimiter == b'\n' {
            return Err(RagError::Config("delimiter cannot be a quote or newline".into()));
        }
        Ok(())
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

fn parse_delimiter(raw: &str) -> Result<u8, RagError> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(RagError::Config(format!(
            "CSV_DELIMITER must be a single ASCII character, got {other:?}"
        ))),
    }
}
