//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::Serialize;

/// Options for a single question.
///
/// # Example
/// ```
/// use contextor::AskOptions;
/// let opts = AskOptions { top_k: 8 };
/// assert_eq!(opts.top_k, 8);
/// assert_eq!(AskOptions::default().top_k, 5);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AskOptions {
    /// Number of neighbours to fetch. Values below 1 are rejected.
    pub top_k: i64,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            top_k: crate::cfg::DEFAULT_TOP_K,
        }
    }
}

/// Model answer and the wall-clock seconds spent producing it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    /// Seconds, rounded to 4 decimal places.
    pub response_time: f64,
}
