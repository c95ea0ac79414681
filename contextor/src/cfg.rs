//! Runtime configuration loaded from environment variables.

use tracing::warn;

/// Neighbours fetched when the caller does not pass `k`.
pub const DEFAULT_TOP_K: i64 = 5;

/// Config bag for the orchestrator. All fields have defaults via `from_env`.
#[derive(Clone, Debug)]
pub struct ContextorConfig {
    pub default_top_k: i64,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

impl ContextorConfig {
    /// Reads `RAG_TOP_K`; unparsable or non-positive values fall back to 5.
    ///
    /// # Example
    /// ```
    /// use contextor::ContextorConfig;
    /// let cfg = ContextorConfig::from_env();
    /// assert!(cfg.default_top_k >= 1);
    /// ```
    pub fn from_env() -> Self {
        let default_top_k = match parse::<i64>("RAG_TOP_K") {
            Some(k) if k >= 1 => k,
            Some(k) => {
                warn!(k, "RAG_TOP_K must be positive; using {DEFAULT_TOP_K}");
                DEFAULT_TOP_K
            }
            None => DEFAULT_TOP_K,
        };
        Self { default_top_k }
    }
}

fn parse<T: std::str::FromStr>(k: &str) -> Option<T> {
    std::env::var(k).ok().and_then(|v| v.trim().parse().ok())
}
