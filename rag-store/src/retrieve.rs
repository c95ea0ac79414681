//! Retrieval helpers: query embedding, index search and row lookup.

use tracing::{debug, trace};

use crate::dataset::BookingStore;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::flat_index::{FlatIndex, SearchResult};
use crate::record::{RagHit, RagQuery};

/// Embeds the query text, searches the index and maps positions to rows.
///
/// # Errors
/// Returns embedding/provider errors, `InvalidTopK` or a dimension mismatch.
pub async fn rag_context(
    store: &BookingStore,
    index: &FlatIndex,
    query: RagQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<RagHit>, RagError> {
    trace!(top_k = query.top_k, "retrieve::rag_context");

    let qv = provider.embed(query.text).await?;
    let found = index.search(&qv, query.top_k)?;
    let hits = collect_rows(store, &found);

    debug!(requested = query.top_k, hits = hits.len(), "retrieved context rows");
    Ok(hits)
}

/// Keeps positions inside `0..store.len()` in result order; negative and
/// out-of-range positions are dropped.
pub fn collect_rows(store: &BookingStore, found: &SearchResult) -> Vec<RagHit> {
    found
        .labels
        .iter()
        .zip(&found.distances)
        .filter_map(|(&label, &score)| {
            let position = usize::try_from(label).ok()?;
            let record = store.record(position)?;
            Some(RagHit {
                position,
                score,
                record,
            })
        })
        .collect()
}
