use rag_store::AnalyticsReport;
use serde::Serialize;

/// Response payload for /analytics.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub analytics: AnalyticsReport,
}
