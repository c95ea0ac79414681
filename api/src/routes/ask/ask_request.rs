use contextor::QaAnswer;
use serde::{Deserialize, Serialize};

/// Query string of /ask.
#[derive(Debug, Deserialize)]
pub struct AskParams {
    /// Natural language question.
    pub query: String,
    /// Number of rows to retrieve; server default when omitted.
    #[serde(default)]
    pub k: Option<i64>,
}

/// Response payload for /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Final model answer (plain text).
    pub answer: String,
    /// Seconds from embedding to answer, 4 decimal places.
    pub response_time: f64,
}

impl From<QaAnswer> for AskResponse {
    fn from(qa: QaAnswer) -> Self {
        Self {
            answer: qa.answer,
            response_time: qa.response_time,
        }
    }
}
