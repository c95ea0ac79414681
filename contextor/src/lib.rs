//! Question answering over the booking dataset.
//!
//! Public API: [`ask`]. It embeds the question, retrieves the top-K rows from
//! `rag-store`, folds them into a single prompt, calls the answer model and
//! returns the answer with the elapsed time.

mod answer;
mod api_types;
mod cfg;
mod error;
mod prompt;

pub use answer::AnswerProvider;
pub use api_types::{AskOptions, QaAnswer};
pub use cfg::{ContextorConfig, DEFAULT_TOP_K};
pub use error::ContextorError;
pub use prompt::build_prompt;

use std::time::Instant;

use rag_store::{BookingRecord, EmbeddingsProvider, RagError, RagQuery, RagStore};
use tracing::{debug, error, info};

/// Answers `question` with the `opts.top_k` most similar booking rows as
/// context.
///
/// `response_time` covers embedding through generation and is rounded to
/// 4 decimal places. Nothing is retried.
///
/// # Errors
/// - `RagError::InvalidTopK` if `opts.top_k < 1`
/// - `RagError::DatasetUnavailable` if no dataset was loaded
/// - embedding, search, serialization or generation faults
pub async fn ask(
    store: &RagStore,
    embedder: &dyn EmbeddingsProvider,
    answerer: &dyn AnswerProvider,
    question: &str,
    opts: AskOptions,
) -> Result<QaAnswer, ContextorError> {
    let top_k = usize::try_from(opts.top_k)
        .ok()
        .filter(|k| *k >= 1)
        .ok_or(RagError::InvalidTopK(opts.top_k))?;

    let started = Instant::now();

    let hits = store
        .rag_context(
            RagQuery {
                text: question,
                top_k,
            },
            embedder,
        )
        .await
        .inspect_err(|e| error!(error = %e, "context retrieval failed"))?;
    debug!(
        positions = ?hits.iter().map(|h| h.position).collect::<Vec<_>>(),
        "context rows selected"
    );

    let records: Vec<BookingRecord> = hits.into_iter().map(|h| h.record).collect();
    let prompt = build_prompt(&records, question)?;

    let answer = answerer
        .answer(&prompt)
        .await
        .inspect_err(|e| error!(error = %e, "answer generation failed"))?;

    let response_time = round4(started.elapsed().as_secs_f64());
    info!(top_k, rows = records.len(), response_time, "question answered");

    Ok(QaAnswer {
        answer,
        response_time,
    })
}

fn round4(secs: f64) -> f64 {
    (secs * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{
        AiLlmError,
        error_handler::{Provider, ProviderError, ProviderErrorKind},
    };
    use rag_store::{BookingStore, FlatIndex, MetricKind};
    use std::{future::Future, pin::Pin, sync::Mutex};

    struct FixedEmbedder(Vec<f32>);

    impl EmbeddingsProvider for FixedEmbedder {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
            Box::pin(async move { Ok(self.0.clone()) })
        }
    }

    #[derive(Default)]
    struct RecordingAnswerer {
        prompts: Mutex<Vec<String>>,
    }

    impl AnswerProvider for RecordingAnswerer {
        fn answer<'a>(
            &'a self,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
            Box::pin(async move {
                self.prompts.lock().unwrap().push(prompt.to_string());
                Ok("The City Hotel.".to_string())
            })
        }
    }

    struct FailingAnswerer;

    impl AnswerProvider for FailingAnswerer {
        fn answer<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
            Box::pin(async {
                let kind = ProviderErrorKind::Decode("quota exceeded".into());
                Err(AiLlmError::from(ProviderError::new(Provider::Gemini, kind)).into())
            })
        }
    }

    /// Three rows; the index holds one extra vector with no matching row.
    fn store() -> RagStore {
        let ds = BookingStore::from_reader(
            "hotel,price\nCity Hotel,100\nResort Hotel,200\nBeach Inn,300\n".as_bytes(),
            b',',
        )
        .unwrap();
        let index =
            FlatIndex::from_vectors(1, MetricKind::L2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        RagStore::from_parts(ds, index)
    }

    fn opts(top_k: i64) -> AskOptions {
        AskOptions { top_k }
    }

    #[tokio::test]
    async fn answers_with_rows_in_rank_order() {
        let answerer = RecordingAnswerer::default();
        let qa = ask(&store(), &FixedEmbedder(vec![1.9]), &answerer, "Best?", opts(2))
            .await
            .unwrap();

        assert_eq!(qa.answer, "The City Hotel.");
        assert!(qa.response_time >= 0.0);
        let prompts = answerer.prompts.lock().unwrap();
        assert_eq!(
            prompts[0],
            r#"Using this data [{"hotel": "Beach Inn", "price": 300}, {"hotel": "Resort Hotel", "price": 200}], answer: Best?"#
        );
    }

    #[tokio::test]
    async fn positions_without_rows_are_skipped() {
        let answerer = RecordingAnswerer::default();
        // Nearest vector is position 3, which has no dataset row.
        ask(&store(), &FixedEmbedder(vec![3.0]), &answerer, "q", opts(2))
            .await
            .unwrap();
        let prompt = answerer.prompts.lock().unwrap()[0].clone();
        assert!(prompt.starts_with(r#"Using this data [{"hotel": "Beach Inn""#));
        assert_eq!(prompt.matches("\"hotel\"").count(), 1);
    }

    #[tokio::test]
    async fn k_larger_than_index_is_not_an_error() {
        let answerer = RecordingAnswerer::default();
        ask(&store(), &FixedEmbedder(vec![0.0]), &answerer, "q", opts(50))
            .await
            .unwrap();
        let prompt = answerer.prompts.lock().unwrap()[0].clone();
        for hotel in ["City Hotel", "Resort Hotel", "Beach Inn"] {
            assert_eq!(prompt.matches(hotel).count(), 1, "{hotel} once");
        }
    }

    #[tokio::test]
    async fn non_positive_k_is_rejected() {
        let err = ask(
            &store(),
            &FixedEmbedder(vec![0.0]),
            &RecordingAnswerer::default(),
            "q",
            opts(0),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "k must be a positive integer, got 0");
    }

    #[tokio::test]
    async fn answer_fault_propagates() {
        let err = ask(&store(), &FixedEmbedder(vec![0.0]), &FailingAnswerer, "q", opts(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextorError::Llm(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn missing_dataset_fails_before_embedding() {
        let index = FlatIndex::from_vectors(1, MetricKind::L2, vec![0.0]).unwrap();
        let store = RagStore::from_parts(None, index);
        let err = ask(
            &store,
            &FixedEmbedder(vec![0.0]),
            &RecordingAnswerer::default(),
            "q",
            AskOptions::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Dataset not loaded.");
    }

    #[test]
    fn rounds_to_four_places() {
        assert_eq!(round4(1.234_567), 1.2346);
        assert_eq!(round4(0.000_04), 0.0);
    }
}
