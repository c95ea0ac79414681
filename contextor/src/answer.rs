use std::{future::Future, pin::Pin};

use ai_llm_service::LlmServiceProfiles;

use crate::error::ContextorError;

/// Text-generation backend that turns a prompt into an answer.
pub trait AnswerProvider: Send + Sync {
    fn answer<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>>;
}

/// Uses the **generation** profile.
impl AnswerProvider for LlmServiceProfiles {
    fn answer<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.generate(prompt).await?) })
    }
}
