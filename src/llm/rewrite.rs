//! Tone rewriting for outgoing questions.
//!
//! Cosmetic only: a rewrite that looks like it changed the question is
//! discarded, and every failure falls back to the canonical text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LlmError;

use super::provider::{ChatMessage, CompletionRequest, LlmProvider};

const REWRITE_SYSTEM_PROMPT: &str = "\
You are $BizMart, a savvy AI agent helping tokenize ideas, businesses, and careers. \
Your tone is energetic, professional but edgy, and encouraging. \
Rewrite the question you are given in that voice. Keep its meaning exactly. \
Do not add questions, options, or instructions. Output only the rewritten question.";

/// Rewrites a question's phrasing without changing its meaning.
#[async_trait]
pub trait ToneRewriter: Send + Sync {
    async fn rewrite(&self, question: &str) -> Result<String, LlmError>;
}

/// Returns questions unchanged.
pub struct PassthroughRewriter;

#[async_trait]
impl ToneRewriter for PassthroughRewriter {
    async fn rewrite(&self, question: &str) -> Result<String, LlmError> {
        Ok(question.to_string())
    }
}

/// LLM-backed rewriter.
pub struct LlmToneRewriter {
    llm: Arc<dyn LlmProvider>,
}

impl LlmToneRewriter {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ToneRewriter for LlmToneRewriter {
    async fn rewrite(&self, question: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(REWRITE_SYSTEM_PROMPT),
            ChatMessage::user(question),
        ])
        .with_max_tokens(200)
        .with_temperature(0.7);
        let response = self.llm.complete(request).await?;
        debug!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Question rewritten"
        );
        Ok(response.content.trim().to_string())
    }
}

/// Whether `candidate` is an acceptable rewrite of `canonical`.
///
/// A rewrite may not carry more `?` than the canonical text, so an
/// instruction like "Drop a USDC address." must stay an instruction.
pub fn is_faithful_rewrite(canonical: &str, candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.contains('\n') {
        return false;
    }
    let questions = |s: &str| s.matches('?').count();
    if questions(candidate) > questions(canonical) {
        return false;
    }
    candidate.chars().count() <= canonical.chars().count() * 4
}

/// Rewrite with a bounded timeout, falling back to `canonical` on any failure.
pub async fn rewrite_or_fallback(
    rewriter: &dyn ToneRewriter,
    canonical: &str,
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, rewriter.rewrite(canonical)).await {
        Ok(Ok(candidate)) if is_faithful_rewrite(canonical, &candidate) => {
            candidate.trim().to_string()
        }
        Ok(Ok(candidate)) => {
            debug!(candidate = %candidate, "Discarding rewrite that strays from the question");
            canonical.to_string()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Tone rewrite failed, using canonical question");
            canonical.to_string()
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Tone rewrite timed out, using canonical question");
            canonical.to_string()
        }
    }
}
