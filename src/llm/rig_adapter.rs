//! Bridges a rig `CompletionModel` to [`LlmProvider`].

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::message::{AssistantContent, Message};

use crate::error::LlmError;

use super::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};

pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

/// System messages become the preamble; the last user message is the prompt
/// and earlier ones are history.
fn split_request(request: &CompletionRequest) -> (Option<String>, Vec<Message>, Option<Message>) {
    let system: Vec<&str> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let preamble = (!system.is_empty()).then(|| system.join("\n\n"));

    let mut turns: Vec<Message> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| Message::user(m.content.clone()))
        .collect();
    let prompt = turns.pop();
    (preamble, turns, prompt)
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (preamble, history, prompt) = split_request(&request);
        let prompt = prompt.ok_or_else(|| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: "request has no user message".to_string(),
        })?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");
        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.provider.to_string(),
                reason: "no text in completion".to_string(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        })
    }
}
