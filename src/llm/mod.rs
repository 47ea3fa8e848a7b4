//! LLM integration for BizMart.
//!
//! Uses rig-core's OpenRouter client for transport and [`RigAdapter`] to
//! bridge rig's `CompletionModel` to our [`LlmProvider`] trait. The intake
//! flow only uses the model to rephrase questions, so a missing API key
//! degrades to [`PassthroughRewriter`] instead of failing startup.

pub mod provider;
pub mod rewrite;
mod rig_adapter;

pub use provider::*;
pub use rewrite::{LlmToneRewriter, PassthroughRewriter, ToneRewriter, rewrite_or_fallback};
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::error::LlmError;

/// Create an OpenRouter-backed provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openrouter;

    let client: openrouter::Client =
        openrouter::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "openrouter".to_string(),
                reason: format!("Failed to create OpenRouter client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    info!("Using OpenRouter (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "openrouter")))
}

/// Build the tone rewriter for an optional LLM configuration.
pub fn create_rewriter(config: Option<LlmConfig>) -> Arc<dyn ToneRewriter> {
    let Some(config) = config else {
        info!("No LLM API key configured, questions are sent verbatim");
        return Arc::new(PassthroughRewriter);
    };
    match create_provider(&config) {
        Ok(provider) => Arc::new(LlmToneRewriter::new(provider)),
        Err(e) => {
            warn!(error = %e, "LLM provider unavailable, questions are sent verbatim");
            Arc::new(PassthroughRewriter)
        }
    }
}
