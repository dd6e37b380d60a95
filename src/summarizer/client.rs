//! Generation backend client.

use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client as OpenAIClient;
use async_trait::async_trait;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::config::Config;
use crate::TARGET_LLM_REQUEST;

/// The generation capability: prompt in, raw JSON document out. Abstracted so
/// the summarizer and the scheduler can be exercised with a fake backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Backend speaking the OpenAI-compatible chat completions protocol.
pub struct OpenAiBackend {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
    request_timeout: Duration,
}

impl OpenAiBackend {
    pub fn new(config: &Config) -> Self {
        let api_config = OpenAIConfig::new()
            .with_api_key(config.generation_api_key.clone())
            .with_api_base(config.generation_api_base.clone());
        OpenAiBackend {
            client: OpenAIClient::with_config(api_config),
            model: config.generation_model.clone(),
            // Generation is slower than plain HTTP; give it more room.
            request_timeout: config.request_timeout * 4,
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .temperature(0.5)
            .response_format(ResponseFormat::JsonObject)
            .build()?;

        debug!(target: TARGET_LLM_REQUEST, "Sending generation request to model {}", self.model);

        let response = timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow!("generation request timed out"))??;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("generation response contained no content"))?;

        debug!(target: TARGET_LLM_REQUEST, "Received {} bytes of generated content", content.len());
        Ok(content)
    }
}
