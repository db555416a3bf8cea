use super::types::PromptPart;
use crate::{Error, Result, config::LlmConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A hosted model that turns an ordered list of prompt parts into text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String>;
}

/// Client for any OpenAI-compatible chat completions endpoint.
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiModel {
    pub fn new(config: LlmConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(Error::NotConfigured);
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url.trim_end_matches('/'));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        // async-openai retries rate limits and server errors by default;
        // a zero budget makes every failure surface on the first attempt.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retry);

        Ok(Self {
            client,
            model: config.model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeModel for OpenAiModel {
    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String> {
        debug!(
            "Generating content from {} prompt parts with model {}",
            parts.len(),
            self.model
        );

        // PNG encoding of image parts is CPU bound.
        let content = crate::imaging::run_blocking(move || {
            parts
                .iter()
                .map(PromptPart::to_openai_part)
                .collect::<Result<Vec<_>>>()
        })
        .await?;

        let message = openai_types::ChatCompletionRequestUserMessageArgs::default()
            .content(openai_types::ChatCompletionRequestUserMessageContent::Array(
                content,
            ))
            .build()?;

        let request = openai_types::CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()?;

        let response = self.client.chat().create(request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| Error::llm("Model returned no text content"))?;

        Ok(text)
    }
}
