use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider::{AdviceError, CompletionRequest, SuggestionProvider};
use crate::config::AdviceSettings;

const SYSTEM_PREAMBLE: &str = "You are a medical assistant.";
const TEMPERATURE: f32 = 0.7;
const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize)]
struct ChatCompletionCall<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireReplyMessage,
}

#[derive(Debug, Deserialize)]
struct WireReplyMessage {
    content: Option<String>,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    /// Builds a client when an API key is configured. `Ok(None)` means
    /// suggestions are disabled for this process.
    pub fn from_settings(settings: &AdviceSettings) -> Result<Option<Self>, AdviceError> {
        let api_key = match settings.api_key.clone() {
            Some(key) => key,
            None => return Ok(None),
        };

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(settings.call_timeout())
            .build()
            .map_err(AdviceError::Build)?;

        Ok(Some(Self {
            http,
            base_url: settings.base_url.clone(),
            api_key,
            model: settings.model.clone(),
        }))
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SuggestionProvider for CompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AdviceError> {
        let call = ChatCompletionCall {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: SYSTEM_PREAMBLE,
                },
                WireMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&call)
            .send()
            .await
            .map_err(AdviceError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdviceError::Status(status.as_u16()));
        }

        let reply: ChatCompletionReply = response.json().await.map_err(AdviceError::Transport)?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AdviceError::EmptyCompletion)
    }
}
