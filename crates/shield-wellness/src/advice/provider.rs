use async_trait::async_trait;

const SUGGESTION_TOKEN_BUDGET: u32 = 64;
const SUMMARY_TOKEN_BUDGET: u32 = 256;

/// One completion call: the user prompt plus its token budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Short, actionable patient suggestion for a single alert.
    pub fn suggestion(prompt: String) -> Self {
        Self {
            prompt,
            max_tokens: SUGGESTION_TOKEN_BUDGET,
        }
    }

    /// Longer-form lab report summary.
    pub fn summary(prompt: String) -> Self {
        Self {
            prompt,
            max_tokens: SUMMARY_TOKEN_BUDGET,
        }
    }
}

/// Seam to the completion backend so scoring and labs can be exercised
/// against stubs.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AdviceError>;
}

/// Failures talking to the advice service. These never reach client
/// responses; callers log them and substitute fallback text.
#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error("advice client could not be built: {0}")]
    Build(#[source] reqwest::Error),
    #[error("advice request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("advice service returned status {0}")]
    Status(u16),
    #[error("advice service returned an empty completion")]
    EmptyCompletion,
}
