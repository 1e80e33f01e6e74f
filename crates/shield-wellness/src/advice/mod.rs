//! Suggestion generation through an OpenAI-compatible completion service.

mod augmenter;
mod client;
mod provider;

pub use augmenter::{AdviceLimits, SuggestionAugmenter, FALLBACK_SUGGESTION};
pub use client::CompletionClient;
pub use provider::{AdviceError, CompletionRequest, SuggestionProvider};
