//! Text-generation collaborator used by the conversation driver.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, TextStream};

use super::model::TripData;
use super::prompts;

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.8;
const REPLY_MAX_TOKENS: u32 = 1024;
const ITINERARY_MAX_TOKENS: u32 = 8192;

/// Produces conversational replies and full itineraries.
#[async_trait]
pub trait TravelAssistant: Send + Sync {
    /// Reply to `prompt` given the most recent transcript entries.
    async fn generate_reply(
        &self,
        prompt: &str,
        prior_turns: &[ChatMessage],
    ) -> Result<String, LlmError>;

    /// Streamed form of [`TravelAssistant::generate_reply`].
    ///
    /// Default implementation yields the whole reply as one chunk.
    async fn stream_reply(
        &self,
        prompt: &str,
        prior_turns: &[ChatMessage],
    ) -> Result<TextStream, LlmError> {
        let reply = self.generate_reply(prompt, prior_turns).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(reply) })))
    }

    /// Markdown itinerary for a complete trip.
    async fn generate_itinerary(&self, trip: &TripData) -> Result<String, LlmError>;
}

/// Drain a reply stream into one string. Any chunk error fails the reply.
pub async fn collect_stream(mut stream: TextStream) -> Result<String, LlmError> {
    let mut buffer = String::new();
    while let Some(chunk) = stream.next().await {
        buffer.push_str(&chunk?);
    }
    Ok(buffer)
}

/// `TravelAssistant` backed by two LLM providers: a fast one for chat and a
/// stronger one for itineraries.
pub struct LlmTravelAssistant {
    chat: Arc<dyn LlmProvider>,
    itinerary: Arc<dyn LlmProvider>,
}

impl LlmTravelAssistant {
    pub fn new(chat: Arc<dyn LlmProvider>, itinerary: Arc<dyn LlmProvider>) -> Self {
        Self { chat, itinerary }
    }

    fn reply_request(prompt: &str, prior_turns: &[ChatMessage]) -> CompletionRequest {
        let mut messages = Vec::with_capacity(prior_turns.len() + 2);
        messages.push(ChatMessage::system(prompts::SYSTEM_PROMPT));
        messages.extend(prior_turns.iter().cloned());
        messages.push(ChatMessage::user(prompt));
        CompletionRequest::new(messages)
            .with_temperature(TEMPERATURE)
            .with_top_p(TOP_P)
            .with_max_tokens(REPLY_MAX_TOKENS)
    }
}

#[async_trait]
impl TravelAssistant for LlmTravelAssistant {
    async fn generate_reply(
        &self,
        prompt: &str,
        prior_turns: &[ChatMessage],
    ) -> Result<String, LlmError> {
        let response = self
            .chat
            .complete(Self::reply_request(prompt, prior_turns))
            .await?;
        non_empty(self.chat.model_name(), response.content)
    }

    async fn stream_reply(
        &self,
        prompt: &str,
        prior_turns: &[ChatMessage],
    ) -> Result<TextStream, LlmError> {
        self.chat
            .complete_stream(Self::reply_request(prompt, prior_turns))
            .await
    }

    async fn generate_itinerary(&self, trip: &TripData) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT),
            ChatMessage::user(prompts::itinerary_prompt(trip)),
        ])
        .with_temperature(TEMPERATURE)
        .with_top_p(TOP_P)
        .with_max_tokens(ITINERARY_MAX_TOKENS);

        tracing::debug!(
            "Requesting itinerary from {} for {:?}",
            self.itinerary.model_name(),
            trip.destination
        );
        let response = self.itinerary.complete(request).await?;
        non_empty(self.itinerary.model_name(), response.content)
    }
}

fn non_empty(provider: &str, content: String) -> Result<String, LlmError> {
    if content.trim().is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "empty completion".to_string(),
        });
    }
    Ok(content)
}
