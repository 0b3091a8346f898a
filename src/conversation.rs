// ABOUTME: Persona chat proxy that frames the history with the persona and situation context
// ABOUTME: Any completion fault is logged and replaced with a fixed fallback reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation Proxy
//!
//! Stateless: the caller supplies the ordered history and exchange index on
//! every turn. Nothing here is persisted.

use std::time::Instant;

use tracing::warn;
use wayfinder_core::constants::chat::{FALLBACK_REPLY, MAX_EXCHANGES};
use wayfinder_core::errors::AppError;

use crate::config::CompletionSettings;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::logging::FlowLogger;
use crate::personas::Persona;

/// Outcome of one persona reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text shown to the participant
    pub content: String,
    /// The fallback sentence replaced a failed completion
    pub fallback: bool,
}

impl Reply {
    fn fallback() -> Self {
        Self {
            content: FALLBACK_REPLY.to_owned(),
            fallback: true,
        }
    }
}

/// Compose the system instruction for exchange `exchange` (1-based)
#[must_use]
pub fn build_system_instruction(persona_prompt: &str, situation: &str, exchange: u32) -> String {
    let pacing = if exchange >= MAX_EXCHANGES {
        "This is the final exchange - provide a thoughtful conclusion.".to_owned()
    } else {
        format!(
            "You have {} exchanges remaining.",
            MAX_EXCHANGES - exchange
        )
    };

    format!(
        "{persona_prompt}\n\n\
         CONTEXT: The user has described their situation as: \"{situation}\"\n\n\
         This is conversation exchange {exchange}/{MAX_EXCHANGES}. {pacing}\n\n\
         Stay in character and respond according to your defined persona and approach."
    )
}

/// Forwards a bounded chat history to the completion provider
pub struct ConversationProxy<'a> {
    provider: Option<&'a dyn LlmProvider>,
    settings: CompletionSettings,
}

impl<'a> ConversationProxy<'a> {
    /// Proxy over an optional provider; `None` means no credential is configured
    #[must_use]
    pub const fn new(provider: Option<&'a dyn LlmProvider>, settings: CompletionSettings) -> Self {
        Self { provider, settings }
    }

    /// Produce the persona's reply; never fails
    pub async fn reply(
        &self,
        persona: &Persona,
        situation: &str,
        history: &[ChatMessage],
        exchange: u32,
    ) -> Reply {
        match self.try_reply(persona, situation, history, exchange).await {
            Ok(content) => Reply {
                content,
                fallback: false,
            },
            Err(e) => {
                warn!(
                    persona = %persona.key,
                    exchange,
                    error = %e,
                    "Chat completion failed, using fallback reply"
                );
                Reply::fallback()
            }
        }
    }

    async fn try_reply(
        &self,
        persona: &Persona,
        situation: &str,
        history: &[ChatMessage],
        exchange: u32,
    ) -> Result<String, AppError> {
        let provider = self
            .provider
            .ok_or_else(|| AppError::config("OpenAI API key not configured"))?;

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(build_system_instruction(
            persona.system_prompt,
            situation,
            exchange,
        )));
        messages.extend_from_slice(history);

        let request = ChatRequest::new(messages)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature);

        let started = Instant::now();
        let result = provider.complete(&request).await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        FlowLogger::log_completion("chat", provider.name(), result.is_ok(), elapsed);

        let content = result?.content;
        if content.trim().is_empty() {
            return Err(AppError::external_service(
                "OpenAI",
                "No response content returned",
            ));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, LlmCapabilities};
    use crate::personas;
    use async_trait::async_trait;
    use wayfinder_core::models::PersonaKey;

    struct Canned(Result<&'static str, ()>);

    #[async_trait]
    impl LlmProvider for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn display_name(&self) -> &'static str {
            "Canned"
        }

        fn capabilities(&self) -> LlmCapabilities {
            LlmCapabilities::SYSTEM_MESSAGES
        }

        fn default_model(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
            assert_eq!(request.messages[0].role.as_str(), "system");
            assert_eq!(request.max_tokens, Some(300));
            self.0
                .map(|content| ChatResponse {
                    content: content.to_owned(),
                    model: "canned".to_owned(),
                    usage: None,
                    finish_reason: Some("stop".to_owned()),
                })
                .map_err(|()| AppError::external_service("OpenAI", "boom"))
        }
    }

    const SETTINGS: CompletionSettings = CompletionSettings {
        max_tokens: 300,
        temperature: 0.8,
    };

    #[test]
    fn test_instruction_counts_remaining_exchanges() {
        let text = build_system_instruction("PROMPT", "my exam", 3);
        assert!(text.starts_with("PROMPT\n\nCONTEXT: The user has described their situation as: \"my exam\""));
        assert!(text.contains("This is conversation exchange 3/10. You have 7 exchanges remaining."));
        assert!(text.ends_with("Stay in character and respond according to your defined persona and approach."));
    }

    #[test]
    fn test_instruction_final_exchange() {
        let text = build_system_instruction("PROMPT", "s", 10);
        assert!(text.contains(
            "This is conversation exchange 10/10. This is the final exchange - provide a thoughtful conclusion."
        ));
    }

    #[tokio::test]
    async fn test_reply_passes_content_through() {
        let provider = Canned(Ok("You can do this."));
        let proxy = ConversationProxy::new(Some(&provider), SETTINGS);
        let persona = personas::get(PersonaKey::SycophanticCompanion);

        let reply = proxy
            .reply(persona, "situation", &[ChatMessage::user("hi")], 1)
            .await;
        assert_eq!(reply.content, "You can do this.");
        assert!(!reply.fallback);
    }

    #[tokio::test]
    async fn test_faults_become_fallback() {
        let persona = personas::get(PersonaKey::AntagonisticSelf);
        let history = [ChatMessage::user("hi")];

        let missing = ConversationProxy::new(None, SETTINGS)
            .reply(persona, "s", &history, 1)
            .await;
        assert_eq!(missing.content, FALLBACK_REPLY);
        assert!(missing.fallback);

        let failing = Canned(Err(()));
        let errored = ConversationProxy::new(Some(&failing), SETTINGS)
            .reply(persona, "s", &history, 1)
            .await;
        assert!(errored.fallback);

        let blank = Canned(Ok("  "));
        let empty = ConversationProxy::new(Some(&blank), SETTINGS)
            .reply(persona, "s", &history, 1)
            .await;
        assert_eq!(empty.content, FALLBACK_REPLY);
    }
}
