// ABOUTME: Bounded persona chat turn: logs both sides of an exchange and ends the chat at the limit
// ABOUTME: The exchange index comes from the log; the submitted history must agree with it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use wayfinder_core::constants::chat::MAX_EXCHANGES;
use wayfinder_core::constants::limits::CHAT_MESSAGE_MAX_CHARS;
use wayfinder_core::errors::{AppError, AppResult};
use wayfinder_core::models::{InteractionKind, PersonaKey, SessionId, Stage};

use super::requests::{session_id, ChatTurnMessage, ChatTurnRequest};
use super::{conflict, page_for, SessionFlow};
use crate::conversation::ConversationProxy;
use crate::database::GuardedWrite;
use crate::llm::{ChatMessage, MessageRole};
use crate::logging::FlowLogger;
use crate::personas;

/// Reply to one chat turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnOutcome {
    /// Persona reply (or the fallback sentence)
    pub content: String,
    /// 1-based exchange index of this turn
    pub exchange: u32,
    /// Exchange limit
    pub max_exchanges: u32,
    /// The limit was reached and the chat has ended
    pub complete: bool,
    /// Page to show next
    pub next: String,
}

/// Convert the submitted history, returning it with its user-turn count
fn validate_history(messages: &[ChatTurnMessage]) -> AppResult<(Vec<ChatMessage>, u32)> {
    let Some(last) = messages.last() else {
        return Err(AppError::missing_field("messages"));
    };
    if last.role != MessageRole::User.as_str() || last.content.trim().is_empty() {
        return Err(AppError::invalid_input(
            "messages must end with a non-empty user turn",
        ));
    }

    let mut history = Vec::with_capacity(messages.len());
    let mut exchange: u32 = 0;
    for message in messages {
        if message.content.chars().count() > CHAT_MESSAGE_MAX_CHARS {
            return Err(AppError::out_of_range(format!(
                "Chat messages must be at most {CHAT_MESSAGE_MAX_CHARS} characters"
            )));
        }
        match message.role.as_str() {
            "user" => {
                exchange += 1;
                history.push(ChatMessage::user(message.content.as_str()));
            }
            "assistant" => history.push(ChatMessage::assistant(message.content.as_str())),
            other => {
                return Err(AppError::invalid_input(format!(
                    "Unsupported message role: {other}"
                )))
            }
        }
    }

    if exchange > MAX_EXCHANGES {
        return Err(AppError::out_of_range(format!(
            "The conversation is limited to {MAX_EXCHANGES} exchanges"
        )));
    }
    Ok((history, exchange))
}

impl SessionFlow<'_> {
    /// Run one exchange of the persona chat
    ///
    /// The exchange index is the number of user turns already logged plus one,
    /// and the submitted history must end on exactly that turn. Logs the user
    /// turn, obtains a reply (never failing; faults become the fallback
    /// sentence), logs the reply, and on the final exchange ends the chat and
    /// advances to `post_landscape`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed history, not-found for an
    /// unknown session or persona, or a stage conflict outside the chat stage
    /// or when the history does not continue the logged conversation
    #[instrument(skip(self, request))]
    pub async fn chat_turn(&self, request: ChatTurnRequest) -> AppResult<ChatTurnOutcome> {
        let id = session_id(request.session_id.as_deref())?;
        let key: PersonaKey = request
            .persona
            .as_deref()
            .ok_or_else(|| AppError::missing_field("persona"))?
            .parse()?;
        let persona = personas::get(key);
        let (history, submitted) = validate_history(&request.messages)?;

        let database = &self.resources.database;
        let session = database
            .get_session(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {id}")))?;
        if session.current_step != Stage::Chat {
            return Err(conflict(id, session.current_step, Stage::Chat));
        }
        let situation = session.situation_description.unwrap_or_default();

        let logged = database
            .count_chat_messages(id, MessageRole::User.as_str())
            .await?;
        let exchange = u32::try_from(logged)
            .map_err(|_| AppError::internal("Chat message count out of range"))?
            + 1;
        if submitted != exchange {
            return Err(exchange_mismatch(id, exchange, submitted));
        }

        let user_text = history
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();
        self.log_chat_message(id, MessageRole::User, &user_text, key, exchange)
            .await?;

        let reply = ConversationProxy::new(self.resources.llm(), self.resources.config.chat)
            .reply(persona, &situation, &history, exchange)
            .await;

        self.log_chat_message(id, MessageRole::Assistant, &reply.content, key, exchange)
            .await?;

        let complete = exchange >= MAX_EXCHANGES;
        let next = if complete {
            self.complete_conversation(id, key).await?
        } else {
            page_for(Stage::Chat, id, Some(key))
        };

        info!(
            session.id = %id,
            persona = %key,
            exchange,
            fallback = reply.fallback,
            "Chat exchange"
        );
        Ok(ChatTurnOutcome {
            content: reply.content,
            exchange,
            max_exchanges: MAX_EXCHANGES,
            complete,
            next,
        })
    }

    /// Log one side of an exchange through the stage and exchange guard
    async fn log_chat_message(
        &self,
        id: SessionId,
        role: MessageRole,
        content: &str,
        persona: PersonaKey,
        exchange: u32,
    ) -> AppResult<()> {
        let database = &self.resources.database;
        let data = json!({
            "role": role,
            "content": content,
            "persona": persona,
            "conversationCount": exchange,
            "timestamp": Utc::now().to_rfc3339(),
        });
        if database
            .append_chat_message(id, role.as_str(), exchange, &data)
            .await?
            .is_some()
        {
            return Ok(());
        }

        // Lost to a concurrent finish or a concurrent turn
        match database.current_stage(id).await? {
            None => Err(AppError::not_found(format!("Session {id}"))),
            Some(Stage::Chat) => Err(exchange_mismatch(id, exchange + 1, exchange)),
            Some(stage) => Err(conflict(id, stage, Stage::Chat)),
        }
    }

    /// End the chat at the exchange limit; returns the page to show next
    async fn complete_conversation(&self, id: SessionId, persona: PersonaKey) -> AppResult<String> {
        let write = self
            .resources
            .database
            .advance_stage(id, Stage::Chat, Stage::PostLandscape)
            .await?;

        match write {
            GuardedWrite::Applied => {
                FlowLogger::log_stage_transition(
                    &id.to_string(),
                    Stage::Chat.as_str(),
                    Stage::PostLandscape.as_str(),
                );
                self.log(
                    id,
                    InteractionKind::ConversationCompleted,
                    &json!({
                        "totalExchanges": MAX_EXCHANGES,
                        "maxExchanges": MAX_EXCHANGES,
                        "persona": persona,
                        "timestamp": Utc::now().to_rfc3339(),
                    }),
                )
                .await?;
                Ok(page_for(Stage::PostLandscape, id, None))
            }
            // A concurrent early finish already moved the session on
            GuardedWrite::WrongStage(actual) => {
                FlowLogger::log_stage_conflict(
                    &id.to_string(),
                    Stage::Chat.as_str(),
                    actual.as_str(),
                );
                Ok(page_for(actual, id, None))
            }
            GuardedWrite::NotFound => Err(AppError::not_found(format!("Session {id}"))),
        }
    }
}

fn exchange_mismatch(id: SessionId, expected: u32, submitted: u32) -> AppError {
    warn!(
        session.id = %id,
        exchange.expected = expected,
        exchange.submitted = submitted,
        "Chat exchange out of sequence"
    );
    AppError::stage_conflict(format!(
        "Expected exchange {expected} of the conversation, got {submitted}"
    ))
    .with_details(json!({
        "currentStage": Stage::Chat,
        "expectedExchange": expected,
        "submittedExchange": submitted,
    }))
}
