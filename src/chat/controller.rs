//! Chat confirmation controller
//!
//! Sends free-form chat to the backend and gates destructive actions. When
//! a reply asks to confirm a removal, the controller holds the server's
//! confirmation token and accepts only "yes" or "no" until answered:
//!
//! ```text
//! Idle ──(reply: confirming_removal + token)──> AwaitingConfirmation
//!   ▲                                               │
//!   ├──────────── "yes" (confirm call) ─────────────┤
//!   ├──────────── "no"  (no call) ──────────────────┤
//!   │                                   other input: re-prompt, stay
//! ```

use std::sync::Arc;

use super::marker::split_stage_marker;
use super::{ChatMessage, ChatSession, PendingConfirmation};
use crate::config::ConfirmationFailurePolicy;
use crate::error::{user_message, AssistantError, Result};
use crate::gateway::{ChatReply, ChatRequest, ConfirmRequest, Gateway, StructuredReply};
use crate::stage::Stage;

/// Shown when the user declines a destructive action
pub const CANCELLED_MESSAGE: &str = "Action cancelled.";

/// Shown when the answer to a confirmation is neither yes nor no
pub const REPROMPT_MESSAGE: &str = "Please type 'yes' or 'no'.";

const CONFIRMED_FALLBACK: &str = "Action completed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    Other,
}

impl Answer {
    fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            _ => Self::Other,
        }
    }
}

/// Chat front end with a yes/no gate for destructive actions
pub struct ChatConfirmationController {
    gateway: Arc<dyn Gateway>,
    session: ChatSession,
    failure_policy: ConfirmationFailurePolicy,
}

impl ChatConfirmationController {
    /// Create a controller with an empty transcript
    pub fn new(gateway: Arc<dyn Gateway>, failure_policy: ConfirmationFailurePolicy) -> Self {
        Self {
            gateway,
            session: ChatSession::default(),
            failure_policy,
        }
    }

    /// Transcript and pending confirmation
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Handle one line of user input
    ///
    /// Returns the messages appended during this turn, starting with the
    /// user's own message.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for empty input when no confirmation is
    /// pending. Gateway failures become error messages in the transcript.
    pub async fn submit(&mut self, input: &str) -> Result<Vec<ChatMessage>> {
        let start = self.session.messages.len();

        if let Some(pending) = self.session.pending_confirmation.clone() {
            self.session.messages.push(ChatMessage::user(input.trim()));
            self.answer_confirmation(&pending, Answer::parse(input)).await;
        } else {
            let text = input.trim();
            if text.is_empty() {
                return Err(AssistantError::Validation("Please enter a message".to_string()).into());
            }
            self.send_message(text).await;
        }

        Ok(self.session.messages[start..].to_vec())
    }

    async fn send_message(&mut self, text: &str) {
        let request = ChatRequest {
            message: text.to_string(),
            message_history: self.session.history(),
        };
        self.session.messages.push(ChatMessage::user(text));

        match self.gateway.send_chat(&request).await {
            Ok(reply) => self.apply_reply(reply),
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                self.push_error(&e);
            }
        }
    }

    fn apply_reply(&mut self, reply: ChatReply) {
        if let Some((id, message)) = reply.confirmation_request() {
            tracing::info!("Destructive action awaiting confirmation");
            self.session.pending_confirmation = Some(PendingConfirmation {
                confirmation_id: id.to_string(),
                message: message.to_string(),
            });
            self.session
                .messages
                .push(ChatMessage::destructive(message));
            return;
        }

        let message = match reply {
            ChatReply::Text(text) => {
                let (stage, content) = split_stage_marker(&text);
                ChatMessage::bot(content, stage)
            }
            ChatReply::Structured(StructuredReply { stage, message, .. }) => {
                let stage = stage.as_deref().and_then(Stage::parse_str);
                if stage == Some(Stage::ConfirmingRemoval) {
                    tracing::warn!("Removal confirmation requested without a confirmation_id");
                }
                ChatMessage::bot(message.unwrap_or_default(), stage)
            }
        };
        self.session.messages.push(message);
    }

    async fn answer_confirmation(&mut self, pending: &PendingConfirmation, answer: Answer) {
        match answer {
            Answer::Other => {
                tracing::debug!("Confirmation answer was neither yes nor no");
                self.session
                    .messages
                    .push(ChatMessage::local(REPROMPT_MESSAGE, None));
            }
            Answer::No => {
                tracing::info!("Destructive action declined");
                self.session.pending_confirmation = None;
                self.session.messages.push(ChatMessage::local(
                    CANCELLED_MESSAGE,
                    Some(Stage::OperationCanceled),
                ));
            }
            Answer::Yes => {
                let request = ConfirmRequest::approve(pending.confirmation_id.clone());
                match self.gateway.confirm_action(&request).await {
                    Ok(response) => {
                        self.session.pending_confirmation = None;
                        let stage = response.stage.as_deref().and_then(Stage::parse_str);
                        let content = response
                            .message
                            .filter(|m| !m.trim().is_empty())
                            .unwrap_or_else(|| CONFIRMED_FALLBACK.to_string());
                        self.session.messages.push(ChatMessage::bot(content, stage));
                    }
                    Err(e) => {
                        tracing::warn!("Confirmation request failed: {}", e);
                        if self.failure_policy == ConfirmationFailurePolicy::Release {
                            self.session.pending_confirmation = None;
                        }
                        self.push_error(&e);
                    }
                }
            }
        }
    }

    fn push_error(&mut self, err: &anyhow::Error) {
        self.session.messages.push(ChatMessage::local(
            format!("Error: {}", user_message(err)),
            Some(Stage::Error),
        ));
    }
}
