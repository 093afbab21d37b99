//! Chat widget state and the destructive-action confirmation gate
//!
//! - `marker`: stage markers embedded in plain-text replies
//! - `controller`: the `ChatConfirmationController`

pub mod controller;
pub mod marker;

pub use controller::{ChatConfirmationController, CANCELLED_MESSAGE, REPROMPT_MESSAGE};

use crate::gateway::HistoryEntry;
use crate::stage::Stage;

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person at the keyboard
    User,
    /// The assistant, or the client speaking on its behalf
    Bot,
}

impl Role {
    /// Role name used in `message_history`
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "assistant",
        }
    }
}

/// One entry in the chat transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Display text (stage markers removed)
    pub content: String,
    /// Stage the reply reported, for presentation only
    pub stage: Option<Stage>,
    /// The message asks to confirm a destructive action
    pub is_destructive: bool,
    /// Produced by the client, never sent as history
    pub local: bool,
}

impl ChatMessage {
    /// Message typed by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            stage: None,
            is_destructive: false,
            local: false,
        }
    }

    /// Reply received from the backend
    pub fn bot(content: impl Into<String>, stage: Option<Stage>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
            stage,
            is_destructive: false,
            local: false,
        }
    }

    /// Reply asking the user to confirm a destructive action
    pub fn destructive(content: impl Into<String>) -> Self {
        Self {
            is_destructive: true,
            ..Self::bot(content, Some(Stage::ConfirmingRemoval))
        }
    }

    /// Client-generated message that stays out of the history
    pub fn local(content: impl Into<String>, stage: Option<Stage>) -> Self {
        Self {
            local: true,
            ..Self::bot(content, stage)
        }
    }

    fn to_history(&self) -> HistoryEntry {
        HistoryEntry {
            role: self.role.as_wire().to_string(),
            content: self.content.clone(),
        }
    }
}

/// A destructive action waiting for "yes" or "no"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    /// Opaque server token
    pub confirmation_id: String,
    /// What the server asked
    pub message: String,
}

/// Transcript plus the pending confirmation, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    /// Every message, oldest first; only ever appended to
    pub messages: Vec<ChatMessage>,
    /// Set while a destructive action awaits an answer
    pub pending_confirmation: Option<PendingConfirmation>,
}

impl ChatSession {
    /// True while a confirmation answer is expected
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.pending_confirmation.is_some()
    }

    /// Prior turns to send with the next message
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter(|m| !m.local)
            .map(ChatMessage::to_history)
            .collect()
    }
}
