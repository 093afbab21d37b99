//! Wire types for the household assistant backend
//!
//! Requests are serialized exactly as the backend expects them. Responses
//! are decoded leniently (missing fields default) and then converted into
//! the enums the controllers match on.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AssistantError, Result};
use crate::flow::FieldMap;
use crate::stage::Stage;

/// Body of a step call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRequest {
    /// Everything collected so far
    pub current_data: FieldMap,
    /// The field(s) answered in this turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input: Option<FieldMap>,
    /// Commit the accumulated data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<bool>,
}

impl StepRequest {
    /// Build a request, sending `confirm` only when it is set
    pub fn new(current_data: FieldMap, user_input: Option<FieldMap>, confirm: bool) -> Self {
        Self {
            current_data,
            user_input,
            confirm: confirm.then_some(true),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStepResponse {
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    current_data: Option<FieldMap>,
    #[serde(default)]
    missing_fields: Vec<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    summary: Option<FieldMap>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, deserialize_with = "opaque_id")]
    id: Option<String>,
    #[serde(default)]
    suggested_recipes: Vec<Value>,
}

/// Decoded step response, one variant per stage
#[derive(Debug, Clone, PartialEq)]
pub enum StepResponse {
    /// More fields are needed
    CollectingInfo {
        /// Server's authoritative view of the collected data
        current_data: FieldMap,
        /// Missing field names; the first is asked next
        missing_fields: Vec<String>,
        /// Question to show the user
        prompt: String,
        /// Similar recipes offered while planning a meal
        suggested_recipes: Vec<Value>,
    },
    /// All fields are present
    ConfirmingInfo {
        /// Values that will be committed
        summary: FieldMap,
        /// Instructions for confirming or editing
        prompt: String,
    },
    /// The record was created
    Created {
        /// Success message
        message: String,
        /// Identifier of the new record
        id: String,
    },
    /// The server reported `error` or a stage the client does not know
    Failed {
        /// Stage name as received
        stage: String,
        /// Server-provided explanation, if any
        message: Option<String>,
    },
}

impl StepResponse {
    /// Decode a step response body
    ///
    /// # Errors
    ///
    /// Returns a transport error if the body is not a JSON object of the
    /// expected shape.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawStepResponse = serde_json::from_value(value).map_err(|e| {
            AssistantError::Transport(format!("Failed to parse step response: {}", e))
        })?;
        Ok(raw.into())
    }

    /// Stage this response represents
    pub fn stage(&self) -> Stage {
        match self {
            Self::CollectingInfo { .. } => Stage::CollectingInfo,
            Self::ConfirmingInfo { .. } => Stage::ConfirmingInfo,
            Self::Created { .. } => Stage::Created,
            Self::Failed { .. } => Stage::Error,
        }
    }
}

impl From<RawStepResponse> for StepResponse {
    fn from(raw: RawStepResponse) -> Self {
        let stage_name = raw.stage.unwrap_or_default();
        match Stage::parse_str(&stage_name) {
            Some(Stage::CollectingInfo) => Self::CollectingInfo {
                current_data: raw.current_data.unwrap_or_default(),
                missing_fields: raw.missing_fields,
                prompt: raw.prompt.unwrap_or_default(),
                suggested_recipes: raw.suggested_recipes,
            },
            Some(Stage::ConfirmingInfo) => Self::ConfirmingInfo {
                summary: raw.summary.unwrap_or_default(),
                prompt: raw.prompt.unwrap_or_default(),
            },
            Some(Stage::Created) => Self::Created {
                message: raw.message.unwrap_or_default(),
                id: raw.id.unwrap_or_default(),
            },
            _ => Self::Failed {
                stage: stage_name,
                message: raw.message,
            },
        }
    }
}

/// One prior turn sent with a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// "user" or "assistant"
    pub role: String,
    /// Message text
    pub content: String,
}

/// Body of a chat call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// The new user message
    pub message: String,
    /// Prior turns, oldest first
    pub message_history: Vec<HistoryEntry>,
}

/// Structured chat reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructuredReply {
    /// Stage name
    #[serde(default)]
    pub stage: Option<String>,
    /// Token to echo back when confirming a destructive action
    #[serde(default, deserialize_with = "opaque_id")]
    pub confirmation_id: Option<String>,
    /// Text to show
    #[serde(default)]
    pub message: Option<String>,
}

/// The `reply` field of a chat response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    /// Plain text, possibly starting with a stage marker
    Text(String),
    /// Structured reply (used for destructive-action confirmation)
    Structured(StructuredReply),
}

impl ChatReply {
    /// The confirmation token, when this reply requests confirmation of a
    /// destructive action
    pub fn confirmation_request(&self) -> Option<(&str, &str)> {
        match self {
            Self::Structured(StructuredReply {
                stage: Some(stage),
                confirmation_id: Some(id),
                message,
            }) if Stage::parse_str(stage) == Some(Stage::ConfirmingRemoval) => {
                Some((id.as_str(), message.as_deref().unwrap_or_default()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub(crate) reply: ChatReply,
}

/// Body of a confirm call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmRequest {
    /// Token from the confirmation request
    pub confirmation_id: String,
    /// Always true; declining never reaches the server
    pub confirm: bool,
}

impl ConfirmRequest {
    /// Affirmative confirmation for a token
    pub fn approve(confirmation_id: impl Into<String>) -> Self {
        Self {
            confirmation_id: confirmation_id.into(),
            confirm: true,
        }
    }
}

/// Result of a confirm call
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ConfirmResponse {
    /// Stage name after the action
    #[serde(default)]
    pub stage: Option<String>,
    /// Text to show
    #[serde(default)]
    pub message: Option<String>,
}

/// Family member create/update body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInput {
    /// Display name
    pub name: String,
    /// male, female, or other
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl MemberInput {
    /// Build an input, dropping blank optional values
    pub fn new(name: impl Into<String>, gender: Option<String>, avatar: Option<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            gender: non_blank(gender),
            avatar: non_blank(avatar),
        }
    }

    /// Refuse to submit without a name
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AssistantError::Validation("Member name is required".to_string()).into());
        }
        Ok(())
    }
}

/// Recipe create body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    /// Recipe name
    pub name: String,
    /// breakfast, lunch, dinner, snack
    pub kind: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecipeInput {
    /// Build an input, dropping a blank description
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            kind: kind.into().trim().to_string(),
            description: non_blank(description),
        }
    }

    /// Refuse to submit without a name and kind
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AssistantError::Validation("Recipe name is required".to_string()).into());
        }
        if self.kind.trim().is_empty() {
            return Err(AssistantError::Validation("Recipe kind is required".to_string()).into());
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accept identifiers sent as either strings or numbers
fn opaque_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
