//! Server-reported conversation stages
//!
//! Both the step flow and the chat widget mirror the backend's stage
//! names. Step responses only use the first five; chat replies may also
//! report `greeting` and `operation_canceled` for presentation.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a flow as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The server still needs one or more fields
    CollectingInfo,
    /// All fields are present and the summary awaits confirmation
    ConfirmingInfo,
    /// A destructive action awaits an explicit yes/no
    ConfirmingRemoval,
    /// The record was created (or the action completed)
    Created,
    /// The flow failed
    Error,
    /// Chat-only: the assistant greeted the user
    Greeting,
    /// Chat-only: a pending action was called off
    OperationCanceled,
}

impl Stage {
    /// Parse a wire stage name
    ///
    /// Returns `None` for names the client does not know.
    ///
    /// # Examples
    ///
    /// ```
    /// use household_assistant::stage::Stage;
    ///
    /// assert_eq!(Stage::parse_str("collecting_info"), Some(Stage::CollectingInfo));
    /// assert_eq!(Stage::parse_str("Created"), Some(Stage::Created));
    /// assert_eq!(Stage::parse_str("dancing"), None);
    /// ```
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "collecting_info" => Some(Self::CollectingInfo),
            "confirming_info" => Some(Self::ConfirmingInfo),
            "confirming_removal" => Some(Self::ConfirmingRemoval),
            "created" => Some(Self::Created),
            "error" => Some(Self::Error),
            "greeting" => Some(Self::Greeting),
            "operation_canceled" | "operation_cancelled" => Some(Self::OperationCanceled),
            _ => None,
        }
    }

    /// Wire name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectingInfo => "collecting_info",
            Self::ConfirmingInfo => "confirming_info",
            Self::ConfirmingRemoval => "confirming_removal",
            Self::Created => "created",
            Self::Error => "error",
            Self::Greeting => "greeting",
            Self::OperationCanceled => "operation_canceled",
        }
    }

    /// Colored tag for terminal output
    pub fn colored_tag(&self) -> String {
        let name = self.as_str();
        let painted = match self {
            Self::CollectingInfo => name.cyan(),
            Self::ConfirmingInfo => name.blue(),
            Self::ConfirmingRemoval => name.red().bold(),
            Self::Created => name.green(),
            Self::Error => name.red(),
            Self::Greeting => name.purple(),
            Self::OperationCanceled => name.yellow(),
        };
        format!("[{}]", painted)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
