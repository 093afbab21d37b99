//! Step flow for creating chores and meals
//!
//! A step flow collects one field per turn, as directed by the backend,
//! then shows a summary for confirmation and finally creates the record.
//!
//! - `fields`: the per-entity field table and input parsing
//! - `controller`: the `StepFlowController` state machine

pub mod controller;
pub mod fields;

pub use controller::{EditField, EditForm, StepFlowController, StepView};
pub use fields::{FieldKind, FieldSpec};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::stage::Stage;

/// Kind of household record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A recurring or one-time household task
    Chore,
    /// A planned meal
    Meal,
    /// A stored recipe
    Recipe,
    /// A family member
    Member,
}

impl EntityType {
    /// Parse an entity name, accepting singular and plural forms
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "chore" | "chores" => Ok(Self::Chore),
            "meal" | "meals" => Ok(Self::Meal),
            "recipe" | "recipes" => Ok(Self::Recipe),
            "member" | "members" => Ok(Self::Member),
            other => Err(format!("Unknown entity type: {}", other)),
        }
    }

    /// Step endpoint path, for entities created through a step flow
    pub fn step_path(&self) -> Option<&'static str> {
        match self {
            Self::Chore => Some("/chore/step"),
            Self::Meal => Some("/meal/step"),
            Self::Recipe | Self::Member => None,
        }
    }

    /// Collection endpoint path
    pub fn collection_path(&self) -> &'static str {
        match self {
            Self::Chore => "/chores",
            Self::Meal => "/meals",
            Self::Recipe => "/recipes",
            Self::Member => "/members",
        }
    }

    /// Heading used when running the entity's step flow
    pub fn flow_title(&self) -> &'static str {
        match self {
            Self::Chore => "Create Chore",
            Self::Meal => "Plan Meal",
            Self::Recipe => "Add Recipe",
            Self::Member => "Add Family Member",
        }
    }

    /// Capitalized singular label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chore => "Chore",
            Self::Meal => "Meal",
            Self::Recipe => "Recipe",
            Self::Member => "Family Member",
        }
    }

    /// Capitalized plural label
    pub fn plural_label(&self) -> &'static str {
        match self {
            Self::Chore => "Chores",
            Self::Meal => "Meals",
            Self::Recipe => "Recipes",
            Self::Member => "Family Members",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chore => "chore",
            Self::Meal => "meal",
            Self::Recipe => "recipe",
            Self::Member => "member",
        };
        f.write_str(name)
    }
}

/// A single field value accumulated during a step flow
///
/// Serialized untagged so the wire format is plain JSON: `null`, a
/// boolean, a number, a string, or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicitly empty (`null`)
    Absent,
    /// Boolean answer
    Flag(bool),
    /// Numeric value reported by the server
    Number(serde_json::Number),
    /// Free text
    Text(String),
    /// Comma-separated input split into items
    List(Vec<String>),
}

impl FieldValue {
    /// True when the value carries no content
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Flag(_) | Self::Number(_) => false,
        }
    }

    /// Text form suitable for pre-filling an input
    ///
    /// Parsing this text back through the field table yields the same value.
    pub fn to_input_text(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Flag(true) => "yes".to_string(),
            Self::Flag(false) => "no".to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Flag(b) => write!(f, "{}", b),
            other => f.write_str(&other.to_input_text()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Field name to value mapping sent on every step call
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Local state of the active step flow
///
/// There is one instance per controller. `current_data` only grows between
/// resets, except when a `collecting_info` response replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Entity type being built, `None` when idle
    pub mode: Option<EntityType>,
    /// Accumulated field values
    pub current_data: FieldMap,
    /// Last stage reported by the server (or set locally on failure/edit)
    pub stage: Option<Stage>,
    /// Fields the server reported missing, in the order it will ask for them
    pub missing_fields: Vec<String>,
    /// True while a local edit form is open
    pub editing: bool,
}

impl SessionState {
    /// Clear everything and return to idle
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The field the server asked for most recently
    pub fn pending_field(&self) -> Option<&str> {
        self.missing_fields.first().map(String::as_str)
    }
}
