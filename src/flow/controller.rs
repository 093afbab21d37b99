//! Step flow controller
//!
//! Drives one chore or meal creation conversation. The backend decides
//! which field is missing next; the controller parses the user's answer
//! for that field, sends the full accumulated data on every call, and
//! mirrors the stage the backend reports.
//!
//! ```text
//! start ──> collecting_info ──(submit_field)──> collecting_info ...
//!                │
//!                └──> confirming_info ──(confirm)──> created
//!                       │      ▲
//!                  (edit)      (submit_edit, no request)
//!                       ▼      │
//!                     local edit form
//! ```
//!
//! Transport and server failures never escape as errors; they move the
//! flow to the `error` stage with a message.

use serde_json::Value;
use std::sync::Arc;

use super::fields::{self, FieldSpec};
use super::{EntityType, FieldMap, FieldValue, SessionState};
use crate::error::{user_message, AssistantError, Result};
use crate::gateway::{Gateway, StepRequest, StepResponse};
use crate::stage::Stage;

const DEFAULT_CONFIRM_PROMPT: &str = "Type 'done' to confirm or 'edit' to make changes.";
const UNKNOWN_ERROR: &str = "Unknown error";

/// What the presentation layer should show after an operation
#[derive(Debug, Clone, PartialEq)]
pub enum StepView {
    /// No flow is active; show the menu
    Idle,
    /// Ask for the next field
    Collecting {
        /// Entity being built
        entity: EntityType,
        /// Field the server asked for, if it named one
        field: Option<String>,
        /// Question to show, including any input hint
        prompt: String,
        /// Similar recipes offered while planning a meal
        suggestions: Vec<Value>,
    },
    /// Show the summary and wait for confirm/edit
    Confirming {
        /// Entity being built
        entity: EntityType,
        /// Values that will be committed
        summary: FieldMap,
        /// Instructions from the server
        prompt: String,
    },
    /// The record exists
    Created {
        /// Entity that was created
        entity: EntityType,
        /// Success message
        message: String,
        /// Identifier of the new record
        id: String,
    },
    /// The flow failed; offer a way back to the menu
    Failed {
        /// Entity that was being built, if any
        entity: Option<EntityType>,
        /// What went wrong
        message: String,
    },
}

/// One row of the local edit form
#[derive(Debug, Clone, PartialEq)]
pub struct EditField {
    /// Field description from the field table
    pub spec: &'static FieldSpec,
    /// Current value as editable text
    pub value: String,
}

/// Editable form pre-filled from the accumulated data
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    /// Entity being edited
    pub entity: EntityType,
    /// Editable fields in display order
    pub fields: Vec<EditField>,
}

impl EditForm {
    fn from_data(entity: EntityType, data: &FieldMap) -> Self {
        let fields = fields::editable_fields(entity)
            .map(|spec| EditField {
                spec,
                value: data
                    .get(spec.name)
                    .map(FieldValue::to_input_text)
                    .unwrap_or_default(),
            })
            .collect();
        Self { entity, fields }
    }
}

/// State machine for the collect -> confirm -> create conversation
pub struct StepFlowController {
    gateway: Arc<dyn Gateway>,
    session: SessionState,
    confirm_prompt: Option<String>,
}

impl StepFlowController {
    /// Create an idle controller
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            session: SessionState::default(),
            confirm_prompt: None,
        }
    }

    /// Current session state
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Begin a new flow, discarding any previous state
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the entity has no step flow
    pub async fn start(&mut self, entity: EntityType) -> Result<StepView> {
        if entity.step_path().is_none() {
            return Err(AssistantError::InvalidState(format!(
                "{} cannot be created through a step flow",
                entity
            ))
            .into());
        }

        tracing::info!("Starting {} flow", entity);
        self.session.reset();
        self.confirm_prompt = None;
        self.session.mode = Some(entity);
        self.advance(None, false).await
    }

    /// Send the accumulated data (plus optional input) and apply the response
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no flow is active. Gateway failures are
    /// reported through `StepView::Failed`, not as errors.
    pub async fn advance(
        &mut self,
        user_input: Option<FieldMap>,
        confirm: bool,
    ) -> Result<StepView> {
        let entity = self
            .session
            .mode
            .ok_or_else(|| AssistantError::InvalidState("No flow is active".to_string()))?;

        let request = StepRequest::new(self.session.current_data.clone(), user_input, confirm);
        match self.gateway.step(entity, &request).await {
            Ok(response) => Ok(self.apply(entity, response)),
            Err(e) => {
                tracing::warn!("{} step failed: {}", entity, e);
                Ok(self.fail(Some(entity), user_message(&e)))
            }
        }
    }

    /// Answer the field the server asked for
    ///
    /// # Errors
    ///
    /// Returns `Validation` for empty input (no request is sent) and
    /// `InvalidState` when no field is being collected.
    pub async fn submit_field(&mut self, text: &str) -> Result<StepView> {
        if text.trim().is_empty() {
            return Err(AssistantError::Validation("Please enter a value".to_string()).into());
        }

        let entity = self
            .session
            .mode
            .ok_or_else(|| AssistantError::InvalidState("No flow is active".to_string()))?;
        if self.session.stage != Some(Stage::CollectingInfo) {
            return Err(AssistantError::InvalidState(
                "The flow is not collecting information".to_string(),
            )
            .into());
        }
        let field = self
            .session
            .pending_field()
            .ok_or_else(|| {
                AssistantError::InvalidState("The server did not ask for a field".to_string())
            })?
            .to_string();

        let value = fields::parse_field(entity, &field, text);
        tracing::debug!("Submitting {} = {:?}", field, value);

        let mut input = FieldMap::new();
        input.insert(field, value);
        self.advance(Some(input), false).await
    }

    /// Commit the accumulated data
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the flow is confirming
    pub async fn confirm(&mut self) -> Result<StepView> {
        if self.session.stage != Some(Stage::ConfirmingInfo) || self.session.editing {
            return Err(AssistantError::InvalidState(
                "There is no summary to confirm".to_string(),
            )
            .into());
        }
        self.advance(None, true).await
    }

    /// Open the local edit form; no request is sent
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the flow is confirming
    pub fn edit(&mut self) -> Result<EditForm> {
        let entity = match (self.session.mode, self.session.stage) {
            (Some(entity), Some(Stage::ConfirmingInfo)) if !self.session.editing => entity,
            _ => {
                return Err(AssistantError::InvalidState(
                    "Only a summary awaiting confirmation can be edited".to_string(),
                )
                .into())
            }
        };

        tracing::debug!("Editing {} locally", entity);
        self.session.stage = Some(Stage::CollectingInfo);
        self.session.editing = true;
        Ok(EditForm::from_data(entity, &self.session.current_data))
    }

    /// Apply edited values locally and return to the summary; no request is sent
    ///
    /// `values` pairs field names with raw text. Fields left out keep their
    /// current value. Optional fields submitted empty are cleared.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-editable field or an empty required
    /// field; nothing is changed in that case.
    pub fn submit_edit(&mut self, values: &[(String, String)]) -> Result<StepView> {
        let entity = match self.session.mode {
            Some(entity) if self.session.editing => entity,
            _ => {
                return Err(
                    AssistantError::InvalidState("No edit form is open".to_string()).into(),
                )
            }
        };

        let mut updates = Vec::with_capacity(values.len());
        for (name, text) in values {
            let spec = fields::lookup(entity, name)
                .filter(|spec| spec.editable)
                .ok_or_else(|| {
                    AssistantError::Validation(format!("{} cannot be edited", name))
                })?;
            let value = if text.trim().is_empty() {
                if spec.required {
                    return Err(AssistantError::Validation(format!(
                        "{} is required",
                        spec.label
                    ))
                    .into());
                }
                FieldValue::Absent
            } else {
                spec.parse(text)
            };
            updates.push((spec.name.to_string(), value));
        }

        self.session.current_data.extend(updates);
        self.session.stage = Some(Stage::ConfirmingInfo);
        self.session.editing = false;

        Ok(StepView::Confirming {
            entity,
            summary: self.session.current_data.clone(),
            prompt: self
                .confirm_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_CONFIRM_PROMPT.to_string()),
        })
    }

    /// Drop the flow and return to the menu
    pub fn cancel(&mut self) -> StepView {
        if let Some(entity) = self.session.mode {
            tracing::info!("Cancelled {} flow", entity);
        }
        self.session.reset();
        self.confirm_prompt = None;
        StepView::Idle
    }

    fn apply(&mut self, entity: EntityType, response: StepResponse) -> StepView {
        match response {
            StepResponse::CollectingInfo {
                current_data,
                missing_fields,
                prompt,
                suggested_recipes,
            } => {
                self.session.current_data = current_data;
                self.session.stage = Some(Stage::CollectingInfo);
                self.session.editing = false;
                self.session.missing_fields = missing_fields;

                let field = self.session.pending_field().map(str::to_string);
                let suffix = field
                    .as_deref()
                    .and_then(|name| fields::lookup(entity, name))
                    .map_or("", FieldSpec::prompt_suffix);
                tracing::debug!("{} flow collecting {:?}", entity, field);

                StepView::Collecting {
                    entity,
                    field,
                    prompt: format!("{}{}", prompt, suffix),
                    suggestions: suggested_recipes,
                }
            }
            StepResponse::ConfirmingInfo { summary, prompt } => {
                self.session
                    .current_data
                    .extend(summary.iter().map(|(k, v)| (k.clone(), v.clone())));
                self.session.stage = Some(Stage::ConfirmingInfo);
                self.session.editing = false;
                self.session.missing_fields.clear();
                self.confirm_prompt = Some(prompt.clone());
                tracing::debug!("{} flow confirming {} fields", entity, summary.len());

                StepView::Confirming {
                    entity,
                    summary,
                    prompt,
                }
            }
            StepResponse::Created { message, id } => {
                self.session.stage = Some(Stage::Created);
                self.session.editing = false;
                tracing::info!("Created {} {}", entity, id);
                StepView::Created {
                    entity,
                    message,
                    id,
                }
            }
            StepResponse::Failed { stage, message } => {
                if Stage::parse_str(&stage) == Some(Stage::Error) {
                    tracing::warn!("{} flow reported an error", entity);
                } else {
                    tracing::warn!("{} flow: {}", entity, AssistantError::UnexpectedStage(stage));
                }
                self.fail(
                    Some(entity),
                    message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                )
            }
        }
    }

    fn fail(&mut self, entity: Option<EntityType>, message: String) -> StepView {
        self.session.stage = Some(Stage::Error);
        self.session.editing = false;
        StepView::Failed { entity, message }
    }
}
