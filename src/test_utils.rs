//! Test utilities for the household assistant
//!
//! Provides a scripted `MockGateway` that replays queued backend responses
//! and records every request it receives, plus small assertion helpers.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{AssistantError, Result};
use crate::flow::EntityType;
use crate::gateway::{
    ChatReply, ChatRequest, ConfirmRequest, ConfirmResponse, Gateway, MemberInput, RecipeInput,
    StepRequest, StepResponse,
};

/// Scripted response: a JSON body or a transport failure message
type Scripted = std::result::Result<Value, String>;

/// Gateway double that replays queued responses in order
///
/// Each operation pops from its own queue. An empty queue answers with a
/// transport error so a test that sends more requests than it scripted
/// fails loudly.
///
/// # Examples
///
/// ```ignore
/// let gateway = Arc::new(MockGateway::new());
/// gateway.push_step(json!({ "stage": "created", "message": "ok", "id": 1 }));
/// ```
#[derive(Debug, Default)]
pub struct MockGateway {
    steps: Mutex<VecDeque<Scripted>>,
    chats: Mutex<VecDeque<Scripted>>,
    confirms: Mutex<VecDeque<Scripted>>,
    records: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockGateway {
    /// Create a gateway with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a step response body
    pub fn push_step(&self, body: Value) {
        push(&self.steps, Ok(body));
    }

    /// Queue a step transport failure
    pub fn push_step_failure(&self, message: &str) {
        push(&self.steps, Err(message.to_string()));
    }

    /// Queue the `reply` field of a chat response
    pub fn push_chat(&self, reply: Value) {
        push(&self.chats, Ok(reply));
    }

    /// Queue a chat transport failure
    pub fn push_chat_failure(&self, message: &str) {
        push(&self.chats, Err(message.to_string()));
    }

    /// Queue a confirm response body
    pub fn push_confirm(&self, body: Value) {
        push(&self.confirms, Ok(body));
    }

    /// Queue a confirm transport failure
    pub fn push_confirm_failure(&self, message: &str) {
        push(&self.confirms, Err(message.to_string()));
    }

    /// Queue a response for list, search, member, recipe and health calls
    pub fn push_record(&self, body: Value) {
        push(&self.records, Ok(body));
    }

    /// Every call so far as (operation, request body)
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Request bodies of the calls to one operation
    pub fn calls_named(&self, operation: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == operation)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Number of calls to one operation
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls_named(operation).len()
    }

    fn record<T: Serialize>(&self, operation: impl Into<String>, body: &T) {
        let body = serde_json::to_value(body).unwrap_or(Value::Null);
        self.calls.lock().unwrap().push((operation.into(), body));
    }

    fn next_record(&self) -> Result<Value> {
        pop(&self.records, "record")
    }
}

fn push(queue: &Mutex<VecDeque<Scripted>>, item: Scripted) {
    queue.lock().unwrap().push_back(item);
}

fn pop(queue: &Mutex<VecDeque<Scripted>>, what: &str) -> Result<Value> {
    match queue.lock().unwrap().pop_front() {
        Some(Ok(value)) => Ok(value),
        Some(Err(message)) => Err(AssistantError::Transport(message).into()),
        None => Err(AssistantError::Transport(format!("no scripted {} response", what)).into()),
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn step(&self, entity: EntityType, request: &StepRequest) -> Result<StepResponse> {
        self.record(format!("step:{}", entity), request);
        StepResponse::from_value(pop(&self.steps, "step")?)
    }

    async fn list(&self, entity: EntityType) -> Result<Vec<Value>> {
        self.record(format!("list:{}", entity), &Value::Null);
        Ok(serde_json::from_value(self.next_record()?)?)
    }

    async fn search_recipes(&self, query: &str) -> Result<Vec<Value>> {
        self.record("search_recipes", &query);
        Ok(serde_json::from_value(self.next_record()?)?)
    }

    async fn create_member(&self, member: &MemberInput) -> Result<Value> {
        self.record("create_member", member);
        self.next_record()
    }

    async fn update_member(&self, id: u64, member: &MemberInput) -> Result<Value> {
        self.record(format!("update_member:{}", id), member);
        self.next_record()
    }

    async fn delete_member(&self, id: u64) -> Result<Value> {
        self.record(format!("delete_member:{}", id), &Value::Null);
        self.next_record()
    }

    async fn create_recipe(&self, recipe: &RecipeInput) -> Result<Value> {
        self.record("create_recipe", recipe);
        self.next_record()
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.record("chat", request);
        Ok(serde_json::from_value(pop(&self.chats, "chat")?)?)
    }

    async fn confirm_action(&self, request: &ConfirmRequest) -> Result<ConfirmResponse> {
        self.record("confirm", request);
        Ok(serde_json::from_value(pop(&self.confirms, "confirm")?)?)
    }

    async fn health(&self) -> Result<Value> {
        self.record("health", &Value::Null);
        self.next_record()
    }
}

/// Assert that an error's message contains the expected text
///
/// # Panics
///
/// Panics if `result` is `Ok` or the message does not match
pub fn assert_error_contains<T: std::fmt::Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!(
            "Expected error containing '{}' but got Ok({:?})",
            expected, value
        ),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration YAML exercising every section
pub fn test_config_yaml() -> String {
    r#"
gateway:
  base_url: http://127.0.0.1:9000
  timeout_seconds: 15
chat:
  confirmation_failure: retain
  show_stage_tags: false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfirmationFailurePolicy};
    use crate::flow::FieldMap;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_replays_in_order_and_records() {
        let gateway = MockGateway::new();
        gateway.push_step(json!({ "stage": "created", "message": "one", "id": 1 }));
        gateway.push_step_failure("down");

        let request = StepRequest::new(FieldMap::new(), None, true);
        let first = gateway.step(EntityType::Chore, &request).await.unwrap();
        assert!(matches!(first, StepResponse::Created { .. }));
        assert!(gateway.step(EntityType::Chore, &request).await.is_err());
        assert!(gateway.step(EntityType::Chore, &request).await.is_err());

        assert_eq!(gateway.call_count("step:chore"), 3);
        assert_eq!(
            gateway.calls_named("step:chore")[0],
            json!({ "current_data": {}, "confirm": true })
        );
    }

    #[tokio::test]
    async fn test_mock_chat_and_confirm_queues() {
        let gateway = MockGateway::new();
        gateway.push_chat(json!("hello"));
        gateway.push_confirm(json!({ "stage": "created", "message": "done" }));

        let reply = gateway
            .send_chat(&ChatRequest {
                message: "hi".into(),
                message_history: vec![],
            })
            .await
            .unwrap();
        assert_eq!(reply, ChatReply::Text("hello".into()));

        let confirmed = gateway
            .confirm_action(&ConfirmRequest::approve("t"))
            .await
            .unwrap();
        assert_eq!(confirmed.message.as_deref(), Some("done"));
        assert_eq!(gateway.calls().len(), 2);
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(AssistantError::Config("test error message".into()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.chat.confirmation_failure,
            ConfirmationFailurePolicy::Retain
        );
    }
}
