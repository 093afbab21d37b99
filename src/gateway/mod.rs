//! Backend gateway for the household assistant
//!
//! The backend owns all business logic, validation and persistence. The
//! client talks to it only through the `Gateway` trait, which keeps the
//! controllers testable without a network.

pub mod http;
pub mod types;

pub use http::HttpGateway;
pub use types::{
    ChatReply, ChatRequest, ConfirmRequest, ConfirmResponse, HistoryEntry, MemberInput,
    RecipeInput, StepRequest, StepResponse, StructuredReply,
};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::flow::EntityType;

/// Request/response boundary to the household assistant backend
///
/// Every method issues exactly one HTTP request. Implementations map
/// connection problems to `AssistantError::Transport` and non-success
/// statuses to `AssistantError::Server`. Nothing is retried.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Advance the step flow of a chore or meal
    async fn step(&self, entity: EntityType, request: &StepRequest) -> Result<StepResponse>;

    /// Fetch every record of a kind
    async fn list(&self, entity: EntityType) -> Result<Vec<Value>>;

    /// Find recipes whose name contains the query
    async fn search_recipes(&self, query: &str) -> Result<Vec<Value>>;

    /// Create a family member
    async fn create_member(&self, member: &MemberInput) -> Result<Value>;

    /// Replace a family member's details
    async fn update_member(&self, id: u64, member: &MemberInput) -> Result<Value>;

    /// Delete a family member
    async fn delete_member(&self, id: u64) -> Result<Value>;

    /// Create a recipe
    async fn create_recipe(&self, recipe: &RecipeInput) -> Result<Value>;

    /// Send a chat message with its history
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// Authorize a previously requested destructive action
    async fn confirm_action(&self, request: &ConfirmRequest) -> Result<ConfirmResponse>;

    /// Check that the backend is up
    async fn health(&self) -> Result<Value>;
}
