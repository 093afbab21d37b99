//! HTTP implementation of the backend gateway
//!
//! Sends JSON requests with `reqwest` and decodes JSON responses. A
//! non-success status becomes `AssistantError::Server`, using the
//! backend's `detail` field as the message when present.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::types::ChatResponse;
use super::{
    ChatReply, ChatRequest, ConfirmRequest, ConfirmResponse, Gateway, MemberInput, RecipeInput,
    StepRequest, StepResponse,
};
use crate::config::GatewayConfig;
use crate::error::{AssistantError, Result};
use crate::flow::EntityType;

/// Gateway that talks to the backend over HTTP
///
/// # Examples
///
/// ```no_run
/// use household_assistant::config::GatewayConfig;
/// use household_assistant::gateway::{Gateway, HttpGateway};
/// use household_assistant::flow::EntityType;
///
/// # async fn example() -> household_assistant::error::Result<()> {
/// let gateway = HttpGateway::new(&GatewayConfig::default())?;
/// let chores = gateway.list(EntityType::Chore).await?;
/// println!("{} chores", chores.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| AssistantError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::info!("Initialized HTTP gateway: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} request failed: {}", what, e);
            AssistantError::Transport(format!("{} request failed: {}", what, e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read {} response body: {}", what, e);
            AssistantError::Transport(format!("Failed to read {} response: {}", what, e))
        })?;

        if !status.is_success() {
            tracing::error!("{} returned error {}: {}", what, status, body);
            return Err(AssistantError::Server {
                status: status.as_u16(),
                message: error_detail(&body),
            }
            .into());
        }

        tracing::debug!("{} response: status={}, {} bytes", what, status, body.len());
        decode(&body).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}", what, e);
            AssistantError::Transport(format!("Failed to parse {} response: {}", what, e)).into()
        })
    }
}

/// Decode a response body; an empty body decodes as JSON `null`
fn decode<T: DeserializeOwned>(body: &str) -> std::result::Result<T, serde_json::Error> {
    if body.trim().is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_str(body)
    }
}

/// Extract a readable message from an error body
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => match obj.get("detail").or_else(|| obj.get("message")) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn step(&self, entity: EntityType, request: &StepRequest) -> Result<StepResponse> {
        let path = entity.step_path().ok_or_else(|| {
            AssistantError::InvalidState(format!("{} has no step flow", entity))
        })?;

        tracing::debug!(
            "Sending {} step: {} fields, input={}, confirm={}",
            entity,
            request.current_data.len(),
            request.user_input.is_some(),
            request.confirm.unwrap_or(false)
        );

        let value: Value = self
            .send(self.client.post(self.url(path)).json(request), "Step")
            .await?;
        StepResponse::from_value(value)
    }

    async fn list(&self, entity: EntityType) -> Result<Vec<Value>> {
        tracing::debug!("Listing {}", entity.plural_label());
        self.send(
            self.client.get(self.url(entity.collection_path())),
            "List",
        )
        .await
    }

    async fn search_recipes(&self, query: &str) -> Result<Vec<Value>> {
        tracing::debug!("Searching recipes for: {}", query);
        self.send(
            self.client
                .get(self.url("/recipes/search"))
                .query(&[("q", query)]),
            "Recipe search",
        )
        .await
    }

    async fn create_member(&self, member: &MemberInput) -> Result<Value> {
        self.send(
            self.client.post(self.url("/members")).json(member),
            "Create member",
        )
        .await
    }

    async fn update_member(&self, id: u64, member: &MemberInput) -> Result<Value> {
        self.send(
            self.client
                .put(self.url(&format!("/members/{}", id)))
                .json(member),
            "Update member",
        )
        .await
    }

    async fn delete_member(&self, id: u64) -> Result<Value> {
        self.send(
            self.client.delete(self.url(&format!("/members/{}", id))),
            "Delete member",
        )
        .await
    }

    async fn create_recipe(&self, recipe: &RecipeInput) -> Result<Value> {
        self.send(
            self.client.post(self.url("/recipes")).json(recipe),
            "Create recipe",
        )
        .await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        tracing::debug!(
            "Sending chat message with {} history entries",
            request.message_history.len()
        );
        let response: ChatResponse = self
            .send(self.client.post(self.url("/chat/")).json(request), "Chat")
            .await?;
        Ok(response.reply)
    }

    async fn confirm_action(&self, request: &ConfirmRequest) -> Result<ConfirmResponse> {
        tracing::info!("Confirming action {}", request.confirmation_id);
        self.send(
            self.client.post(self.url("/chat/confirm")).json(request),
            "Confirm",
        )
        .await
    }

    async fn health(&self) -> Result<Value> {
        self.send(self.client.get(self.url("/health")), "Health")
            .await
    }
}
