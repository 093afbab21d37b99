//! Household Assistant - terminal client library
//!
//! This library provides the client side of the household assistant:
//! the step flows for creating chores and meals, the chat widget with its
//! destructive-action confirmation gate, and the HTTP gateway to the
//! backend that owns all business logic.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `flow`: `StepFlowController`, session state and the field table
//! - `chat`: `ChatConfirmationController` and the chat transcript
//! - `gateway`: the `Gateway` trait, wire types and `HttpGateway`
//! - `stage`: server-reported stage names
//! - `render`: tables and chat lines for the terminal
//! - `commands`: interactive menu, chat and flow handlers
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use household_assistant::{Config, EntityType, HttpGateway, StepFlowController};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let gateway = Arc::new(HttpGateway::new(&config.gateway)?);
//!     let mut flow = StepFlowController::new(gateway);
//!     let view = flow.start(EntityType::Chore).await?;
//!     println!("{:?}", view);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod render;
pub mod stage;

// Re-export commonly used types
pub use chat::{ChatConfirmationController, ChatMessage, ChatSession};
pub use config::Config;
pub use error::{AssistantError, Result};
pub use flow::{EntityType, FieldMap, FieldValue, SessionState, StepFlowController, StepView};
pub use gateway::{Gateway, HttpGateway};
pub use stage::Stage;

#[cfg(test)]
pub mod test_utils;
