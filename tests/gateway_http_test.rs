//! HTTP gateway integration tests
//!
//! Runs `HttpGateway` against a `wiremock` mock server and checks request
//! shapes, response decoding, and how failures are classified.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use household_assistant::config::GatewayConfig;
use household_assistant::error::AssistantError;
use household_assistant::flow::{EntityType, FieldMap, FieldValue};
use household_assistant::gateway::{
    ChatReply, ChatRequest, ConfirmRequest, Gateway, HistoryEntry, HttpGateway, MemberInput,
    RecipeInput, StepRequest, StepResponse,
};

#[tokio::test]
async fn test_step_posts_accumulated_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/meal/step"))
        .and(body_json(json!({
            "current_data": { "meal_name": "Pasta" },
            "user_input": { "exist": false }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stage": "collecting_info",
            "current_data": { "meal_name": "Pasta", "exist": false },
            "missing_fields": ["meal_kind", "meal_date"],
            "prompt": "What kind of meal is this?"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let mut data = FieldMap::new();
    data.insert("meal_name".into(), FieldValue::from("Pasta"));
    let mut input = FieldMap::new();
    input.insert("exist".into(), FieldValue::Flag(false));

    let response = gateway
        .step(EntityType::Meal, &StepRequest::new(data, Some(input), false))
        .await
        .expect("step should succeed");

    match response {
        StepResponse::CollectingInfo {
            current_data,
            missing_fields,
            ..
        } => {
            assert_eq!(current_data["exist"], FieldValue::Flag(false));
            assert_eq!(missing_fields, vec!["meal_kind", "meal_date"]);
        }
        other => panic!("Expected CollectingInfo, got {:?}", other),
    }
}

#[tokio::test]
async fn test_step_for_entity_without_flow_is_rejected() {
    let server = MockServer::start().await;
    let gateway = common::gateway_for(&server);

    let result = gateway
        .step(EntityType::Member, &StepRequest::new(FieldMap::new(), None, false))
        .await;
    assert!(result.is_err());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_server_error_uses_detail() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/members/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Member not found" })),
        )
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let err = gateway.delete_member(99).await.unwrap_err();

    match err.downcast_ref::<AssistantError>() {
        Some(AssistantError::Server { status, message }) => {
            assert_eq!(*status, 404);
            assert_eq!(message, "Member not found");
        }
        other => panic!("Expected Server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_with_plain_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chores"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let err = gateway.list(EntityType::Chore).await.unwrap_err();
    let kind = err.downcast_ref::<AssistantError>().expect("typed error");
    assert!(kind.is_gateway_failure());
    assert!(err.to_string().contains("Internal Server Error"));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let config = GatewayConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: Some(2),
        ..Default::default()
    };
    let gateway = HttpGateway::new(&config).unwrap();

    let err = gateway.health().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AssistantError>(),
        Some(AssistantError::Transport(_))
    ));
}

#[tokio::test]
async fn test_malformed_json_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meals"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let err = gateway.list(EntityType::Meal).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AssistantError>(),
        Some(AssistantError::Transport(_))
    ));
}

#[tokio::test]
async fn test_list_and_search() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Pasta Bake", "kind": "dinner" },
            { "id": 2, "name": "Pancakes", "kind": "breakfast" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/recipes/search"))
        .and(query_param("q", "pasta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Pasta Bake", "kind": "dinner" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    assert_eq!(gateway.list(EntityType::Recipe).await.unwrap().len(), 2);
    let found = gateway.search_recipes("pasta").await.unwrap();
    assert_eq!(found[0]["name"], "Pasta Bake");
}

#[tokio::test]
async fn test_member_create_and_update() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/members"))
        .and(body_json(json!({ "name": "Alex", "gender": "male" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Alex" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/members/1"))
        .and(body_json(json!({ "name": "Alexander" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Alexander" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let created = gateway
        .create_member(&MemberInput::new("Alex", Some("male".into()), None))
        .await
        .unwrap();
    assert_eq!(created["id"], 1);

    let updated = gateway
        .update_member(1, &MemberInput::new("Alexander", None, None))
        .await
        .unwrap();
    assert_eq!(updated["name"], "Alexander");
}

#[tokio::test]
async fn test_recipe_create() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/recipes"))
        .and(body_json(json!({
            "name": "Pancakes",
            "kind": "breakfast",
            "description": "Fluffy"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let created = gateway
        .create_recipe(&RecipeInput::new(
            "Pancakes",
            "breakfast",
            Some("Fluffy".into()),
        ))
        .await
        .unwrap();
    assert_eq!(created["id"], 7);
}

#[tokio::test]
async fn test_chat_send_with_history() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(body_json(json!({
            "message": "what's for dinner?",
            "message_history": [
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "Hello!" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "reply": "Pasta Bake tonight." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let reply = gateway
        .send_chat(&ChatRequest {
            message: "what's for dinner?".into(),
            message_history: vec![
                HistoryEntry {
                    role: "user".into(),
                    content: "hi".into(),
                },
                HistoryEntry {
                    role: "assistant".into(),
                    content: "Hello!".into(),
                },
            ],
        })
        .await
        .unwrap();
    assert_eq!(reply, ChatReply::Text("Pasta Bake tonight.".into()));
}

#[tokio::test]
async fn test_chat_structured_reply_and_confirm() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": {
                "stage": "confirming_removal",
                "confirmation_id": "abc-123",
                "message": "Delete meal 3?"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/confirm"))
        .and(body_json(json!({ "confirmation_id": "abc-123", "confirm": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stage": "created",
            "message": "Meal deleted."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    let reply = gateway
        .send_chat(&ChatRequest {
            message: "delete meal 3".into(),
            message_history: vec![],
        })
        .await
        .unwrap();
    let (token, _) = reply.confirmation_request().expect("confirmation request");

    let confirmed = gateway
        .confirm_action(&ConfirmRequest::approve(token))
        .await
        .unwrap();
    assert_eq!(confirmed.message.as_deref(), Some("Meal deleted."));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = common::gateway_for(&server);
    assert_eq!(gateway.health().await.unwrap()["status"], "ok");
}
