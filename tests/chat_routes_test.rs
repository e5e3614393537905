// ABOUTME: Integration tests for the chat agent endpoint and conversation routes
// ABOUTME: Uses a scripted provider; covers tool calls, fallback replies, and cascade delete
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{create_user_with_token, test_resources, test_resources_with, MockProvider, ScriptStep};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use taskmind::routes;

const FALLBACK_REPLY: &str = "I'm sorry, I encountered an error processing your request. \
Please try again or contact support if the issue persists.";

#[tokio::test]
async fn test_chat_without_id_creates_conversation_with_two_messages() {
    let resources = test_resources().await;
    let (_, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources);

    let reply: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "Hello there"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(reply["message"], "Happy to help with your tasks!");
    let conversation_id = reply["conversation_id"].as_i64().expect("conversation id");

    let detail: Value = AxumTestRequest::get(&format!("/api/chat/{conversation_id}"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();

    let messages = detail["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hello there");
    assert_eq!(messages[1]["role"], "assistant");

    // Exactly one conversation exists
    let summaries: Vec<Value> = AxumTestRequest::get("/api/chat")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["message_count"], 2);
}

#[tokio::test]
async fn test_chat_continues_existing_conversation() {
    let resources = test_resources().await;
    let (_, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources);

    let first: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "first turn"}))
        .send(app.clone())
        .await
        .json();
    let conversation_id = first["conversation_id"].as_i64().expect("id");

    let second: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "second turn", "conversation_id": conversation_id}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(second["conversation_id"].as_i64(), Some(conversation_id));

    let detail: Value = AxumTestRequest::get(&format!("/api/chat/{conversation_id}"))
        .bearer(&token)
        .send(app)
        .await
        .json();
    assert_eq!(detail["messages"].as_array().expect("messages").len(), 4);
}

#[tokio::test]
async fn test_chat_with_unknown_conversation_is_404_and_writes_nothing() {
    let resources = test_resources().await;
    let (_, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources);

    AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "hello", "conversation_id": 99999}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let summaries: Vec<Value> = AxumTestRequest::get("/api/chat")
        .bearer(&token)
        .send(app)
        .await
        .json();
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn test_another_users_conversation_is_404() {
    let resources = test_resources().await;
    let (_, alice_token) = create_user_with_token(&resources, "alice@example.com").await;
    let (_, bob_token) = create_user_with_token(&resources, "bob@example.com").await;
    let app = routes::router(resources);

    let reply: Value = AxumTestRequest::post("/api/chat")
        .bearer(&alice_token)
        .json(&json!({"message": "mine"}))
        .send(app.clone())
        .await
        .json();
    let conversation_id = reply["conversation_id"].as_i64().expect("id");

    AxumTestRequest::get(&format!("/api/chat/{conversation_id}"))
        .bearer(&bob_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::post("/api/chat")
        .bearer(&bob_token)
        .json(&json!({"message": "hijack", "conversation_id": conversation_id}))
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_provider_failure_yields_200_with_fallback_and_persists_both_sides() {
    let resources = test_resources_with(Arc::new(MockProvider::failing())).await;
    let (_, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources);

    let reply: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "are you there?"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(reply["message"], FALLBACK_REPLY);
    let conversation_id = reply["conversation_id"].as_i64().expect("id");

    let detail: Value = AxumTestRequest::get(&format!("/api/chat/{conversation_id}"))
        .bearer(&token)
        .send(app)
        .await
        .json();
    let messages = detail["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "are you there?");
    assert_eq!(messages[1]["content"], FALLBACK_REPLY);
}

#[tokio::test]
async fn test_tool_call_turn_actually_creates_the_task() {
    let provider = MockProvider::script(vec![
        ScriptStep::ToolCall {
            name: "create_task".into(),
            args: json!({"title": "Buy milk", "category": "SHOPPING"}),
        },
        ScriptStep::Text("Added Buy milk to your shopping list!".into()),
    ]);
    let resources = test_resources_with(Arc::new(provider)).await;
    let (user_id, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources);

    let reply: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "add milk to my shopping list"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(reply["message"], "Added Buy milk to your shopping list!");

    let tasks: Vec<Value> = AxumTestRequest::get(&format!("/api/{user_id}/tasks"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Buy milk");
    assert_eq!(tasks[0]["category"], "SHOPPING");
}

#[tokio::test]
async fn test_unknown_tool_request_still_completes_the_turn() {
    let provider = MockProvider::script(vec![
        ScriptStep::ToolCall {
            name: "format_disk".into(),
            args: json!({}),
        },
        ScriptStep::Text("I can't do that, but I can manage your tasks.".into()),
    ]);
    let resources = test_resources_with(Arc::new(provider)).await;
    let (_, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources);

    let reply: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "format my disk"}))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(
        reply["message"],
        "I can't do that, but I can manage your tasks."
    );
}

#[tokio::test]
async fn test_delete_conversation_cascades_to_messages() {
    let resources = test_resources().await;
    let (_, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources.clone());

    let reply: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "short-lived"}))
        .send(app.clone())
        .await
        .json();
    let conversation_id = reply["conversation_id"].as_i64().expect("id");

    AxumTestRequest::delete(&format!("/api/chat/{conversation_id}"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get(&format!("/api/chat/{conversation_id}"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // No orphaned message rows remain
    let orphans = resources
        .database
        .get_conversation_messages(conversation_id)
        .await
        .expect("query messages");
    assert!(orphans.is_empty());
}

#[tokio::test]
async fn test_conversation_summaries_are_ordered_by_recency() {
    let resources = test_resources().await;
    let (_, token) = create_user_with_token(&resources, "alice@example.com").await;
    let app = routes::router(resources);

    let first: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "older"}))
        .send(app.clone())
        .await
        .json();
    let second: Value = AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "newer"}))
        .send(app.clone())
        .await
        .json();

    // Touch the first conversation again so it becomes the most recent
    let first_id = first["conversation_id"].as_i64().expect("id");
    AxumTestRequest::post("/api/chat")
        .bearer(&token)
        .json(&json!({"message": "follow-up", "conversation_id": first_id}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let summaries: Vec<Value> = AxumTestRequest::get("/api/chat")
        .bearer(&token)
        .send(app)
        .await
        .json();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["id"].as_i64(), Some(first_id));
    assert_eq!(summaries[0]["message_count"], 4);
    assert_eq!(
        summaries[1]["id"].as_i64(),
        second["conversation_id"].as_i64()
    );
}

#[tokio::test]
async fn test_chat_requires_authentication() {
    let resources = test_resources().await;
    let app = routes::router(resources);

    AxumTestRequest::post("/api/chat")
        .json(&json!({"message": "anyone home?"}))
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
