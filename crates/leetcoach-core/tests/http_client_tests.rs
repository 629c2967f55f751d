use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use leetcoach_core::llm::{GeminiClient, OpenAIClient};
use leetcoach_core::problem::ProblemResponse;
use leetcoach_core::*;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// An address nothing listens on.
async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
    headers: Arc<Mutex<Vec<HeaderMap>>>,
}

// ========================================================================
// HttpChatBackend
// ========================================================================

async fn echo_chat(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    let last = body["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    captured.bodies.lock().unwrap().push(body);
    Json(json!({ "choices": [ { "message": { "content": format!("echo: {last}") } } ] }))
}

#[tokio::test]
async fn test_chat_backend_posts_request_and_reads_envelope() {
    let captured = Captured::default();
    let base = spawn(
        Router::new()
            .route("/api/chat", post(echo_chat))
            .with_state(captured.clone()),
    )
    .await;

    let backend = HttpChatBackend::new(&base, TIMEOUT).unwrap();
    let request = ChatRequest::new(vec![ChatMessage::user("hi")]).with_problem_context(Some(
        ProblemContext::new("Two Sum", Difficulty::Easy, ["Array"]),
    ));

    let completion = backend.complete(&request).await.unwrap();
    assert_eq!(completion.text(), Some("echo: hi"));

    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies[0]["messages"], json!([{ "role": "user", "content": "hi" }]));
    assert_eq!(bodies[0]["problemContext"]["difficulty"], "Easy");
}

#[tokio::test]
async fn test_chat_backend_error_status_is_provider_error() {
    let base = spawn(Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Error processing your request", "details": "quota" })),
            )
        }),
    ))
    .await;

    let backend = HttpChatBackend::new(&base, TIMEOUT).unwrap();
    let err = backend
        .complete(&ChatRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();

    match err {
        CoachError::Provider(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("quota"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_backend_rejects_malformed_bodies() {
    let base = spawn(
        Router::new()
            .route("/empty/api/chat", post(|| async { Json(json!({})) }))
            .route(
                "/nulls/api/chat",
                post(|| async { Json(json!({ "choices": [ { "message": null } ] })) }),
            )
            .route("/text/api/chat", post(|| async { "not json" })),
    )
    .await;

    for prefix in ["empty", "nulls", "text"] {
        let backend = HttpChatBackend::new(format!("{base}/{prefix}"), TIMEOUT).unwrap();
        let err = backend
            .complete(&ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(
            matches!(err, CoachError::MalformedOutput(_)),
            "{prefix}: {err:?}"
        );
    }
}

#[tokio::test]
async fn test_chat_backend_unreachable_is_provider_failure() {
    let backend = HttpChatBackend::new(dead_endpoint().await, TIMEOUT).unwrap();
    let err = backend
        .complete(&ChatRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();
    assert!(err.is_provider_failure());
}

// ========================================================================
// HttpProblemLookup
// ========================================================================

async fn problem(Path(slug): Path<String>) -> impl IntoResponse {
    match slug.as_str() {
        "two-sum" => Json(ProblemResponse::found(ProblemContext::new(
            "Two Sum",
            Difficulty::Easy,
            ["Array", "Hash Table"],
        )))
        .into_response(),
        "broken" => (StatusCode::BAD_GATEWAY, "upstream down").into_response(),
        "garbage" => "<html>".into_response(),
        _ => Json(ProblemResponse::not_found()).into_response(),
    }
}

#[tokio::test]
async fn test_lookup_found_and_not_found() {
    let base = spawn(Router::new().route("/api/leetcode/problem/:slug", get(problem))).await;
    let lookup = HttpProblemLookup::new(&base, TIMEOUT).unwrap();

    let found = lookup.lookup("two-sum").await.unwrap();
    assert_eq!(found.title, "Two Sum");
    assert_eq!(found.tags, vec!["Array", "Hash Table"]);

    assert!(lookup.lookup("unknown-problem").await.is_none());
}

#[tokio::test]
async fn test_lookup_failures_are_empty_results() {
    let base = spawn(Router::new().route("/api/leetcode/problem/:slug", get(problem))).await;
    let lookup = HttpProblemLookup::new(&base, TIMEOUT).unwrap();

    assert!(lookup.lookup("broken").await.is_none());
    assert!(lookup.lookup("garbage").await.is_none());

    let dead = HttpProblemLookup::new(dead_endpoint().await, TIMEOUT).unwrap();
    assert!(dead.lookup("two-sum").await.is_none());
}

#[tokio::test]
async fn test_lookup_resource_is_configurable() {
    let base = spawn(Router::new().route("/api/codeforge/problem/:slug", get(problem))).await;
    let lookup = HttpProblemLookup::new(&base, TIMEOUT)
        .unwrap()
        .with_resource("codeforge");
    assert!(lookup.lookup("two-sum").await.is_some());
}

// ========================================================================
// Provider clients
// ========================================================================

async fn gemini(
    State(captured): State<Captured>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.headers.lock().unwrap().push(headers);
    let mut body = body;
    body["model_segment"] = Value::String(model);
    captured.bodies.lock().unwrap().push(body);
    Json(json!({
        "candidates": [ { "content": { "role": "model", "parts": [ { "text": "What have " }, { "text": "you tried?" } ] } } ]
    }))
}

#[tokio::test]
async fn test_gemini_client_generate() {
    let captured = Captured::default();
    let base = spawn(
        Router::new()
            .route("/v1beta/models/:model", post(gemini))
            .with_state(captured.clone()),
    )
    .await;

    let client = GeminiClient::new("secret", TIMEOUT)
        .unwrap()
        .with_base_url(&base)
        .with_model("gemini-test");

    let text = client.generate("User: hi").await.unwrap();
    assert_eq!(text, "What have you tried?");

    let headers = captured.headers.lock().unwrap();
    assert_eq!(headers[0]["x-goog-api-key"], "secret");
    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies[0]["model_segment"], "gemini-test:generateContent");
    assert_eq!(bodies[0]["contents"][0]["parts"][0]["text"], "User: hi");
}

#[tokio::test]
async fn test_gemini_client_error_status() {
    let base = spawn(Router::new().route(
        "/v1beta/models/:model",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
    ))
    .await;

    let client = GeminiClient::new("secret", TIMEOUT).unwrap().with_base_url(&base);
    let err = client.generate("hi").await.unwrap_err();
    assert!(matches!(err, CoachError::Provider(ref m) if m.contains("429")));
}

#[tokio::test]
async fn test_openai_client_generate() {
    let captured = Captured::default();
    let base = spawn(
        Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        captured.headers.lock().unwrap().push(headers);
                        captured.bodies.lock().unwrap().push(body);
                        Json(json!({ "choices": [ { "message": { "role": "assistant", "content": "Consider sorting." } } ] }))
                    },
                ),
            )
            .with_state(captured.clone()),
    )
    .await;

    let client = OpenAIClient::new("sk-test", TIMEOUT)
        .unwrap()
        .with_base_url(&base)
        .with_model("gpt-test");

    assert_eq!(client.generate("User: hi").await.unwrap(), "Consider sorting.");

    let headers = captured.headers.lock().unwrap();
    assert_eq!(headers[0]["authorization"], "Bearer sk-test");
    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies[0]["model"], "gpt-test");
    assert_eq!(
        bodies[0]["messages"],
        json!([{ "role": "user", "content": "User: hi" }])
    );
}

#[tokio::test]
async fn test_openai_client_missing_content_is_malformed() {
    let base = spawn(Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [] })) }),
    ))
    .await;

    let client = OpenAIClient::new("sk-test", TIMEOUT).unwrap().with_base_url(&base);
    let err = client.generate("hi").await.unwrap_err();
    assert!(matches!(err, CoachError::MalformedOutput(_)));
}

// ========================================================================
// Controller over HTTP
// ========================================================================

#[tokio::test]
async fn test_controller_end_to_end_over_http() {
    let captured = Captured::default();
    let base = spawn(
        Router::new()
            .route("/api/chat", post(echo_chat))
            .route("/api/leetcode/problem/:slug", get(problem))
            .with_state(captured.clone()),
    )
    .await;

    let backend = Arc::new(HttpChatBackend::new(&base, TIMEOUT).unwrap());
    let lookup = Arc::new(HttpProblemLookup::new(&base, TIMEOUT).unwrap());
    let ctrl =
        ConversationController::new(backend, Some(lookup), ControllerOptions::default()).unwrap();

    let outcome = ctrl.submit("https://leetcode.com/problems/two-sum/").await;
    assert!(matches!(outcome, SubmitOutcome::ContextLoaded(ref p) if p.title == "Two Sum"));

    assert_eq!(ctrl.submit("where do I start?").await, SubmitOutcome::Replied);
    assert_eq!(
        ctrl.transcript().last().unwrap().text(),
        "echo: where do I start?"
    );

    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["problemContext"]["title"], "Two Sum");
}
