use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use trip_planner::{CompletionClient, GenerationParams, PlannerError, TravelPlanner};
use trip_planner_service::{AppState, build_router, telemetry::CORRELATION_ID_HEADER};

const MAX_DAYS: u32 = 30;

/// Completion client that always answers with the same text
struct ScriptedClient(Result<String, u16>);

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _prompt: &str, _params: &GenerationParams) -> trip_planner::Result<String> {
        match &self.0 {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(PlannerError::Http {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

fn app_with(client: ScriptedClient) -> Router {
    let planner = TravelPlanner::new(Arc::new(client), GenerationParams::default());
    build_router(AppState::in_memory(planner, MAX_DAYS), "/api/v1", &[])
}

fn unparseable_app() -> Router {
    app_with(ScriptedClient(Ok("I'd love to help you plan a trip!".to_string())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_correlation_header() {
    let app = unparseable_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
}

#[tokio::test]
async fn test_unparseable_reply_still_succeeds() {
    let app = unparseable_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Japan", "days": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["error_message"].is_null());
    assert!(body["generation_time_seconds"].is_number());

    let plan = &body["travel_plan"];
    assert_eq!(plan["gemini_generated"], json!(false));
    assert_eq!(plan["itinerary"].as_array().unwrap().len(), 5);
    assert!(plan["itinerary"][0]["title"].as_str().unwrap().contains("Japan"));
}

#[tokio::test]
async fn test_transport_failure_falls_back() {
    let app = app_with(ScriptedClient(Err(503)));
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Peru", "days": 3})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["travel_plan"]["itinerary"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_generated_reply_is_returned() {
    let reply = json!({
        "country": "Japan",
        "days": 2,
        "title": "Tokyo and Kyoto",
        "itinerary": [
            {"day": 1, "title": "Shibuya", "activities": ["Crossing"], "notes": "Busy"},
            {"day": 2, "title": "Fushimi Inari", "activities": []}
        ]
    });
    let app = app_with(ScriptedClient(Ok(format!("```json\n{}\n```", reply))));

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Japan", "days": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let plan = &body["travel_plan"];
    assert_eq!(plan["gemini_generated"], json!(true));
    assert_eq!(plan["title"], json!("Tokyo and Kyoto"));
    assert_eq!(plan["itinerary"][1]["title"], json!("Fushimi Inari"));
}

#[tokio::test]
async fn test_day_boundaries() {
    let app = unparseable_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Italy", "days": MAX_DAYS + 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("30 days"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Italy", "days": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["travel_plan"]["itinerary"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Italy", "days": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_country_is_rejected() {
    let app = unparseable_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "   ", "days": 3})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Country is required"));
}

#[tokio::test]
async fn test_start_date_at_calendar_end_is_rejected() {
    let app = unparseable_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Japan", "days": 3, "start_date": "+262142-12-30"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("calendar"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Japan", "days": 2, "start_date": "+262142-12-30"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["travel_plan"]["itinerary"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_budget_tiers_order_total_cost() {
    let app = unparseable_app();
    let mut totals = Vec::new();

    for budget in ["BUDGET", "MODERATE", "LUXURY"] {
        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/generate_plan",
            Some(json!({
                "country": "Thailand",
                "days": 5,
                "budget_range": budget,
                "preferences": ["ADVENTURE", "NATURE"]
            })),
        )
        .await;
        totals.push(body["travel_plan"]["total_estimated_cost"].as_f64().unwrap());
    }

    assert!(totals[0] < totals[1] && totals[1] < totals[2]);
}

#[tokio::test]
async fn test_validate_input_endpoint() {
    let app = unparseable_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/validate_input",
        Some(json!({"country": " Japan ", "days": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"valid": true, "country": "Japan", "days": 7}));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/validate_input",
        Some(json!({"country": "Japan", "days": 45})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_item_crud() {
    let app = unparseable_app();

    let (status, body) = send(&app, "GET", "/api/v1/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/items",
        Some(json!({"name": "Test Item", "description": "A test item", "price": 9.99})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], json!("Test Item"));
    let id = created["id"].as_u64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/v1/items/{}", id),
        Some(json!({"price": 4.5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], json!(4.5));
    assert_eq!(updated["name"], json!("Test Item"));

    let (status, deleted) = send(&app, "DELETE", &format!("/api/v1/items/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], json!("Item 'Test Item' deleted successfully"));

    let (status, _) = send(&app, "GET", &format!("/api/v1/items/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_records_are_404() {
    let app = unparseable_app();

    let (status, body) = send(&app, "GET", "/api/v1/items/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Item not found"));

    let (status, _) = send(&app, "PUT", "/api/v1/users/999", Some(json!({"name": "X"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/v1/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_pagination() {
    let app = unparseable_app();
    let (status, body) = send(&app, "GET", "/api/v1/users?skip=1&limit=5", None).await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], json!("Jane Smith"));
}

#[tokio::test]
async fn test_duplicate_email_leaves_users_unchanged() {
    let app = unparseable_app();
    let (_, before) = send(&app, "GET", "/api/v1/users", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(json!({"name": "John Again", "email": "john@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Email already registered"));

    let (_, after) = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_user_create_defaults_active() {
    let app = unparseable_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(json!({"name": "Ada", "email": "ada@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(3));
    assert_eq!(body["is_active"], json!(true));
}

#[tokio::test]
async fn test_malformed_body_uses_error_shape() {
    let app = unparseable_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate_plan",
        Some(json!({"country": "Japan", "days": "five"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("days"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}
