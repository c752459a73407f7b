use axum::{
    Router,
    extract::{FromRequest, Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    middleware::from_fn,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use trip_planner::{
    ChatCompletionsClient, GenerationResponse, PlannerError, TravelPlanInput, TravelPlanner,
};

use crate::{
    config::Settings,
    crud,
    storage::{InMemoryItemStore, InMemoryUserStore, ItemStore, UserStore},
    telemetry::correlation_id_middleware,
};

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
pub type ApiError = (StatusCode, Json<Value>);

pub fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

pub fn not_found_error(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message })))
}

pub fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

/// Map a library error onto the API's error shape, keyed by its status code
pub fn planner_error(err: PlannerError) -> ApiError {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match err {
        PlannerError::Validation(message) => bad_request_error(&message),
        PlannerError::NotFound(message) => not_found_error(&message),
        other if status == StatusCode::INTERNAL_SERVER_ERROR => {
            internal_error("Request failed", &other.to_string())
        }
        other => (
            status,
            Json(json!({
                "error": "Upstream request failed",
                "details": other.to_string()
            })),
        ),
    }
}

/// `Json` extractor whose rejections use the same `{"error": ...}` body as
/// every other failure. The status code is axum's (415, 400 or 422).
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "Rejected request body");
                Err((
                    rejection.status(),
                    Json(json!({ "error": rejection.body_text() })),
                ))
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub planner: TravelPlanner,
    pub items: Arc<dyn ItemStore>,
    pub users: Arc<dyn UserStore>,
    pub max_trip_days: u32,
    pub project_name: Arc<str>,
}

impl AppState {
    /// State backed by the seeded in-memory stores
    pub fn in_memory(planner: TravelPlanner, max_trip_days: u32) -> Self {
        Self {
            planner,
            items: Arc::new(InMemoryItemStore::with_demo_data()),
            users: Arc::new(InMemoryUserStore::with_demo_data()),
            max_trip_days,
            project_name: Arc::from("Trip Planner API"),
        }
    }

    pub fn with_project_name(mut self, name: &str) -> Self {
        self.project_name = Arc::from(name);
        self
    }
}

pub fn create_app(settings: &Settings) -> trip_planner::Result<Router> {
    let client = ChatCompletionsClient::new(
        settings.gemini_base_url.clone(),
        settings.gemini_api_key.clone(),
        settings.gemini_model.clone(),
        settings.gemini_timeout,
    )?;
    info!(
        model = %client.model(),
        base_url = %settings.gemini_base_url,
        max_trip_days = settings.max_trip_days,
        "Completion client configured"
    );

    let planner = TravelPlanner::new(Arc::new(client), settings.generation);
    let app_state = AppState::in_memory(planner, settings.max_trip_days)
        .with_project_name(&settings.project_name);

    Ok(build_router(
        app_state,
        &settings.api_v1_str,
        &settings.cors_origins,
    ))
}

pub fn build_router(app_state: AppState, api_prefix: &str, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/generate_plan", post(generate_plan))
        .route("/validate_input", post(validate_input))
        .route("/items", get(crud::list_items).post(crud::create_item))
        .route(
            "/items/{id}",
            get(crud::get_item)
                .put(crud::update_item)
                .delete(crud::delete_item),
        )
        .route("/users", get(crud::list_users).post(crud::create_user))
        .route(
            "/users/{id}",
            get(crud::get_user)
                .put(crud::update_user)
                .delete(crud::delete_user),
        );

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check));

    let router = if api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(api_prefix, api)
    };

    router
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": state.project_name.as_ref(),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "AI-assisted travel itinerary generation",
        "endpoints": {
            "POST /generate_plan": "Generate a travel plan for a country and number of days",
            "POST /validate_input": "Check a travel plan request without generating it",
            "GET|POST /items": "List or create items",
            "GET|PUT|DELETE /items/{id}": "Read, update or delete an item",
            "GET|POST /users": "List or create users",
            "GET|PUT|DELETE /users/{id}": "Read, update or delete a user",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn validate_travel_input(input: &TravelPlanInput, max_trip_days: u32) -> Result<(), ApiError> {
    input.validate(max_trip_days).map_err(|e| {
        warn!(
            country = %input.country,
            days = input.days,
            error = %e,
            "Rejected travel plan request"
        );
        planner_error(e)
    })
}

async fn validate_input(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TravelPlanInput>,
) -> ApiResult<Value> {
    validate_travel_input(&input, state.max_trip_days)?;

    Ok(Json(json!({
        "valid": true,
        "country": input.country.trim(),
        "days": input.days
    })))
}

async fn generate_plan(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TravelPlanInput>,
) -> ApiResult<GenerationResponse> {
    info!(
        country = %input.country,
        days = input.days,
        "Generating travel plan"
    );

    validate_travel_input(&input, state.max_trip_days)?;

    let started = Instant::now();
    let planner = state.planner.clone();
    let outcome = tokio::spawn(async move { planner.generate(&input).await }).await;
    let elapsed = started.elapsed().as_secs_f64();

    let response = match outcome {
        Ok(generated) => {
            info!(
                provenance = ?generated.provenance,
                days = generated.plan.days,
                elapsed_seconds = elapsed,
                "Travel plan ready"
            );
            GenerationResponse::success(generated.plan, elapsed)
        }
        Err(e) => {
            error!(error = %e, "Travel plan generation task failed");
            GenerationResponse::failure(format!("Error generating travel plan: {}", e), elapsed)
        }
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_error_follows_status_code() {
        let cases = [
            (PlannerError::Validation("Country is required".into()), StatusCode::BAD_REQUEST),
            (PlannerError::NotFound("Item not found".into()), StatusCode::NOT_FOUND),
            (
                PlannerError::Http {
                    status: 503,
                    body: "unavailable".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (PlannerError::Config("GEMINI_API_KEY not set".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let code = err.status_code();
            let (status, Json(body)) = planner_error(err);
            assert_eq!(status, expected);
            assert_eq!(status.as_u16(), code);
            assert!(body["error"].is_string());
        }
    }

    #[test]
    fn test_not_found_keeps_store_message() {
        let (_, Json(body)) = planner_error(PlannerError::NotFound("User not found".into()));
        assert_eq!(body, json!({ "error": "User not found" }));
    }
}
