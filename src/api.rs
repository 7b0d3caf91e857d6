//! REST API for the load planning service.
//!
//! Provides HTTP endpoints for the frontend. Uses Axum as the web framework and
//! supports CORS. The placement work itself runs on Tokio's blocking pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::ops::ControlFlow;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, PlannerSettings};
use crate::model::{BoxType, Container, Group, ValidationError};
use crate::planner::{PlannerConfig, plan_load, plan_load_with_progress};
use crate::report::{PlacedItem, PlacementReport, UnplacedItem};

#[derive(Clone)]
struct ApiState {
    planner: PlannerSettings,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>load-planner API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for the calculation endpoints.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "container": {"length": 1000.0, "width": 1000.0, "height": 1000.0, "maxWeight": 500.0},
        "items": [
            {"id": "A", "quantity": 2, "length": 500.0, "width": 500.0, "height": 500.0, "weight": 10.0, "group": "G1"}
        ],
        "groups": [{"name": "G1", "color": "#FF0000"}]
    })
)]
pub struct CalculationRequest {
    #[serde(default)]
    #[schema(nullable = true)]
    pub container: Option<Container>,
    #[serde(default)]
    pub items: Vec<BoxType>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub allow_rotations: Option<bool>,
}

#[derive(Debug)]
struct ValidatedCalculation {
    container: Container,
    items: Vec<BoxType>,
    groups: Vec<Group>,
    allow_rotations: Option<bool>,
}

impl ValidatedCalculation {
    fn unit_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    fn planner_config(&self, settings: &PlannerSettings) -> PlannerConfig {
        let mut config = settings.planner_config();
        if let Some(allow_rotations) = self.allow_rotations {
            config.allow_rotations = allow_rotations;
        }
        config
    }
}

#[derive(Debug, thiserror::Error)]
enum CalculationRequestError {
    #[error("'container' must be provided")]
    MissingContainer,
    #[error("'items' must not be empty")]
    NoItems,
    #[error("'items' expand to {requested} boxes, at most {limit} are accepted")]
    TooManyUnits { requested: u64, limit: u64 },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl CalculationRequest {
    /// Checks the request and caps the number of boxes it expands to.
    fn into_validated(
        self,
        max_units: u64,
    ) -> Result<ValidatedCalculation, CalculationRequestError> {
        let container = self
            .container
            .ok_or(CalculationRequestError::MissingContainer)?;
        if self.items.is_empty() {
            return Err(CalculationRequestError::NoItems);
        }

        container.validate()?;
        for item in &self.items {
            item.validate()?;
        }

        let validated = ValidatedCalculation {
            container,
            items: self.items,
            groups: self.groups,
            allow_rotations: self.allow_rotations,
        };
        let requested = validated.unit_count();
        if requested > max_units {
            return Err(CalculationRequestError::TooManyUnits {
                requested,
                limit: max_units,
            });
        }
        Ok(validated)
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    status: String,
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn parse_calculation_request(
    payload: Result<Json<CalculationRequest>, JsonRejection>,
    settings: &PlannerSettings,
) -> Result<ValidatedCalculation, Response> {
    let Json(payload) = payload.map_err(json_deserialize_error)?;
    payload
        .into_validated(settings.max_units())
        .map_err(|err| validation_error(err.to_string()))
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_calculate, handle_calculate_stream, handle_health),
    components(
        schemas(
            CalculationRequest,
            Container,
            BoxType,
            Group,
            PlacementReport,
            PlacedItem,
            UnplacedItem,
            ErrorResponse,
            HealthResponse
        )
    ),
    tags((name = "loading", description = "Endpoints for container load planning"))
)]
struct ApiDoc;

/// Builds the router with all endpoints and the CORS layer.
fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/calculate", post(handle_calculate))
        .route("/calculate/stream", post(handle_calculate_stream))
        .route("/health", get(handle_health))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, planner: PlannerSettings) -> std::io::Result<()> {
    let app = router(ApiState { planner });

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let display_host = config.display_host().to_string();
    info!(
        "🚀 Server running on http://{}:{}",
        display_host,
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📦 API Endpoints: POST /calculate, POST /calculate/stream, GET /health");
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app).await
}

/// Handler for POST /calculate.
///
/// Computes the placement of all requested boxes in the container.
#[utoipa::path(
    post,
    path = "/calculate",
    request_body = CalculationRequest,
    responses(
        (status = 200, description = "Load plan computed", body = PlacementReport),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request data",
            body = ErrorResponse
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Calculation failed unexpectedly",
            body = ErrorResponse
        )
    ),
    tag = "loading"
)]
async fn handle_calculate(
    State(state): State<ApiState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let request = match parse_calculation_request(payload, &state.planner) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(
        "📥 New calculation request: {} box types, {} units",
        request.items.len(),
        request.unit_count()
    );
    let config = request.planner_config(&state.planner);

    let outcome = tokio::task::spawn_blocking(move || {
        plan_load(&request.container, &request.items, &request.groups, &config)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(err)) => validation_error(err.to_string()),
        Err(err) => {
            error!("❌ Calculation task failed: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Calculation failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for POST /calculate/stream (SSE).
///
/// Streams every placement decision as a Server-Sent Event, followed by the
/// complete report as the final event.
#[utoipa::path(
    post,
    path = "/calculate/stream",
    request_body = CalculationRequest,
    responses(
        (
            status = 200,
            description = "Streams placement events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request data",
            body = ErrorResponse
        )
    ),
    tag = "loading"
)]
async fn handle_calculate_stream(
    State(state): State<ApiState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let request = match parse_calculation_request(payload, &state.planner) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = request.planner_config(&state.planner);
    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        let result = plan_load_with_progress(
            &request.container,
            &request.items,
            &request.groups,
            &config,
            |evt| match serde_json::to_string(evt) {
                Ok(json) => match tx.blocking_send(json) {
                    Ok(()) => ControlFlow::Continue(()),
                    // receiver dropped: the client went away
                    Err(_) => ControlFlow::Break(()),
                },
                Err(err) => {
                    error!("❌ Could not serialize load event: {}", err);
                    ControlFlow::Continue(())
                }
            },
        );
        let final_message = match result {
            Ok(report) => json!({ "type": "Report", "report": report }),
            Err(err) => json!({ "type": "Error", "details": err.to_string() }),
        };
        if tx.blocking_send(final_message.to_string()).is_err() {
            info!("🔌 Stream client disconnected before the report was sent");
        }
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for GET /health.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = HealthResponse)),
    tag = "loading"
)]
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
