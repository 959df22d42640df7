use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::database::DatabaseManager;
use crate::handlers::{auth, bootcamps, courses, reviews, users};
use crate::middleware::{authorize, protect};
use crate::state::AppState;
use crate::types::{ADMIN_ROLES, PUBLISHER_ROLES, REVIEWER_ROLES};

/// Multipart framing allowance on top of the photo size limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Full application router
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_routes(&state))
        .nest_service("/uploads", ServeDir::new(&config.upload.dir))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state))
        .nest("/bootcamps", bootcamp_routes(state))
        .nest("/courses", course_routes(state))
        .nest("/reviews", review_routes(state))
        .nest("/users", user_routes(state))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let signed_in = from_fn_with_state(state.clone(), protect);

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/forgotpassword", post(auth::forgot_password))
        .route("/resetpassword/:token", put(auth::reset_password))
        .route("/me", get(auth::me).route_layer(signed_in.clone()))
        .route("/updatedetails", put(auth::update_details).route_layer(signed_in.clone()))
        .route("/updatepassword", put(auth::update_password).route_layer(signed_in))
}

fn bootcamp_routes(state: &AppState) -> Router<AppState> {
    let publisher = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), protect))
        .layer(from_fn_with_state(PUBLISHER_ROLES, authorize));
    let reviewer = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), protect))
        .layer(from_fn_with_state(REVIEWER_ROLES, authorize));
    let photo_limit =
        DefaultBodyLimit::max(state.config.upload.max_file_size + MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/",
            get(bootcamps::list).merge(post(bootcamps::create).route_layer(publisher.clone())),
        )
        .route("/radius/:zipcode/:distance", get(bootcamps::within_radius))
        .route(
            "/:id",
            get(bootcamps::get).merge(
                put(bootcamps::update)
                    .delete(bootcamps::delete)
                    .route_layer(publisher.clone()),
            ),
        )
        .route(
            "/:id/photo",
            put(bootcamps::photo_upload)
                .route_layer(publisher.clone())
                .layer(photo_limit),
        )
        .route(
            "/:id/courses",
            get(courses::list_for_bootcamp).merge(post(courses::create).route_layer(publisher)),
        )
        .route(
            "/:id/reviews",
            get(reviews::list_for_bootcamp).merge(post(reviews::create).route_layer(reviewer)),
        )
}

fn course_routes(state: &AppState) -> Router<AppState> {
    let publisher = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), protect))
        .layer(from_fn_with_state(PUBLISHER_ROLES, authorize));

    Router::new()
        .route("/", get(courses::list))
        .route(
            "/:id",
            get(courses::get).merge(
                put(courses::update)
                    .delete(courses::delete)
                    .route_layer(publisher),
            ),
        )
}

fn review_routes(state: &AppState) -> Router<AppState> {
    let reviewer = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), protect))
        .layer(from_fn_with_state(REVIEWER_ROLES, authorize));

    Router::new()
        .route("/", get(reviews::list))
        .route(
            "/:id",
            get(reviews::get).merge(
                put(reviews::update)
                    .delete(reviews::delete)
                    .route_layer(reviewer),
            ),
        )
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let admin = ServiceBuilder::new()
        .layer(from_fn_with_state(state.clone(), protect))
        .layer(from_fn_with_state(ADMIN_ROLES, authorize));

    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route_layer(admin)
}

/// Explicit origin list; a single `*` entry opens CORS to any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("ignoring CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "DevCamper API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/api/v1/auth/*",
                "bootcamps": "/api/v1/bootcamps[/:id]",
                "radius": "/api/v1/bootcamps/radius/:zipcode/:distance",
                "courses": "/api/v1/courses[/:id], /api/v1/bootcamps/:id/courses",
                "reviews": "/api/v1/reviews[/:id], /api/v1/bootcamps/:id/reviews",
                "users": "/api/v1/users[/:id] (admin)",
                "uploads": "/uploads/:file",
                "health": "/health",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
