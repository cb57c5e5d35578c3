use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware};
use crate::state::AppState;

/// Build the full application router around `state`
pub fn app(state: AppState) -> Router {
    // Admin routes go first so that shared paths keep the public router's
    // (unauthenticated) method fallback after merging
    let mut router = admin_routes(&state)
        .merge(public_routes())
        .merge(protected_routes(&state));

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/emissions", get(public::emissions::list))
        .route("/emissions/:id", get(public::emissions::show))
        .route("/air-quality", get(public::air_quality::list))
        .route("/air-quality/:id", get(public::air_quality::show))
        .route("/sources", get(public::sources::list))
        .route("/sources/:id", get(public::sources::show))
        .route("/users/register", post(public::auth::register))
        .route("/users/login", post(public::auth::login))
        .route("/stats/air/averages", get(public::stats::air_averages))
        .route("/stats/co2/trend", get(public::stats::co2_trend))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(protected::whoami::whoami))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/emissions", post(elevated::emissions::create))
        .route(
            "/emissions/:id",
            axum::routing::put(elevated::emissions::update).delete(elevated::emissions::delete),
        )
        .route("/air-quality", post(elevated::air_quality::create))
        .route(
            "/air-quality/:id",
            axum::routing::put(elevated::air_quality::update).delete(elevated::air_quality::delete),
        )
        .route("/sources", post(elevated::sources::create))
        .route(
            "/sources/:id",
            axum::routing::put(elevated::sources::update).delete(elevated::sources::delete),
        )
        .route("/users", get(elevated::users::list))
        .route(
            "/users/:id",
            get(elevated::users::show)
                .put(elevated::users::update)
                .delete(elevated::users::delete),
        )
        // Layers run bottom-up: authenticate, then check the role
        .route_layer(middleware::from_fn(require_admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
