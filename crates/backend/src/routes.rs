use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;
use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    // ========================================
    // DASHBOARD ROUTES (auth optional, see auth.protect_api)
    // ========================================
    let mut api = Router::new()
        // D400 Seller performance
        .route(
            "/api/sellers",
            get(handlers::d400_seller_performance::list_sellers),
        )
        .route(
            "/api/sellers/:id/metrics",
            get(handlers::d400_seller_performance::get_seller_metrics),
        )
        .route(
            "/api/sellers/:id/portfolio",
            get(handlers::d400_seller_performance::get_seller_portfolio),
        )
        .route(
            "/api/sellers/:id/insights",
            get(handlers::d400_seller_performance::get_seller_insights),
        )
        // D401 RFV overview
        .route("/api/rfv", get(handlers::d401_rfv_overview::list_entries))
        .route(
            "/api/rfv/classification",
            get(handlers::d401_rfv_overview::by_classification),
        )
        .route("/api/rfv/value", get(handlers::d401_rfv_overview::by_value))
        .route("/api/rfv/status", get(handlers::d401_rfv_overview::by_status))
        .route(
            "/api/rfv/recency-frequency",
            get(handlers::d401_rfv_overview::by_recency_frequency),
        )
        .route(
            "/api/rfv/by-codigos",
            post(handlers::d401_rfv_overview::by_codes),
        )
        .route("/api/rfv/:id", get(handlers::d401_rfv_overview::get_entry))
        // D402 Client heatmap
        .route("/api/geoloc", get(handlers::d402_client_heatmap::list_points))
        .route(
            "/api/geoloc/center",
            get(handlers::d402_client_heatmap::center),
        )
        .route(
            "/api/geoloc/nearby",
            post(handlers::d402_client_heatmap::nearby),
        );

    if state.config.auth.protect_api {
        tracing::info!("Dashboard API requires a bearer token");
        api = api.route_layer(middleware::from_fn_with_state(
            state.clone(),
            system::auth::middleware::require_auth,
        ));
    }

    Router::new()
        .route("/health", get(health))
        // ========================================
        // AUTH ROUTES (PUBLIC)
        // ========================================
        .route("/api/auth/signin", post(system::handlers::auth::signin))
        .route("/api/auth/signout", post(system::handlers::auth::signout))
        .route("/api/auth/session", get(system::handlers::auth::session))
        .merge(api)
        .with_state(state)
}

/// Роуты + CORS + логирование запросов
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors.frontend_url.as_deref());
    configure_routes(state)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!("Invalid FRONTEND_URL, allowing any origin: {}", e);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}
