mod auth;
mod dashboard;
mod pages;
mod paychecks;
mod reports;
mod shifts;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::auth::middleware::{require_auth, require_page_auth};
use crate::config::Config;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

async fn health() -> &'static str {
    "ok"
}

pub fn create_router(state: AppState) -> Router {
    // Rate limit: auth routes — 10 requests per 60 seconds per IP
    let auth_governor = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .finish()
        .unwrap();

    // Rate limit: protected API — burst of 120, then 30 requests per 60 seconds per IP
    let api_governor = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(120)
        .finish()
        .unwrap();

    // Health check — no rate limit
    let health_routes = Router::new().route("/health", get(health));

    // Auth routes — strict rate limit
    let auth_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .layer(GovernorLayer::new(Arc::new(auth_governor)));

    let protected = Router::new()
        // Auth
        .route("/api/auth/me", get(auth::me))
        // Shifts
        .route("/api/shifts", get(shifts::list).post(shifts::create))
        .route(
            "/api/shifts/{id}",
            put(shifts::update).delete(shifts::delete),
        )
        // Paychecks (reconciled on every read)
        .route(
            "/api/paychecks",
            get(paychecks::list).post(paychecks::create),
        )
        .route(
            "/api/paychecks/{id}",
            get(paychecks::get)
                .put(paychecks::update)
                .delete(paychecks::delete),
        )
        // Dashboard summary
        .route("/api/dashboard", get(dashboard::summary))
        // Reports
        .route("/api/reports/summary", get(reports::summary))
        .route("/api/reports/export.csv", get(reports::export_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(GovernorLayer::new(Arc::new(api_governor)));

    // Page routes — everything not allow-listed redirects to /login
    let pages = Router::new()
        .route("/login", get(pages::login))
        .fallback(pages::app_shell)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_page_auth,
        ));

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(protected)
        .merge(pages)
        .with_state(state)
}
