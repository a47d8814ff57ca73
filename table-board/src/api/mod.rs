//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tables`] - 桌台看板与员工操作

pub mod health;
pub mod tables;

use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// 最大并发请求数
const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        // Table board API
        .merge(tables::router())
}

/// Build the fully configured application
///
/// Used by both the HTTP server and the oneshot tests
pub fn build_app(state: AppState) -> Router {
    build_router()
        .with_state(state)
        // CORS - the dashboard UI is served from elsewhere
        .layer(CorsLayer::permissive())
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        // Trace - Request tracing (outermost)
        .layer(TraceLayer::new_for_http())
}
