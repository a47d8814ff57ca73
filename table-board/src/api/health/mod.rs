//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 存活检查 + 订单源状态 | 无 |
//!
//! Answers 503 with `"status": "stopped"` once the reconciler is gone.
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "engine_running": true,
//!   "uptime_seconds": 42,
//!   "revision": 9,
//!   "feed": { "online": true, "consecutiveFailures": 0, ... }
//! }
//! ```

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use table_engine::FeedHealth;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// ok | degraded (order feed offline) | stopped (reconciler gone)
    status: &'static str,
    version: &'static str,
    engine_running: bool,
    uptime_seconds: u64,
    /// Board revision last published
    revision: u64,
    feed: FeedHealth,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let board = state.dashboard.board();
    let engine_running = state.dashboard.is_running();
    let (code, status) = if !engine_running {
        tracing::error!("Health check: reconciler is not running");
        (StatusCode::SERVICE_UNAVAILABLE, "stopped")
    } else if board.feed.online || board.revision == 0 {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::OK, "degraded")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        engine_running,
        uptime_seconds: state.uptime_seconds(),
        revision: board.revision,
        feed: board.feed,
    };
    (code, Json(body))
}
