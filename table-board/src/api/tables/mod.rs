//! Table Board API 模块
//!
//! | 方法 | 路径 | 说明 |
//! |------|------|------|
//! | GET | /api/tables | 整个看板 |
//! | GET | /api/tables/{id} | 单个桌台 |
//! | POST | /api/tables/{id}/print | 打印小票 → preparing |
//! | POST | /api/tables/{id}/confirm | 确认付款 → paid |
//! | POST | /api/refresh | 立即协调一次 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tables", get(handler::list))
        .route("/api/tables/{id}", get(handler::get_by_id))
        .route("/api/tables/{id}/print", post(handler::print))
        .route("/api/tables/{id}/confirm", post(handler::confirm))
        .route("/api/refresh", post(handler::refresh))
}
