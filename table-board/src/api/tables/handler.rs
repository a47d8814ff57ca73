//! Table Board API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::ApiResponse;
use table_engine::{BoardView, TableView};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/tables - 获取整个看板
pub async fn list(State(state): State<AppState>) -> Json<ApiResponse<BoardView>> {
    Json(ApiResponse::ok(state.dashboard.board()))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<TableView>>> {
    let view = state
        .dashboard
        .table(&id)
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/tables/:id/print - 打印小票
///
/// A failed print still leaves the table in `preparing`; the 502 only
/// reports the ticket.
pub async fn print(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<TableView>>> {
    let view = state.dashboard.on_print_clicked(&id).await?;
    Ok(Json(ApiResponse::ok_with_message(view, "Ticket printed")))
}

/// POST /api/tables/:id/confirm - 确认付款
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<TableView>>> {
    let view = state.dashboard.on_confirm_clicked(&id).await?;
    Ok(Json(ApiResponse::ok_with_message(view, "Payment confirmed")))
}

/// POST /api/refresh - 立即协调
pub async fn refresh(State(state): State<AppState>) -> AppResult<Json<ApiResponse<BoardView>>> {
    let board = state.dashboard.refresh().await?;
    Ok(Json(ApiResponse::ok(board)))
}
